//! Playback timing settings

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Duration used for images, and for videos until the player reports the real length
pub const DEFAULT_ITEM_DURATION: Duration = Duration::from_millis(5_000);

/// Progress timer period
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Coarsest tick the progress bar tolerates before it visibly stutters
pub const MAX_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Presses shorter than this are taps, longer ones are holds
pub const DEFAULT_HOLD_THRESHOLD: Duration = Duration::from_millis(200);

/// Stories stay visible for this many hours after creation
pub const DEFAULT_STORY_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSettings {
    pub tick_interval: Duration,
    pub image_duration: Duration,
    pub hold_threshold: Duration,
    pub story_window: chrono::Duration,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            image_duration: DEFAULT_ITEM_DURATION,
            hold_threshold: DEFAULT_HOLD_THRESHOLD,
            story_window: chrono::Duration::hours(DEFAULT_STORY_WINDOW_HOURS),
        }
    }
}

impl PlaybackSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval.is_zero() || self.tick_interval > MAX_TICK_INTERVAL {
            return Err(format!(
                "tick interval must be between 1ms and {}ms, got {}ms",
                MAX_TICK_INTERVAL.as_millis(),
                self.tick_interval.as_millis()
            ));
        }
        if self.image_duration.is_zero() {
            return Err("image duration must be positive".to_string());
        }
        if self.story_window <= chrono::Duration::zero() {
            return Err("story window must be positive".to_string());
        }
        Ok(())
    }

    /// Oldest creation time still inside the story window.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.story_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = PlaybackSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.tick_interval, Duration::from_millis(50));
        assert_eq!(settings.image_duration, Duration::from_millis(5_000));
    }

    #[test]
    fn rejects_coarse_or_zero_ticks() {
        let mut settings = PlaybackSettings::default();
        settings.tick_interval = Duration::from_millis(250);
        assert!(settings.validate().is_err());

        settings.tick_interval = Duration::ZERO;
        assert!(settings.validate().is_err());

        settings.tick_interval = MAX_TICK_INTERVAL;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn window_start_is_24_hours_back() {
        let now = Utc::now();
        let settings = PlaybackSettings::default();
        assert_eq!(now - settings.window_start(now), chrono::Duration::hours(24));
    }
}
