//! Tap and hold detection on the story surface

use crate::session::Direction;
use std::time::{Duration, Instant};

/// Region of the surface a tap landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapZone {
    Previous,
    Next,
}

impl TapZone {
    /// Left third goes back, everything else goes forward.
    pub fn from_position(x: f64, width: f64) -> Self {
        if width > 0.0 && x < width / 3.0 {
            TapZone::Previous
        } else {
            TapZone::Next
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            TapZone::Previous => Direction::Previous,
            TapZone::Next => Direction::Next,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Short press: navigate
    Tap(TapZone),
    /// Long press released: resume only
    HoldEnded,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    started_at: Instant,
    zone: TapZone,
}

/// Classifies a press/release pair as a tap or a hold by its duration.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    hold_threshold: Duration,
    active: Option<Press>,
}

impl GestureTracker {
    pub fn new(hold_threshold: Duration) -> Self {
        Self {
            hold_threshold,
            active: None,
        }
    }

    pub fn press(&mut self, at: Instant, x: f64, width: f64) {
        self.active = Some(Press {
            started_at: at,
            zone: TapZone::from_position(x, width),
        });
    }

    /// Returns `None` when no press is active.
    pub fn release(&mut self, at: Instant) -> Option<Gesture> {
        let press = self.active.take()?;
        let held_for = at.saturating_duration_since(press.started_at);
        if held_for < self.hold_threshold {
            Some(Gesture::Tap(press.zone))
        } else {
            Some(Gesture::HoldEnded)
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_third_is_previous() {
        assert_eq!(TapZone::from_position(10.0, 300.0), TapZone::Previous);
        assert_eq!(TapZone::from_position(99.9, 300.0), TapZone::Previous);
        assert_eq!(TapZone::from_position(100.0, 300.0), TapZone::Next);
        assert_eq!(TapZone::from_position(290.0, 300.0), TapZone::Next);
        assert_eq!(TapZone::from_position(0.0, 0.0), TapZone::Next);
    }

    #[test]
    fn short_press_is_tap() {
        let mut tracker = GestureTracker::new(Duration::from_millis(200));
        let start = Instant::now();
        tracker.press(start, 20.0, 300.0);
        assert!(tracker.is_pressed());

        let gesture = tracker.release(start + Duration::from_millis(80));
        assert_eq!(gesture, Some(Gesture::Tap(TapZone::Previous)));
        assert!(!tracker.is_pressed());
    }

    #[test]
    fn long_press_is_hold_in_any_zone() {
        let mut tracker = GestureTracker::new(Duration::from_millis(200));
        let start = Instant::now();
        tracker.press(start, 20.0, 300.0);
        assert_eq!(
            tracker.release(start + Duration::from_millis(2_000)),
            Some(Gesture::HoldEnded)
        );

        tracker.press(start, 250.0, 300.0);
        assert_eq!(
            tracker.release(start + Duration::from_millis(200)),
            Some(Gesture::HoldEnded)
        );
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut tracker = GestureTracker::new(Duration::from_millis(200));
        assert_eq!(tracker.release(Instant::now()), None);
    }
}
