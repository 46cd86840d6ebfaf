//! Story playback state machine.
//!
//! A [`PlaybackSession`] is an immutable value; every transition consumes it
//! and returns the next state. Transitions that can close the session return
//! a [`Step`].

use crate::actions::{reply_draft, repost_draft};
use crate::error::{PlaybackError, PlaybackResult};
use crate::gesture::Gesture;
use crate::models::{NewReply, NewStory, Profile, StoryId, StoryItem, Viewer};
use crate::settings::PlaybackSettings;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound of `progress_percent`
pub const PROGRESS_COMPLETE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Outcome of a transition that may end the session
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Active(PlaybackSession),
    /// Advanced past the last item
    Finished,
}

impl Step {
    pub fn is_finished(&self) -> bool {
        matches!(self, Step::Finished)
    }

    pub fn into_session(self) -> Option<PlaybackSession> {
        match self {
            Step::Active(session) => Some(session),
            Step::Finished => None,
        }
    }
}

/// One viewer's traversal through one author's current stories
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    author: Profile,
    items: Arc<[StoryItem]>,
    current_index: usize,
    progress_percent: f64,
    item_duration: Duration,
    duration_reported: bool,
    held: bool,
    input_focused: bool,
    repost_in_flight: bool,
    epoch: u64,
    settings: PlaybackSettings,
}

impl PlaybackSession {
    /// Start a session on the first item.
    ///
    /// Items not authored by `author` are dropped and the rest are ordered
    /// oldest first. Fails with `NoActiveStories` if nothing remains.
    pub fn start(
        author: Profile,
        mut items: Vec<StoryItem>,
        settings: PlaybackSettings,
    ) -> PlaybackResult<Self> {
        let fetched = items.len();
        items.retain(|item| item.author_id == author.id);
        if items.len() != fetched {
            tracing::warn!(
                author_id = %author.id,
                dropped = fetched - items.len(),
                "dropping stories from other authors"
            );
        }
        if items.is_empty() {
            return Err(PlaybackError::NoActiveStories);
        }
        items.sort_by_key(|item| item.created_at);

        Ok(Self {
            author,
            items: items.into(),
            current_index: 0,
            progress_percent: 0.0,
            item_duration: settings.image_duration,
            duration_reported: false,
            held: false,
            input_focused: false,
            repost_in_flight: false,
            epoch: 0,
            settings,
        })
    }

    pub fn author(&self) -> &Profile {
        &self.author
    }

    pub fn items(&self) -> &[StoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_item(&self) -> &StoryItem {
        &self.items[self.current_index]
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    pub fn item_duration(&self) -> Duration {
        self.item_duration
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Bumped whenever the current item (re)starts.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_paused(&self) -> bool {
        self.held || self.input_focused || self.repost_in_flight
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn is_input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn is_repost_in_flight(&self) -> bool {
        self.repost_in_flight
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.items.len()
    }

    pub fn advance(self, direction: Direction) -> Step {
        match direction {
            Direction::Next if self.is_last() => Step::Finished,
            Direction::Next => {
                let next = self.current_index + 1;
                Step::Active(self.move_to(next))
            }
            Direction::Previous => {
                let prev = self.current_index.saturating_sub(1);
                Step::Active(self.move_to(prev))
            }
        }
    }

    /// Account for `elapsed` time on the progress timer.
    ///
    /// Reaching 100% advances to the next item, which starts at 0; any
    /// overshoot is discarded.
    pub fn tick(mut self, elapsed: Duration) -> Step {
        if self.is_paused() {
            return Step::Active(self);
        }

        let duration_us = self.item_duration.as_micros();
        if duration_us == 0 {
            return self.advance(Direction::Next);
        }

        let step = elapsed.as_micros() as f64 * PROGRESS_COMPLETE / duration_us as f64;
        let progress = self.progress_percent + step;
        if progress >= PROGRESS_COMPLETE {
            return self.advance(Direction::Next);
        }

        self.progress_percent = progress;
        Step::Active(self)
    }

    /// Press-and-hold pause source.
    pub fn set_paused(mut self, held: bool) -> Self {
        self.held = held;
        self
    }

    /// Reply composition pause source.
    pub fn set_input_focus(mut self, focused: bool) -> Self {
        self.input_focused = focused;
        self
    }

    /// Apply the real length of a video once the player knows it.
    ///
    /// Ignored unless `story_id` is the current item, the item is a video and
    /// no duration was applied yet. Elapsed progress is kept.
    pub fn report_media_duration(mut self, story_id: &StoryId, duration: Duration) -> Self {
        let current = self.current_item();
        if current.id != *story_id || !current.is_video() {
            tracing::trace!(story_id = %story_id, "ignoring duration for non-current item");
            return self;
        }
        if self.duration_reported || duration.is_zero() {
            return self;
        }

        tracing::debug!(
            story_id = %story_id,
            duration_ms = duration.as_millis() as u64,
            "video duration discovered"
        );
        self.item_duration = duration;
        self.duration_reported = true;
        self
    }

    /// The player reached the natural end of a video.
    ///
    /// A stale `story_id` is a no-op, so a timer advance and an end event for
    /// the same item never advance twice.
    pub fn media_ended(self, story_id: &StoryId) -> Step {
        let current = self.current_item();
        if current.id == *story_id && current.is_video() {
            self.advance(Direction::Next)
        } else {
            Step::Active(self)
        }
    }

    /// Press on the surface: pause immediately until released.
    pub fn press(self) -> Self {
        self.set_paused(true)
    }

    /// Resolve a released press.
    pub fn apply_gesture(self, gesture: Gesture) -> Step {
        let resumed = self.set_paused(false);
        match gesture {
            Gesture::Tap(zone) => resumed.advance(zone.direction()),
            Gesture::HoldEnded => Step::Active(resumed),
        }
    }

    /// Validate a repost of the current item by `viewer`.
    pub fn prepare_repost(&self, viewer: Option<&Viewer>) -> PlaybackResult<NewStory> {
        let draft = repost_draft(self.current_item(), &self.author, viewer)?;
        if self.repost_in_flight {
            return Err(PlaybackError::RepostInFlight);
        }
        Ok(draft)
    }

    pub fn begin_repost(mut self) -> Self {
        self.repost_in_flight = true;
        self
    }

    pub fn finish_repost(mut self) -> Self {
        self.repost_in_flight = false;
        self
    }

    pub fn prepare_reply(&self, viewer: Option<&Viewer>, body: &str) -> PlaybackResult<NewReply> {
        reply_draft(self.current_item(), viewer, body)
    }

    fn move_to(mut self, index: usize) -> Self {
        debug_assert!(index < self.items.len());
        self.current_index = index;
        self.progress_percent = 0.0;
        self.item_duration = self.settings.image_duration;
        self.duration_reported = false;
        self.epoch += 1;
        self
    }
}
