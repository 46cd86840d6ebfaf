//! Story playback engine
//!
//! Pure state machine behind the stories viewer: an ordered set of one
//! author's ephemeral items, a progress timer that advances on its own,
//! tap/hold navigation, and validation for reposts and replies.
//!
//! Nothing here does I/O or owns a timer. Callers feed elapsed time and
//! input events into [`PlaybackSession`] and perform the writes described by
//! the drafts it returns.

pub mod actions;
pub mod error;
pub mod gesture;
pub mod models;
pub mod session;
pub mod settings;

pub use actions::{reply_draft, repost_draft, MAX_REPLY_CHARS};
pub use error::{ErrorKind, PlaybackError, PlaybackResult};
pub use gesture::{Gesture, GestureTracker, TapZone};
pub use models::{
    MediaKind, NewReply, NewStory, Profile, StoryId, StoryItem, UnknownMediaKind, UserId, Viewer,
};
pub use session::{Direction, PlaybackSession, Step, PROGRESS_COMPLETE};
pub use settings::PlaybackSettings;
