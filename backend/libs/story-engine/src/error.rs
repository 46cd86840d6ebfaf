//! Error types for story playback

use crate::models::UserId;
use thiserror::Error;

/// Result type for playback operations
pub type PlaybackResult<T> = Result<T, PlaybackError>;

/// Everything that can stop a playback operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The requested author has no profile
    #[error("profile not found: {0}")]
    ProfileNotFound(UserId),

    /// The author has nothing inside the story window
    #[error("no active stories")]
    NoActiveStories,

    /// The viewer is not signed in
    #[error("sign in to continue")]
    AuthRequired,

    #[error("you cannot repost your own story")]
    SelfRepostForbidden,

    #[error("you cannot reply to your own story")]
    SelfReplyForbidden,

    /// Only one repost may be in flight per session
    #[error("a repost is already in progress")]
    RepostInFlight,

    #[error("invalid reply: {0}")]
    InvalidReply(String),

    /// Loading the story sequence failed
    #[error("failed to load stories: {0}")]
    FetchFailed(String),

    #[error("failed to repost story: {0}")]
    RepostWriteFailed(String),

    #[error("failed to send reply: {0}")]
    ReplyWriteFailed(String),

    /// The session was torn down before the operation ran
    #[error("story session is closed")]
    SessionClosed,
}

/// How the caller should react to a [`PlaybackError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Expected exit; route away silently
    Navigational,
    /// Show a message, nothing to retry
    Precondition,
    /// Show a transient notification; the caller may retry explicitly
    Transient,
}

impl PlaybackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaybackError::NoActiveStories | PlaybackError::SessionClosed => {
                ErrorKind::Navigational
            }
            PlaybackError::ProfileNotFound(_)
            | PlaybackError::AuthRequired
            | PlaybackError::SelfRepostForbidden
            | PlaybackError::SelfReplyForbidden
            | PlaybackError::RepostInFlight
            | PlaybackError::InvalidReply(_) => ErrorKind::Precondition,
            PlaybackError::FetchFailed(_)
            | PlaybackError::RepostWriteFailed(_)
            | PlaybackError::ReplyWriteFailed(_) => ErrorKind::Transient,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        assert_eq!(PlaybackError::NoActiveStories.kind(), ErrorKind::Navigational);
        assert_eq!(
            PlaybackError::SelfRepostForbidden.kind(),
            ErrorKind::Precondition
        );
        assert!(PlaybackError::RepostWriteFailed("timeout".into()).is_retryable());
        assert!(!PlaybackError::AuthRequired.is_retryable());
    }
}
