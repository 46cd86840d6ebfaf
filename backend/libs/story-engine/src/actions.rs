//! Validation for the side-effecting story actions.
//!
//! These build the records to write; performing the write is up to the caller.

use crate::error::{PlaybackError, PlaybackResult};
use crate::models::{NewReply, NewStory, Profile, StoryItem, Viewer};

/// Longest accepted reply, in characters
pub const MAX_REPLY_CHARS: usize = 1_000;

/// Build the repost of `item` (authored by `author`) on behalf of `viewer`.
pub fn repost_draft(
    item: &StoryItem,
    author: &Profile,
    viewer: Option<&Viewer>,
) -> PlaybackResult<NewStory> {
    let viewer = viewer.ok_or(PlaybackError::AuthRequired)?;
    if viewer.id == item.author_id {
        return Err(PlaybackError::SelfRepostForbidden);
    }

    Ok(NewStory {
        author_id: viewer.id,
        author_username: viewer.username.clone(),
        author_photo_url: viewer.photo_url.clone(),
        media_kind: item.media_kind,
        media_url: item.media_url.clone(),
        reposted_from_username: Some(author.username.clone()),
    })
}

/// Build a reply from `viewer` to the author of `item`.
pub fn reply_draft(item: &StoryItem, viewer: Option<&Viewer>, body: &str) -> PlaybackResult<NewReply> {
    let viewer = viewer.ok_or(PlaybackError::AuthRequired)?;
    if viewer.id == item.author_id {
        return Err(PlaybackError::SelfReplyForbidden);
    }

    let body = body.trim();
    if body.is_empty() {
        return Err(PlaybackError::InvalidReply("reply is empty".to_string()));
    }
    let len = body.chars().count();
    if len > MAX_REPLY_CHARS {
        return Err(PlaybackError::InvalidReply(format!(
            "reply is {len} characters, limit is {MAX_REPLY_CHARS}"
        )));
    }

    Ok(NewReply {
        story_id: item.id,
        sender_id: viewer.id,
        recipient_id: item.author_id,
        body: body.to_string(),
    })
}
