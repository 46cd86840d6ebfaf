//! Core story data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a story record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub Uuid);

impl StoryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for StoryId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a user profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Kind of media a story points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown media kind: {0}")]
pub struct UnknownMediaKind(pub String);

impl TryFrom<&str> for MediaKind {
    type Error = UnknownMediaKind;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            other => Err(UnknownMediaKind(other.to_string())),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ephemeral media item as served by the content store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryItem {
    pub id: StoryId,
    pub author_id: UserId,
    pub media_kind: MediaKind,
    pub media_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposted_from_username: Option<String>,
}

impl StoryItem {
    pub fn is_video(&self) -> bool {
        self.media_kind == MediaKind::Video
    }
}

/// Public profile of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub photo_url: Option<String>,
}

/// The signed-in user looking at stories. Anonymous viewers are `None`.
pub type Viewer = Profile;

/// Record written to the content store when a story is published or reposted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStory {
    pub author_id: UserId,
    pub author_username: String,
    pub author_photo_url: Option<String>,
    pub media_kind: MediaKind,
    pub media_url: String,
    pub reposted_from_username: Option<String>,
}

/// Direct reply to a story, delivered to the story's author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReply {
    pub story_id: StoryId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_parses_known_values() {
        assert_eq!(MediaKind::try_from("image"), Ok(MediaKind::Image));
        assert_eq!(MediaKind::try_from("video"), Ok(MediaKind::Video));
        assert_eq!(
            MediaKind::try_from("gif"),
            Err(UnknownMediaKind("gif".to_string()))
        );
    }

    #[test]
    fn story_item_serializes_with_lowercase_kind() {
        let item = StoryItem {
            id: StoryId::new(),
            author_id: UserId::new(),
            media_kind: MediaKind::Video,
            media_url: "https://cdn.example/v.mp4".to_string(),
            created_at: Utc::now(),
            reposted_from_username: None,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["media_kind"], "video");
        assert!(json.get("reposted_from_username").is_none());
        assert_eq!(json["id"], item.id.0.to_string());
    }
}
