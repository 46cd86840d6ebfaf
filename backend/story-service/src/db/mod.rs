/// Content store access for story-service
///
/// The [`ContentStore`] trait is the seam between story logic and
/// persistence; [`PgStoryRepo`] is the PostgreSQL implementation.
pub mod story_repo;

pub use story_repo::PgStoryRepo;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use story_engine::{NewReply, NewStory, Profile, StoryId, StoryItem, UserId};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn find_profile(&self, user_id: UserId) -> Result<Option<Profile>>;

    /// A single live story created at or after `since`.
    async fn find_story(&self, story_id: StoryId, since: DateTime<Utc>)
        -> Result<Option<StoryItem>>;

    /// Live stories of `author_id` created at or after `since`, oldest first.
    async fn query_ephemeral(
        &self,
        author_id: UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<StoryItem>>;

    async fn create_ephemeral(&self, story: NewStory) -> Result<StoryId>;

    /// Idempotent per (story, viewer).
    async fn track_view(&self, story_id: StoryId, viewer_id: UserId) -> Result<()>;

    async fn create_reply(&self, reply: NewReply) -> Result<Uuid>;

    /// Soft-delete stories created before `before`. Returns affected rows.
    async fn cleanup_expired(&self, before: DateTime<Utc>) -> Result<u64>;
}
