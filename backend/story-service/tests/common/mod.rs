//! In-memory content store for integration tests
//!
//! Keeps profiles, stories, views and replies in memory and counts writes so
//! tests can assert that rejected actions never reached the store. Story
//! writes can be held behind a gate to simulate a slow backend.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::{Arc, Mutex};
use story_engine::{MediaKind, NewReply, NewStory, Profile, StoryId, StoryItem, UserId};
use story_service::db::ContentStore;
use story_service::error::{AppError, Result};
use tokio::sync::Semaphore;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    profiles: Vec<Profile>,
    stories: Vec<StoryItem>,
    created: Vec<NewStory>,
    views: Vec<(StoryId, UserId)>,
    replies: Vec<NewReply>,
    fail_writes: bool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    write_gate: Option<Arc<Semaphore>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Story writes wait until [`MemoryStore::open_gate`] is called.
    pub fn gated() -> Self {
        Self {
            inner: Arc::default(),
            write_gate: Some(Arc::new(Semaphore::new(0))),
        }
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.write_gate {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn fail_writes(&self) {
        self.inner.lock().unwrap().fail_writes = true;
    }

    pub fn add_profile(&self, username: &str) -> Profile {
        let profile = Profile {
            id: UserId::new(),
            username: username.to_string(),
            photo_url: Some(format!("https://cdn.otakuwall.test/avatars/{username}.png")),
        };
        self.inner.lock().unwrap().profiles.push(profile.clone());
        profile
    }

    /// Add a story created `minutes_ago` minutes in the past.
    pub fn add_story(&self, author: &Profile, kind: MediaKind, minutes_ago: i64) -> StoryItem {
        let story = StoryItem {
            id: StoryId::new(),
            author_id: author.id,
            media_kind: kind,
            media_url: format!("https://cdn.otakuwall.test/stories/{}", Uuid::new_v4()),
            created_at: Utc::now() - ChronoDuration::minutes(minutes_ago),
            reposted_from_username: None,
        };
        self.inner.lock().unwrap().stories.push(story.clone());
        story
    }

    pub fn created(&self) -> Vec<NewStory> {
        self.inner.lock().unwrap().created.clone()
    }

    pub fn views(&self) -> Vec<(StoryId, UserId)> {
        self.inner.lock().unwrap().views.clone()
    }

    pub fn replies(&self) -> Vec<NewReply> {
        self.inner.lock().unwrap().replies.clone()
    }

    pub fn shared(&self) -> Arc<dyn ContentStore> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn find_profile(&self, user_id: UserId) -> Result<Option<Profile>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.profiles.iter().find(|p| p.id == user_id).cloned())
    }

    async fn find_story(
        &self,
        story_id: StoryId,
        since: DateTime<Utc>,
    ) -> Result<Option<StoryItem>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .stories
            .iter()
            .find(|s| s.id == story_id && s.created_at >= since)
            .cloned())
    }

    async fn query_ephemeral(
        &self,
        author_id: UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<StoryItem>> {
        let inner = self.inner.lock().unwrap();
        let mut stories: Vec<StoryItem> = inner
            .stories
            .iter()
            .filter(|s| s.author_id == author_id && s.created_at >= since)
            .cloned()
            .collect();
        stories.sort_by_key(|s| s.created_at);
        Ok(stories)
    }

    async fn create_ephemeral(&self, story: NewStory) -> Result<StoryId> {
        if let Some(gate) = &self.write_gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(AppError::DatabaseError("write rejected".to_string()));
        }
        let item = StoryItem {
            id: StoryId::new(),
            author_id: story.author_id,
            media_kind: story.media_kind,
            media_url: story.media_url.clone(),
            created_at: Utc::now(),
            reposted_from_username: story.reposted_from_username.clone(),
        };
        let id = item.id;
        inner.stories.push(item);
        inner.created.push(story);
        Ok(id)
    }

    async fn track_view(&self, story_id: StoryId, viewer_id: UserId) -> Result<()> {
        // Every call is kept so tests can count duplicates.
        self.inner.lock().unwrap().views.push((story_id, viewer_id));
        Ok(())
    }

    async fn create_reply(&self, reply: NewReply) -> Result<Uuid> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(AppError::DatabaseError("write rejected".to_string()));
        }
        inner.replies.push(reply);
        Ok(Uuid::new_v4())
    }

    async fn cleanup_expired(&self, before: DateTime<Utc>) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        let count = inner.stories.len();
        inner.stories.retain(|s| s.created_at >= before);
        Ok((count - inner.stories.len()) as u64)
    }
}
