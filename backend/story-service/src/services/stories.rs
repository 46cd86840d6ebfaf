use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::metrics::stories as metrics;
use chrono::Utc;
use std::sync::Arc;
use story_engine::{
    reply_draft, repost_draft, MediaKind, NewStory, PlaybackError, PlaybackResult,
    PlaybackSession, PlaybackSettings, StoryId, StoryItem, UserId, Viewer,
};
use uuid::Uuid;

/// Story reads and writes on top of a [`ContentStore`]
#[derive(Clone)]
pub struct StoriesService {
    store: Arc<dyn ContentStore>,
    settings: PlaybackSettings,
}

impl StoriesService {
    pub fn new(store: Arc<dyn ContentStore>, settings: PlaybackSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Load an author's live stories into a fresh playback session.
    pub async fn open_session(&self, author_id: UserId) -> PlaybackResult<PlaybackSession> {
        let result = self.load_session(author_id).await;
        let outcome = match &result {
            Ok(_) => "opened",
            Err(PlaybackError::NoActiveStories) => "empty",
            Err(PlaybackError::ProfileNotFound(_)) => "not_found",
            Err(_) => "error",
        };
        metrics::record_session_opened(outcome);
        result
    }

    async fn load_session(&self, author_id: UserId) -> PlaybackResult<PlaybackSession> {
        let author = self
            .store
            .find_profile(author_id)
            .await
            .map_err(|e| PlaybackError::FetchFailed(e.to_string()))?
            .ok_or(PlaybackError::ProfileNotFound(author_id))?;

        let since = self.settings.window_start(Utc::now());
        let items = self
            .store
            .query_ephemeral(author_id, since)
            .await
            .map_err(|e| PlaybackError::FetchFailed(e.to_string()))?;

        tracing::debug!(author_id = %author_id, stories = items.len(), "loaded stories");
        PlaybackSession::start(author, items, self.settings)
    }

    /// Resolve the signed-in user from a gateway-propagated id.
    ///
    /// An id without a profile is rejected rather than treated as anonymous.
    pub async fn resolve_viewer(&self, user_id: Option<UserId>) -> Result<Option<Viewer>> {
        let Some(user_id) = user_id else {
            return Ok(None);
        };
        match self.store.find_profile(user_id).await? {
            Some(profile) => Ok(Some(profile)),
            None => Err(AppError::Unauthorized(format!("unknown user {user_id}"))),
        }
    }

    pub async fn publish(
        &self,
        viewer: Option<&Viewer>,
        media_kind: MediaKind,
        media_url: &str,
    ) -> Result<StoryId> {
        let viewer = viewer.ok_or(PlaybackError::AuthRequired)?;
        let story = NewStory {
            author_id: viewer.id,
            author_username: viewer.username.clone(),
            author_photo_url: viewer.photo_url.clone(),
            media_kind,
            media_url: media_url.to_string(),
            reposted_from_username: None,
        };

        let id = self.store.create_ephemeral(story).await?;
        metrics::record_action("publish", "success");
        tracing::info!(story_id = %id, user_id = %viewer.id, "story published");
        Ok(id)
    }

    /// Republish a live story under the viewer's name.
    pub async fn repost(&self, story_id: StoryId, viewer: Option<&Viewer>) -> Result<StoryId> {
        if viewer.is_none() {
            return Err(PlaybackError::AuthRequired.into());
        }
        let item = self.live_story(story_id).await?;
        let author = self
            .store
            .find_profile(item.author_id)
            .await?
            .ok_or(PlaybackError::ProfileNotFound(item.author_id))?;

        let draft = repost_draft(&item, &author, viewer).map_err(|e| {
            metrics::record_action("repost", "rejected");
            e
        })?;
        let id = write_repost(self.store.as_ref(), draft).await?;
        Ok(id)
    }

    pub async fn reply(&self, story_id: StoryId, viewer: Option<&Viewer>, body: &str) -> Result<Uuid> {
        if viewer.is_none() {
            return Err(PlaybackError::AuthRequired.into());
        }
        let item = self.live_story(story_id).await?;
        let reply = reply_draft(&item, viewer, body)?;
        let id = write_reply(self.store.as_ref(), reply).await?;
        Ok(id)
    }

    /// Record that `viewer` saw the story. Authors viewing their own stories are not counted.
    pub async fn track_view(&self, story_id: StoryId, viewer: &Viewer) -> Result<()> {
        let item = self.live_story(story_id).await?;
        if item.author_id == viewer.id {
            return Ok(());
        }
        self.store.track_view(story_id, viewer.id).await
    }

    async fn live_story(&self, story_id: StoryId) -> Result<StoryItem> {
        let since = self.settings.window_start(Utc::now());
        self.store
            .find_story(story_id, since)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("story {story_id}")))
    }
}

/// Write a validated repost; failures surface as `RepostWriteFailed`.
pub(crate) async fn write_repost(store: &dyn ContentStore, draft: NewStory) -> PlaybackResult<StoryId> {
    let author_id = draft.author_id;
    match store.create_ephemeral(draft).await {
        Ok(id) => {
            metrics::record_action("repost", "success");
            tracing::info!(story_id = %id, user_id = %author_id, "story reposted");
            Ok(id)
        }
        Err(e) => {
            metrics::record_action("repost", "error");
            tracing::warn!(user_id = %author_id, error = %e, "repost write failed");
            Err(PlaybackError::RepostWriteFailed(e.to_string()))
        }
    }
}

pub(crate) async fn write_reply(
    store: &dyn ContentStore,
    reply: story_engine::NewReply,
) -> PlaybackResult<Uuid> {
    let story_id = reply.story_id;
    match store.create_reply(reply).await {
        Ok(id) => {
            metrics::record_action("reply", "success");
            Ok(id)
        }
        Err(e) => {
            metrics::record_action("reply", "error");
            tracing::warn!(story_id = %story_id, error = %e, "reply write failed");
            Err(PlaybackError::ReplyWriteFailed(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockContentStore;
    use chrono::Duration as ChronoDuration;
    use story_engine::Profile;

    fn profile(name: &str) -> Profile {
        Profile {
            id: UserId::new(),
            username: name.to_string(),
            photo_url: None,
        }
    }

    fn story_by(author: &Profile) -> StoryItem {
        StoryItem {
            id: StoryId::new(),
            author_id: author.id,
            media_kind: MediaKind::Image,
            media_url: "https://cdn.example/wall.png".to_string(),
            created_at: Utc::now() - ChronoDuration::hours(1),
            reposted_from_username: None,
        }
    }

    fn service(mock: MockContentStore) -> StoriesService {
        StoriesService::new(Arc::new(mock), PlaybackSettings::default())
    }

    #[tokio::test]
    async fn open_session_unknown_author() {
        let mut mock = MockContentStore::new();
        mock.expect_find_profile().returning(|_| Ok(None));
        mock.expect_query_ephemeral().times(0);

        let author_id = UserId::new();
        let err = service(mock).open_session(author_id).await.unwrap_err();
        assert_eq!(err, PlaybackError::ProfileNotFound(author_id));
    }

    #[tokio::test]
    async fn open_session_without_stories() {
        let author = profile("chika");
        let mut mock = MockContentStore::new();
        let found = author.clone();
        mock.expect_find_profile()
            .returning(move |_| Ok(Some(found.clone())));
        mock.expect_query_ephemeral().returning(|_, _| Ok(Vec::new()));

        let err = service(mock).open_session(author.id).await.unwrap_err();
        assert_eq!(err, PlaybackError::NoActiveStories);
    }

    #[tokio::test]
    async fn open_session_queries_24h_window() {
        let author = profile("chika");
        let story = story_by(&author);
        let mut mock = MockContentStore::new();
        let found = author.clone();
        mock.expect_find_profile()
            .returning(move |_| Ok(Some(found.clone())));
        let item = story.clone();
        mock.expect_query_ephemeral()
            .withf(|_, since| {
                let age = Utc::now() - *since;
                age >= ChronoDuration::hours(24) && age < ChronoDuration::hours(25)
            })
            .returning(move |_, _| Ok(vec![item.clone()]));

        let session = service(mock).open_session(author.id).await.unwrap();
        assert_eq!(session.current_item().id, story.id);
        assert_eq!(session.author().username, "chika");
    }

    #[tokio::test]
    async fn open_session_store_failure() {
        let mut mock = MockContentStore::new();
        mock.expect_find_profile()
            .returning(|_| Err(AppError::DatabaseError("connection reset".into())));

        let err = service(mock).open_session(UserId::new()).await.unwrap_err();
        assert!(matches!(err, PlaybackError::FetchFailed(_)));
    }

    #[tokio::test]
    async fn anonymous_repost_writes_nothing() {
        let mut mock = MockContentStore::new();
        mock.expect_find_story().times(0);
        mock.expect_create_ephemeral().times(0);

        let err = service(mock).repost(StoryId::new(), None).await.unwrap_err();
        assert!(matches!(err, AppError::Playback(PlaybackError::AuthRequired)));
    }

    #[tokio::test]
    async fn self_repost_writes_nothing() {
        let author = profile("kaguya");
        let story = story_by(&author);
        let mut mock = MockContentStore::new();
        mock.expect_find_story()
            .returning(move |_, _| Ok(Some(story.clone())));
        let found = author.clone();
        mock.expect_find_profile()
            .returning(move |_| Ok(Some(found.clone())));
        mock.expect_create_ephemeral().times(0);

        let err = service(mock)
            .repost(StoryId::new(), Some(&author))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Playback(PlaybackError::SelfRepostForbidden)
        ));
    }

    #[tokio::test]
    async fn repost_credits_author() {
        let author = profile("kaguya");
        let viewer = profile("shirogane");
        let story = story_by(&author);
        let media_url = story.media_url.clone();
        let new_id = StoryId::new();

        let mut mock = MockContentStore::new();
        mock.expect_find_story()
            .returning(move |_, _| Ok(Some(story.clone())));
        let found = author.clone();
        mock.expect_find_profile()
            .returning(move |_| Ok(Some(found.clone())));
        let viewer_id = viewer.id;
        mock.expect_create_ephemeral()
            .times(1)
            .withf(move |s| {
                s.author_id == viewer_id
                    && s.media_url == media_url
                    && s.reposted_from_username.as_deref() == Some("kaguya")
            })
            .returning(move |_| Ok(new_id));

        let id = service(mock)
            .repost(StoryId::new(), Some(&viewer))
            .await
            .unwrap();
        assert_eq!(id, new_id);
    }

    #[tokio::test]
    async fn repost_write_failure_is_reported() {
        let author = profile("kaguya");
        let viewer = profile("shirogane");
        let story = story_by(&author);

        let mut mock = MockContentStore::new();
        mock.expect_find_story()
            .returning(move |_, _| Ok(Some(story.clone())));
        let found = author.clone();
        mock.expect_find_profile()
            .returning(move |_| Ok(Some(found.clone())));
        mock.expect_create_ephemeral()
            .returning(|_| Err(AppError::DatabaseError("disk full".into())));

        let err = service(mock)
            .repost(StoryId::new(), Some(&viewer))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Playback(PlaybackError::RepostWriteFailed(_))
        ));
    }

    #[tokio::test]
    async fn unknown_viewer_is_unauthorized() {
        let mut mock = MockContentStore::new();
        mock.expect_find_profile().returning(|_| Ok(None));
        let svc = service(mock);

        assert!(svc.resolve_viewer(None).await.unwrap().is_none());
        assert!(matches!(
            svc.resolve_viewer(Some(UserId::new())).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn own_view_is_not_tracked() {
        let author = profile("ai");
        let story = story_by(&author);
        let mut mock = MockContentStore::new();
        mock.expect_find_story()
            .returning(move |_, _| Ok(Some(story.clone())));
        mock.expect_track_view().times(0);

        service(mock)
            .track_view(StoryId::new(), &author)
            .await
            .unwrap();
    }
}
