use crate::db::ContentStore;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use story_engine::{MediaKind, NewReply, NewStory, Profile, StoryId, StoryItem, UserId};
use uuid::Uuid;

const STORY_COLUMNS: &str =
    "id, user_id, media_kind, media_url, reposted_from_username, created_at";

pub struct PgStoryRepo {
    pool: PgPool,
}

impl PgStoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_story(row: &PgRow) -> Result<StoryItem> {
        let kind: String = row.get("media_kind");
        let media_kind = MediaKind::try_from(kind.as_str())
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(StoryItem {
            id: StoryId(row.get("id")),
            author_id: UserId(row.get("user_id")),
            media_kind,
            media_url: row.get("media_url"),
            created_at: row.get("created_at"),
            reposted_from_username: row.get("reposted_from_username"),
        })
    }
}

#[async_trait]
impl ContentStore for PgStoryRepo {
    async fn find_profile(&self, user_id: UserId) -> Result<Option<Profile>> {
        let row = sqlx::query(r#"SELECT id, username, photo_url FROM profiles WHERE id = $1"#)
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Profile {
            id: UserId(r.get("id")),
            username: r.get("username"),
            photo_url: r.get("photo_url"),
        }))
    }

    async fn find_story(
        &self,
        story_id: StoryId,
        since: DateTime<Utc>,
    ) -> Result<Option<StoryItem>> {
        let sql = format!(
            "SELECT {STORY_COLUMNS} FROM stories \
             WHERE id = $1 AND is_story AND deleted_at IS NULL AND created_at >= $2"
        );
        let row = sqlx::query(&sql)
            .bind(story_id.0)
            .bind(since)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_story).transpose()
    }

    async fn query_ephemeral(
        &self,
        author_id: UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<StoryItem>> {
        let sql = format!(
            "SELECT {STORY_COLUMNS} FROM stories \
             WHERE user_id = $1 AND is_story AND deleted_at IS NULL AND created_at >= $2 \
             ORDER BY created_at ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(author_id.0)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_story).collect()
    }

    async fn create_ephemeral(&self, story: NewStory) -> Result<StoryId> {
        let row = sqlx::query(
            r#"
            INSERT INTO stories (user_id, username, user_photo_url, media_kind, media_url, is_story, reposted_from_username)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6)
            RETURNING id
            "#,
        )
        .bind(story.author_id.0)
        .bind(&story.author_username)
        .bind(story.author_photo_url.as_deref())
        .bind(story.media_kind.as_str())
        .bind(&story.media_url)
        .bind(story.reposted_from_username.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(StoryId(row.get("id")))
    }

    async fn track_view(&self, story_id: StoryId, viewer_id: UserId) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO story_views (story_id, viewer_id) VALUES ($1, $2)
               ON CONFLICT (story_id, viewer_id) DO NOTHING"#,
        )
        .bind(story_id.0)
        .bind(viewer_id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_reply(&self, reply: NewReply) -> Result<Uuid> {
        let row = sqlx::query(
            r#"
            INSERT INTO story_replies (story_id, sender_id, recipient_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(reply.story_id.0)
        .bind(reply.sender_id.0)
        .bind(reply.recipient_id.0)
        .bind(&reply.body)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    async fn cleanup_expired(&self, before: DateTime<Utc>) -> Result<u64> {
        match sqlx::query(
            r#"UPDATE stories SET deleted_at = NOW()
               WHERE is_story AND created_at < $1 AND deleted_at IS NULL"#,
        )
        .bind(before)
        .execute(&self.pool)
        .await
        {
            Ok(res) => Ok(res.rows_affected()),
            Err(err) => {
                let table_missing = err
                    .as_database_error()
                    .and_then(|db_err| db_err.code())
                    .map(|code| code == "42P01")
                    .unwrap_or(false);
                if table_missing {
                    tracing::debug!(
                        "stories cleanup skipped because table does not exist (migration pending)"
                    );
                    Ok(0)
                } else {
                    Err(err.into())
                }
            }
        }
    }
}
