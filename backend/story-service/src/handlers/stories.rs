/// Story handlers - HTTP endpoints for story operations
use crate::error::Result;
use crate::middleware::ViewerId;
use crate::services::StoriesService;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use story_engine::{MediaKind, PlaybackError, Profile, StoryId, StoryItem, UserId};
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize)]
pub struct AuthorStoriesResponse {
    pub author: Profile,
    pub stories: Vec<StoryItem>,
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Deserialize, Validate)]
pub struct CreateStoryRequest {
    pub media_kind: MediaKind,
    #[validate(url, length(max = 2048))]
    pub media_url: String,
}

#[derive(Deserialize, Validate)]
pub struct ReplyRequest {
    #[validate(length(min = 1, max = 8000))]
    pub body: String,
}

/// Get an author's live stories, oldest first
pub async fn get_author_stories(
    service: web::Data<StoriesService>,
    author_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let session = service.open_session(UserId(*author_id)).await?;

    Ok(HttpResponse::Ok().json(AuthorStoriesResponse {
        author: session.author().clone(),
        stories: session.items().to_vec(),
    }))
}

/// Publish a new story
pub async fn create_story(
    service: web::Data<StoriesService>,
    viewer_id: ViewerId,
    req: web::Json<CreateStoryRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let viewer = service.resolve_viewer(viewer_id.0).await?;
    let id = service
        .publish(viewer.as_ref(), req.media_kind, &req.media_url)
        .await?;

    Ok(HttpResponse::Created().json(CreatedResponse { id: id.0 }))
}

/// Repost a story as the signed-in user
pub async fn repost_story(
    service: web::Data<StoriesService>,
    story_id: web::Path<Uuid>,
    viewer_id: ViewerId,
) -> Result<HttpResponse> {
    let viewer = service.resolve_viewer(viewer_id.0).await?;
    let id = service.repost(StoryId(*story_id), viewer.as_ref()).await?;

    Ok(HttpResponse::Created().json(CreatedResponse { id: id.0 }))
}

/// Track story view
pub async fn track_story_view(
    service: web::Data<StoriesService>,
    story_id: web::Path<Uuid>,
    viewer_id: ViewerId,
) -> Result<HttpResponse> {
    let viewer = service
        .resolve_viewer(viewer_id.0)
        .await?
        .ok_or(PlaybackError::AuthRequired)?;
    service.track_view(StoryId(*story_id), &viewer).await?;

    Ok(HttpResponse::Ok().finish())
}

/// Reply to a story's author
pub async fn reply_to_story(
    service: web::Data<StoriesService>,
    story_id: web::Path<Uuid>,
    viewer_id: ViewerId,
    req: web::Json<ReplyRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let viewer = service.resolve_viewer(viewer_id.0).await?;
    let id = service
        .reply(StoryId(*story_id), viewer.as_ref(), &req.body)
        .await?;

    Ok(HttpResponse::Created().json(CreatedResponse { id }))
}
