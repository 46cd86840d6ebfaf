/// HTTP handlers for story endpoints
pub mod stories;

pub use stories::{
    create_story, get_author_stories, reply_to_story, repost_story, track_story_view,
};

use actix_web::web;

/// Register the `/api/v1` story routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route(
                "/users/{author_id}/stories",
                web::get().to(get_author_stories),
            )
            .service(
                web::scope("/stories")
                    .service(web::resource("").route(web::post().to(create_story)))
                    .route("/{story_id}/repost", web::post().to(repost_story))
                    .route("/{story_id}/views", web::post().to(track_story_view))
                    .route("/{story_id}/replies", web::post().to(reply_to_story)),
            ),
    );
}
