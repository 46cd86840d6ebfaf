/// HTTP middleware utilities for story-service
///
/// Authentication happens at the gateway, which forwards the signed-in
/// user's id in `X-User-Id`. Requests without it are anonymous.
use actix_web::dev::Payload;
use actix_web::{error::ErrorUnauthorized, Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use story_engine::UserId;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// Id of the signed-in viewer, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerId(pub Option<UserId>);

impl FromRequest for ViewerId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(viewer_id_from_request(req))
    }
}

fn viewer_id_from_request(req: &HttpRequest) -> Result<ViewerId, Error> {
    let Some(value) = req.headers().get(USER_ID_HEADER) else {
        return Ok(ViewerId(None));
    };

    value
        .to_str()
        .ok()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
        .map(|id| ViewerId(Some(UserId(id))))
        .ok_or_else(|| ErrorUnauthorized("Invalid X-User-Id header"))
}
