/// Story Service Library
///
/// Stories for the OtakuWall platform: ephemeral wallpaper and clip posts
/// that stay visible for 24 hours, plus the player that walks a viewer
/// through one author's stories.
///
/// # Modules
///
/// - `handlers`: Story HTTP request handlers
/// - `services`: Story operations and the playback player
/// - `db`: Content store trait and PostgreSQL repository
/// - `jobs`: Expired story cleanup
/// - `middleware`: Viewer identity extraction
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod metrics;
pub mod middleware;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
