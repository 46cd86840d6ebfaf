/// Business logic layer for story-service
///
/// - Stories service: reads, publishing, reposts, replies, view tracking
/// - Player: runs a playback session on its own task
pub mod player;
pub mod stories;

pub use player::{
    open_stories, CloseReason, Notification, PlayerEvent, StoryPlayerHandle,
};
pub use stories::StoriesService;
