use crate::{AppState, handlers, policy};
use axum::{Router, routing::get};

/// Public Router Module
///
/// API endpoints listed in the access policy's public API allow-list. Anonymous callers
/// reach these handlers unchanged.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /api/videos
        // Every uploaded video with thumbnail, preview and download renditions.
        .route(policy::VIDEOS_API_PATH, get(handlers::list_videos))
}
