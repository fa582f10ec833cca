use crate::{AppState, handlers};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

// Room for multipart boundaries and the text fields next to the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Authenticated Router Module
///
/// API endpoints for signed-in users. The access policy already redirects anonymous callers
/// away from these paths; the router is additionally wrapped in a layer that requires an
/// `AuthUser`, so a handler never runs without one.
pub fn authenticated_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // POST /api/video-upload
        // Multipart upload, compressed by the media service and recorded in the database.
        .route("/api/video-upload", post(handlers::upload_video))
        // POST /api/image-upload
        // Multipart image upload used by the social share tool.
        .route("/api/image-upload", post(handlers::upload_image))
        .layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
        ))
        // GET /api/videos/{id}
        .route("/api/videos/{id}", get(handlers::get_video))
        // GET /api/social-formats
        .route("/api/social-formats", get(handlers::list_social_formats))
        // GET /api/social-share?publicId=...&format=...
        // Delivery URL of an uploaded image cropped to a social format.
        .route("/api/social-share", get(handlers::social_share))
}
