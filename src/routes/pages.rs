use crate::{AppState, handlers, policy};
use axum::{Router, routing::get};

/// Page Router Module
///
/// The views of the web application. Which of them an anonymous visitor may see is decided
/// by the access policy's public page allow-list, not here.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        // GET /home
        // Dashboard listing uploaded videos. Public, so the root bounce always lands somewhere.
        .route(policy::HOME_PATH, get(handlers::home_page))
        // GET /sign-in, /sign-up
        // Mount points for the identity provider's hosted widgets.
        .route(policy::SIGN_IN_PATH, get(handlers::sign_in_page))
        .route(policy::SIGN_UP_PATH, get(handlers::sign_up_page))
        // GET /video-upload, /social-share
        // Signed-in tools.
        .route("/video-upload", get(handlers::video_upload_page))
        .route("/social-share", get(handlers::social_share_page))
}
