use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod media;
pub mod models;
pub mod policy;
pub mod repository;
pub mod transform;

pub mod routes;
use routes::{authenticated, pages, public};

use auth::{AuthContext, AuthUser};
use policy::{AccessDecision, AccessPolicy};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use media::{CloudinaryClient, MediaState, MockMediaService};
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document of the JSON API, served with Swagger UI under `/_docs`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_videos, handlers::get_video, handlers::upload_video,
        handlers::upload_image, handlers::list_social_formats, handlers::social_share
    ),
    components(
        schemas(
            models::Video, models::VideoSummary, models::ImageUploadResponse,
            models::SocialFormatInfo, models::SocialShareResponse, models::ErrorBody,
            models::VideoUploadForm, models::ImageUploadForm,
        )
    ),
    tags(
        (name = "media-studio", description = "Video compression and social image API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, cloneable container of everything a request may need. All members are
/// immutable after startup or internally synchronized, so it is shared freely across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Persistence of asset metadata.
    pub repo: RepositoryState,
    /// Hosted media transformation and delivery service.
    pub media: MediaState,
    /// The loaded environment configuration.
    pub config: AppConfig,
    /// Compiled route allow-lists.
    pub policy: Arc<AccessPolicy>,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for MediaState {
    fn from_ref(app_state: &AppState) -> MediaState {
        app_state.media.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// access_policy_middleware
///
/// Runs the access policy in front of every route. Excluded paths (framework internals,
/// static files) pass untouched. Otherwise the caller's `AuthContext` is resolved, handed to
/// the policy, and the request either proceeds (with the context stored in its extensions
/// for downstream extractors) or is answered with a `307` redirect.
async fn access_policy_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if state.policy.is_excluded(&path) {
        return next.run(request).await;
    }

    let auth = auth::resolve_auth_context(request.headers(), &state.config);
    let decision = state.policy.evaluate(&path, &auth);

    tracing::debug!(
        path = %path,
        authenticated = auth.is_authenticated(),
        decision = ?decision,
        "access policy evaluated"
    );

    match decision {
        AccessDecision::Proceed => {
            request.extensions_mut().insert::<AuthContext>(auth);
            next.run(request).await
        }
        AccessDecision::Redirect(target) => Redirect::temporary(target.path()).into_response(),
    }
}

/// require_user
///
/// Rejects the request with `401` unless an `AuthUser` can be extracted.
async fn require_user(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles pages, public and authenticated APIs, internal endpoints and static assets,
/// wraps them in the access policy, then applies the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Internal: excluded from the access policy by their `/_` prefix.
        .merge(SwaggerUi::new("/_docs").url("/_docs/openapi.json", ApiDoc::openapi()))
        .route("/_health", get(|| async { "ok" }))
        // Static bundle: excluded from the access policy by file extension.
        .nest_service("/assets", ServeDir::new(&state.config.assets_dir))
        .merge(pages::page_routes())
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes(state.config.max_upload_bytes).route_layer(
                middleware::from_fn_with_state(state.clone(), require_user),
            ),
        )
        // Applied with `layer`, so unmatched paths are evaluated as well.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            access_policy_middleware,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, correlated by the `x-request-id` header set above.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
