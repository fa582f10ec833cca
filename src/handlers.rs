use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    media::{ResourceType, UploadOptions},
    models::{
        ErrorBody, ImageUploadForm, ImageUploadResponse, NewVideo, SocialFormatInfo,
        SocialShareQuery, SocialShareResponse, Video, VideoSummary, VideoUploadForm,
    },
    transform::{SOCIAL_FORMATS, SocialFormat},
};
use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        multipart::{Multipart, MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::Html,
};
use std::collections::HashMap;
use uuid::Uuid;

// --- Multipart Form Parsing ---

/// The `file` part of an upload form.
struct UploadedFile {
    file_name: Option<String>,
    bytes: Bytes,
}

/// A parsed upload form: the file part plus every text field.
struct UploadForm {
    file: Option<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Trimmed text field, `None` when absent or blank.
    fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("File size too large".to_string())
    } else {
        tracing::warn!(error = %e, "malformed multipart body");
        ApiError::BadRequest("Malformed multipart body".to_string())
    }
}

async fn read_upload_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadForm, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection, "upload without a multipart body");
        ApiError::BadRequest("Invalid content type".to_string())
    })?;

    let mut form = UploadForm {
        file: None,
        fields: HashMap::new(),
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            form.file = Some(UploadedFile { file_name, bytes });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

fn ensure_media_configured(state: &AppState) -> Result<(), ApiError> {
    match state.config.media {
        Some(_) => Ok(()),
        None => Err(ApiError::NotConfigured(
            "Media service credentials not configured".to_string(),
        )),
    }
}

/// Shared precondition of both upload endpoints: a non-empty file within the size ceiling.
fn validated_file(state: &AppState, form: &mut UploadForm) -> Result<UploadedFile, ApiError> {
    let file = form
        .file
        .take()
        .filter(|file| !file.bytes.is_empty())
        .ok_or_else(|| ApiError::BadRequest("File not found".to_string()))?;

    if file.bytes.len() > state.config.max_upload_bytes {
        return Err(ApiError::PayloadTooLarge(format!(
            "File size too large (max {}MB)",
            state.config.max_upload_bytes / (1024 * 1024)
        )));
    }

    Ok(file)
}

// --- Handlers ---

/// upload_video
///
/// [Authenticated Route] Accepts a multipart form (`file`, `title`, `description`), hands the
/// bytes to the media service for compression, then records the processed asset.
#[utoipa::path(
    post,
    path = "/api/video-upload",
    request_body(content = VideoUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Uploaded", body = Video),
        (status = 400, description = "Invalid form", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 500, description = "Upload failed", body = ErrorBody)
    )
)]
pub async fn upload_video(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Video>, ApiError> {
    ensure_media_configured(&state)?;

    let mut form = read_upload_form(multipart).await?;
    let file = validated_file(&state, &mut form)?;
    let title = form
        .text("title")
        .ok_or_else(|| ApiError::BadRequest("Title is required".to_string()))?;
    let description = form.text("description");

    let original_size = file.bytes.len() as i64;
    let options = UploadOptions::video().with_file_name(file.file_name);

    let asset = state.media.upload(file.bytes, &options).await.map_err(|e| {
        tracing::error!(error = %e, user_id = %user_id, "video upload to media service failed");
        ApiError::Internal("Upload video failed".to_string())
    })?;

    let video = state
        .repo
        .create_video(NewVideo {
            title,
            description,
            public_id: asset.public_id,
            original_size,
            compressed_size: asset.bytes,
            duration: asset.duration.unwrap_or(0.0),
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %user_id, "failed to record uploaded video");
            ApiError::Internal("Upload video failed".to_string())
        })?;

    tracing::info!(
        user_id = %user_id,
        video_id = %video.id,
        public_id = %video.public_id,
        original_size = video.original_size,
        compressed_size = video.compressed_size,
        "video uploaded"
    );

    Ok(Json(video))
}

/// upload_image
///
/// [Authenticated Route] Stores an image with the media service so it can be cropped to
/// social formats. Nothing is persisted locally; the client keeps the returned `publicId`.
#[utoipa::path(
    post,
    path = "/api/image-upload",
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Uploaded", body = ImageUploadResponse),
        (status = 400, description = "Invalid form", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 500, description = "Upload failed", body = ErrorBody)
    )
)]
pub async fn upload_image(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageUploadResponse>, ApiError> {
    ensure_media_configured(&state)?;

    let mut form = read_upload_form(multipart).await?;
    let file = validated_file(&state, &mut form)?;
    let options = UploadOptions::image().with_file_name(file.file_name);

    let asset = state.media.upload(file.bytes, &options).await.map_err(|e| {
        tracing::error!(error = %e, user_id = %user_id, "image upload to media service failed");
        ApiError::Internal("Upload image failed".to_string())
    })?;

    tracing::info!(user_id = %user_id, public_id = %asset.public_id, "image uploaded");

    Ok(Json(ImageUploadResponse {
        public_id: asset.public_id,
    }))
}

/// list_videos
///
/// [Public API] Every uploaded video, newest first, with rendition URLs and display fields.
#[utoipa::path(
    get,
    path = "/api/videos",
    responses(
        (status = 200, description = "Videos", body = [VideoSummary]),
        (status = 500, description = "Store unavailable", body = ErrorBody)
    )
)]
pub async fn list_videos(
    State(state): State<AppState>,
) -> Result<Json<Vec<VideoSummary>>, ApiError> {
    let videos = state.repo.list_videos().await.map_err(|e| {
        tracing::error!(error = %e, "failed to list videos");
        ApiError::Internal("Failed to fetch videos".to_string())
    })?;

    Ok(Json(
        videos
            .into_iter()
            .map(|video| VideoSummary::from_video(video, state.media.as_ref()))
            .collect(),
    ))
}

/// get_video
///
/// [Authenticated Route] A single video by id.
#[utoipa::path(
    get,
    path = "/api/videos/{id}",
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Found", body = VideoSummary),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Store unavailable", body = ErrorBody)
    )
)]
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VideoSummary>, ApiError> {
    let video = state.repo.get_video(id).await.map_err(|e| {
        tracing::error!(error = %e, video_id = %id, "failed to fetch video");
        ApiError::Internal("Failed to fetch video".to_string())
    })?;

    match video {
        Some(video) => Ok(Json(VideoSummary::from_video(video, state.media.as_ref()))),
        None => Err(ApiError::NotFound("Video not found".to_string())),
    }
}

/// list_social_formats
///
/// [Authenticated Route] The canvases an uploaded image can be cropped to.
#[utoipa::path(
    get,
    path = "/api/social-formats",
    responses((status = 200, description = "Formats", body = [SocialFormatInfo]))
)]
pub async fn list_social_formats() -> Json<Vec<SocialFormatInfo>> {
    Json(SOCIAL_FORMATS.iter().map(SocialFormatInfo::from).collect())
}

/// social_share
///
/// [Authenticated Route] Delivery URL of an uploaded image fill-cropped to a social format.
#[utoipa::path(
    get,
    path = "/api/social-share",
    params(SocialShareQuery),
    responses(
        (status = 200, description = "Transformed", body = SocialShareResponse),
        (status = 400, description = "Unknown format or missing image", body = ErrorBody)
    )
)]
pub async fn social_share(
    State(state): State<AppState>,
    Query(query): Query<SocialShareQuery>,
) -> Result<Json<SocialShareResponse>, ApiError> {
    let public_id = query
        .public_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("publicId is required".to_string()))?;

    let slug = query.format.as_deref().unwrap_or(SOCIAL_FORMATS[0].slug);
    let format = SocialFormat::find(slug)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown social format: {slug}")))?;

    Ok(Json(SocialShareResponse {
        url: state
            .media
            .delivery_url(public_id, ResourceType::Image, &format.transformation()),
        width: format.width,
        height: format.height,
        aspect_ratio: format.aspect_ratio.to_string(),
        download_name: format.download_name(),
    }))
}

// --- Pages ---

// The UI is a client-side bundle served from `/assets`; each page is the same shell
// tagged with the view it should mount.
fn page_shell(page: &str, title: &str) -> Html<String> {
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Media Studio</title>
<link rel="stylesheet" href="/assets/app.css">
</head>
<body>
<main id="app" data-page="{page}"></main>
<script type="module" src="/assets/app.js"></script>
</body>
</html>
"#
    ))
}

pub async fn home_page() -> Html<String> {
    page_shell("home", "Home")
}

pub async fn sign_in_page() -> Html<String> {
    page_shell("sign-in", "Sign in")
}

pub async fn sign_up_page() -> Html<String> {
    page_shell("sign-up", "Sign up")
}

pub async fn video_upload_page() -> Html<String> {
    page_shell("video-upload", "Video Upload")
}

pub async fn social_share_page() -> Html<String> {
    page_shell("social-share", "Social Share")
}
