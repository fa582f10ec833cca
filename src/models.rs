use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    media::{MediaService, ResourceType},
    transform::{SocialFormat, Transformation},
};

// --- Persisted Records ---

/// Video
///
/// An uploaded video as recorded in the `videos` table. `public_id` is the media
/// service's identifier of the compressed asset; every rendition URL is derived from it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub public_id: String,
    // Byte size of the file as uploaded.
    pub original_size: i64,
    // Byte size after the media service compressed it.
    pub compressed_size: i64,
    // Seconds. Zero when the service did not report one.
    pub duration: f64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new `Video`. Ids and timestamps are assigned by the repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewVideo {
    pub title: String,
    pub description: Option<String>,
    pub public_id: String,
    pub original_size: i64,
    pub compressed_size: i64,
    pub duration: f64,
}

// --- Response Payloads ---

/// VideoSummary
///
/// A `Video` enriched with everything a listing card shows: rendition URLs plus
/// human-readable sizes, duration and the space saved by compression.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct VideoSummary {
    #[serde(flatten)]
    pub video: Video,
    pub thumbnail_url: String,
    pub preview_url: String,
    pub download_url: String,
    pub formatted_duration: String,
    pub formatted_original_size: String,
    pub formatted_compressed_size: String,
    pub compression_percentage: i64,
}

impl VideoSummary {
    pub fn from_video(video: Video, media: &dyn MediaService) -> Self {
        let public_id = video.public_id.as_str();
        Self {
            thumbnail_url: media.delivery_url(
                public_id,
                ResourceType::Video,
                &Transformation::video_thumbnail(),
            ),
            preview_url: media.delivery_url(
                public_id,
                ResourceType::Video,
                &Transformation::video_preview(),
            ),
            download_url: media.delivery_url(
                public_id,
                ResourceType::Video,
                &Transformation::video_download(),
            ),
            formatted_duration: format_duration(video.duration),
            formatted_original_size: format_size(video.original_size),
            formatted_compressed_size: format_size(video.compressed_size),
            compression_percentage: compression_percentage(
                video.original_size,
                video.compressed_size,
            ),
            video,
        }
    }
}

/// Response of the image upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ImageUploadResponse {
    pub public_id: String,
}

/// A social media canvas as exposed by the API.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SocialFormatInfo {
    pub slug: String,
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: String,
}

impl From<&SocialFormat> for SocialFormatInfo {
    fn from(format: &SocialFormat) -> Self {
        Self {
            slug: format.slug.to_string(),
            label: format.label.to_string(),
            width: format.width,
            height: format.height,
            aspect_ratio: format.aspect_ratio.to_string(),
        }
    }
}

/// Query of the social share endpoint (GET /api/social-share).
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SocialShareQuery {
    /// Identifier returned by the image upload.
    pub public_id: Option<String>,
    /// Slug of the target social format, e.g. `twitter-post`.
    pub format: Option<String>,
}

/// The image cropped to a social format, ready to download.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SocialShareResponse {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: String,
    pub download_name: String,
}

/// Error body shared by every API failure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Documentation-only shape of the multipart video upload form.
#[derive(ToSchema)]
pub struct VideoUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub title: String,
    pub description: Option<String>,
}

/// Documentation-only shape of the multipart image upload form.
#[derive(ToSchema)]
pub struct ImageUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

// --- Presentation Helpers ---

/// `m:ss`, rounded to the nearest second.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as i64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Decimal (SI) units with at most two fractional digits: `512 B`, `1.5 MB`, `70 MB`.
pub fn format_size(bytes: i64) -> String {
    const UNITS: [&str; 6] = ["B", "kB", "MB", "GB", "TB", "PB"];

    let mut value = bytes.max(0) as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    let mut rounded = (value * 100.0).round() / 100.0;
    // 999_999 B rounds to 1000 kB; show it as 1 MB.
    if rounded >= 1000.0 && unit < UNITS.len() - 1 {
        rounded /= 1000.0;
        unit += 1;
    }
    format!("{} {}", rounded, UNITS[unit])
}

/// Share of the original size saved by compression, in whole percent.
pub fn compression_percentage(original_size: i64, compressed_size: i64) -> i64 {
    if original_size <= 0 {
        return 0;
    }
    ((1.0 - compressed_size as f64 / original_size as f64) * 100.0).round() as i64
}
