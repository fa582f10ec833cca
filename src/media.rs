use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::{config::MediaCredentials, transform::Transformation};

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";
pub const DEFAULT_DELIVERY_BASE: &str = "https://res.cloudinary.com";

pub const VIDEO_UPLOAD_FOLDER: &str = "video-uploads";
pub const IMAGE_UPLOAD_FOLDER: &str = "image-uploads";

/// Kind of asset held by the media service. Part of both upload and delivery URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Image,
    Video,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Video => "video",
        }
    }
}

/// Where and how an upload is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOptions {
    pub resource_type: ResourceType,
    pub folder: String,
    /// Applied by the service to the incoming bytes before the asset is stored.
    pub incoming_transformation: Option<Transformation>,
    pub file_name: Option<String>,
}

impl UploadOptions {
    /// Videos are compressed to an auto-quality mp4 on the way in.
    pub fn video() -> Self {
        Self {
            resource_type: ResourceType::Video,
            folder: VIDEO_UPLOAD_FOLDER.to_string(),
            incoming_transformation: Some(Transformation::video_compression()),
            file_name: None,
        }
    }

    pub fn image() -> Self {
        Self {
            resource_type: ResourceType::Image,
            folder: IMAGE_UPLOAD_FOLDER.to_string(),
            incoming_transformation: None,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: Option<String>) -> Self {
        self.file_name = file_name;
        self
    }
}

/// The processed asset reported back by the media service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedAsset {
    pub public_id: String,
    /// Stored size after the incoming transformation.
    pub bytes: i64,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("media service rejected the upload ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected media service response: {0}")]
    InvalidResponse(String),
}

/// MediaService
///
/// Contract for the hosted media transformation and delivery service. The real client
/// (`CloudinaryClient`) and the in-memory double (`MockMediaService`) are interchangeable
/// behind `MediaState`.
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Uploads raw bytes and returns the processed asset's identifier, size and duration.
    async fn upload(&self, file: Bytes, options: &UploadOptions)
        -> Result<UploadedAsset, MediaError>;

    /// Builds the delivery URL of a transformed rendition. Pure string construction, no I/O.
    fn delivery_url(
        &self,
        public_id: &str,
        resource_type: ResourceType,
        transformation: &Transformation,
    ) -> String;
}

pub type MediaState = Arc<dyn MediaService>;

/// sign_params
///
/// Request signature expected by the upload API: the `key=value` pairs sorted by key and
/// joined with `&`, immediately followed by the API secret, hashed with SHA-256.
/// Empty values are left out.
pub fn sign_params(params: &BTreeMap<&'static str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn build_delivery_url(
    delivery_base: &str,
    cloud_name: &str,
    public_id: &str,
    resource_type: ResourceType,
    transformation: &Transformation,
) -> String {
    let transformation = transformation.to_string();
    if transformation.is_empty() {
        format!(
            "{delivery_base}/{cloud_name}/{}/upload/{public_id}",
            resource_type.as_str()
        )
    } else {
        format!(
            "{delivery_base}/{cloud_name}/{}/upload/{transformation}/{public_id}",
            resource_type.as_str()
        )
    }
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    error: ServiceErrorMessage,
}

#[derive(Deserialize)]
struct ServiceErrorMessage {
    message: String,
}

/// CloudinaryClient
///
/// Signed REST client for the hosted media service.
#[derive(Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    credentials: MediaCredentials,
    api_base: String,
    delivery_base: String,
}

impl CloudinaryClient {
    pub fn new(credentials: MediaCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            api_base: DEFAULT_API_BASE.to_string(),
            delivery_base: DEFAULT_DELIVERY_BASE.to_string(),
        }
    }

    /// Points the client at alternative endpoints (a regional API host or a test server).
    pub fn with_base_urls(mut self, api_base: &str, delivery_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.delivery_base = delivery_base.trim_end_matches('/').to_string();
        self
    }

    pub fn upload_url(&self, resource_type: ResourceType) -> String {
        format!(
            "{}/v1_1/{}/{}/upload",
            self.api_base,
            self.credentials.cloud_name,
            resource_type.as_str()
        )
    }

    /// The signed parameters of an upload, keyed for signing.
    pub fn upload_params(
        &self,
        options: &UploadOptions,
        timestamp: i64,
    ) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("folder", options.folder.clone());
        params.insert("timestamp", timestamp.to_string());
        if let Some(transformation) = &options.incoming_transformation {
            params.insert("transformation", transformation.to_string());
        }
        params
    }
}

#[async_trait]
impl MediaService for CloudinaryClient {
    async fn upload(
        &self,
        file: Bytes,
        options: &UploadOptions,
    ) -> Result<UploadedAsset, MediaError> {
        let params = self.upload_params(options, chrono::Utc::now().timestamp());
        let signature = sign_params(&params, &self.credentials.api_secret);

        let mut form = Form::new();
        for (key, value) in params {
            form = form.text(key, value);
        }

        let file_name = options
            .file_name
            .clone()
            .unwrap_or_else(|| "upload".to_string());

        let length = file.len() as u64;
        let form = form
            .text("api_key", self.credentials.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part(
                "file",
                Part::stream_with_length(file, length).file_name(file_name),
            );

        let response = self
            .http
            .post(self.upload_url(options.resource_type))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ServiceErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<UploadedAsset>()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))
    }

    fn delivery_url(
        &self,
        public_id: &str,
        resource_type: ResourceType,
        transformation: &Transformation,
    ) -> String {
        build_delivery_url(
            &self.delivery_base,
            &self.credentials.cloud_name,
            public_id,
            resource_type,
            transformation,
        )
    }
}

/// MockMediaService
///
/// Deterministic stand-in used by the tests: no network, fixed compression ratio.
#[derive(Clone)]
pub struct MockMediaService {
    /// When true, every upload fails.
    pub should_fail: bool,
    /// Duration reported for video uploads.
    pub duration: f64,
}

impl MockMediaService {
    pub fn new() -> Self {
        Self {
            should_fail: false,
            duration: 42.5,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }
}

impl Default for MockMediaService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaService for MockMediaService {
    async fn upload(
        &self,
        file: Bytes,
        options: &UploadOptions,
    ) -> Result<UploadedAsset, MediaError> {
        if self.should_fail {
            return Err(MediaError::Rejected {
                status: 500,
                message: "Mock Media Error: Simulation requested".to_string(),
            });
        }

        let stem = options
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.').map(|(stem, _)| stem).or(Some(name)))
            .unwrap_or("asset");

        let duration = match options.resource_type {
            ResourceType::Video => Some(self.duration),
            ResourceType::Image => None,
        };

        Ok(UploadedAsset {
            public_id: format!("{}/{}", options.folder, stem),
            bytes: (file.len() / 2) as i64,
            duration,
            width: None,
            height: None,
            format: None,
        })
    }

    fn delivery_url(
        &self,
        public_id: &str,
        resource_type: ResourceType,
        transformation: &Transformation,
    ) -> String {
        build_delivery_url(
            "http://localhost:9000",
            "mock-cloud",
            public_id,
            resource_type,
            transformation,
        )
    }
}
