use axum::body::Bytes;
use media_studio::{
    CloudinaryClient, MockMediaService,
    config::MediaCredentials,
    media::{MediaService, ResourceType, UploadOptions, sign_params},
    transform::{SOCIAL_FORMATS, SocialFormat, Transformation},
};
use std::collections::BTreeMap;

fn client() -> CloudinaryClient {
    CloudinaryClient::new(MediaCredentials {
        cloud_name: "demo".to_string(),
        api_key: "1234".to_string(),
        api_secret: "abcd".to_string(),
    })
}

// --- Transformations ---

#[test]
fn test_transformation_segment_order() {
    let t = Transformation::new()
        .quality("auto")
        .format("jpg")
        .gravity("auto")
        .crop("fill")
        .size(400, 225);

    assert_eq!(t.to_string(), "w_400,h_225,c_fill,g_auto,f_jpg,q_auto");
}

#[test]
fn test_video_presets() {
    assert_eq!(
        Transformation::video_thumbnail().to_string(),
        "w_400,h_225,c_fill,g_auto,f_jpg,q_auto"
    );
    assert_eq!(
        Transformation::video_preview().to_string(),
        "w_400,h_225/e_preview:duration_15:max_seg_9:min_seg_dur_1"
    );
    assert_eq!(Transformation::video_download().to_string(), "w_1920,h_1080");
    assert_eq!(Transformation::video_compression().to_string(), "f_mp4,q_auto");
}

#[test]
fn test_empty_transformation() {
    assert!(Transformation::new().is_empty());
    assert_eq!(Transformation::new().to_string(), "");
    assert!(!Transformation::new().raw("e_grayscale").is_empty());
}

#[test]
fn test_social_formats_catalogue() {
    assert_eq!(SOCIAL_FORMATS.len(), 5);

    let post = SocialFormat::find("twitter-post").unwrap();
    assert_eq!((post.width, post.height), (1200, 675));
    assert_eq!(post.aspect_ratio, "16:9");
    assert_eq!(post.transformation().to_string(), "w_1200,h_675,c_fill,g_auto");
    assert_eq!(post.download_name(), "twitter_post_(16:9).png");

    assert!(SocialFormat::find("tiktok-story").is_none());
}

#[test]
fn test_download_names_are_lowercase_pngs() {
    for format in SOCIAL_FORMATS.iter() {
        let name = format.download_name();
        assert!(name.ends_with(".png"), "{name}");
        assert_eq!(name, name.to_lowercase());
        assert!(!name.contains(' '));
    }
}

// --- Signing ---

#[test]
fn test_sign_params_matches_known_digest() {
    let mut params = BTreeMap::new();
    params.insert("timestamp", "1315060510".to_string());
    params.insert("public_id", "sample_image".to_string());
    params.insert("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop".to_string());

    // sha256("eager=w_400,h_300,c_pad|w_260,h_200,c_crop&public_id=sample_image&timestamp=1315060510abcd")
    let signature = sign_params(&params, "abcd");
    assert_eq!(
        signature,
        "cc927e1290f9e3ae4c1a741eda21a4630b4ce80f9ce0bc0296337d25cf40f91e"
    );
    assert_ne!(signature, sign_params(&params, "other-secret"));
}

#[test]
fn test_sign_params_skips_empty_values() {
    let mut with_empty = BTreeMap::new();
    with_empty.insert("folder", "video-uploads".to_string());
    with_empty.insert("timestamp", "100".to_string());
    with_empty.insert("transformation", String::new());

    let mut without = with_empty.clone();
    without.remove("transformation");

    assert_eq!(sign_params(&with_empty, "s"), sign_params(&without, "s"));
}

#[test]
fn test_upload_params_for_video_carry_compression() {
    let params = client().upload_params(&UploadOptions::video(), 1_700_000_000);

    assert_eq!(params.get("folder").map(String::as_str), Some("video-uploads"));
    assert_eq!(params.get("timestamp").map(String::as_str), Some("1700000000"));
    assert_eq!(
        params.get("transformation").map(String::as_str),
        Some("f_mp4,q_auto")
    );
    assert!(!params.contains_key("api_key"));
    assert!(!params.contains_key("file"));
}

#[test]
fn test_upload_params_for_image() {
    let params = client().upload_params(&UploadOptions::image(), 42);

    assert_eq!(params.get("folder").map(String::as_str), Some("image-uploads"));
    assert!(!params.contains_key("transformation"));
}

// --- URLs ---

#[test]
fn test_upload_url() {
    assert_eq!(
        client().upload_url(ResourceType::Video),
        "https://api.cloudinary.com/v1_1/demo/video/upload"
    );
    assert_eq!(
        client()
            .with_base_urls("http://localhost:8080/", "http://localhost:8081")
            .upload_url(ResourceType::Image),
        "http://localhost:8080/v1_1/demo/image/upload"
    );
}

#[test]
fn test_delivery_url_with_transformation() {
    let url = client().delivery_url(
        "video-uploads/clip",
        ResourceType::Video,
        &Transformation::video_download(),
    );
    assert_eq!(
        url,
        "https://res.cloudinary.com/demo/video/upload/w_1920,h_1080/video-uploads/clip"
    );
}

#[test]
fn test_delivery_url_without_transformation() {
    let url = client().delivery_url("image-uploads/cat", ResourceType::Image, &Transformation::new());
    assert_eq!(url, "https://res.cloudinary.com/demo/image/upload/image-uploads/cat");
}

// --- Mock Service ---

#[tokio::test]
async fn test_mock_video_upload() {
    let media = MockMediaService::new();
    let options = UploadOptions::video().with_file_name(Some("holiday.mov".to_string()));

    let asset = media
        .upload(Bytes::from(vec![0u8; 1000]), &options)
        .await
        .unwrap();

    assert_eq!(asset.public_id, "video-uploads/holiday");
    assert_eq!(asset.bytes, 500);
    assert_eq!(asset.duration, Some(42.5));
}

#[tokio::test]
async fn test_mock_image_upload_without_name() {
    let media = MockMediaService::new();

    let asset = media
        .upload(Bytes::from_static(b"png"), &UploadOptions::image())
        .await
        .unwrap();

    assert_eq!(asset.public_id, "image-uploads/asset");
    assert_eq!(asset.duration, None);
}

#[tokio::test]
async fn test_mock_failure() {
    let media = MockMediaService::new_failing();

    let result = media
        .upload(Bytes::from_static(b"data"), &UploadOptions::video())
        .await;

    assert!(result.is_err());
}
