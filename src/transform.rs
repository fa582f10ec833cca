use std::fmt;

/// Raw effect that renders a short multi-segment preview clip of a video.
pub const PREVIEW_EFFECT: &str = "e_preview:duration_15:max_seg_9:min_seg_dur_1";

/// Transformation
///
/// A parameter set understood by the media delivery service. Rendered in its URL segment
/// form, e.g. `w_400,h_225,c_fill,g_auto,f_jpg,q_auto`, with raw transformations chained
/// after it as extra `/`-separated segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transformation {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: Option<String>,
    pub gravity: Option<String>,
    pub format: Option<String>,
    pub quality: Option<String>,
    pub raw: Vec<String>,
}

impl Transformation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn crop(mut self, crop: &str) -> Self {
        self.crop = Some(crop.to_string());
        self
    }

    pub fn gravity(mut self, gravity: &str) -> Self {
        self.gravity = Some(gravity.to_string());
        self
    }

    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn quality(mut self, quality: &str) -> Self {
        self.quality = Some(quality.to_string());
        self
    }

    pub fn raw(mut self, raw: &str) -> Self {
        self.raw.push(raw.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.to_string().is_empty()
    }

    /// Still frame used as the card thumbnail of a video.
    pub fn video_thumbnail() -> Self {
        Self::new()
            .size(400, 225)
            .crop("fill")
            .gravity("auto")
            .format("jpg")
            .quality("auto")
    }

    /// Short looping preview shown on hover.
    pub fn video_preview() -> Self {
        Self::new().size(400, 225).raw(PREVIEW_EFFECT)
    }

    /// Full resolution rendition offered for download.
    pub fn video_download() -> Self {
        Self::new().size(1920, 1080)
    }

    /// Compression applied to incoming video uploads before they are stored.
    pub fn video_compression() -> Self {
        Self::new().quality("auto").format("mp4")
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut components = Vec::new();
        if let Some(width) = self.width {
            components.push(format!("w_{width}"));
        }
        if let Some(height) = self.height {
            components.push(format!("h_{height}"));
        }
        if let Some(crop) = &self.crop {
            components.push(format!("c_{crop}"));
        }
        if let Some(gravity) = &self.gravity {
            components.push(format!("g_{gravity}"));
        }
        if let Some(format) = &self.format {
            components.push(format!("f_{format}"));
        }
        if let Some(quality) = &self.quality {
            components.push(format!("q_{quality}"));
        }

        let mut segments = Vec::new();
        if !components.is_empty() {
            segments.push(components.join(","));
        }
        segments.extend(self.raw.iter().cloned());

        f.write_str(&segments.join("/"))
    }
}

/// SocialFormat
///
/// A social media canvas an uploaded image can be cropped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocialFormat {
    pub slug: &'static str,
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: &'static str,
}

pub const SOCIAL_FORMATS: [SocialFormat; 5] = [
    SocialFormat {
        slug: "instagram-square",
        label: "Instagram Square (1:1)",
        width: 1080,
        height: 1080,
        aspect_ratio: "1:1",
    },
    SocialFormat {
        slug: "instagram-portrait",
        label: "Instagram Portrait (4:5)",
        width: 1080,
        height: 1350,
        aspect_ratio: "4:5",
    },
    SocialFormat {
        slug: "twitter-post",
        label: "Twitter Post (16:9)",
        width: 1200,
        height: 675,
        aspect_ratio: "16:9",
    },
    SocialFormat {
        slug: "twitter-header",
        label: "Twitter Header (3:1)",
        width: 1500,
        height: 500,
        aspect_ratio: "3:1",
    },
    SocialFormat {
        slug: "facebook-cover",
        label: "Facebook Cover (205:78)",
        width: 820,
        height: 312,
        aspect_ratio: "205:78",
    },
];

impl SocialFormat {
    pub fn find(slug: &str) -> Option<&'static SocialFormat> {
        SOCIAL_FORMATS.iter().find(|format| format.slug == slug)
    }

    /// Fill-crop to the canvas size, letting the service pick the focal point.
    pub fn transformation(&self) -> Transformation {
        Transformation::new()
            .size(self.width, self.height)
            .crop("fill")
            .gravity("auto")
    }

    /// `Twitter Post (16:9)` becomes `twitter_post_(16:9).png`.
    pub fn download_name(&self) -> String {
        let stem = self.label.split_whitespace().collect::<Vec<_>>().join("_");
        format!("{}.png", stem.to_lowercase())
    }
}
