//! Application-level configuration constants.

use log::LevelFilter;
use serde::Deserialize;

use crate::triggers::UploadBinding;

// Page reveal
pub const PRELOAD_CLASS: &str = "is-preload";
pub const REVEAL_DELAY_MS: u32 = 100;

// Slideshow
pub const SLIDESHOW_WRAPPER_ID: &str = "bg";
pub const SLIDESHOW_DELAY_MS: u32 = 6_000;
pub const SLIDESHOW_IMAGES: [(&str, &str); 3] = [
    ("/static/images/bg01.jpg", "center"),
    ("/static/images/bg02.jpg", "center"),
    ("/static/images/bg03.jpg", "center"),
];

// Status messages
pub const MESSAGE_TIMEOUT_MS: u32 = 3_000;

// Generate action
pub const GENERATE_BUTTON_ID: &str = "generate-button";
pub const GENERATE_ENDPOINT: &str = "/generate";
pub const DOWNLOAD_FILENAME: &str = "timetable.xlsx";

// Upload forms
pub const UPLOAD_FORM_CLASS: &str = "upload-form";
pub const UPLOAD_TARGETS: [&str; 5] = ["courses", "instructors", "rooms", "timeslots", "sections"];

// Body attribute carrying an optional JSON override of `SiteConfig`
pub const CONFIG_ATTRIBUTE: &str = "data-site-config";

pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// One background layer of the slideshow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackgroundImage {
    pub url: String,
    /// CSS `background-position` keyword, e.g. `center`.
    pub alignment: String,
}

/// Runtime settings for every component installed by [`crate::start`].
///
/// Every field falls back to the constant of the same concern above, so a
/// partial JSON override only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub log_level: LevelFilter,
    pub reveal_delay_ms: u32,
    pub slideshow_delay_ms: u32,
    pub images: Vec<BackgroundImage>,
    pub message_timeout_ms: u32,
    pub generate_endpoint: String,
    pub download_filename: String,
    pub upload_bindings: Vec<UploadBinding>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            log_level: LOG_LEVEL,
            reveal_delay_ms: REVEAL_DELAY_MS,
            slideshow_delay_ms: SLIDESHOW_DELAY_MS,
            images: SLIDESHOW_IMAGES
                .iter()
                .map(|(url, alignment)| BackgroundImage {
                    url: (*url).to_string(),
                    alignment: (*alignment).to_string(),
                })
                .collect(),
            message_timeout_ms: MESSAGE_TIMEOUT_MS,
            generate_endpoint: GENERATE_ENDPOINT.to_string(),
            download_filename: DOWNLOAD_FILENAME.to_string(),
            upload_bindings: UPLOAD_TARGETS
                .iter()
                .map(|target| UploadBinding::for_target(target))
                .collect(),
        }
    }
}

impl SiteConfig {
    /// Parse a JSON override; missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Read the override from `<body data-site-config="…">`, if any.
    pub fn from_document(document: &web_sys::Document) -> Self {
        let raw = document
            .body()
            .and_then(|body| body.get_attribute(CONFIG_ATTRIBUTE));

        match raw {
            None => Self::default(),
            Some(raw) => Self::from_json(&raw).unwrap_or_else(|e| {
                log::warn!("ignoring malformed {}: {}", CONFIG_ATTRIBUTE, e);
                Self::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_upload_target() {
        let config = SiteConfig::default();
        let triggers: Vec<&str> = config
            .upload_bindings
            .iter()
            .map(|b| b.trigger.as_str())
            .collect();
        assert_eq!(
            triggers,
            ["courses-button", "instructors-button", "rooms-button", "timeslots-button", "sections-button"]
        );
        assert_eq!(config.images.len(), 3);
        assert_eq!(config.images[0].url, "/static/images/bg01.jpg");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = SiteConfig::from_json(
            r#"{"slideshow_delay_ms": 2000, "images": [{"url": "/a.jpg", "alignment": "top"}]}"#,
        )
        .unwrap();

        assert_eq!(config.slideshow_delay_ms, 2000);
        assert_eq!(config.images, vec![BackgroundImage { url: "/a.jpg".into(), alignment: "top".into() }]);
        assert_eq!(config.message_timeout_ms, MESSAGE_TIMEOUT_MS);
        assert_eq!(config.download_filename, "timetable.xlsx");
    }

    #[test]
    fn bindings_override_accepts_trigger_ids() {
        let config = SiteConfig::from_json(r#"{"upload_bindings": ["rooms-button"]}"#).unwrap();
        assert_eq!(config.upload_bindings, vec![UploadBinding::for_target("rooms")]);
    }

    #[test]
    fn log_level_is_read_by_name() {
        let config = SiteConfig::from_json(r#"{"log_level": "DEBUG"}"#).unwrap();
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn malformed_override_is_an_error() {
        assert!(SiteConfig::from_json("{not json").is_err());
    }
}
