//! Start the page's entry animations once everything has loaded.

use gloo_timers::callback::Timeout;
use web_sys::Document;

use crate::config::{SiteConfig, PRELOAD_CLASS};
use crate::dom::listen;
use crate::error::SiteError;

/// Remove the preload marker from `<body>` shortly after `load`.
pub fn install(document: &Document, config: &SiteConfig) -> Result<(), SiteError> {
    let body = document
        .body()
        .ok_or_else(|| SiteError::MissingElement("body".into()))?;
    let delay = config.reveal_delay_ms;

    listen(&gloo_utils::window(), "load", move |_| {
        let body = body.clone();
        Timeout::new(delay, move || {
            let _ = body.class_list().remove_1(PRELOAD_CLASS);
        })
        .forget();
    })
}
