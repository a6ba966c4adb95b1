//! The "generate timetable" button: POST to the solver endpoint and hand the
//! returned spreadsheet to the browser as a download.

use log::{error, info};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Blob, Document, HtmlAnchorElement, RequestInit, Response, Url};

use crate::config::{SiteConfig, GENERATE_BUTTON_ID};
use crate::dom::{append_message_span, listen};
use crate::error::SiteError;
use crate::message::StatusMessage;

pub const IN_PROGRESS_TEXT: &str = "Generating...";
pub const DONE_TEXT: &str = "Downloaded";
pub const HTTP_FAILURE_TEXT: &str = "Generate failed";
pub const FAILURE_TEXT: &str = "Failed";

/// JSON body returned by the endpoint on failure.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Map a non-success response to an error carrying the server's message.
pub fn http_failure(status: u16, body: Option<ErrorBody>) -> SiteError {
    SiteError::Http {
        status,
        message: body.and_then(|b| b.message),
    }
}

/// Status text for a failed generate request.
pub fn failure_text(err: &SiteError) -> String {
    match err {
        SiteError::Http { .. } => err.user_text(HTTP_FAILURE_TEXT),
        _ => err.user_text(FAILURE_TEXT),
    }
}

async fn read_error_body(response: &Response) -> Option<ErrorBody> {
    let promise = response.json().ok()?;
    let value = JsFuture::from(promise).await.ok()?;
    serde_wasm_bindgen::from_value(value).ok()
}

async fn request_timetable(endpoint: &str) -> Result<Blob, SiteError> {
    let window = gloo_utils::window();
    let init = RequestInit::new();
    init.set_method("POST");

    let response: Response = JsFuture::from(window.fetch_with_str_and_init(endpoint, &init))
        .await
        .map_err(SiteError::network)?
        .dyn_into()
        .map_err(SiteError::decode)?;

    if !response.ok() {
        let body = read_error_body(&response).await;
        return Err(http_failure(response.status(), body));
    }

    let blob = JsFuture::from(response.blob()?)
        .await
        .map_err(SiteError::decode)?;
    blob.dyn_into().map_err(SiteError::decode)
}

/// Save `blob` through a temporary `<a download>`.
pub fn download_blob(document: &Document, blob: &Blob, filename: &str) -> Result<(), SiteError> {
    let body = document
        .body()
        .ok_or_else(|| SiteError::MissingElement("body".into()))?;
    let url = Url::create_object_url_with_blob(blob)?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(|_| SiteError::Dom("anchor cast failed".into()))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();

    Url::revoke_object_url(&url)?;
    Ok(())
}

async fn run(endpoint: String, filename: String, message: StatusMessage) {
    message.success(IN_PROGRESS_TEXT);

    let result = async {
        let blob = request_timetable(&endpoint).await?;
        download_blob(&gloo_utils::document(), &blob, &filename)
    }
    .await;

    match result {
        Ok(()) => {
            info!("downloaded {}", filename);
            message.success(DONE_TEXT);
        }
        Err(e) => {
            error!("generate failed: {}", e);
            message.failure(&failure_text(&e));
        }
    }
}

/// Wire the generate button if the page has one.
pub fn bind(document: &Document, config: &SiteConfig) -> Result<(), SiteError> {
    let Some(button) = document.get_element_by_id(GENERATE_BUTTON_ID) else {
        return Ok(());
    };
    let parent = button
        .parent_element()
        .ok_or_else(|| SiteError::Dom(format!("#{} has no parent", GENERATE_BUTTON_ID)))?;
    let message = StatusMessage::new(append_message_span(document, &parent)?, config.message_timeout_ms);

    let endpoint = config.generate_endpoint.clone();
    let filename = config.download_filename.clone();
    listen(&button, "click", move |_| {
        spawn_local(run(endpoint.clone(), filename.clone(), message.clone()));
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_shown() {
        let body: ErrorBody = serde_json::from_str(r#"{"message": "bad"}"#).unwrap();
        assert_eq!(failure_text(&http_failure(500, Some(body))), "bad");
    }

    #[test]
    fn flask_error_body_is_accepted() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"success": false, "message": "No courses uploaded"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("No courses uploaded"));
    }

    #[test]
    fn missing_or_unreadable_body_uses_default() {
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(failure_text(&http_failure(500, Some(body))), HTTP_FAILURE_TEXT);
        assert_eq!(failure_text(&http_failure(502, None)), HTTP_FAILURE_TEXT);
    }

    #[test]
    fn transport_errors_show_their_text() {
        assert_eq!(failure_text(&SiteError::Network("Failed to fetch".into())), "Failed to fetch");
        assert_eq!(failure_text(&SiteError::Decode("bad blob".into())), FAILURE_TEXT);
    }
}
