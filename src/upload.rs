//! Asynchronous submission of every `.upload-form` on the page.
//!
//! A form is either idle or submitting. A submit validates the file input,
//! disables the submit control, POSTs the file as multipart form data and
//! always returns to idle with the control re-enabled.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, error, info};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, File, FormData, HtmlFormElement, HtmlInputElement, RequestInit, Response};

use crate::config::{SiteConfig, UPLOAD_FORM_CLASS};
use crate::dom::{append_message_span, listen, set_disabled};
use crate::error::SiteError;
use crate::message::{MessageKind, StatusMessage};

pub const NO_FILE_TEXT: &str = "Please select a file.";
pub const SUCCESS_TEXT: &str = "Uploaded";
pub const FAILURE_TEXT: &str = "Upload failed";

const SUBMIT_SELECTOR: &str = "input[type=submit], input[type=button], button";
const FILE_SELECTOR: &str = "input[type=file]";

/// Multipart field names understood by the upload endpoint.
pub const FILE_FIELD: &str = "file";
pub const TARGET_NAME_FIELD: &str = "use_target_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
}

/// JSON body returned by the upload endpoint. A missing flag counts as a
/// rejection.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// How a form reacts to a submit.
#[derive(Debug, PartialEq)]
pub enum Begin {
    /// A request is already in flight; the submit is dropped.
    Busy,
    /// Nothing to send; show the error and stay idle.
    Reject(SiteError),
    /// Disable the control and send the request.
    Start,
}

/// Decide whether a submit starts a request.
pub fn begin(phase: FormPhase, has_file: bool) -> Begin {
    match (phase, has_file) {
        (FormPhase::Submitting, _) => Begin::Busy,
        (FormPhase::Idle, false) => Begin::Reject(SiteError::NoFile),
        (FormPhase::Idle, true) => Begin::Start,
    }
}

/// What the form does once a submission ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub kind: MessageKind,
    pub text: String,
    pub clear_input: bool,
    pub phase: FormPhase,
    pub enable_submit: bool,
}

impl Settlement {
    fn failure(text: String) -> Self {
        Self {
            kind: MessageKind::Failure,
            text,
            clear_input: false,
            phase: FormPhase::Idle,
            enable_submit: true,
        }
    }
}

/// Decide the terminal message for a finished submission. Every outcome
/// returns the form to idle with its submit control enabled.
pub fn settle(result: &Result<UploadResponse, SiteError>) -> Settlement {
    match result {
        Ok(UploadResponse { success: true, message }) => Settlement {
            kind: MessageKind::Success,
            text: non_empty(message).unwrap_or(SUCCESS_TEXT).to_string(),
            clear_input: true,
            phase: FormPhase::Idle,
            enable_submit: true,
        },
        Ok(UploadResponse { success: false, message }) => {
            Settlement::failure(non_empty(message).unwrap_or(FAILURE_TEXT).to_string())
        }
        // Non-success statuses get the generic text; the body is not read.
        Err(SiteError::Http { .. }) => Settlement::failure(FAILURE_TEXT.to_string()),
        Err(e) => Settlement::failure(e.user_text(FAILURE_TEXT)),
    }
}

fn non_empty(message: &Option<String>) -> Option<&str> {
    message.as_deref().filter(|m| !m.is_empty())
}

/// First selected file of `input`, if any.
fn selected_file(input: Option<&HtmlInputElement>) -> Option<File> {
    input?.files()?.get(0)
}

fn build_form_data(file: &File) -> Result<FormData, SiteError> {
    let data = FormData::new()?;
    data.append_with_blob(FILE_FIELD, file)?;
    data.append_with_str(TARGET_NAME_FIELD, "true")?;
    Ok(data)
}

async fn post_file(action: &str, file: &File) -> Result<UploadResponse, SiteError> {
    let init = RequestInit::new();
    init.set_method("POST");
    let data = build_form_data(file)?;
    init.set_body(&data);

    let response: Response = JsFuture::from(gloo_utils::window().fetch_with_str_and_init(action, &init))
        .await
        .map_err(SiteError::network)?
        .dyn_into()
        .map_err(SiteError::decode)?;

    if !response.ok() {
        return Err(SiteError::Http { status: response.status(), message: None });
    }

    let json = JsFuture::from(response.json()?)
        .await
        .map_err(SiteError::decode)?;
    Ok(serde_wasm_bindgen::from_value(json)?)
}

/// One bound `.upload-form` and its per-form state.
#[derive(Clone)]
struct UploadForm {
    form: HtmlFormElement,
    message: StatusMessage,
    phase: Rc<Cell<FormPhase>>,
}

impl UploadForm {
    fn control(&self, selector: &str) -> Option<Element> {
        self.form.query_selector(selector).ok().flatten()
    }

    fn on_submit(&self) {
        let submit = self.control(SUBMIT_SELECTOR);
        let file_input = self
            .control(FILE_SELECTOR)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
        let file = selected_file(file_input.as_ref());

        let file = match (begin(self.phase.get(), file.is_some()), file) {
            (Begin::Start, Some(file)) => file,
            (Begin::Busy, _) => {
                debug!("#{} already submitting, ignoring", self.form.id());
                return;
            }
            (Begin::Reject(e), _) => {
                self.message.failure(&e.user_text(NO_FILE_TEXT));
                return;
            }
            (Begin::Start, None) => return,
        };

        self.phase.set(FormPhase::Submitting);
        if let Some(control) = &submit {
            set_disabled(control, true);
        }

        let action = self.form.action();
        info!("starting upload -> {} ({})", action, file.name());

        let this = self.clone();
        spawn_local(async move {
            let result = post_file(&action, &file).await;
            match &result {
                Ok(json) => debug!("server json -> {:?}", json),
                Err(e) => error!("upload to {} failed: {}", action, e),
            }
            this.finish(&result, submit.as_ref(), file_input.as_ref());
        });
    }

    fn finish(
        &self,
        result: &Result<UploadResponse, SiteError>,
        submit: Option<&Element>,
        file_input: Option<&HtmlInputElement>,
    ) {
        let settlement = settle(result);

        if settlement.enable_submit {
            if let Some(control) = submit {
                set_disabled(control, false);
            }
        }
        if settlement.clear_input {
            if let Some(input) = file_input {
                input.set_value("");
            }
        }
        self.phase.set(settlement.phase);
        self.message.show(settlement.kind, &settlement.text);
    }
}

/// Intercept submits of every `.upload-form`; returns how many were bound.
pub fn bind_all(document: &Document, config: &SiteConfig) -> Result<usize, SiteError> {
    let forms = document.get_elements_by_class_name(UPLOAD_FORM_CLASS);
    let mut bound = 0;

    for index in 0..forms.length() {
        let Some(form) = forms
            .item(index)
            .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
        else {
            continue;
        };

        let message = StatusMessage::new(append_message_span(document, &form)?, config.message_timeout_ms);
        let upload = UploadForm {
            form: form.clone(),
            message,
            phase: Rc::new(Cell::new(FormPhase::Idle)),
        };
        listen(&form, "submit", move |event| {
            event.prevent_default();
            upload.on_submit();
        })?;
        bound += 1;
    }

    info!("{} upload form(s) bound", bound);
    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(raw: &str) -> Result<UploadResponse, SiteError> {
        Ok(serde_json::from_str(raw).unwrap())
    }

    #[test]
    fn success_clears_input_and_shows_server_text() {
        let s = settle(&parsed(r#"{"success": true, "message": "Saved"}"#));
        assert_eq!(
            s,
            Settlement {
                kind: MessageKind::Success,
                text: "Saved".into(),
                clear_input: true,
                phase: FormPhase::Idle,
                enable_submit: true,
            }
        );
    }

    #[test]
    fn rejection_keeps_input_and_shows_server_text() {
        let s = settle(&parsed(r#"{"success": false, "message": "Bad format"}"#));
        assert_eq!(s.kind, MessageKind::Failure);
        assert_eq!(s.text, "Bad format");
        assert!(!s.clear_input);
        assert!(s.enable_submit);
    }

    #[test]
    fn missing_messages_fall_back() {
        assert_eq!(settle(&parsed(r#"{"success": true}"#)).text, SUCCESS_TEXT);
        assert_eq!(settle(&parsed(r#"{"success": false, "message": ""}"#)).text, FAILURE_TEXT);
    }

    #[test]
    fn missing_success_flag_is_a_rejection_with_server_text() {
        let s = settle(&parsed(r#"{"message": "Invalid upload target"}"#));
        assert_eq!(s.kind, MessageKind::Failure);
        assert_eq!(s.text, "Invalid upload target");
    }

    #[test]
    fn extra_response_fields_are_ignored() {
        let s = settle(&parsed(r#"{"success": true, "message": "File uploaded", "filename": "rooms.csv"}"#));
        assert_eq!(s.text, "File uploaded");
    }

    #[test]
    fn http_status_failure_is_generic() {
        let s = settle(&Err(SiteError::Http { status: 400, message: Some("Invalid upload target".into()) }));
        assert_eq!(s.text, FAILURE_TEXT);
        assert_eq!(s.kind, MessageKind::Failure);
    }

    #[test]
    fn transport_failure_shows_its_text() {
        let s = settle(&Err(SiteError::Network("Failed to fetch".into())));
        assert_eq!(s.text, "Failed to fetch");
        let s = settle(&Err(SiteError::Decode("expected value".into())));
        assert_eq!(s.text, FAILURE_TEXT);
    }

    #[test]
    fn submit_without_file_is_rejected_without_request() {
        let decision = begin(FormPhase::Idle, false);
        assert_eq!(decision, Begin::Reject(SiteError::NoFile));
        if let Begin::Reject(e) = decision {
            assert_eq!(e.user_text(NO_FILE_TEXT), "Please select a file.");
        }
    }

    #[test]
    fn submit_while_submitting_is_ignored() {
        assert_eq!(begin(FormPhase::Submitting, true), Begin::Busy);
        assert_eq!(begin(FormPhase::Submitting, false), Begin::Busy);
    }

    #[test]
    fn idle_form_with_file_starts() {
        assert_eq!(begin(FormPhase::Idle, true), Begin::Start);
    }

    #[test]
    fn every_outcome_returns_to_idle_with_control_enabled() {
        let outcomes = [
            parsed(r#"{"success": true, "message": "Saved"}"#),
            parsed(r#"{"success": false, "message": "Bad format"}"#),
            parsed(r#"{}"#),
            Err(SiteError::Http { status: 500, message: None }),
            Err(SiteError::Network("Failed to fetch".into())),
            Err(SiteError::Decode("expected value".into())),
        ];
        for outcome in &outcomes {
            let s = settle(outcome);
            assert_eq!(s.phase, FormPhase::Idle, "{:?}", outcome);
            assert!(s.enable_submit, "{:?}", outcome);
            assert_eq!(begin(s.phase, true), Begin::Start);
        }
    }
}
