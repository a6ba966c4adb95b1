//! Visible buttons that open a hidden file picker and auto-submit its form.

use log::{debug, info};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventInit, HtmlElement, HtmlInputElement};

use crate::dom::{listen, ElementLookup};
use crate::error::SiteError;

const TRIGGER_SUFFIX: &str = "-button";

/// Ids of a trigger button, its hidden file input and the form to submit.
///
/// In a config override a binding is either the full table entry or just
/// the trigger id (`"rooms-button"`), which expands by naming convention.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BindingSpec")]
pub struct UploadBinding {
    pub trigger: String,
    pub file_input: String,
    pub form: String,
}

impl UploadBinding {
    /// `courses` → `courses-button`, `courses-file`, `courses-form`.
    pub fn for_target(target: &str) -> Self {
        Self {
            trigger: format!("{}{}", target, TRIGGER_SUFFIX),
            file_input: format!("{}-file", target),
            form: format!("{}-form", target),
        }
    }

    /// Derive the conventional binding from a trigger id ending in `-button`.
    pub fn from_trigger_id(id: &str) -> Option<Self> {
        id.strip_suffix(TRIGGER_SUFFIX)
            .filter(|base| !base.is_empty())
            .map(Self::for_target)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BindingSpec {
    Trigger(String),
    Table {
        trigger: String,
        file_input: String,
        form: String,
    },
}

impl TryFrom<BindingSpec> for UploadBinding {
    type Error = String;

    fn try_from(spec: BindingSpec) -> Result<Self, Self::Error> {
        match spec {
            BindingSpec::Trigger(id) => Self::from_trigger_id(&id)
                .ok_or_else(|| format!("trigger id {:?} does not end in {}", id, TRIGGER_SUFFIX)),
            BindingSpec::Table { trigger, file_input, form } => Ok(Self { trigger, file_input, form }),
        }
    }
}

/// The three elements of a binding, all present on the page.
#[derive(Debug, PartialEq)]
pub struct Resolved<E> {
    pub trigger: E,
    pub file_input: E,
    pub form: E,
}

/// Look up every element of `binding`; `None` if any is missing.
pub fn resolve<L: ElementLookup>(lookup: &L, binding: &UploadBinding) -> Option<Resolved<L::Element>> {
    Some(Resolved {
        trigger: lookup.by_id(&binding.trigger)?,
        file_input: lookup.by_id(&binding.file_input)?,
        form: lookup.by_id(&binding.form)?,
    })
}

fn has_files(input: &HtmlInputElement) -> bool {
    input.files().map(|files| files.length() > 0).unwrap_or(false)
}

fn synthetic_submit() -> Result<Event, SiteError> {
    let init = EventInit::new();
    init.set_bubbles(true);
    init.set_cancelable(true);
    Ok(Event::new_with_event_init_dict("submit", &init)?)
}

fn wire(binding: &UploadBinding, resolved: Resolved<Element>) -> Result<(), SiteError> {
    let Resolved { trigger, file_input, form } = resolved;
    let trigger: HtmlElement = trigger
        .dyn_into()
        .map_err(|_| SiteError::Dom(format!("#{} is not an HTML element", binding.trigger)))?;
    let file_input: HtmlInputElement = file_input
        .dyn_into()
        .map_err(|_| SiteError::Dom(format!("#{} is not an <input>", binding.file_input)))?;

    let picker = file_input.clone();
    let trigger_id = binding.trigger.clone();
    listen(&trigger, "click", move |_| {
        debug!("{} clicked, opening file picker", trigger_id);
        picker.click();
    })?;

    let input = file_input.clone();
    let form_id = binding.form.clone();
    listen(&file_input, "change", move |_| {
        if !has_files(&input) {
            return;
        }
        debug!("file selected, submitting #{}", form_id);
        let dispatched = synthetic_submit().and_then(|evt| Ok(form.dispatch_event(&evt)?));
        if let Err(e) = dispatched {
            log::error!("could not submit #{}: {}", form_id, e);
        }
    })?;

    Ok(())
}

/// Wire every binding whose elements exist; returns how many were wired.
pub fn bind_all(document: &Document, bindings: &[UploadBinding]) -> usize {
    let mut wired = 0;
    for binding in bindings {
        let Some(resolved) = resolve(document, binding) else {
            debug!("skipping {}: missing file input or form", binding.trigger);
            continue;
        };
        match wire(binding, resolved) {
            Ok(()) => wired += 1,
            Err(e) => debug!("skipping {}: {}", binding.trigger, e),
        }
    }
    info!("{} upload trigger(s) wired", wired);
    wired
}
