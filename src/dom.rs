//! Thin helpers over `web_sys` shared by the page components.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, EventTarget, HtmlElement};

use crate::error::SiteError;

/// Lookup of elements by id, so binding logic can run against a fake page.
pub trait ElementLookup {
    type Element;

    fn by_id(&self, id: &str) -> Option<Self::Element>;
}

impl ElementLookup for Document {
    type Element = Element;

    fn by_id(&self, id: &str) -> Option<Element> {
        self.get_element_by_id(id)
    }
}

/// Attach a listener that lives as long as the page.
pub fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), SiteError>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

pub fn create_html_element(document: &Document, tag: &str) -> Result<HtmlElement, SiteError> {
    document
        .create_element(tag)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| SiteError::Dom(format!("<{}> is not an HtmlElement", tag)))
}

/// Append `<span class="message">` to `parent`.
pub fn append_message_span(document: &Document, parent: &Element) -> Result<HtmlElement, SiteError> {
    let span = create_html_element(document, "span")?;
    span.class_list().add_1("message")?;
    parent.append_child(&span)?;
    Ok(span)
}

/// Set or clear the `disabled` attribute of a form control.
pub fn set_disabled(control: &Element, disabled: bool) {
    let result = if disabled {
        control.set_attribute("disabled", "")
    } else {
        control.remove_attribute("disabled")
    };
    if let Err(e) = result {
        log::warn!("could not toggle disabled: {:?}", e);
    }
}

/// Names under which a style property may be exposed (`transition`,
/// `MozTransition`, `WebkitTransition`, `OTransition`, `msTransition`).
pub fn vendor_variants(property: &str) -> Vec<String> {
    let mut chars = property.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => return Vec::new(),
    };

    std::iter::once(property.to_string())
        .chain(["Moz", "Webkit", "O", "ms"].iter().map(|prefix| format!("{}{}", prefix, capitalized)))
        .collect()
}

/// Whether the browser knows the given CSS property, in any vendor form.
pub fn supports_css_property(document: &Document, property: &str) -> bool {
    let Ok(probe) = create_html_element(document, "div") else {
        return false;
    };
    let style = probe.style();
    vendor_variants(property)
        .iter()
        .any(|name| js_sys::Reflect::has(&style, &JsValue::from_str(name)).unwrap_or(false))
}
