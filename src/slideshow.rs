//! Crossfading background slideshow.
//!
//! Layers are stacked inside `<div id="bg">`. On every tick the next layer
//! becomes `visible` + `top`; the outgoing layer loses `top` immediately and
//! `visible` half a period later, which is the crossfade window.

use gloo_timers::callback::{Interval, Timeout};
use log::{debug, info};
use web_sys::{Document, HtmlElement};

use crate::config::{BackgroundImage, SiteConfig, SLIDESHOW_WRAPPER_ID};
use crate::dom::{create_html_element, supports_css_property};
use crate::error::SiteError;
use crate::message::CancelSlot;

/// Rotating cursor over `len` layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    pos: usize,
    len: usize,
}

/// Result of one [`Rotation::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub previous: usize,
    pub current: usize,
}

impl Rotation {
    pub fn new(len: usize) -> Self {
        Self { pos: 0, len }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move to the next layer, wrapping to the first. `None` when empty.
    pub fn advance(&mut self) -> Option<Step> {
        if self.len == 0 {
            return None;
        }
        let previous = self.pos;
        self.pos = (self.pos + 1) % self.len;
        Some(Step { previous, current: self.pos })
    }
}

/// A single slideshow frame.
pub trait Layer {
    fn set_visible(&self, on: bool);
    fn set_top(&self, on: bool);
}

impl Layer for HtmlElement {
    fn set_visible(&self, on: bool) {
        toggle_class(self, "visible", on);
    }

    fn set_top(&self, on: bool) {
        toggle_class(self, "top", on);
    }
}

fn toggle_class(element: &HtmlElement, class: &str, on: bool) {
    let classes = element.class_list();
    let result = if on { classes.add_1(class) } else { classes.remove_1(class) };
    if let Err(e) = result {
        debug!("class {} not toggled: {:?}", class, e);
    }
}

pub struct Slideshow<L> {
    layers: Vec<L>,
    rotation: Rotation,
}

impl<L: Layer + Clone> Slideshow<L> {
    /// Take ownership of the layers and show the first one.
    pub fn new(layers: Vec<L>) -> Self {
        if let Some(first) = layers.first() {
            first.set_visible(true);
            first.set_top(true);
        }
        let rotation = Rotation::new(layers.len());
        Self { layers, rotation }
    }

    pub fn layers(&self) -> &[L] {
        &self.layers
    }

    pub fn current(&self) -> usize {
        self.rotation.position()
    }

    /// Bring the next layer on top and return the outgoing one, which the
    /// caller hides once the crossfade window is over.
    pub fn advance(&mut self) -> Option<L> {
        let Step { previous, current } = self.rotation.advance()?;
        self.layers[previous].set_top(false);
        self.layers[current].set_visible(true);
        self.layers[current].set_top(true);
        Some(self.layers[previous].clone())
    }
}

/// One timer tick: advance and schedule the hide of the outgoing layer.
///
/// The new hide handle replaces the previous one, which has already fired
/// since the hide delay is shorter than the tick period, so at most one
/// handle is held at any time.
pub fn rotate<L, H>(
    slideshow: &mut Slideshow<L>,
    pending_hide: &mut CancelSlot<H>,
    schedule_hide: impl FnOnce(L) -> H,
) where
    L: Layer + Clone,
{
    if let Some(outgoing) = slideshow.advance() {
        pending_hide.arm(schedule_hide(outgoing));
    }
}

/// Rotation only makes sense with two or more layers and CSS transitions.
pub fn should_rotate(layer_count: usize, supports_transitions: bool) -> bool {
    layer_count > 1 && supports_transitions
}

fn build_layers(
    document: &Document,
    wrapper: &HtmlElement,
    images: &[BackgroundImage],
) -> Result<Vec<HtmlElement>, SiteError> {
    images
        .iter()
        .map(|image| -> Result<HtmlElement, SiteError> {
            let layer = create_html_element(document, "div")?;
            let style = layer.style();
            style.set_property("background-image", &format!("url(\"{}\")", image.url))?;
            style.set_property("background-position", &image.alignment)?;
            wrapper.append_child(&layer)?;
            Ok(layer)
        })
        .collect()
}

/// Build the layers and, when possible, start the rotation timer.
pub fn install(document: &Document, config: &SiteConfig) -> Result<(), SiteError> {
    let body = document
        .body()
        .ok_or_else(|| SiteError::MissingElement("body".into()))?;

    let wrapper = create_html_element(document, "div")?;
    wrapper.set_id(SLIDESHOW_WRAPPER_ID);
    body.append_child(&wrapper)?;

    let layers = build_layers(document, &wrapper, &config.images)?;
    let mut slideshow = Slideshow::new(layers);

    let layer_count = slideshow.layers().len();
    if !should_rotate(layer_count, supports_css_property(document, "transition")) {
        debug!("slideshow static ({} layer(s) or no transition support)", layer_count);
        return Ok(());
    }

    let delay = config.slideshow_delay_ms;
    let mut pending_hide = CancelSlot::default();
    Interval::new(delay, move || {
        rotate(&mut slideshow, &mut pending_hide, |outgoing| {
            Timeout::new(delay / 2, move || outgoing.set_visible(false))
        });
    })
    .forget();

    info!("slideshow rotating {} layers every {} ms", layer_count, delay);
    Ok(())
}
