//! Transient status text shown next to a form or button.
//!
//! Each widget owns exactly one pending hide timer. Showing a new message
//! cancels the previous timer first, so a stale timeout can never dismiss a
//! message that replaced the one it was armed for.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use web_sys::HtmlElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Failure,
}

impl MessageKind {
    pub fn class(self) -> &'static str {
        match self {
            MessageKind::Success => "success",
            MessageKind::Failure => "failure",
        }
    }

    /// The class that must be removed when this kind is shown.
    pub fn opposite(self) -> MessageKind {
        match self {
            MessageKind::Success => MessageKind::Failure,
            MessageKind::Failure => MessageKind::Success,
        }
    }
}

/// Holds at most one handle; replacing or clearing it drops the old one.
///
/// With `gloo_timers::callback::Timeout`, dropping the handle cancels the
/// timer.
#[derive(Debug)]
pub struct CancelSlot<H> {
    current: Option<H>,
}

impl<H> Default for CancelSlot<H> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<H> CancelSlot<H> {
    pub fn arm(&mut self, handle: H) {
        self.current = Some(handle);
    }

    pub fn cancel(&mut self) {
        self.current = None;
    }

    pub fn is_armed(&self) -> bool {
        self.current.is_some()
    }
}

#[derive(Clone)]
pub struct StatusMessage {
    element: HtmlElement,
    timeout_ms: u32,
    pending_hide: Rc<RefCell<CancelSlot<Timeout>>>,
}

impl StatusMessage {
    pub fn new(element: HtmlElement, timeout_ms: u32) -> Self {
        Self {
            element,
            timeout_ms,
            pending_hide: Rc::new(RefCell::new(CancelSlot::default())),
        }
    }

    pub fn show(&self, kind: MessageKind, text: &str) {
        self.pending_hide.borrow_mut().cancel();

        self.element.set_text_content(Some(text));
        let classes = self.element.class_list();
        let _ = classes.remove_1(kind.opposite().class());
        let _ = classes.add_2(kind.class(), "visible");

        // The fired timer stays in the slot until the next show; dropping a
        // Closure from inside its own callback is not allowed.
        let element = self.element.clone();
        let hide = Timeout::new(self.timeout_ms, move || {
            let _ = element.class_list().remove_1("visible");
        });
        self.pending_hide.borrow_mut().arm(hide);
    }

    pub fn success(&self, text: &str) {
        self.show(MessageKind::Success, text);
    }

    pub fn failure(&self, text: &str) {
        self.show(MessageKind::Failure, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Tracked<'a>(&'a Cell<usize>);

    impl Drop for Tracked<'_> {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn rearming_cancels_the_previous_handle() {
        let dropped = Cell::new(0);
        let mut slot = CancelSlot::default();

        slot.arm(Tracked(&dropped));
        assert_eq!(dropped.get(), 0);

        slot.arm(Tracked(&dropped));
        assert_eq!(dropped.get(), 1, "first hide must be cancelled");
        assert!(slot.is_armed());
    }

    #[test]
    fn cancel_clears_the_slot() {
        let dropped = Cell::new(0);
        let mut slot = CancelSlot::default();
        slot.arm(Tracked(&dropped));
        slot.cancel();
        assert_eq!(dropped.get(), 1);
        assert!(!slot.is_armed());

        slot.cancel();
        assert_eq!(dropped.get(), 1);
    }

    #[test]
    fn kinds_swap_classes() {
        assert_eq!(MessageKind::Success.class(), "success");
        assert_eq!(MessageKind::Failure.class(), "failure");
        assert_eq!(MessageKind::Success.opposite(), MessageKind::Failure);
    }
}
