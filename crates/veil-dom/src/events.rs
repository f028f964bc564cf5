//! Event objects and listener bookkeeping.
//!
//! [§ 2 Events](https://dom.spec.whatwg.org/#events)
//!
//! Only the slice of the event model that overlays need: click dispatch with
//! bubbling, a document-wide keyboard channel, and one-shot subscriptions for
//! transition completion.

use std::cell::Cell;
use std::rc::Rc;

use crate::NodeId;

/// Handler installed through an element's `onclick` property.
pub type ClickHandler = Rc<dyn Fn(&MouseEvent)>;

/// Listener on the document-wide keyboard channel.
pub type KeyHandler = Rc<dyn Fn(&KeyboardEvent)>;

/// Identifies a registered key listener so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// [§ 2.2 Interface Event](https://dom.spec.whatwg.org/#interface-event)
///
/// A click travelling from `target` up through its ancestors.
#[derive(Debug)]
pub struct MouseEvent {
    target: NodeId,
    current_target: Cell<NodeId>,
    propagation_stopped: Cell<bool>,
}

impl MouseEvent {
    pub(crate) const fn new(target: NodeId) -> Self {
        Self {
            target,
            current_target: Cell::new(target),
            propagation_stopped: Cell::new(false),
        }
    }

    /// "The target attribute's getter must return this's target."
    #[must_use]
    pub const fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose handler is currently running.
    #[must_use]
    pub fn current_target(&self) -> NodeId {
        self.current_target.get()
    }

    /// [§ 2.2 stopPropagation()](https://dom.spec.whatwg.org/#dom-event-stoppropagation)
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub(crate) fn set_current_target(&self, node: NodeId) {
        self.current_target.set(node);
    }

    pub(crate) fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// [UI Events § 5.6 KeyboardEvent](https://www.w3.org/TR/uievents/#interface-keyboardevent)
#[derive(Debug)]
pub struct KeyboardEvent {
    key: String,
    immediate_propagation_stopped: Cell<bool>,
}

impl KeyboardEvent {
    /// Create a keydown event for the given `key` value (e.g. `"Escape"`).
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            immediate_propagation_stopped: Cell::new(false),
        }
    }

    /// The `key` attribute value.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// [§ 2.2 stopImmediatePropagation()](https://dom.spec.whatwg.org/#dom-event-stopimmediatepropagation)
    ///
    /// Listeners after the current one are not invoked for this event.
    pub fn stop_immediate_propagation(&self) {
        self.immediate_propagation_stopped.set(true);
    }

    /// Whether a listener has stopped further dispatch.
    #[must_use]
    pub fn is_immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped.get()
    }
}

/// Listeners registered with `{ once: true }`.
///
/// Each callback runs at most once: firing drains the whole set, so a
/// callback registered while others are running waits for the next firing.
#[derive(Default)]
pub struct OnceListeners {
    pending: Vec<Box<dyn FnOnce()>>,
}

impl OnceListeners {
    /// Register a callback for the next firing.
    pub fn register(&mut self, callback: Box<dyn FnOnce()>) {
        self.pending.push(callback);
    }

    /// Take every callback registered so far, unsubscribing them.
    pub fn take(&mut self) -> Vec<Box<dyn FnOnce()>> {
        std::mem::take(&mut self.pending)
    }

    /// Number of callbacks waiting for the next firing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
