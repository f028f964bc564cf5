//! The document handle shared by everything that lives on a page.
//!
//! [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
//!
//! `Document` is an `Rc` handle: cloning it gives another view of the same
//! page. Handlers are cloned out of their registries before they are invoked,
//! so a handler may mutate the document, register listeners or remove itself
//! without tripping a `RefCell` borrow.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use crate::events::{ClickHandler, KeyHandler, KeyboardEvent, ListenerId, MouseEvent, OnceListeners};
use crate::tasks::{Task, TaskQueue};
use crate::{BoxMetrics, DomError, DomTree, NodeId, NodeType};

/// A host document: tree, listeners, transition notifier and task queue.
#[derive(Clone)]
pub struct Document {
    inner: Rc<Inner>,
}

#[derive(Default)]
struct Inner {
    tree: RefCell<DomTree>,
    onclick: RefCell<HashMap<NodeId, ClickHandler>>,
    key_listeners: RefCell<Vec<(ListenerId, KeyHandler)>>,
    transitions: RefCell<HashMap<NodeId, OnceListeners>>,
    tasks: RefCell<TaskQueue>,
    next_listener: Cell<u64>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a blank page: `<html><head></head><body></body></html>`.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");
        // Freshly allocated nodes always form a valid hierarchy.
        let _ = tree.append_child(NodeId::ROOT, html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);
        Self::from_tree(tree)
    }

    /// Wrap an existing tree.
    #[must_use]
    pub fn from_tree(tree: DomTree) -> Self {
        Self {
            inner: Rc::new(Inner {
                tree: RefCell::new(tree),
                ..Inner::default()
            }),
        }
    }

    /// Whether two handles refer to the same document.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Borrow the tree.
    ///
    /// # Panics
    ///
    /// Panics if the tree is currently borrowed mutably.
    #[must_use]
    pub fn tree(&self) -> Ref<'_, DomTree> {
        self.inner.tree.borrow()
    }

    /// Borrow the tree mutably.
    ///
    /// # Panics
    ///
    /// Panics if the tree is currently borrowed.
    #[must_use]
    pub fn tree_mut(&self) -> RefMut<'_, DomTree> {
        self.inner.tree.borrow_mut()
    }

    // ===== Tree =====

    /// The `<html>` element.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.tree().document_element()
    }

    /// The `<body>` element.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.tree().body()
    }

    /// [§ 4.5 createElement](https://dom.spec.whatwg.org/#dom-document-createelement)
    #[must_use]
    pub fn create_element(&self, tag_name: &str) -> NodeId {
        self.tree_mut().create_element(tag_name)
    }

    /// Append `child` to `parent`, moving it if it is already attached.
    ///
    /// # Errors
    ///
    /// See [`DomTree::append_child`].
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.tree_mut().append_child(parent, child)
    }

    /// [§ 4.2.8 ChildNode remove()](https://dom.spec.whatwg.org/#dom-childnode-remove)
    ///
    /// Detaches `node` and drops the click handlers and transition
    /// subscriptions installed on it and its descendants.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NodeNotFound`] if `node` is unknown.
    pub fn remove(&self, node: NodeId) -> Result<(), DomError> {
        let subtree = {
            let mut tree = self.tree_mut();
            if tree.get(node).is_none() {
                return Err(DomError::NodeNotFound(node));
            }
            tree.detach(node);
            let mut subtree = vec![node];
            let mut i = 0;
            while i < subtree.len() {
                let current = subtree[i];
                subtree.extend(tree.children(current).iter());
                i += 1;
            }
            subtree
        };
        // Dropping a handler can run code that touches the document again,
        // so the registries must not be borrowed at that point.
        let mut handlers: Vec<ClickHandler> = Vec::new();
        let mut subscriptions: Vec<OnceListeners> = Vec::new();
        {
            let mut onclick = self.inner.onclick.borrow_mut();
            let mut transitions = self.inner.transitions.borrow_mut();
            for id in &subtree {
                handlers.extend(onclick.remove(id));
                subscriptions.extend(transitions.remove(id));
            }
        }
        drop(handlers);
        drop(subscriptions);
        Ok(())
    }

    /// Whether `node` is attached to this document.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.tree().is_connected(node)
    }

    /// Deep-copy a subtree into detached nodes.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NodeNotFound`] if `node` is unknown.
    pub fn clone_subtree(&self, node: NodeId) -> Result<NodeId, DomError> {
        self.tree_mut().clone_subtree(node)
    }

    /// Children of `node`, copied out of the tree.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree().children(node).to_vec()
    }

    /// Parent of `node`.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree().parent(node)
    }

    /// [§ 5.1 getElementById](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    #[must_use]
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.tree().get_element_by_id(element_id)
    }

    /// Set `innerHTML`: replace the children of `node` with opaque markup.
    pub fn set_inner_html(&self, node: NodeId, html: &str) {
        self.tree_mut().set_inner_html(node, html);
    }

    /// The concatenated markup and text directly under `node`.
    #[must_use]
    pub fn inner_html(&self, node: NodeId) -> String {
        let tree = self.tree();
        tree.children(node)
            .iter()
            .filter_map(|&child| match tree.get(child).map(|n| &n.node_type) {
                Some(NodeType::Markup(html) | NodeType::Text(html)) => Some(html.clone()),
                _ => None,
            })
            .collect()
    }

    /// Define a `<template id=...>` holding `html`, appended to the body.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NodeNotFound`] if the document has neither a body
    /// nor a document element to hold the template.
    pub fn create_template(&self, template_id: &str, html: &str) -> Result<NodeId, DomError> {
        let host = self
            .body()
            .or_else(|| self.document_element())
            .ok_or(DomError::NodeNotFound(NodeId::ROOT))?;
        let template = self.create_element("template");
        self.set_attribute(template, "id", template_id);
        self.set_inner_html(template, html);
        self.append_child(host, template)?;
        Ok(template)
    }

    // ===== Attributes, classes, styles =====

    /// Set an attribute on an element. Non-elements are ignored.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.tree_mut().as_element_mut(node) {
            let _ = element.attrs.insert(name.to_string(), value.to_string());
        }
    }

    /// Read an attribute.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree()
            .as_element(node)
            .and_then(|e| e.attrs.get(name).cloned())
    }

    /// Local name of an element.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NodeNotFound`] or [`DomError::NotAnElement`].
    pub fn tag_name(&self, node: NodeId) -> Result<String, DomError> {
        let tree = self.tree();
        if tree.get(node).is_none() {
            return Err(DomError::NodeNotFound(node));
        }
        tree.as_element(node)
            .map(|e| e.tag_name.clone())
            .ok_or(DomError::NotAnElement(node))
    }

    /// Set `className`, replacing the whole class list.
    pub fn set_class_name(&self, node: NodeId, class_name: &str) {
        self.set_attribute(node, "class", class_name);
    }

    /// `classList.add`.
    pub fn add_class(&self, node: NodeId, class: &str) {
        if let Some(element) = self.tree_mut().as_element_mut(node) {
            element.add_class(class);
        }
    }

    /// `classList.remove`.
    pub fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(element) = self.tree_mut().as_element_mut(node) {
            element.remove_class(class);
        }
    }

    /// `classList.contains`.
    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree()
            .as_element(node)
            .is_some_and(|e| e.has_class(class))
    }

    /// Class names of an element in order.
    #[must_use]
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.tree().as_element(node).map_or_else(Vec::new, |e| {
            e.classes().into_iter().map(str::to_string).collect()
        })
    }

    /// Set an inline style declaration.
    pub fn set_style(&self, node: NodeId, property: &str, value: &str) {
        if let Some(element) = self.tree_mut().as_element_mut(node) {
            let _ = element.style.insert(property.to_string(), value.to_string());
        }
    }

    /// Remove an inline style declaration, as assigning `""` does.
    pub fn remove_style(&self, node: NodeId, property: &str) {
        if let Some(element) = self.tree_mut().as_element_mut(node) {
            let _ = element.style.remove(property);
        }
    }

    /// Read an inline style declaration.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.tree()
            .as_element(node)
            .and_then(|e| e.style.get(property).cloned())
    }

    // ===== Metrics =====

    /// Describe an element's layout box.
    pub fn set_metrics(&self, node: NodeId, metrics: BoxMetrics) {
        if let Some(element) = self.tree_mut().as_element_mut(node) {
            element.metrics = metrics;
        }
    }

    /// Platform scrollbar width in px.
    #[must_use]
    pub fn scrollbar_width(&self) -> f32 {
        self.tree().scrollbar_width()
    }

    /// Change the platform scrollbar width.
    pub fn set_scrollbar_width(&self, width: f32) {
        self.tree_mut().set_scrollbar_width(width);
    }

    /// `offsetWidth`.
    #[must_use]
    pub fn offset_width(&self, node: NodeId) -> f32 {
        self.tree().offset_width(node)
    }

    /// `clientWidth`.
    #[must_use]
    pub fn client_width(&self, node: NodeId) -> f32 {
        self.tree().client_width(node)
    }

    /// `clientHeight`.
    #[must_use]
    pub fn client_height(&self, node: NodeId) -> f32 {
        self.tree().client_height(node)
    }

    /// `scrollHeight`.
    #[must_use]
    pub fn scroll_height(&self, node: NodeId) -> f32 {
        self.tree().scroll_height(node)
    }

    /// Computed `padding-right` in px.
    #[must_use]
    pub fn computed_padding_right(&self, node: NodeId) -> f32 {
        self.tree().computed_padding_right(node)
    }

    // ===== Click dispatch =====

    /// Install (or clear, with `None`) the element's single `onclick` handler.
    pub fn set_onclick(&self, node: NodeId, handler: Option<ClickHandler>) {
        let mut onclick = self.inner.onclick.borrow_mut();
        match handler {
            Some(handler) => {
                let _ = onclick.insert(node, handler);
            }
            None => {
                let _ = onclick.remove(&node);
            }
        }
    }

    /// Whether an `onclick` handler is installed on `node`.
    #[must_use]
    pub fn has_onclick(&self, node: NodeId) -> bool {
        self.inner.onclick.borrow().contains_key(&node)
    }

    /// Dispatch a click at `target`, bubbling to the document root.
    ///
    /// Returns how many handlers ran.
    pub fn click(&self, target: NodeId) -> usize {
        let path: Vec<NodeId> = {
            let tree = self.tree();
            std::iter::once(target).chain(tree.ancestors(target)).collect()
        };
        let event = MouseEvent::new(target);
        let mut ran = 0;
        for node in path {
            let handler = self.inner.onclick.borrow().get(&node).cloned();
            if let Some(handler) = handler {
                event.set_current_target(node);
                handler(&event);
                ran += 1;
            }
            if event.propagation_stopped() {
                break;
            }
        }
        ran
    }

    // ===== Keyboard channel =====

    /// [§ 2.7 addEventListener()](https://dom.spec.whatwg.org/#dom-eventtarget-addeventlistener)
    ///
    /// Listen for `keydown` on the whole document.
    pub fn add_key_listener(&self, handler: KeyHandler) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner.key_listeners.borrow_mut().push((id, handler));
        id
    }

    /// [§ 2.7 removeEventListener()](https://dom.spec.whatwg.org/#dom-eventtarget-removeeventlistener)
    ///
    /// Returns whether the listener was registered.
    pub fn remove_key_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.key_listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener, _)| *listener != id);
        listeners.len() != before
    }

    /// Number of registered key listeners.
    #[must_use]
    pub fn key_listener_count(&self) -> usize {
        self.inner.key_listeners.borrow().len()
    }

    /// [§ 2.9 Dispatching events](https://dom.spec.whatwg.org/#concept-event-dispatch)
    ///
    /// Listeners run in registration order. "If listener's removed is true,
    /// then continue": a listener removed by an earlier one is skipped.
    pub fn dispatch_key(&self, event: &KeyboardEvent) {
        let snapshot: Vec<(ListenerId, KeyHandler)> = self.inner.key_listeners.borrow().clone();
        for (id, handler) in snapshot {
            let still_registered = self
                .inner
                .key_listeners
                .borrow()
                .iter()
                .any(|(listener, _)| *listener == id);
            if !still_registered {
                continue;
            }
            handler(event);
            if event.is_immediate_propagation_stopped() {
                break;
            }
        }
    }

    /// Convenience for `dispatch_key(&KeyboardEvent::new(key))`.
    pub fn press_key(&self, key: &str) {
        self.dispatch_key(&KeyboardEvent::new(key));
    }

    // ===== Transition completion =====

    /// Run `callback` the next time a transition on `node` finishes.
    ///
    /// Equivalent to `addEventListener("transitionend", cb, { once: true })`.
    pub fn once_transition_end(&self, node: NodeId, callback: Box<dyn FnOnce()>) {
        self.inner
            .transitions
            .borrow_mut()
            .entry(node)
            .or_default()
            .register(callback);
    }

    /// Notify that a transition on `node` finished.
    ///
    /// Every callback subscribed at this moment runs once and is
    /// unsubscribed. Returns how many ran.
    pub fn finish_transition(&self, node: NodeId) -> usize {
        let callbacks = self
            .inner
            .transitions
            .borrow_mut()
            .remove(&node)
            .map(|mut listeners| listeners.take())
            .unwrap_or_default();
        let ran = callbacks.len();
        for callback in callbacks {
            callback();
        }
        ran
    }

    /// Number of one-shot callbacks waiting on `node`.
    #[must_use]
    pub fn pending_transitions(&self, node: NodeId) -> usize {
        self.inner
            .transitions
            .borrow()
            .get(&node)
            .map_or(0, OnceListeners::len)
    }

    /// Number of nodes that have transition callbacks waiting.
    #[must_use]
    pub fn transition_targets(&self) -> usize {
        self.inner.transitions.borrow().len()
    }

    // ===== Task queue =====

    /// Queue `task` for the next turn of the event loop.
    pub fn defer(&self, task: Task) {
        self.inner.tasks.borrow_mut().push(task);
    }

    /// Run one turn: every task queued before this call, in order.
    ///
    /// Returns how many ran.
    pub fn run_tasks(&self) -> usize {
        let batch = self.inner.tasks.borrow_mut().take_turn();
        let ran = batch.len();
        for task in batch {
            task();
        }
        ran
    }

    /// Number of tasks waiting for the next turn.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.inner.tasks.borrow().len()
    }
}
