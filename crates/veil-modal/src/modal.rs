//! A modal instance and its lifecycle.
//!
//! ```text
//!            open()                 close()                 transition end
//! Closed ───────────▶ Open ───────────────▶ ClosingPending ─────────────────▶ Closed
//!   ▲                  ▲                        │          (destroy)        ─▶ Destroyed
//!   │                  └────── open() ──────────┘                             │
//!   └──────────────────────────── open() rebuilds ◀───────────────────────────┘
//! ```
//!
//! Opening is a two-phase commit: the element is inserted without the show
//! flag, and the flag is added on the next task-queue turn so the host sees a
//! state change and runs the show transition. Closing removes the flag at
//! once and defers destructive teardown, scroll-lock release and `onClose`
//! to the next transition-completion notification on the backdrop.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use strum_macros::{AsRefStr, Display};
use veil_common::diagnostics;
use veil_dom::{Document, DomError, KeyboardEvent, ListenerId, MouseEvent, NodeId};

use crate::classes::{BACKDROP, CLOSE, CONTAINER, CONTENT, SHOW};
use crate::content::{ConfigError, ContentSource};
use crate::footer::{self, Footer, FooterButton, FooterView};
use crate::host::ModalHost;
use crate::options::{CloseMethods, ModalOptions};
use crate::scroll_lock::measure_scrollbar_width;
use crate::stack::ModalId;

const COMPONENT: &str = "modal";
const ESCAPE_KEY: &str = "Escape";

/// Where a modal is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum ModalState {
    /// Not shown. Either never built, or closed without releasing the element.
    Closed,
    /// On the stack and shown (or about to be, pending the show flag).
    Open,
    /// Close requested; waiting for the hide transition to finish.
    ClosingPending,
    /// Closed and the element released; the next `open` rebuilds it.
    Destroyed,
}

/// Elements of a built modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct View {
    backdrop: NodeId,
    container: NodeId,
    content: NodeId,
    close_button: Option<NodeId>,
    footer: Option<FooterView>,
}

/// One dialog: configuration, owned elements and lifecycle state.
///
/// `Modal` is a cheap handle; clones refer to the same instance. Event
/// handlers installed in the document hold weak references, so dropping
/// every handle lets the instance go: an open instance leaves the stack and
/// the page when that happens. A pending close keeps the instance alive
/// until its transition ends.
#[derive(Clone)]
pub struct Modal {
    inner: Rc<Inner>,
}

/// Non-owning handle used by event handlers.
#[derive(Clone)]
pub(crate) struct WeakModal(Weak<Inner>);

impl WeakModal {
    pub(crate) fn upgrade(&self) -> Option<Modal> {
        self.0.upgrade().map(|inner| Modal { inner })
    }
}

struct Inner {
    id: ModalId,
    host: ModalHost,
    options: ModalOptions,
    close_methods: CloseMethods,
    /// `None` when configuration failed; such a modal never builds.
    content: RefCell<Option<ContentSource>>,
    state: Cell<ModalState>,
    view: Cell<Option<View>>,
    footer: RefCell<Footer>,
    escape_listener: Cell<Option<ListenerId>>,
    scrollbar_width: Cell<Option<f32>>,
    /// Bumped on every open; pending teardowns from older generations skip
    /// their destructive part.
    generation: Cell<u64>,
    destroy_pending: Cell<bool>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let document = self.host.document();
        if let Some(listener) = self.escape_listener.take() {
            let _ = document.remove_key_listener(listener);
        }

        // An instance dropped while shown must not leave its id on the stack
        // or its element in the page.
        let shown = matches!(
            self.state.get(),
            ModalState::Open | ModalState::ClosingPending
        );
        if shown {
            let _ = self.host.stack_mut().remove(self.id);
        }
        if let Some(view) = self.view.take() {
            let _ = document.remove(view.backdrop);
        }
        if shown && self.options.enable_scroll_lock && self.host.stack().is_empty() {
            let _ = self.host.scroll_lock_mut().release(document);
        }
    }
}

impl Modal {
    /// Create a modal, reporting configuration problems instead of failing.
    ///
    /// A modal whose content cannot be resolved is still returned, but it is
    /// unusable: [`Modal::open`] reports an error and returns `None` until
    /// [`Modal::set_content`] gives it content.
    #[must_use]
    pub fn new(host: &ModalHost, options: ModalOptions) -> Self {
        let content = match resolve_content(host, &options) {
            Ok(content) => Some(content),
            Err(err) => {
                diagnostics::error(COMPONENT, &err.to_string());
                None
            }
        };
        Self::assemble(host, options, content)
    }

    /// Create a modal, returning configuration problems to the caller.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingContent`] or [`ConfigError::TemplateNotFound`].
    pub fn try_new(host: &ModalHost, options: ModalOptions) -> Result<Self, ConfigError> {
        let content = resolve_content(host, &options)?;
        Ok(Self::assemble(host, options, Some(content)))
    }

    fn assemble(host: &ModalHost, options: ModalOptions, content: Option<ContentSource>) -> Self {
        let close_methods = options.close_flags();
        Self {
            inner: Rc::new(Inner {
                id: ModalId::next(),
                host: host.clone(),
                options,
                close_methods,
                content: RefCell::new(content),
                state: Cell::new(ModalState::Closed),
                view: Cell::new(None),
                footer: RefCell::new(Footer::default()),
                escape_listener: Cell::new(None),
                scrollbar_width: Cell::new(None),
                generation: Cell::new(0),
                destroy_pending: Cell::new(false),
            }),
        }
    }

    // ===== Accessors =====

    /// This instance's id on the stack.
    #[must_use]
    pub fn id(&self) -> ModalId {
        self.inner.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ModalState {
        self.inner.state.get()
    }

    /// Whether the modal is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == ModalState::Open
    }

    /// Whether the modal has content and can be opened.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.inner.content.borrow().is_some()
    }

    /// Whether this modal is the topmost open one.
    #[must_use]
    pub fn is_top(&self) -> bool {
        self.inner.host.stack().is_top(self.id())
    }

    /// The configuration the modal was created with.
    #[must_use]
    pub fn options(&self) -> &ModalOptions {
        &self.inner.options
    }

    /// The resolved content source, if configuration succeeded.
    #[must_use]
    pub fn content_source(&self) -> Option<ContentSource> {
        self.inner.content.borrow().clone()
    }

    /// The shared per-document state.
    #[must_use]
    pub fn host(&self) -> &ModalHost {
        &self.inner.host
    }

    /// The backdrop element, while built.
    #[must_use]
    pub fn backdrop(&self) -> Option<NodeId> {
        self.inner.view.get().map(|v| v.backdrop)
    }

    /// The container element, while built.
    #[must_use]
    pub fn container(&self) -> Option<NodeId> {
        self.inner.view.get().map(|v| v.container)
    }

    /// The content region, while built.
    #[must_use]
    pub fn content_element(&self) -> Option<NodeId> {
        self.inner.view.get().map(|v| v.content)
    }

    /// The `×` button, while built with the `button` close method.
    #[must_use]
    pub fn close_button(&self) -> Option<NodeId> {
        self.inner.view.get().and_then(|v| v.close_button)
    }

    /// The footer element, while built with a footer.
    #[must_use]
    pub fn footer_element(&self) -> Option<NodeId> {
        self.footer_view().map(|f| f.element)
    }

    /// The footer's informational region, while built with a footer.
    #[must_use]
    pub fn footer_content_element(&self) -> Option<NodeId> {
        self.footer_view().map(|f| f.content_region)
    }

    /// Footer button descriptors, in insertion order.
    #[must_use]
    pub fn footer_buttons(&self) -> Vec<FooterButton> {
        self.inner.footer.borrow().buttons().to_vec()
    }

    /// Rendered footer button elements, in insertion order.
    #[must_use]
    pub fn footer_button_elements(&self) -> Vec<NodeId> {
        self.inner.footer.borrow().rendered().to_vec()
    }

    /// Platform scrollbar width, measured once per instance.
    #[must_use]
    pub fn scrollbar_width(&self) -> f32 {
        if let Some(width) = self.inner.scrollbar_width.get() {
            return width;
        }
        let width = measure_scrollbar_width(self.document());
        self.inner.scrollbar_width.set(Some(width));
        width
    }

    fn document(&self) -> &Document {
        self.inner.host.document()
    }

    fn footer_view(&self) -> Option<FooterView> {
        self.inner.view.get().and_then(|v| v.footer)
    }

    pub(crate) fn downgrade(&self) -> WeakModal {
        WeakModal(Rc::downgrade(&self.inner))
    }

    // ===== Lifecycle =====

    /// Show the modal, building its element on first use.
    ///
    /// Returns the backdrop element, or `None` when the modal is unusable or
    /// could not be built (reported through diagnostics, never raised).
    pub fn open(&self) -> Option<NodeId> {
        let content = self.inner.content.borrow().clone();
        let Some(content) = content else {
            diagnostics::error(
                COMPONENT,
                &format!("modal {} has no usable content and cannot be opened", self.id()),
            );
            return None;
        };

        if self.is_open() {
            diagnostics::warn(
                COMPONENT,
                &format!("modal {} is already open; it stays where it is on the stack", self.id()),
            );
            self.schedule_show();
            return self.backdrop();
        }

        let _ = self.inner.host.stack_mut().push(self.id());

        let view = match self.ensure_view(&content) {
            Ok(view) => view,
            Err(err) => {
                let _ = self.inner.host.stack_mut().remove(self.id());
                diagnostics::error(
                    COMPONENT,
                    &format!("failed to build modal {}: {err}", self.id()),
                );
                return None;
            }
        };

        self.inner.generation.set(self.inner.generation.get() + 1);
        self.inner.destroy_pending.set(false);
        self.inner.state.set(ModalState::Open);

        self.schedule_show();

        if self.inner.options.enable_scroll_lock && self.inner.host.stack().len() == 1 {
            self.lock_scroll();
        }

        if self.inner.close_methods.overlay {
            self.bind_overlay_close(view.backdrop);
        }

        if self.inner.close_methods.escape {
            self.bind_escape();
        }

        if let Some(on_open) = self.inner.options.on_open.clone() {
            self.document()
                .once_transition_end(view.backdrop, Box::new(move || on_open()));
        }

        Some(view.backdrop)
    }

    /// Close the modal using the configured `destroyOnClose` default.
    pub fn close(&self) {
        self.close_with(self.inner.options.destroy_on_close);
    }

    /// Close the modal; `destroy` releases the element once hidden.
    ///
    /// The modal leaves the stack immediately. The element is released,
    /// the scroll lock let go (if this was the last modal) and `onClose`
    /// called when the backdrop's hide transition completes.
    pub fn close_with(&self, destroy: bool) {
        let state = self.state();
        let view = self.inner.view.get();
        let (ModalState::Open, Some(view)) = (state, view) else {
            diagnostics::warn(
                COMPONENT,
                &format!("modal {} is not open ({state}); close ignored", self.id()),
            );
            return;
        };
        let document = self.document();

        {
            let mut stack = self.inner.host.stack_mut();
            if !stack.is_top(self.id()) {
                diagnostics::warn(
                    COMPONENT,
                    &format!("modal {} closed while not on top of the stack", self.id()),
                );
            }
            let _ = stack.remove(self.id());
        }

        document.remove_class(view.backdrop, SHOW);

        if let Some(listener) = self.inner.escape_listener.take() {
            let _ = document.remove_key_listener(listener);
        }

        self.inner.state.set(ModalState::ClosingPending);
        self.inner.destroy_pending.set(destroy);

        // The subscription owns a handle so teardown still runs if the
        // caller lets go of the modal before the transition ends.
        let generation = self.inner.generation.get();
        let modal = self.clone();
        document.once_transition_end(
            view.backdrop,
            Box::new(move || modal.finish_close(generation)),
        );
    }

    /// Close and always release the element, whatever `destroyOnClose` says.
    ///
    /// On a modal that is already closing, the pending teardown becomes
    /// destructive. On a closed modal that kept its element, the element is
    /// released right away.
    pub fn destroy(&self) {
        match self.state() {
            ModalState::Open => self.close_with(true),
            ModalState::ClosingPending => self.inner.destroy_pending.set(true),
            ModalState::Closed => {
                if self.inner.view.get().is_some() {
                    self.release_view();
                    self.inner.state.set(ModalState::Destroyed);
                }
            }
            ModalState::Destroyed => {}
        }
    }

    fn finish_close(&self, generation: u64) {
        let reopened = self.inner.generation.get() != generation;
        if !reopened {
            if self.inner.destroy_pending.get() {
                self.release_view();
                self.inner.state.set(ModalState::Destroyed);
            } else {
                self.inner.state.set(ModalState::Closed);
            }
        }

        if self.inner.options.enable_scroll_lock && self.inner.host.stack().is_empty() {
            let _ = self.inner.host.scroll_lock_mut().release(self.document());
        }

        if let Some(on_close) = self.inner.options.on_close.clone() {
            on_close();
        }
    }

    // ===== Content and footer =====

    /// Replace the modal's content with inline markup.
    ///
    /// Takes effect immediately if the element is built, otherwise on the
    /// next build. Gives an unusable modal content.
    pub fn set_content(&self, html: &str) {
        *self.inner.content.borrow_mut() = Some(ContentSource::Inline(html.to_string()));
        if let Some(region) = self.content_element() {
            self.document().set_inner_html(region, html);
        }
    }

    /// Replace the footer's informational markup, leaving its buttons alone.
    pub fn set_modal_footer(&self, html: &str) {
        if !self.inner.options.footer {
            diagnostics::warn_once(
                COMPONENT,
                "footer content set on a modal created without a footer; it will not be shown",
            );
        }
        let mut footer = self.inner.footer.borrow_mut();
        footer.set_content(html);
        if let Some(view) = self.footer_view() {
            footer.render_content(self.document(), view);
        }
    }

    /// Append a footer button and re-render all buttons in insertion order.
    ///
    /// Identical calls add identical buttons; nothing is deduplicated.
    pub fn add_footer_button(
        &self,
        title: &str,
        css_class: &str,
        callback: impl Fn(&Self) + 'static,
    ) {
        let mut footer = self.inner.footer.borrow_mut();
        footer.push_button(FooterButton::new(title, css_class, callback));
        let Some(view) = self.footer_view() else {
            return;
        };
        if let Err(err) = footer.render_buttons(self.document(), view, &self.downgrade()) {
            diagnostics::error(
                COMPONENT,
                &format!("failed to render footer buttons of modal {}: {err}", self.id()),
            );
        }
    }

    // ===== Internals =====

    fn ensure_view(&self, content: &ContentSource) -> Result<View, DomError> {
        if let Some(view) = self.inner.view.get() {
            return Ok(view);
        }
        let view = self.build(content)?;
        self.inner.view.set(Some(view));
        Ok(view)
    }

    fn build(&self, content: &ContentSource) -> Result<View, DomError> {
        let document = self.document();
        let options = &self.inner.options;

        let backdrop = document.create_element("div");
        document.set_class_name(backdrop, BACKDROP);

        let container = document.create_element("div");
        document.set_class_name(container, CONTAINER);
        for class in options.css_class.iter().filter(|c| !c.is_empty()) {
            document.add_class(container, class);
        }

        let close_button = if self.inner.close_methods.button {
            let weak = self.downgrade();
            let button = footer::create_button(document, "&times;", CLOSE, move || {
                if let Some(modal) = weak.upgrade().filter(Self::is_open) {
                    modal.close();
                }
            });
            document.append_child(container, button)?;
            Some(button)
        } else {
            None
        };

        let region = document.create_element("div");
        document.set_class_name(region, CONTENT);
        content.render_into(document, region)?;
        document.append_child(container, region)?;

        let footer = if options.footer {
            let view = Footer::build(document)?;
            {
                let mut footer = self.inner.footer.borrow_mut();
                footer.render_content(document, view);
                footer.render_buttons(document, view, &self.downgrade())?;
            }
            document.append_child(container, view.element)?;
            Some(view)
        } else {
            None
        };

        document.append_child(backdrop, container)?;
        let parent = document
            .body()
            .or_else(|| document.document_element())
            .ok_or(DomError::NodeNotFound(NodeId::ROOT))?;
        document.append_child(parent, backdrop)?;

        Ok(View {
            backdrop,
            container,
            content: region,
            close_button,
            footer,
        })
    }

    fn release_view(&self) {
        let Some(view) = self.inner.view.take() else {
            return;
        };
        if let Err(err) = self.document().remove(view.backdrop) {
            diagnostics::warn(
                COMPONENT,
                &format!("could not remove modal {}: {err}", self.id()),
            );
        }
        self.inner.footer.borrow_mut().forget_elements();
    }

    fn schedule_show(&self) {
        let weak = self.downgrade();
        let generation = self.inner.generation.get();
        self.document().defer(Box::new(move || {
            let Some(modal) = weak.upgrade() else {
                return;
            };
            if !modal.is_open() || modal.inner.generation.get() != generation {
                return;
            }
            if let Some(backdrop) = modal.backdrop() {
                modal.document().add_class(backdrop, SHOW);
            }
        }));
    }

    fn lock_scroll(&self) {
        let document = self.document();
        let target = match &self.inner.options.scroll_lock_target {
            Some(resolve) => resolve(document),
            None => document.body(),
        };
        let Some(target) = target else {
            diagnostics::warn(
                "scroll-lock",
                "scroll lock target did not resolve; background scrolling stays enabled",
            );
            return;
        };
        let _ = self
            .inner
            .host
            .scroll_lock_mut()
            .acquire(document, target, || self.scrollbar_width());
    }

    fn bind_overlay_close(&self, backdrop: NodeId) {
        let weak = self.downgrade();
        self.document().set_onclick(
            backdrop,
            Some(Rc::new(move |event: &MouseEvent| {
                // Clicks inside the container bubble up here too.
                if event.target() != event.current_target() {
                    return;
                }
                if let Some(modal) = weak.upgrade().filter(Self::is_open) {
                    modal.close();
                }
            })),
        );
    }

    fn bind_escape(&self) {
        if self.inner.escape_listener.get().is_some() {
            return;
        }
        let weak = self.downgrade();
        let listener = self
            .document()
            .add_key_listener(Rc::new(move |event: &KeyboardEvent| {
                if event.key() != ESCAPE_KEY {
                    return;
                }
                if let Some(modal) = weak.upgrade().filter(|m| m.is_open() && m.is_top()) {
                    modal.close();
                }
            }));
        self.inner.escape_listener.set(Some(listener));
    }
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("backdrop", &self.backdrop())
            .finish_non_exhaustive()
    }
}

fn resolve_content(host: &ModalHost, options: &ModalOptions) -> Result<ContentSource, ConfigError> {
    ContentSource::resolve(
        host.document(),
        options.content.as_deref(),
        options.template_id.as_deref(),
    )
}
