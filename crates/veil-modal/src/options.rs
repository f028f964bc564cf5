//! Modal configuration.
//!
//! The serializable part of [`ModalOptions`] deserializes from the camelCase
//! JSON the CLI scenarios use. Callbacks and the scroll-lock target are
//! code-only.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use veil_dom::{Document, NodeId};

/// Zero-argument lifecycle callback (`onOpen` / `onClose`).
pub type Callback = Rc<dyn Fn()>;

/// Resolves the element whose scrolling is locked while modals are open.
pub type ScrollLockTarget = Rc<dyn Fn(&Document) -> Option<NodeId>>;

/// A way the user may dismiss a modal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CloseMethod {
    /// The `×` button in the container's corner.
    Button,
    /// A click that lands exactly on the backdrop.
    Overlay,
    /// The Escape key, for the topmost modal only.
    Escape,
}

/// Which close methods are enabled, flattened for quick checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CloseMethods {
    /// `×` button is built.
    pub button: bool,
    /// Backdrop clicks close.
    pub overlay: bool,
    /// Escape closes.
    pub escape: bool,
}

impl CloseMethods {
    /// Collapse a list of methods; duplicates are harmless.
    #[must_use]
    pub fn from_list(methods: &[CloseMethod]) -> Self {
        Self {
            button: methods.contains(&CloseMethod::Button),
            overlay: methods.contains(&CloseMethod::Overlay),
            escape: methods.contains(&CloseMethod::Escape),
        }
    }
}

/// Everything a modal is configured with at construction.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ModalOptions {
    /// Enabled close methods. Defaults to all three.
    pub close_methods: Vec<CloseMethod>,
    /// Lock background scrolling while open. Defaults to `true`.
    pub enable_scroll_lock: bool,
    /// Whether a plain `close()` releases the element. Defaults to `true`.
    pub destroy_on_close: bool,
    /// Build a footer bar. Defaults to `false`.
    pub footer: bool,
    /// Extra classes for the container, in order.
    pub css_class: Vec<String>,
    /// Inline markup. Takes precedence over `template_id`.
    pub content: Option<String>,
    /// Id of a template element whose children are cloned as content.
    pub template_id: Option<String>,
    /// Element to lock; defaults to the document body.
    #[serde(skip)]
    pub scroll_lock_target: Option<ScrollLockTarget>,
    /// Runs after the show transition completes.
    #[serde(skip)]
    pub on_open: Option<Callback>,
    /// Runs after the hide transition completes and teardown is done.
    #[serde(skip)]
    pub on_close: Option<Callback>,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            close_methods: CloseMethod::iter().collect(),
            enable_scroll_lock: true,
            destroy_on_close: true,
            footer: false,
            css_class: Vec::new(),
            content: None,
            template_id: None,
            scroll_lock_target: None,
            on_open: None,
            on_close: None,
        }
    }
}

impl ModalOptions {
    /// Set inline content.
    #[must_use]
    pub fn with_content(mut self, html: impl Into<String>) -> Self {
        self.content = Some(html.into());
        self
    }

    /// Use the children of `#template_id` as content.
    #[must_use]
    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    /// Replace the enabled close methods.
    #[must_use]
    pub fn with_close_methods(mut self, methods: &[CloseMethod]) -> Self {
        self.close_methods = methods.to_vec();
        self
    }

    /// Append a container class.
    #[must_use]
    pub fn with_css_class(mut self, class: impl Into<String>) -> Self {
        self.css_class.push(class.into());
        self
    }

    /// Enable or disable the footer bar.
    #[must_use]
    pub const fn with_footer(mut self, footer: bool) -> Self {
        self.footer = footer;
        self
    }

    /// Enable or disable background scroll locking.
    #[must_use]
    pub const fn with_scroll_lock(mut self, enabled: bool) -> Self {
        self.enable_scroll_lock = enabled;
        self
    }

    /// Choose whether a plain `close()` is destructive.
    #[must_use]
    pub const fn with_destroy_on_close(mut self, destroy: bool) -> Self {
        self.destroy_on_close = destroy;
        self
    }

    /// Lock a different element than the body.
    #[must_use]
    pub fn with_scroll_lock_target(
        mut self,
        target: impl Fn(&Document) -> Option<NodeId> + 'static,
    ) -> Self {
        self.scroll_lock_target = Some(Rc::new(target));
        self
    }

    /// Set the `onOpen` callback.
    #[must_use]
    pub fn on_open(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_open = Some(Rc::new(callback));
        self
    }

    /// Set the `onClose` callback.
    #[must_use]
    pub fn on_close(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_close = Some(Rc::new(callback));
        self
    }

    /// The enabled close methods as flags.
    #[must_use]
    pub fn close_flags(&self) -> CloseMethods {
        CloseMethods::from_list(&self.close_methods)
    }
}

impl fmt::Debug for ModalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalOptions")
            .field("close_methods", &self.close_methods)
            .field("enable_scroll_lock", &self.enable_scroll_lock)
            .field("destroy_on_close", &self.destroy_on_close)
            .field("footer", &self.footer)
            .field("css_class", &self.css_class)
            .field("content", &self.content)
            .field("template_id", &self.template_id)
            .field("scroll_lock_target", &self.scroll_lock_target.is_some())
            .field("on_open", &self.on_open.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}
