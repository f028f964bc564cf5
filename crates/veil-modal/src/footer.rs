//! Footer composition.
//!
//! The footer element holds an informational region first and the buttons
//! after it. The two are rendered independently: replacing the footer text
//! never disturbs the buttons, and re-rendering the buttons never touches the
//! text.

use std::fmt;
use std::rc::Rc;

use veil_dom::{Document, DomError, MouseEvent, NodeId};

use crate::classes::{FOOTER, FOOTER_CONTENT};
use crate::modal::{Modal, WeakModal};

/// Invoked with the owning modal when a footer button is clicked.
pub type ButtonCallback = Rc<dyn Fn(&Modal)>;

/// One footer button, as added by [`Modal::add_footer_button`].
#[derive(Clone)]
pub struct FooterButton {
    /// Button markup.
    pub label: String,
    /// Class attribute of the button.
    pub class: String,
    callback: ButtonCallback,
}

impl FooterButton {
    /// Describe a button.
    #[must_use]
    pub fn new(label: &str, class: &str, callback: impl Fn(&Modal) + 'static) -> Self {
        Self {
            label: label.to_string(),
            class: class.to_string(),
            callback: Rc::new(callback),
        }
    }

    /// Run the button's callback as if it had been clicked.
    pub fn invoke(&self, modal: &Modal) {
        (self.callback)(modal);
    }
}

impl fmt::Debug for FooterButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FooterButton")
            .field("label", &self.label)
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

/// The elements of a built footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FooterView {
    pub(crate) element: NodeId,
    pub(crate) content_region: NodeId,
}

/// Footer state that outlives the elements: text and button descriptors.
#[derive(Default)]
pub(crate) struct Footer {
    content: Option<String>,
    buttons: Vec<FooterButton>,
    rendered: Vec<NodeId>,
}

impl Footer {
    pub(crate) fn set_content(&mut self, html: &str) {
        self.content = Some(html.to_string());
    }

    pub(crate) fn push_button(&mut self, button: FooterButton) {
        self.buttons.push(button);
    }

    pub(crate) fn buttons(&self) -> &[FooterButton] {
        &self.buttons
    }

    pub(crate) fn rendered(&self) -> &[NodeId] {
        &self.rendered
    }

    /// The elements are gone; forget their ids but keep the descriptors.
    pub(crate) fn forget_elements(&mut self) {
        self.rendered.clear();
    }

    /// Create the footer element with an empty content region.
    pub(crate) fn build(document: &Document) -> Result<FooterView, DomError> {
        let element = document.create_element("div");
        document.set_class_name(element, FOOTER);
        let content_region = document.create_element("div");
        document.set_class_name(content_region, FOOTER_CONTENT);
        document.append_child(element, content_region)?;
        Ok(FooterView {
            element,
            content_region,
        })
    }

    /// Write the footer text into its region, if any text was set.
    pub(crate) fn render_content(&self, document: &Document, view: FooterView) {
        if let Some(html) = &self.content {
            document.set_inner_html(view.content_region, html);
        }
    }

    /// Replace the rendered buttons with fresh ones, in insertion order.
    pub(crate) fn render_buttons(
        &mut self,
        document: &Document,
        view: FooterView,
        owner: &WeakModal,
    ) -> Result<(), DomError> {
        for old in self.rendered.drain(..) {
            let _ = document.remove(old);
        }
        for button in &self.buttons {
            let node = create_button(document, &button.label, &button.class, {
                let owner = owner.clone();
                let button = button.clone();
                move || {
                    if let Some(modal) = owner.upgrade() {
                        button.invoke(&modal);
                    }
                }
            });
            document.append_child(view.element, node)?;
            self.rendered.push(node);
        }
        Ok(())
    }
}

/// Create a detached `<button>` whose click runs `on_click`.
pub(crate) fn create_button(
    document: &Document,
    label: &str,
    class: &str,
    on_click: impl Fn() + 'static,
) -> NodeId {
    let button = document.create_element("button");
    document.set_class_name(button, class);
    document.set_inner_html(button, label);
    document.set_onclick(button, Some(Rc::new(move |_: &MouseEvent| on_click())));
    button
}
