//! Scenario files and the runner that replays them.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use veil_dom::{BoxMetrics, Document};
use veil_modal::{Modal, ModalHost, ModalId, ModalOptions};

/// A scripted session: page setup, modal definitions and the steps to replay.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Scenario {
    /// Platform scrollbar width in pixels.
    #[serde(default)]
    pub scrollbar_width: Option<f32>,
    /// Body box metrics; give it a `scrollHeight` above `height` to overflow.
    #[serde(default)]
    pub body: Option<BodyMetrics>,
    /// Template elements to create, by id.
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
    /// Modal definitions, by name.
    pub modals: BTreeMap<String, ModalOptions>,
    /// Steps, replayed in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Body box metrics as written in a scenario.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BodyMetrics {
    /// Content width.
    pub width: f32,
    /// Visible height.
    pub height: f32,
    /// Content height.
    pub scroll_height: Option<f32>,
    /// Stylesheet `padding-right`.
    pub padding_right: f32,
}

impl From<&BodyMetrics> for BoxMetrics {
    fn from(body: &BodyMetrics) -> Self {
        Self {
            width: body.width,
            height: body.height,
            scroll_height: body.scroll_height,
            padding_right: body.padding_right,
        }
    }
}

/// What a footer button added from a scenario does when clicked.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    /// Nothing beyond being clicked.
    #[default]
    None,
    /// Close the owning modal.
    Close,
    /// Destroy the owning modal.
    Destroy,
}

/// One scripted interaction.
#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Step {
    /// `modal.open()`.
    Open {
        /// Modal name.
        modal: String,
    },
    /// `modal.close()`, or `close_with(destroy)` when `destroy` is given.
    Close {
        /// Modal name.
        modal: String,
        /// Override for `destroyOnClose`.
        #[serde(default)]
        destroy: Option<bool>,
    },
    /// `modal.destroy()`.
    Destroy {
        /// Modal name.
        modal: String,
    },
    /// A keydown on the document.
    Key {
        /// Key value, e.g. `"Escape"`.
        key: String,
    },
    /// Click directly on a modal's backdrop.
    ClickBackdrop {
        /// Modal name.
        modal: String,
    },
    /// Click on a modal's content region.
    ClickInside {
        /// Modal name.
        modal: String,
    },
    /// Click a modal's `×` button.
    ClickClose {
        /// Modal name.
        modal: String,
    },
    /// Click the `index`-th footer button.
    ClickFooterButton {
        /// Modal name.
        modal: String,
        /// Zero-based button position.
        index: usize,
    },
    /// `modal.set_content(html)`.
    SetContent {
        /// Modal name.
        modal: String,
        /// New content markup.
        html: String,
    },
    /// `modal.set_modal_footer(html)`.
    SetFooter {
        /// Modal name.
        modal: String,
        /// New footer markup.
        html: String,
    },
    /// `modal.add_footer_button(...)`.
    AddFooterButton {
        /// Modal name.
        modal: String,
        /// Button label.
        title: String,
        /// Button class attribute.
        #[serde(default)]
        css_class: String,
        /// What clicking it does.
        #[serde(default)]
        action: ButtonAction,
    },
    /// Run one turn of the task queue.
    Tick,
    /// Signal the end of the backdrop transition.
    TransitionEnd {
        /// Modal name.
        modal: String,
    },
}

/// A live scenario: the host document and its named modals.
pub struct Runner {
    host: ModalHost,
    modals: BTreeMap<String, Modal>,
}

impl Runner {
    /// Set up the document and create every modal.
    ///
    /// # Errors
    ///
    /// Fails when a template cannot be inserted into the document.
    pub fn new(scenario: &Scenario) -> Result<Self> {
        let document = Document::new();
        if let Some(width) = scenario.scrollbar_width {
            document.set_scrollbar_width(width);
        }
        if let Some(metrics) = &scenario.body {
            let body = document.body().context("document has no body")?;
            document.set_metrics(body, metrics.into());
        }
        for (id, html) in &scenario.templates {
            let _ = document
                .create_template(id, html)
                .with_context(|| format!("creating template #{id}"))?;
        }

        let host = ModalHost::new(document);
        let modals = scenario
            .modals
            .iter()
            .map(|(name, options)| (name.clone(), Modal::new(&host, options.clone())))
            .collect();

        Ok(Self { host, modals })
    }

    /// The shared host state.
    #[must_use]
    pub const fn host(&self) -> &ModalHost {
        &self.host
    }

    /// Modals by name.
    #[must_use]
    pub const fn modals(&self) -> &BTreeMap<String, Modal> {
        &self.modals
    }

    /// The name a modal was defined under.
    #[must_use]
    pub fn name_of(&self, id: ModalId) -> Option<&str> {
        self.modals
            .iter()
            .find(|(_, m)| m.id() == id)
            .map(|(name, _)| name.as_str())
    }

    fn modal(&self, name: &str) -> Result<&Modal> {
        self.modals
            .get(name)
            .with_context(|| format!("no modal named {name:?}"))
    }

    /// Replay one step.
    ///
    /// # Errors
    ///
    /// Fails when the step names an unknown modal or an element the modal
    /// has not built.
    pub fn apply(&self, step: &Step) -> Result<()> {
        let document = self.host.document();
        match step {
            Step::Open { modal } => {
                let _ = self.modal(modal)?.open();
            }
            Step::Close { modal, destroy } => {
                let modal = self.modal(modal)?;
                match destroy {
                    Some(destroy) => modal.close_with(*destroy),
                    None => modal.close(),
                }
            }
            Step::Destroy { modal } => self.modal(modal)?.destroy(),
            Step::Key { key } => document.press_key(key),
            Step::ClickBackdrop { modal } => {
                let backdrop = built(self.modal(modal)?.backdrop(), modal)?;
                let _ = document.click(backdrop);
            }
            Step::ClickInside { modal } => {
                let region = built(self.modal(modal)?.content_element(), modal)?;
                let _ = document.click(region);
            }
            Step::ClickClose { modal } => {
                let Some(button) = self.modal(modal)?.close_button() else {
                    bail!("modal {modal:?} has no close button");
                };
                let _ = document.click(button);
            }
            Step::ClickFooterButton { modal, index } => {
                let buttons = self.modal(modal)?.footer_button_elements();
                let Some(&button) = buttons.get(*index) else {
                    bail!(
                        "modal {modal:?} has {} footer buttons, no index {index}",
                        buttons.len()
                    );
                };
                let _ = document.click(button);
            }
            Step::SetContent { modal, html } => self.modal(modal)?.set_content(html),
            Step::SetFooter { modal, html } => self.modal(modal)?.set_modal_footer(html),
            Step::AddFooterButton {
                modal,
                title,
                css_class,
                action,
            } => {
                let action = *action;
                self.modal(modal)?
                    .add_footer_button(title, css_class, move |m: &Modal| match action {
                        ButtonAction::None => {}
                        ButtonAction::Close => m.close(),
                        ButtonAction::Destroy => m.destroy(),
                    });
            }
            Step::Tick => {
                let _ = document.run_tasks();
            }
            Step::TransitionEnd { modal } => {
                let backdrop = built(self.modal(modal)?.backdrop(), modal)?;
                let _ = document.finish_transition(backdrop);
            }
        }
        Ok(())
    }
}

fn built<T>(element: Option<T>, modal: &str) -> Result<T> {
    element.with_context(|| format!("modal {modal:?} is not built"))
}

/// One-line description of a step for the progress log.
#[must_use]
pub fn describe(step: &Step) -> String {
    match step {
        Step::Open { modal } => format!("open {modal}"),
        Step::Close {
            modal,
            destroy: Some(destroy),
        } => format!("close {modal} (destroy: {destroy})"),
        Step::Close { modal, .. } => format!("close {modal}"),
        Step::Destroy { modal } => format!("destroy {modal}"),
        Step::Key { key } => format!("key {key}"),
        Step::ClickBackdrop { modal } => format!("click backdrop of {modal}"),
        Step::ClickInside { modal } => format!("click inside {modal}"),
        Step::ClickClose { modal } => format!("click close button of {modal}"),
        Step::ClickFooterButton { modal, index } => {
            format!("click footer button {index} of {modal}")
        }
        Step::SetContent { modal, .. } => format!("set content of {modal}"),
        Step::SetFooter { modal, .. } => format!("set footer of {modal}"),
        Step::AddFooterButton { modal, title, .. } => {
            format!("add footer button {title:?} to {modal}")
        }
        Step::Tick => "tick".to_string(),
        Step::TransitionEnd { modal } => format!("transition end on {modal}"),
    }
}
