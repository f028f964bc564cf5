//! Where a modal's markup comes from.
//!
//! Content is either inline markup or the children of a template element
//! already present in the document. Both are opaque: they are injected or
//! cloned, never parsed.

use thiserror::Error;
use veil_common::diagnostics;
use veil_dom::{Document, DomError, NodeId};

/// A configuration problem that leaves a modal unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Neither `content` nor `templateId` was given.
    #[error("modal must have content or templateId")]
    MissingContent,

    /// `templateId` names no element in the document.
    #[error("template #{template_id} does not exist")]
    TemplateNotFound {
        /// The id that failed to resolve.
        template_id: String,
    },
}

/// Resolved content source for a modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Markup owned by the modal.
    Inline(String),
    /// A template element whose children are cloned on every build.
    Template {
        /// The id it was looked up by.
        template_id: String,
        /// The template element.
        node: NodeId,
    },
}

impl ContentSource {
    /// Pick the content source from the configured options.
    ///
    /// Inline content wins when both are given; the template id is dropped
    /// and a warning is reported. Empty strings count as absent.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingContent`] when neither is given,
    /// [`ConfigError::TemplateNotFound`] when the template id does not resolve.
    pub fn resolve(
        document: &Document,
        content: Option<&str>,
        template_id: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let content = content.filter(|c| !c.is_empty());
        let template_id = template_id.filter(|t| !t.is_empty());

        match (content, template_id) {
            (None, None) => Err(ConfigError::MissingContent),
            (Some(html), Some(_)) => {
                diagnostics::warn(
                    "modal",
                    "both content and templateId are set, content will take precedence and templateId will be ignored",
                );
                Ok(Self::Inline(html.to_string()))
            }
            (Some(html), None) => Ok(Self::Inline(html.to_string())),
            (None, Some(id)) => document
                .get_element_by_id(id)
                .map(|node| Self::Template {
                    template_id: id.to_string(),
                    node,
                })
                .ok_or_else(|| ConfigError::TemplateNotFound {
                    template_id: id.to_string(),
                }),
        }
    }

    /// Insert a fresh copy of the content into `region`.
    ///
    /// Inline markup goes into a wrapper `div`; template children are deep
    /// clones, so the template itself is never moved.
    ///
    /// # Errors
    ///
    /// Propagates tree errors, e.g. when the template node has been dropped.
    pub fn render_into(&self, document: &Document, region: NodeId) -> Result<(), DomError> {
        match self {
            Self::Inline(html) => {
                let wrapper = document.create_element("div");
                document.set_inner_html(wrapper, html);
                document.append_child(region, wrapper)
            }
            Self::Template { node, .. } => {
                let _ = document.tag_name(*node)?;
                for child in document.children(*node) {
                    let copy = document.clone_subtree(child)?;
                    document.append_child(region, copy)?;
                }
                Ok(())
            }
        }
    }
}
