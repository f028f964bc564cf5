//! Background scroll lock shared by every modal on a document.
//!
//! The first modal to open (stack size 0 → 1) engages the lock and the last
//! one to finish closing releases it. Intermediate modals never touch it, so
//! nested modals cannot fight over the target's classes or padding.
//!
//! Engaging hides the target's scrollbar through [`NO_SCROLL`] and pads the
//! target's right edge by the scrollbar width, so content does not shift
//! sideways when the scrollbar disappears.

use veil_dom::{Document, NodeId};

use crate::classes::NO_SCROLL;

/// What the lock changed, so release can undo exactly that.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Engagement {
    target: NodeId,
    prior_padding: Option<String>,
}

/// The document-wide scroll lock.
#[derive(Debug, Default)]
pub struct ScrollLock {
    engaged: Option<Engagement>,
    acquisitions: usize,
    releases: usize,
}

impl ScrollLock {
    /// Create a released lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the lock currently holds a target.
    #[must_use]
    pub const fn is_engaged(&self) -> bool {
        self.engaged.is_some()
    }

    /// The element currently locked.
    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        self.engaged.as_ref().map(|e| e.target)
    }

    /// How many times the lock has been engaged.
    #[must_use]
    pub const fn acquisitions(&self) -> usize {
        self.acquisitions
    }

    /// How many times the lock has been released.
    #[must_use]
    pub const fn releases(&self) -> usize {
        self.releases
    }

    /// Lock scrolling on `target`.
    ///
    /// Does nothing if the lock is already engaged or the target has no
    /// overflow. `scrollbar_width` is only called when the lock engages.
    /// Returns whether it engaged.
    pub fn acquire(
        &mut self,
        document: &Document,
        target: NodeId,
        scrollbar_width: impl FnOnce() -> f32,
    ) -> bool {
        if self.engaged.is_some() || !has_scrollbar(document, target) {
            return false;
        }

        let prior_padding = document.style(target, "padding-right");
        let padding = document.computed_padding_right(target) + scrollbar_width();

        document.add_class(target, NO_SCROLL);
        document.set_style(target, "padding-right", &format!("{padding}px"));

        self.engaged = Some(Engagement {
            target,
            prior_padding,
        });
        self.acquisitions += 1;
        true
    }

    /// Undo the last engagement, restoring the target's inline padding.
    ///
    /// Returns whether anything was released.
    pub fn release(&mut self, document: &Document) -> bool {
        let Some(engagement) = self.engaged.take() else {
            return false;
        };

        document.remove_class(engagement.target, NO_SCROLL);
        match engagement.prior_padding {
            Some(padding) => document.set_style(engagement.target, "padding-right", &padding),
            None => document.remove_style(engagement.target, "padding-right"),
        }

        self.releases += 1;
        true
    }
}

/// Whether `target` overflows vertically.
///
/// For the root scroller (`<html>` or `<body>`) either element overflowing
/// counts, since the page scrollbar belongs to whichever one the stylesheet
/// made scroll.
#[must_use]
pub fn has_scrollbar(document: &Document, target: NodeId) -> bool {
    let overflows = |node: NodeId| document.scroll_height(node) > document.client_height(node);

    let html = document.document_element();
    let body = document.body();
    if Some(target) == html || Some(target) == body {
        return html.is_some_and(overflows) || body.is_some_and(overflows);
    }
    overflows(target)
}

/// Measure the platform scrollbar width with an off-screen probe.
///
/// The probe is forced to overflow, measured (`offsetWidth - clientWidth`)
/// and removed again before returning.
#[must_use]
pub fn measure_scrollbar_width(document: &Document) -> f32 {
    let Some(host) = document.body().or_else(|| document.document_element()) else {
        return 0.0;
    };

    let probe = document.create_element("div");
    document.set_style(probe, "position", "absolute");
    document.set_style(probe, "overflow", "scroll");
    document.set_style(probe, "top", "-9999px");

    if document.append_child(host, probe).is_err() {
        return 0.0;
    }
    let width = document.offset_width(probe) - document.client_width(probe);
    let _ = document.remove(probe);

    width
}
