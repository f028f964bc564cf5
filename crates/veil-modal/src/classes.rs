//! Class names applied to the elements a modal builds.
//!
//! Stylesheets key off these; the show and no-scroll flags drive the CSS
//! transitions and scroll suppression.

/// Full-viewport overlay behind the dialog.
pub const BACKDROP: &str = "veil__backdrop";
/// The dialog box itself.
pub const CONTAINER: &str = "veil__container";
/// The `×` button in the corner.
pub const CLOSE: &str = "veil__close";
/// Region holding the modal's markup.
pub const CONTENT: &str = "veil__content";
/// Footer bar.
pub const FOOTER: &str = "veil__footer";
/// Informational region at the start of the footer, before its buttons.
pub const FOOTER_CONTENT: &str = "veil__footer-content";
/// Added to the backdrop one turn after insertion to start the show transition.
pub const SHOW: &str = "veil--show";
/// Added to the scroll-lock target while any modal holds the lock.
pub const NO_SCROLL: &str = "veil--no-scroll";
