//! Diagnostics with colored terminal output.
//!
//! Nothing in veil raises for caller-catchable recovery. Configuration
//! problems and lifecycle misuse are reported here instead: printed to stderr
//! and recorded so that callers (and tests) can inspect what went wrong.
//!
//! Records are kept per thread. veil is single-threaded by construction, and
//! keeping them thread-local lets parallel test threads assert on their own
//! reports without seeing each other's.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use owo_colors::OwoColorize;
use strum_macros::{AsRefStr, Display};

/// How serious a report is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Recoverable problem; the affected operation still did something sensible.
    Warning,
    /// Terminal problem for the affected instance.
    Error,
}

/// A single recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Warning or error.
    pub severity: Severity,
    /// The component that raised it (e.g. `"modal"`, `"scroll-lock"`).
    pub component: String,
    /// Human-readable message.
    pub message: String,
}

thread_local! {
    static REPORTS: RefCell<Vec<Report>> = const { RefCell::new(Vec::new()) };
    static WARNED: RefCell<Option<HashSet<String>>> = const { RefCell::new(None) };
    static ECHO: Cell<bool> = const { Cell::new(true) };
}

/// Report a non-fatal problem.
///
/// # Example
/// ```ignore
/// warn("modal", "both content and templateId are set, using content");
/// ```
pub fn warn(component: &str, message: &str) {
    emit(Severity::Warning, component, message);
}

/// Report a problem that leaves the affected instance unusable.
pub fn error(component: &str, message: &str) {
    emit(Severity::Error, component, message);
}

/// Warn about a problem, once per unique message on this thread.
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let first = WARNED.with_borrow_mut(|warned| warned.get_or_insert_with(HashSet::new).insert(key));

    if first {
        warn(component, message);
    }
}

/// Drain every report recorded on this thread, oldest first.
#[must_use]
pub fn take_reports() -> Vec<Report> {
    REPORTS.with_borrow_mut(std::mem::take)
}

/// Forget recorded reports and the `warn_once` history.
pub fn clear_reports() {
    REPORTS.with_borrow_mut(Vec::clear);
    WARNED.with_borrow_mut(|warned| {
        if let Some(set) = warned.as_mut() {
            set.clear();
        }
    });
}

/// Enable or disable printing to stderr on this thread.
///
/// Reports are recorded either way.
pub fn set_echo(enabled: bool) {
    ECHO.set(enabled);
}

fn emit(severity: Severity, component: &str, message: &str) {
    if ECHO.get() {
        let line = format!("[veil {component}] {message}");
        match severity {
            Severity::Warning => eprintln!("{}", line.yellow()),
            Severity::Error => eprintln!("{}", line.red()),
        }
    }

    REPORTS.with_borrow_mut(|reports| {
        reports.push(Report {
            severity,
            component: component.to_string(),
            message: message.to_string(),
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        set_echo(false);
        clear_reports();

        warn("modal", "first");
        error("template", "second");

        let reports = take_reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].severity, Severity::Warning);
        assert_eq!(reports[1].component, "template");
        assert!(take_reports().is_empty());
    }

    #[test]
    fn warn_once_dedups_until_cleared() {
        set_echo(false);
        clear_reports();

        warn_once("modal", "same");
        warn_once("modal", "same");
        assert_eq!(take_reports().len(), 1);

        clear_reports();
        warn_once("modal", "same");
        assert_eq!(take_reports().len(), 1);
    }
}
