//! Integration tests for opening, closing and destroying modals.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use veil_common::diagnostics::{self, Severity};
use veil_dom::{Document, MouseEvent};
use veil_modal::classes::{BACKDROP, CLOSE, CONTAINER, CONTENT, SHOW};
use veil_modal::{CloseMethod, Modal, ModalHost, ModalOptions, ModalState};

fn setup() -> ModalHost {
    diagnostics::set_echo(false);
    diagnostics::clear_reports();
    ModalHost::new(Document::new())
}

fn modal(host: &ModalHost, html: &str) -> Modal {
    Modal::new(host, ModalOptions::default().with_content(html))
}

fn counter() -> (Rc<Cell<usize>>, Rc<Cell<usize>>) {
    let c = Rc::new(Cell::new(0));
    (Rc::clone(&c), c)
}

// ========== opening ==========

#[test]
fn test_open_builds_backdrop_under_body() {
    let host = setup();
    let doc = host.document();
    let m = modal(&host, "<p>Hello</p>");

    let backdrop = m.open().unwrap();

    assert_eq!(doc.parent(backdrop), doc.body());
    assert!(doc.has_class(backdrop, BACKDROP));
    let container = m.container().unwrap();
    assert_eq!(doc.children(backdrop), vec![container]);
    assert!(doc.has_class(container, CONTAINER));

    let children = doc.children(container);
    assert_eq!(children.len(), 2);
    assert!(doc.has_class(children[0], CLOSE));
    assert_eq!(doc.tag_name(children[0]).unwrap(), "button");
    assert_eq!(doc.inner_html(children[0]), "&times;");
    assert!(doc.has_class(children[1], CONTENT));

    let wrapper = doc.children(children[1])[0];
    assert_eq!(doc.inner_html(wrapper), "<p>Hello</p>");
    assert_eq!(m.state(), ModalState::Open);
}

#[test]
fn test_show_flag_lands_on_next_turn() {
    let host = setup();
    let m = modal(&host, "x");

    let backdrop = m.open().unwrap();
    assert!(!host.document().has_class(backdrop, SHOW));

    let _ = host.document().run_tasks();
    assert!(host.document().has_class(backdrop, SHOW));
}

#[test]
fn test_css_classes_skip_empty_entries() {
    let host = setup();
    let m = Modal::new(
        &host,
        ModalOptions::default()
            .with_content("x")
            .with_css_class("wide")
            .with_css_class("")
            .with_css_class("dark"),
    );

    let _ = m.open();

    let classes = host.document().classes(m.container().unwrap());
    assert_eq!(classes, vec![CONTAINER, "wide", "dark"]);
}

#[test]
fn test_open_registers_in_open_order() {
    let host = setup();
    let a = modal(&host, "a");
    let b = modal(&host, "b");

    let _ = a.open();
    let _ = b.open();

    assert_eq!(host.open_modals(), vec![a.id(), b.id()]);
    assert!(b.is_top());
    assert!(!a.is_top());
}

#[test]
fn test_open_twice_warns_and_keeps_one_entry() {
    let host = setup();
    let m = modal(&host, "x");

    let first = m.open();
    let second = m.open();

    assert_eq!(first, second);
    assert_eq!(host.stack().len(), 1);
    let reports = diagnostics::take_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].severity, Severity::Warning);
}

#[test]
fn test_on_open_fires_after_show_transition() {
    let host = setup();
    let (opened, seen) = counter();
    let m = Modal::new(
        &host,
        ModalOptions::default()
            .with_content("x")
            .on_open(move || opened.set(opened.get() + 1)),
    );

    let backdrop = m.open().unwrap();
    assert_eq!(seen.get(), 0);

    let _ = host.document().run_tasks();
    assert_eq!(host.document().finish_transition(backdrop), 1);
    assert_eq!(seen.get(), 1);

    let _ = host.document().finish_transition(backdrop);
    assert_eq!(seen.get(), 1);
}

// ========== closing ==========

#[test]
fn test_close_defers_teardown_to_transition_end() {
    let host = setup();
    let doc = host.document();
    let (closed, seen) = counter();
    let m = Modal::new(
        &host,
        ModalOptions::default()
            .with_content("x")
            .on_close(move || closed.set(closed.get() + 1)),
    );

    let backdrop = m.open().unwrap();
    let _ = doc.run_tasks();
    let _ = doc.finish_transition(backdrop);

    m.close();
    assert!(host.stack().is_empty());
    assert!(!doc.has_class(backdrop, SHOW));
    assert_eq!(m.state(), ModalState::ClosingPending);
    assert!(doc.contains(backdrop));
    assert_eq!(seen.get(), 0);

    let _ = doc.finish_transition(backdrop);
    assert!(!doc.contains(backdrop));
    assert_eq!(m.state(), ModalState::Destroyed);
    assert_eq!(m.backdrop(), None);
    assert_eq!(seen.get(), 1);
}

#[test]
fn test_non_destructive_close_keeps_element_for_reuse() {
    let host = setup();
    let doc = host.document();
    let m = Modal::new(
        &host,
        ModalOptions::default()
            .with_content("x")
            .with_destroy_on_close(false),
    );

    let backdrop = m.open().unwrap();
    m.close();
    let _ = doc.finish_transition(backdrop);

    assert_eq!(m.state(), ModalState::Closed);
    assert!(doc.contains(backdrop));
    assert!(!doc.has_class(backdrop, SHOW));

    assert_eq!(m.open(), Some(backdrop));
    let _ = doc.run_tasks();
    assert!(doc.has_class(backdrop, SHOW));
}

#[test]
fn test_destroy_overrides_destroy_on_close() {
    let host = setup();
    let doc = host.document();
    let m = Modal::new(
        &host,
        ModalOptions::default()
            .with_content("x")
            .with_destroy_on_close(false),
    );

    let backdrop = m.open().unwrap();
    m.destroy();
    let _ = doc.finish_transition(backdrop);

    assert!(!doc.contains(backdrop));
    assert_eq!(m.state(), ModalState::Destroyed);
}

#[test]
fn test_destroy_on_closed_modal_releases_immediately() {
    let host = setup();
    let doc = host.document();
    let m = Modal::new(
        &host,
        ModalOptions::default()
            .with_content("x")
            .with_destroy_on_close(false),
    );

    let backdrop = m.open().unwrap();
    m.close();
    let _ = doc.finish_transition(backdrop);

    m.destroy();
    assert!(!doc.contains(backdrop));
    assert_eq!(m.state(), ModalState::Destroyed);
}

#[test]
fn test_destroy_while_closing_upgrades_teardown() {
    let host = setup();
    let doc = host.document();
    let m = Modal::new(
        &host,
        ModalOptions::default()
            .with_content("x")
            .with_destroy_on_close(false),
    );

    let backdrop = m.open().unwrap();
    m.close();
    m.destroy();
    let _ = doc.finish_transition(backdrop);

    assert!(!doc.contains(backdrop));
    assert_eq!(m.state(), ModalState::Destroyed);
}

#[test]
fn test_reopen_after_destroy_builds_fresh_element() {
    let host = setup();
    let doc = host.document();
    let m = modal(&host, "x");

    let first = m.open().unwrap();
    m.close();
    let _ = doc.finish_transition(first);

    let second = m.open().unwrap();
    assert_ne!(first, second);
    assert!(doc.contains(second));
    assert_eq!(m.state(), ModalState::Open);
}

#[test]
fn test_close_when_not_open_warns() {
    let host = setup();
    let m = modal(&host, "x");

    m.close();

    assert_eq!(m.state(), ModalState::Closed);
    let reports = diagnostics::take_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].severity, Severity::Warning);
}

#[test]
fn test_close_below_top_warns_and_keeps_order() {
    let host = setup();
    let a = modal(&host, "a");
    let b = modal(&host, "b");
    let c = modal(&host, "c");
    let _ = a.open();
    let _ = b.open();
    let _ = c.open();
    diagnostics::clear_reports();

    b.close();

    assert_eq!(host.open_modals(), vec![a.id(), c.id()]);
    let reports = diagnostics::take_reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("not on top"));
}

#[test]
fn test_reopen_while_closing_cancels_teardown() {
    let host = setup();
    let doc = host.document();
    let (closed, seen) = counter();
    let m = Modal::new(
        &host,
        ModalOptions::default()
            .with_content("x")
            .on_close(move || closed.set(closed.get() + 1)),
    );

    let backdrop = m.open().unwrap();
    m.close();
    assert_eq!(m.open(), Some(backdrop));

    let _ = doc.run_tasks();
    let _ = doc.finish_transition(backdrop);

    assert!(doc.contains(backdrop));
    assert_eq!(m.state(), ModalState::Open);
    assert!(doc.has_class(backdrop, SHOW));
    assert_eq!(host.open_modals(), vec![m.id()]);
    // The stale close still reports completion.
    assert_eq!(seen.get(), 1);
}

#[test]
fn test_show_task_is_skipped_after_close() {
    let host = setup();
    let doc = host.document();
    let m = modal(&host, "x");

    let backdrop = m.open().unwrap();
    m.close();
    let _ = doc.run_tasks();

    assert!(!doc.has_class(backdrop, SHOW));
}

// ========== close methods ==========

#[test]
fn test_escape_closes_only_the_top_modal() {
    let host = setup();
    let doc = host.document();
    let a = modal(&host, "a");
    let b = modal(&host, "b");
    let _ = a.open();
    let _ = b.open();

    doc.press_key("Escape");
    assert_eq!(host.open_modals(), vec![a.id()]);
    assert_eq!(b.state(), ModalState::ClosingPending);

    doc.press_key("Escape");
    assert!(host.stack().is_empty());
}

#[test]
fn test_escape_closes_top_regardless_of_listener_order() {
    let host = setup();
    let doc = host.document();
    let a = modal(&host, "a");
    let b = modal(&host, "b");
    let _ = b.open();
    let _ = a.open();

    doc.press_key("Escape");

    assert_eq!(host.open_modals(), vec![b.id()]);
    assert_eq!(a.state(), ModalState::ClosingPending);
}

#[test]
fn test_other_keys_are_ignored() {
    let host = setup();
    let m = modal(&host, "x");
    let _ = m.open();

    host.document().press_key("Enter");

    assert!(m.is_open());
}

#[test]
fn test_escape_listener_removed_on_close() {
    let host = setup();
    let doc = host.document();
    let m = modal(&host, "x");

    let _ = m.open();
    assert_eq!(doc.key_listener_count(), 1);
    m.close();
    assert_eq!(doc.key_listener_count(), 0);
}

#[test]
fn test_backdrop_click_closes_but_inside_click_does_not() {
    let host = setup();
    let doc = host.document();
    let m = modal(&host, "x");
    let backdrop = m.open().unwrap();

    let _ = doc.click(m.content_element().unwrap());
    assert!(m.is_open());

    let _ = doc.click(m.container().unwrap());
    assert!(m.is_open());

    let _ = doc.click(backdrop);
    assert_eq!(m.state(), ModalState::ClosingPending);
}

#[test]
fn test_close_button_closes() {
    let host = setup();
    let m = modal(&host, "x");
    let _ = m.open();

    let _ = host.document().click(m.close_button().unwrap());

    assert_eq!(m.state(), ModalState::ClosingPending);
    assert!(host.stack().is_empty());
}

#[test]
fn test_disabled_close_methods_do_nothing() {
    let host = setup();
    let doc = host.document();
    let m = Modal::new(
        &host,
        ModalOptions::default()
            .with_content("x")
            .with_close_methods(&[]),
    );

    let backdrop = m.open().unwrap();
    assert_eq!(m.close_button(), None);
    assert_eq!(doc.key_listener_count(), 0);

    doc.press_key("Escape");
    let _ = doc.click(backdrop);

    assert!(m.is_open());
    assert_eq!(doc.children(m.container().unwrap()).len(), 1);
}

#[test]
fn test_single_close_method() {
    let host = setup();
    let doc = host.document();
    let m = Modal::new(
        &host,
        ModalOptions::default()
            .with_content("x")
            .with_close_methods(&[CloseMethod::Escape]),
    );

    let backdrop = m.open().unwrap();
    let _ = doc.click(backdrop);
    assert!(m.is_open());

    doc.press_key("Escape");
    assert!(!m.is_open());
}

// ========== unusable modals ==========

#[test]
fn test_unusable_modal_never_opens() {
    let host = setup();
    let m = Modal::new(&host, ModalOptions::default());
    assert!(!m.is_usable());

    assert_eq!(m.open(), None);
    assert!(host.stack().is_empty());

    let reports = diagnostics::take_reports();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.severity == Severity::Error));
}

#[test]
fn test_set_content_makes_modal_usable() {
    let host = setup();
    let m = Modal::new(&host, ModalOptions::default());

    m.set_content("<p>late</p>");

    assert!(m.is_usable());
    assert!(m.open().is_some());
}

#[test]
fn test_set_content_replaces_built_content() {
    let host = setup();
    let doc = host.document();
    let m = modal(&host, "<p>old</p>");
    let _ = m.open();

    m.set_content("<p>new</p>");

    assert_eq!(doc.inner_html(m.content_element().unwrap()), "<p>new</p>");
}

#[test]
fn test_dropped_modal_unregisters_escape() {
    let host = setup();
    let doc = host.document().clone();
    {
        let m = modal(&host, "x");
        let _ = m.open();
        assert_eq!(doc.key_listener_count(), 1);
    }
    assert_eq!(doc.key_listener_count(), 0);
    assert!(host.stack().is_empty());
}

#[test]
fn test_dropped_open_modal_leaves_stack_and_page() {
    let host = setup();
    let doc = host.document();
    let a = modal(&host, "a");
    let backdrop_a = a.open().unwrap();
    let backdrop_b = {
        let b = modal(&host, "b");
        b.open().unwrap()
    };

    assert_eq!(host.open_modals(), vec![a.id()]);
    assert!(!doc.contains(backdrop_b));
    assert!(a.is_top());

    doc.press_key("Escape");

    assert_eq!(a.state(), ModalState::ClosingPending);
    let _ = doc.finish_transition(backdrop_a);
    assert!(!doc.contains(backdrop_a));
}

#[test]
fn test_dropping_kept_element_removes_it() {
    let host = setup();
    let doc = host.document();
    let backdrop = {
        let m = Modal::new(
            &host,
            ModalOptions::default()
                .with_content("x")
                .with_destroy_on_close(false),
        );
        let backdrop = m.open().unwrap();
        m.close();
        let _ = doc.finish_transition(backdrop);
        assert_eq!(m.state(), ModalState::Closed);
        assert!(doc.contains(backdrop));
        backdrop
    };

    assert!(!doc.contains(backdrop));
}

#[test]
fn test_on_close_fires_after_handle_is_dropped() {
    let host = setup();
    let doc = host.document();
    let (hits, probe) = counter();
    let backdrop = {
        let m = Modal::new(
            &host,
            ModalOptions::default()
                .with_content("x")
                .on_close(move || hits.set(hits.get() + 1)),
        );
        let backdrop = m.open().unwrap();
        doc.press_key("Escape");
        backdrop
    };
    assert_eq!(probe.get(), 0);

    let _ = doc.finish_transition(backdrop);

    assert_eq!(probe.get(), 1);
    assert!(!doc.contains(backdrop));
    assert_eq!(doc.transition_targets(), 0);
}

#[test]
fn test_handlers_see_latest_state() {
    let host = setup();
    let doc = host.document();
    let log = Rc::new(RefCell::new(Vec::<ModalState>::new()));
    let m = modal(&host, "x");
    let seen = Rc::clone(&log);
    let probe = m.clone();
    doc.set_onclick(
        doc.body().unwrap(),
        Some(Rc::new(move |_: &MouseEvent| {
            seen.borrow_mut().push(probe.state());
        })),
    );

    let backdrop = m.open().unwrap();
    let _ = doc.click(backdrop);

    // Backdrop handler closes first, then the click bubbles to the body.
    assert_eq!(*log.borrow(), vec![ModalState::ClosingPending]);
}
