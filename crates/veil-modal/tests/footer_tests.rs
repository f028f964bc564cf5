//! Integration tests for footer text and buttons.

use std::cell::RefCell;
use std::rc::Rc;

use veil_common::diagnostics;
use veil_dom::Document;
use veil_modal::classes::{FOOTER, FOOTER_CONTENT};
use veil_modal::{Modal, ModalHost, ModalId, ModalOptions};

fn setup() -> ModalHost {
    diagnostics::set_echo(false);
    diagnostics::clear_reports();
    ModalHost::new(Document::new())
}

fn footer_modal(host: &ModalHost) -> Modal {
    Modal::new(
        host,
        ModalOptions::default()
            .with_content("x")
            .with_footer(true)
            .with_destroy_on_close(true),
    )
}

#[test]
fn test_footer_layout_text_then_buttons() {
    let host = setup();
    let doc = host.document();
    let m = footer_modal(&host);
    m.set_modal_footer("Are you sure?");
    m.add_footer_button("OK", "btn", |_: &Modal| {});

    let _ = m.open();

    let footer = m.footer_element().unwrap();
    assert!(doc.has_class(footer, FOOTER));
    assert_eq!(doc.parent(footer), m.container());
    let children = doc.children(footer);
    assert_eq!(children.len(), 2);
    assert!(doc.has_class(children[0], FOOTER_CONTENT));
    assert_eq!(doc.inner_html(children[0]), "Are you sure?");
    assert_eq!(doc.inner_html(children[1]), "OK");
}

#[test]
fn test_identical_buttons_are_not_deduplicated() {
    let host = setup();
    let doc = host.document();
    let m = footer_modal(&host);
    let _ = m.open();

    m.add_footer_button("Close", "btn", |_: &Modal| {});
    m.add_footer_button("Close", "btn", |_: &Modal| {});

    let buttons = m.footer_button_elements();
    assert_eq!(buttons.len(), 2);
    assert_ne!(buttons[0], buttons[1]);
    let footer_children = doc.children(m.footer_element().unwrap());
    assert_eq!(&footer_children[1..], buttons.as_slice());
}

#[test]
fn test_buttons_keep_insertion_order() {
    let host = setup();
    let doc = host.document();
    let m = footer_modal(&host);
    m.add_footer_button("Cancel", "btn", |_: &Modal| {});
    let _ = m.open();
    m.add_footer_button("Save", "btn btn-primary", |_: &Modal| {});

    let labels: Vec<String> = m
        .footer_button_elements()
        .into_iter()
        .map(|b| doc.inner_html(b))
        .collect();
    assert_eq!(labels, vec!["Cancel", "Save"]);
    let save = m.footer_button_elements()[1];
    assert_eq!(doc.classes(save), vec!["btn", "btn-primary"]);
}

#[test]
fn test_set_footer_leaves_buttons_alone() {
    let host = setup();
    let doc = host.document();
    let m = footer_modal(&host);
    m.add_footer_button("OK", "btn", |_: &Modal| {});
    let _ = m.open();
    let before = m.footer_button_elements();

    m.set_modal_footer("first");
    m.set_modal_footer("second");

    assert_eq!(m.footer_button_elements(), before);
    assert_eq!(doc.inner_html(m.footer_content_element().unwrap()), "second");
}

#[test]
fn test_button_callback_receives_owning_modal() {
    let host = setup();
    let m = footer_modal(&host);
    let seen = Rc::new(RefCell::new(Vec::<ModalId>::new()));
    let log = Rc::clone(&seen);
    m.add_footer_button("Done", "btn", move |modal: &Modal| {
        log.borrow_mut().push(modal.id());
        modal.close();
    });
    let _ = m.open();

    let button = m.footer_button_elements()[0];
    let _ = host.document().click(button);

    assert_eq!(*seen.borrow(), vec![m.id()]);
    assert!(!m.is_open());
}

#[test]
fn test_footer_survives_destroy_and_rebuild() {
    let host = setup();
    let doc = host.document();
    let m = footer_modal(&host);
    m.set_modal_footer("note");
    m.add_footer_button("A", "btn", |_: &Modal| {});
    m.add_footer_button("B", "btn", |_: &Modal| {});

    let first = m.open().unwrap();
    m.close();
    let _ = doc.finish_transition(first);
    assert!(m.footer_button_elements().is_empty());

    let _ = m.open();
    let labels: Vec<String> = m
        .footer_button_elements()
        .into_iter()
        .map(|b| doc.inner_html(b))
        .collect();
    assert_eq!(labels, vec!["A", "B"]);
    assert_eq!(doc.inner_html(m.footer_content_element().unwrap()), "note");
    assert_eq!(m.footer_buttons().len(), 2);
}

#[test]
fn test_footer_disabled_warns_once() {
    let host = setup();
    let m = Modal::new(&host, ModalOptions::default().with_content("x"));
    let _ = m.open();

    m.set_modal_footer("ignored");
    m.set_modal_footer("ignored again");

    assert_eq!(m.footer_element(), None);
    assert_eq!(diagnostics::take_reports().len(), 1);
}
