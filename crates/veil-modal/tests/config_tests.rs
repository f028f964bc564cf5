//! Integration tests for content resolution and configuration errors.

use veil_common::diagnostics::{self, Severity};
use veil_dom::Document;
use veil_modal::{ConfigError, ContentSource, Modal, ModalHost, ModalOptions};

fn setup() -> ModalHost {
    diagnostics::set_echo(false);
    diagnostics::clear_reports();
    ModalHost::new(Document::new())
}

#[test]
fn test_missing_content_is_reported() {
    let host = setup();

    let m = Modal::new(&host, ModalOptions::default());

    assert!(!m.is_usable());
    let reports = diagnostics::take_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].severity, Severity::Error);
    assert_eq!(reports[0].message, "modal must have content or templateId");
}

#[test]
fn test_empty_strings_count_as_missing() {
    let host = setup();

    let err = Modal::try_new(
        &host,
        ModalOptions::default().with_content("").with_template(""),
    )
    .unwrap_err();

    assert_eq!(err, ConfigError::MissingContent);
}

#[test]
fn test_unknown_template_is_reported() {
    let host = setup();

    let err = Modal::try_new(&host, ModalOptions::default().with_template("nope")).unwrap_err();

    assert_eq!(
        err,
        ConfigError::TemplateNotFound {
            template_id: "nope".to_string()
        }
    );
}

#[test]
fn test_both_sources_prefers_inline_with_warning() {
    let host = setup();
    let _ = host.document().create_template("tpl", "<p>template</p>").unwrap();

    let m = Modal::new(
        &host,
        ModalOptions::default()
            .with_content("<p>inline</p>")
            .with_template("tpl"),
    );

    assert_eq!(
        m.content_source(),
        Some(ContentSource::Inline("<p>inline</p>".to_string()))
    );
    let reports = diagnostics::take_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].severity, Severity::Warning);
}

#[test]
fn test_template_children_are_cloned_not_moved() {
    let host = setup();
    let doc = host.document();
    let template = doc.create_template("tpl", "<p>from template</p>").unwrap();
    let m = Modal::new(&host, ModalOptions::default().with_template("tpl"));

    let _ = m.open();

    let region = m.content_element().unwrap();
    assert_eq!(doc.inner_html(region), "<p>from template</p>");
    assert_eq!(doc.inner_html(template), "<p>from template</p>");
    assert_ne!(doc.children(region), doc.children(template));
}

#[test]
fn test_template_content_rebuilt_fresh_each_open() {
    let host = setup();
    let doc = host.document();
    let _ = doc.create_template("tpl", "<p>t</p>").unwrap();
    let m = Modal::new(&host, ModalOptions::default().with_template("tpl"));

    let first = m.open().unwrap();
    m.close();
    let _ = doc.finish_transition(first);
    let _ = m.open();

    assert_eq!(doc.inner_html(m.content_element().unwrap()), "<p>t</p>");
}

#[test]
fn test_options_from_json() {
    let host = setup();
    let options: ModalOptions = serde_json::from_str(
        r#"{
            "content": "<p>json</p>",
            "closeMethods": ["escape"],
            "footer": true,
            "cssClass": ["a"],
            "destroyOnClose": false
        }"#,
    )
    .unwrap();

    let m = Modal::try_new(&host, options).unwrap();
    let _ = m.open();

    assert!(m.footer_element().is_some());
    assert_eq!(m.close_button(), None);
    assert!(host.document().has_class(m.container().unwrap(), "a"));
    assert!(!m.options().destroy_on_close);
}
