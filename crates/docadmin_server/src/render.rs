//! Rendering collaborator and the view models handed to it.
//!
//! The engine never produces markup itself. Every outcome of a request is
//! translated into exactly one [`Renderer`] call carrying a view model; the
//! renderer turns it into an [`AdminResponse`].

use crate::error::AdminError;
use crate::request::{AdminRequest, AdminResponse};
use docadmin_codec::Value;
use docadmin_core::{BindErrors, FieldKind};
use docadmin_store::{CollectionName, DocumentId};
use std::fmt::{self, Write as _};

/// One namespace on the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceView {
    /// Namespace name.
    pub name: String,
    /// Its collections, sorted by name.
    pub collections: Vec<CollectionLink>,
}

/// A collection on the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionLink {
    /// Full identifier.
    pub collection: CollectionName,
    /// Path of the collection's list page.
    pub list_path: String,
    /// Path of the collection's create form.
    pub create_path: String,
}

/// The collection index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexView {
    /// Namespaces, sorted by name.
    pub namespaces: Vec<NamespaceView>,
}

/// One row of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Document identity.
    pub id: DocumentId,
    /// First non-empty text field, or the id.
    pub title: String,
    /// Path of the detail page.
    pub detail_path: String,
    /// Path of the edit form.
    pub update_path: String,
}

/// All documents of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// The listed collection.
    pub collection: CollectionName,
    /// Documents in store order.
    pub items: Vec<Summary>,
    /// Path of the create form.
    pub create_path: String,
    /// Path of the index page.
    pub index_path: String,
}

/// One document, field by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    /// Collection the document belongs to.
    pub collection: CollectionName,
    /// Document identity.
    pub id: DocumentId,
    /// Declared fields in declaration order.
    pub fields: Vec<(String, Value)>,
    /// Path of the edit form.
    pub update_path: String,
    /// Path of the collection listing.
    pub list_path: String,
}

/// How a field is presented in a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    /// One control holding the value as text.
    Single(String),
    /// One control per element. Renderers add a blank control for
    /// appending; blank elements are dropped on submission.
    Repeated(Vec<String>),
    /// Displayed but never submitted, so the stored value is kept.
    ReadOnly(String),
}

impl FieldInput {
    /// Chooses the presentation of a field of `kind` currently holding
    /// `value`.
    ///
    /// Text controls cannot carry maps, byte strings or nested sequences
    /// back to the binder, so those are read-only.
    pub fn for_value(kind: FieldKind, value: &Value) -> Self {
        match (kind, value) {
            (FieldKind::Map | FieldKind::Bytes, _) => FieldInput::ReadOnly(value.to_string()),
            (FieldKind::Array, Value::Array(items)) if items.iter().all(is_scalar) => {
                FieldInput::Repeated(items.iter().map(form_text).collect())
            }
            (_, value) if is_scalar(value) => FieldInput::Single(form_text(value)),
            (_, value) => FieldInput::ReadOnly(value.to_string()),
        }
    }

    /// Returns true if the field is submitted with the form.
    pub fn is_editable(&self) -> bool {
        !matches!(self, FieldInput::ReadOnly(_))
    }
}

/// One field of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Field name.
    pub name: String,
    /// Declared kind.
    pub kind: FieldKind,
    /// Current value and how to present it.
    pub input: FieldInput,
    /// Binding error for this field, if the last submission failed.
    pub error: Option<String>,
}

impl FormField {
    /// Text of a single or read-only control.
    pub fn value(&self) -> Option<&str> {
        match &self.input {
            FieldInput::Single(text) | FieldInput::ReadOnly(text) => Some(text),
            FieldInput::Repeated(_) => None,
        }
    }

    /// Elements of a repeated control.
    pub fn items(&self) -> &[String] {
        match &self.input {
            FieldInput::Repeated(items) => items,
            _ => &[],
        }
    }
}

/// A create or edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    /// Collection being written.
    pub collection: CollectionName,
    /// Document being edited; `None` for a create form.
    pub id: Option<DocumentId>,
    /// Path the form submits to.
    pub action: String,
    /// Controls in declaration order.
    pub fields: Vec<FormField>,
}

impl FormView {
    /// Returns the control named `name`.
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true for a create form.
    pub fn is_create(&self) -> bool {
        self.id.is_none()
    }

    /// The `(name, value)` pairs an unchanged submission of this form
    /// sends, in control order.
    pub fn submission(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for field in &self.fields {
            match &field.input {
                FieldInput::Single(text) => pairs.push((field.name.clone(), text.clone())),
                FieldInput::Repeated(items) => {
                    for item in items.iter().chain(std::iter::once(&String::new())) {
                        pairs.push((field.name.clone(), item.clone()));
                    }
                }
                FieldInput::ReadOnly(_) => {}
            }
        }
        pairs
    }
}

/// Formats a value for a form control.
///
/// Null renders as the empty string so an untouched nullable control
/// submits as absent.
pub fn form_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::Null | Value::Bool(_) | Value::Integer(_) | Value::Text(_)
    )
}

/// Produces responses for admin outcomes.
pub trait Renderer: Send + Sync {
    /// The request was rejected by the authorizer.
    fn unauthorized(&self, request: &AdminRequest) -> AdminResponse;

    /// The admin or the store failed.
    fn internal_error(&self, request: &AdminRequest, error: &AdminError) -> AdminResponse;

    /// Route, collection or document does not exist.
    fn not_found(&self, request: &AdminRequest, error: &AdminError) -> AdminResponse;

    /// Malformed request: bad document id or unsupported method.
    fn bad_request(&self, request: &AdminRequest, error: &AdminError) -> AdminResponse;

    /// The collection index.
    fn index(&self, request: &AdminRequest, view: &IndexView) -> AdminResponse;

    /// A collection listing.
    fn list(&self, request: &AdminRequest, view: &ListView) -> AdminResponse;

    /// A single document.
    fn detail(&self, request: &AdminRequest, view: &DetailView) -> AdminResponse;

    /// A create or edit form.
    fn form(&self, request: &AdminRequest, view: &FormView) -> AdminResponse;

    /// A submitted form that failed to bind; `view` carries the submitted
    /// values and per-field errors.
    fn binding_errors(
        &self,
        request: &AdminRequest,
        view: &FormView,
        errors: &BindErrors,
    ) -> AdminResponse;

    /// A document was written; `location` is its detail path.
    fn saved(&self, request: &AdminRequest, location: &str) -> AdminResponse;
}

/// Minimal HTML renderer used when none is configured.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    title: String,
}

impl HtmlRenderer {
    /// Creates a renderer titling every page with `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    fn page(&self, status: u16, heading: &str, content: &str) -> AdminResponse {
        let title = escape(&self.title);
        let heading = escape(heading);
        AdminResponse::html(
            status,
            format!(
                "<!DOCTYPE html>\n<html><head><title>{heading} - {title}</title></head>\
                 <body><h1>{heading}</h1>\n{content}</body></html>\n"
            ),
        )
    }

    fn error_page(&self, error: &AdminError) -> AdminResponse {
        self.page(
            error.status(),
            "Error",
            &format!("<p>{}</p>\n", escape(&error.to_string())),
        )
    }

    fn form_body(view: &FormView) -> String {
        markup(|out| {
            writeln!(out, "<form method=\"post\" action=\"{}\">", escape(&view.action))?;
            for field in &view.fields {
                let name = escape(&field.name);
                write!(out, "<p><label>{name} ({})", field.kind)?;
                match &field.input {
                    FieldInput::Single(value) if field.kind == FieldKind::Bool => {
                        let (yes, no) = if value == "true" {
                            (" selected", "")
                        } else {
                            ("", " selected")
                        };
                        write!(
                            out,
                            " <select name=\"{name}\"><option value=\"true\"{yes}>true</option>\
                             <option value=\"false\"{no}>false</option></select>"
                        )?;
                    }
                    FieldInput::Single(value) => {
                        write!(out, " <input name=\"{name}\" value=\"{}\">", escape(value))?;
                    }
                    FieldInput::Repeated(items) => {
                        for item in items {
                            write!(out, " <input name=\"{name}\" value=\"{}\">", escape(item))?;
                        }
                        write!(out, " <input name=\"{name}\" value=\"\">")?;
                    }
                    FieldInput::ReadOnly(value) => {
                        write!(out, " <output>{}</output>", escape(value))?;
                    }
                }
                out.push_str("</label>");
                if let Some(error) = &field.error {
                    write!(out, " <strong class=\"error\">{}</strong>", escape(error))?;
                }
                out.push_str("</p>\n");
            }
            out.push_str("<p><button type=\"submit\">Save</button></p>\n</form>\n");
            Ok(())
        })
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new("Admin")
    }
}

impl Renderer for HtmlRenderer {
    fn unauthorized(&self, _request: &AdminRequest) -> AdminResponse {
        self.page(401, "Unauthorized", "<p>You are not allowed to view this page.</p>\n")
    }

    fn internal_error(&self, _request: &AdminRequest, error: &AdminError) -> AdminResponse {
        self.error_page(error)
    }

    fn not_found(&self, _request: &AdminRequest, error: &AdminError) -> AdminResponse {
        self.error_page(error)
    }

    fn bad_request(&self, _request: &AdminRequest, error: &AdminError) -> AdminResponse {
        self.error_page(error)
    }

    fn index(&self, _request: &AdminRequest, view: &IndexView) -> AdminResponse {
        let out = markup(|out| {
            for namespace in &view.namespaces {
                writeln!(out, "<h2>{}</h2>\n<ul>", escape(&namespace.name))?;
                for link in &namespace.collections {
                    writeln!(
                        out,
                        "<li><a href=\"{}\">{}</a> <a href=\"{}\">new</a></li>",
                        escape(&link.list_path),
                        escape(link.collection.collection()),
                        escape(&link.create_path),
                    )?;
                }
                out.push_str("</ul>\n");
            }
            Ok(())
        });
        self.page(200, "Collections", &out)
    }

    fn list(&self, _request: &AdminRequest, view: &ListView) -> AdminResponse {
        let out = markup(|out| {
            writeln!(
                out,
                "<p><a href=\"{}\">index</a> <a href=\"{}\">new</a></p>\n<ul>",
                escape(&view.index_path),
                escape(&view.create_path),
            )?;
            for item in &view.items {
                writeln!(
                    out,
                    "<li><a href=\"{}\">{}</a> <a href=\"{}\">edit</a></li>",
                    escape(&item.detail_path),
                    escape(&item.title),
                    escape(&item.update_path),
                )?;
            }
            out.push_str("</ul>\n");
            Ok(())
        });
        self.page(200, view.collection.as_str(), &out)
    }

    fn detail(&self, _request: &AdminRequest, view: &DetailView) -> AdminResponse {
        let out = markup(|out| {
            out.push_str("<dl>\n");
            for (name, value) in &view.fields {
                writeln!(
                    out,
                    "<dt>{}</dt><dd>{}</dd>",
                    escape(name),
                    escape(&value.to_string())
                )?;
            }
            writeln!(
                out,
                "</dl>\n<p><a href=\"{}\">edit</a> <a href=\"{}\">back</a></p>",
                escape(&view.update_path),
                escape(&view.list_path),
            )
        });
        self.page(200, &format!("{} {}", view.collection, view.id), &out)
    }

    fn form(&self, _request: &AdminRequest, view: &FormView) -> AdminResponse {
        let heading = match view.id {
            Some(id) => format!("Edit {} {id}", view.collection),
            None => format!("New {}", view.collection),
        };
        self.page(200, &heading, &Self::form_body(view))
    }

    fn binding_errors(
        &self,
        _request: &AdminRequest,
        view: &FormView,
        errors: &BindErrors,
    ) -> AdminResponse {
        let content = format!(
            "<p class=\"error\">{}</p>\n{}",
            escape(&errors.to_string()),
            Self::form_body(view)
        );
        self.page(422, &format!("Invalid {}", view.collection), &content)
    }

    fn saved(&self, _request: &AdminRequest, location: &str) -> AdminResponse {
        AdminResponse::redirect(location)
    }
}

/// Collects markup written by `build`.
fn markup(build: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    // Writing into a String never fails
    match build(&mut out) {
        Ok(()) => out,
        Err(fmt::Error) => String::new(),
    }
}

/// Escapes text for HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> CollectionName {
        CollectionName::parse("db1.users").unwrap()
    }

    #[test]
    fn escape_html() {
        assert_eq!(escape("<a href=\"x\">&'</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn form_text_blanks_null() {
        assert_eq!(form_text(&Value::Null), "");
        assert_eq!(form_text(&Value::Integer(7)), "7");
        assert_eq!(form_text(&Value::from("Bob")), "Bob");
    }

    #[test]
    fn unauthorized_page() {
        let response = HtmlRenderer::default().unauthorized(&AdminRequest::get("/"));
        assert_eq!(response.status, 401);
        assert!(response.content_type.starts_with("text/html"));
    }

    #[test]
    fn list_page_escapes_titles() {
        let id = DocumentId::new();
        let view = ListView {
            collection: users(),
            items: vec![Summary {
                id,
                title: "<script>".to_string(),
                detail_path: format!("/detail/db1.users/{id}"),
                update_path: format!("/update/db1.users/{id}"),
            }],
            create_path: "/create/db1.users".to_string(),
            index_path: "/".to_string(),
        };

        let response = HtmlRenderer::new("Test").list(&AdminRequest::get("/list/db1.users"), &view);
        assert_eq!(response.status, 200);
        assert!(response.body.contains("&lt;script&gt;"));
        assert!(!response.body.contains("<script>"));
        assert!(response.body.contains(&format!("/detail/db1.users/{id}")));
    }

    #[test]
    fn binding_error_page_shows_field_errors() {
        let view = FormView {
            collection: users(),
            id: None,
            action: "/create/db1.users".to_string(),
            fields: vec![FormField {
                name: "age".to_string(),
                kind: FieldKind::Integer,
                input: FieldInput::Single("abc".to_string()),
                error: Some("expected integer".to_string()),
            }],
        };
        let errors = BindErrors::new(vec![docadmin_core::FieldError::new("age", "expected integer")]);

        let response = HtmlRenderer::default().binding_errors(
            &AdminRequest::get("/create/db1.users"),
            &view,
            &errors,
        );
        assert_eq!(response.status, 422);
        assert!(response.body.contains("value=\"abc\""));
        assert!(response.body.contains("expected integer"));
        assert!(view.is_create());
        assert_eq!(view.field("age").map(|f| f.kind), Some(FieldKind::Integer));
    }

    #[test]
    fn scalar_sequences_get_one_control_per_element() {
        let tags = Value::Array(vec![Value::from("a"), Value::from("b")]);
        assert_eq!(
            FieldInput::for_value(FieldKind::Array, &tags),
            FieldInput::Repeated(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            FieldInput::for_value(FieldKind::Array, &Value::Array(vec![])),
            FieldInput::Repeated(vec![])
        );
    }

    #[test]
    fn structured_values_are_read_only() {
        let address = Value::map([("city", Value::from("Oslo"))]);
        assert!(!FieldInput::for_value(FieldKind::Map, &address).is_editable());
        assert!(!FieldInput::for_value(FieldKind::Bytes, &Value::Bytes(vec![0xab])).is_editable());

        let nested = Value::Array(vec![Value::Array(vec![Value::Integer(1)])]);
        assert!(!FieldInput::for_value(FieldKind::Array, &nested).is_editable());
        assert!(!FieldInput::for_value(FieldKind::Nullable, &address).is_editable());

        assert_eq!(
            FieldInput::for_value(FieldKind::Nullable, &Value::Null),
            FieldInput::Single(String::new())
        );
    }

    fn mixed_form() -> FormView {
        FormView {
            collection: users(),
            id: None,
            action: "/create/db1.users".to_string(),
            fields: vec![
                FormField {
                    name: "name".to_string(),
                    kind: FieldKind::Text,
                    input: FieldInput::Single("Ann".to_string()),
                    error: None,
                },
                FormField {
                    name: "tags".to_string(),
                    kind: FieldKind::Array,
                    input: FieldInput::Repeated(vec!["a".to_string(), "b".to_string()]),
                    error: None,
                },
                FormField {
                    name: "address".to_string(),
                    kind: FieldKind::Map,
                    input: FieldInput::ReadOnly("{city: Oslo}".to_string()),
                    error: None,
                },
            ],
        }
    }

    #[test]
    fn html_form_repeats_sequence_controls() {
        let view = mixed_form();
        let response = HtmlRenderer::default().form(&AdminRequest::get("/create/db1.users"), &view);
        let body = &response.body;

        assert_eq!(body.matches("name=\"tags\"").count(), 3);
        assert!(body.contains("<input name=\"tags\" value=\"a\">"));
        assert!(body.contains("<input name=\"tags\" value=\"\">"));
        assert!(!body.contains("name=\"address\""));
        assert!(body.contains("<output>{city: Oslo}</output>"));
    }

    #[test]
    fn submission_matches_rendered_controls() {
        let pairs = mixed_form().submission();
        let pairs: Vec<_> = pairs.iter().map(|(n, v)| (n.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            [("name", "Ann"), ("tags", "a"), ("tags", "b"), ("tags", "")]
        );
    }

    #[test]
    fn saved_redirects() {
        let response = HtmlRenderer::default().saved(&AdminRequest::get("/"), "/detail/db1.users/x");
        assert_eq!(response.status, 303);
        assert_eq!(response.header("location"), Some("/detail/db1.users/x"));
    }
}
