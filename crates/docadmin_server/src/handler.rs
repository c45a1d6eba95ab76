//! Request dispatch: route, run the action, render the outcome.

use crate::error::{AdminError, AdminResult};
use crate::render::{form_text, FieldInput, FormView, Renderer};
use crate::request::{AdminRequest, AdminResponse, Method};
use crate::router::{Action, Target};
use crate::server::Admin;
use docadmin_codec::Value;
use docadmin_core::{BindErrors, InputFields};

/// Serves one authorized request against an [`Admin`].
pub(crate) struct RequestHandler<'a> {
    admin: &'a Admin,
}

impl<'a> RequestHandler<'a> {
    pub(crate) fn new(admin: &'a Admin) -> Self {
        Self { admin }
    }

    fn renderer(&self) -> &'a dyn Renderer {
        self.admin.renderer()
    }

    /// Routes and runs the request. Every outcome becomes exactly one
    /// renderer call.
    pub(crate) fn handle(&self, request: &AdminRequest) -> AdminResponse {
        let path = request.path();
        let Some(route) = self.admin.router().route(path) else {
            return self.error(request, AdminError::RouteNotFound { path: path.to_string() });
        };
        tracing::debug!(
            method = %request.method,
            action = %route.action,
            remainder = route.remainder,
            "dispatching admin request"
        );

        let result = match route.action {
            Action::Index => self.index(request, route.remainder),
            Action::List => self.list(request, route.remainder),
            Action::Detail => self.detail(request, route.remainder),
            Action::Create => self.create(request, route.remainder),
            Action::Update => self.update(request, route.remainder),
        };
        result.unwrap_or_else(|e| self.error(request, e))
    }

    fn index(&self, request: &AdminRequest, remainder: &str) -> AdminResult<AdminResponse> {
        require_safe(request)?;
        if !remainder.is_empty() {
            return Err(AdminError::RouteNotFound {
                path: request.path().to_string(),
            });
        }
        Ok(self.renderer().index(request, &self.admin.index_view()))
    }

    fn list(&self, request: &AdminRequest, remainder: &str) -> AdminResult<AdminResponse> {
        require_safe(request)?;
        let target = Target::parse(remainder)?;
        target.forbid_id()?;
        let view = self.admin.list(target.collection.as_str())?;
        Ok(self.renderer().list(request, &view))
    }

    fn detail(&self, request: &AdminRequest, remainder: &str) -> AdminResult<AdminResponse> {
        require_safe(request)?;
        let target = Target::parse(remainder)?;
        let view = self
            .admin
            .detail(target.collection.as_str(), target.require_id()?)?;
        Ok(self.renderer().detail(request, &view))
    }

    fn create(&self, request: &AdminRequest, remainder: &str) -> AdminResult<AdminResponse> {
        let target = Target::parse(remainder)?;
        target.forbid_id()?;
        let collection = target.collection.as_str();

        match request.method {
            Method::Get | Method::Head => {
                let view = self.admin.new_form(collection)?;
                Ok(self.renderer().form(request, &view))
            }
            Method::Post => {
                let input = request.form();
                match self.admin.create(collection, &input) {
                    Ok(id) => {
                        let location = self
                            .admin
                            .config()
                            .routes
                            .detail_path(&target.collection, id);
                        Ok(self.renderer().saved(request, &location))
                    }
                    Err(AdminError::Binding { errors, .. }) => {
                        let view = self.admin.new_form(collection)?;
                        Ok(self.rebind(request, view, &input, &errors))
                    }
                    Err(e) => Err(e),
                }
            }
            _ => Err(method_not_allowed(request)),
        }
    }

    fn update(&self, request: &AdminRequest, remainder: &str) -> AdminResult<AdminResponse> {
        let target = Target::parse(remainder)?;
        let id = target.require_id()?;
        let collection = target.collection.as_str();

        match request.method {
            Method::Get | Method::Head => {
                let view = self.admin.edit_form(collection, id)?;
                Ok(self.renderer().form(request, &view))
            }
            Method::Post => {
                let input = request.form();
                match self.admin.update(collection, id, &input) {
                    Ok(view) => {
                        let location = self
                            .admin
                            .config()
                            .routes
                            .detail_path(&view.collection, view.id);
                        Ok(self.renderer().saved(request, &location))
                    }
                    Err(AdminError::Binding { errors, .. }) => {
                        let view = self.admin.edit_form(collection, id)?;
                        Ok(self.rebind(request, view, &input, &errors))
                    }
                    Err(e) => Err(e),
                }
            }
            _ => Err(method_not_allowed(request)),
        }
    }

    /// Re-renders a form with the submitted values and the field errors.
    fn rebind(
        &self,
        request: &AdminRequest,
        mut view: FormView,
        input: &InputFields,
        errors: &BindErrors,
    ) -> AdminResponse {
        tracing::debug!(
            collection = %view.collection,
            failed = errors.len(),
            "form submission failed to bind"
        );
        for field in &mut view.fields {
            if let Some(value) = input.get(&field.name) {
                overlay(&mut field.input, value);
            }
            field.error = errors.get(&field.name).map(|e| e.message.clone());
        }
        self.renderer().binding_errors(request, &view, errors)
    }

    fn error(&self, request: &AdminRequest, error: AdminError) -> AdminResponse {
        let renderer = self.renderer();
        match error {
            AdminError::Unauthorized | AdminError::InvalidToken { .. } => {
                renderer.unauthorized(request)
            }
            ref e if e.is_not_found() => {
                tracing::debug!(error = %e, path = request.path(), "admin resource not found");
                renderer.not_found(request, e)
            }
            ref e if e.is_client_error() => {
                tracing::debug!(error = %e, path = request.path(), "bad admin request");
                renderer.bad_request(request, e)
            }
            ref e => {
                tracing::warn!(error = %e, path = request.path(), "admin request failed");
                renderer.internal_error(request, e)
            }
        }
    }
}

fn require_safe(request: &AdminRequest) -> AdminResult<()> {
    if request.method.is_safe() {
        Ok(())
    } else {
        Err(method_not_allowed(request))
    }
}

fn method_not_allowed(request: &AdminRequest) -> AdminError {
    AdminError::MethodNotAllowed {
        method: request.method.to_string(),
        path: request.path().to_string(),
    }
}

/// Puts submitted values back into a control after a failed submission.
fn overlay(input: &mut FieldInput, value: &Value) {
    match input {
        FieldInput::Single(text) => *text = submitted_text(value),
        FieldInput::Repeated(items) => {
            let submitted: Vec<String> = match value {
                Value::Array(values) => values.iter().map(form_text).collect(),
                other => vec![form_text(other)],
            };
            *items = submitted
                .into_iter()
                .filter(|item| !item.trim().is_empty())
                .collect();
        }
        FieldInput::ReadOnly(_) => {}
    }
}

/// Text to put back into a single control after a failed submission.
fn submitted_text(value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::Array(items) => items.iter().map(form_text).collect::<Vec<_>>().join(", "),
        other => form_text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submitted_text_keeps_raw_input() {
        assert_eq!(submitted_text(&Value::from("not-a-number")), "not-a-number");
        assert_eq!(submitted_text(&Value::Null), "");
        assert_eq!(
            submitted_text(&Value::Array(vec![Value::from("a"), Value::from("b")])),
            "a, b"
        );
    }

    #[test]
    fn overlay_refills_repeated_controls_without_blanks() {
        let mut input = FieldInput::Repeated(vec!["old".to_string()]);
        overlay(
            &mut input,
            &Value::Array(vec![Value::from("1"), Value::from("x"), Value::from("")]),
        );
        assert_eq!(input, FieldInput::Repeated(vec!["1".to_string(), "x".to_string()]));

        overlay(&mut input, &Value::from("7"));
        assert_eq!(input, FieldInput::Repeated(vec!["7".to_string()]));
    }

    #[test]
    fn overlay_leaves_read_only_values() {
        let mut input = FieldInput::ReadOnly("{city: Oslo}".to_string());
        overlay(&mut input, &Value::from("{city: }"));
        assert_eq!(input, FieldInput::ReadOnly("{city: Oslo}".to_string()));
    }

    #[test]
    fn only_safe_methods_read() {
        assert!(require_safe(&AdminRequest::get("/")).is_ok());
        let err = require_safe(&AdminRequest::new(Method::Delete, "/list/a.b")).unwrap_err();
        assert!(matches!(err, AdminError::MethodNotAllowed { .. }));
        assert_eq!(err.status(), 405);
    }
}
