//! Request command implementation.

use super::{demo, Format};
use docadmin_server::{
    Admin, AdminConfig, AdminRequest, Method, RouteConfig, TokenAuthorizer, TokenConfig,
};
use docadmin_store::MemoryStore;
use serde::Serialize;
use std::sync::Arc;

/// Parsed arguments of the request command.
#[derive(Debug)]
pub struct RequestOptions {
    /// Request method.
    pub method: String,
    /// Request target.
    pub path: String,
    /// `name=value` form fields.
    pub fields: Vec<String>,
    /// Token secret, enabling authorization.
    pub secret: Option<String>,
    /// User to issue a token for.
    pub user: Option<String>,
}

/// The printed response.
#[derive(Debug, Serialize)]
pub struct ResponseOutput {
    /// HTTP status.
    pub status: u16,
    /// Content type.
    pub content_type: String,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Body.
    pub body: String,
}

/// Runs the request command.
pub fn run(
    routes: RouteConfig,
    options: RequestOptions,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = Format::parse(format)?;
    let method: Method = options.method.parse()?;

    let mut builder = Admin::builder(Arc::new(demo::registry()?))
        .store(Arc::new(MemoryStore::new()))
        .config(AdminConfig::new().with_title("DocAdmin demo").with_routes(routes));

    let mut token = None;
    if let Some(secret) = options.secret {
        let auth = TokenAuthorizer::new(TokenConfig::new(secret.into_bytes()))?;
        token = options.user.as_deref().map(|user| auth.issue_token(user));
        builder = builder.authorizer(Arc::new(auth));
    }

    let admin = builder.build()?;
    demo::seed(&admin)?;

    let mut request = if method == Method::Post && !options.fields.is_empty() {
        let pairs = parse_fields(&options.fields)?;
        AdminRequest::post_form(
            options.path,
            pairs.iter().map(|(name, value)| (name.as_str(), value.as_str())),
        )
    } else {
        AdminRequest::new(method, options.path)
    };
    if let Some(token) = token {
        request = request.with_header(docadmin_server::TOKEN_HEADER, token);
    }

    let response = admin.handle(&request);
    let output = ResponseOutput {
        status: response.status,
        content_type: response.content_type,
        headers: response.headers,
        body: response.body,
    };

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        Format::Text => {
            println!("{} {}", output.status, output.content_type);
            for (name, value) in &output.headers {
                println!("{name}: {value}");
            }
            println!();
            print!("{}", output.body);
        }
    }
    Ok(())
}

/// Splits `name=value` arguments.
fn parse_fields(fields: &[String]) -> Result<Vec<(String, String)>, Box<dyn std::error::Error>> {
    fields
        .iter()
        .map(|field| {
            field
                .split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .ok_or_else(|| -> Box<dyn std::error::Error> {
                    format!("Field must be name=value: {field:?}").into()
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_split_on_first_equals() {
        let fields = vec!["name=Desk lamp".to_string(), "query=a=b".to_string()];
        let pairs = parse_fields(&fields).unwrap();
        assert_eq!(pairs[0], ("name".to_string(), "Desk lamp".to_string()));
        assert_eq!(pairs[1], ("query".to_string(), "a=b".to_string()));
    }

    #[test]
    fn field_without_equals_is_rejected() {
        assert!(parse_fields(&["name".to_string()]).is_err());
    }
}
