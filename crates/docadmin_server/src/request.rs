//! Transport-neutral request and response model.
//!
//! The admin does not own an HTTP server. The embedding application converts
//! its framework's request into an [`AdminRequest`], calls
//! [`crate::Admin::handle`], and writes the [`AdminResponse`] back.

use crate::error::AdminError;
use docadmin_codec::Value;
use docadmin_core::InputFields;
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded;

/// Content type of urlencoded form bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// HEAD
    Head,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl Method {
    /// Returns the canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Returns true for methods that only read.
    pub fn is_safe(self) -> bool {
        matches!(self, Method::Get | Method::Head)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(AdminError::InvalidRequest(format!("unknown method: {s}"))),
        }
    }
}

/// An incoming admin request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRequest {
    /// Request method.
    pub method: Method,
    /// Request target: path plus optional `?query`.
    pub target: String,
    /// Header name/value pairs as received.
    pub headers: Vec<(String, String)>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl AdminRequest {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Creates a GET request.
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target)
    }

    /// Creates a POST request carrying `fields` as a urlencoded form.
    pub fn post_form<'a, I>(target: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        Self::new(Method::Post, target)
            .with_header("content-type", FORM_CONTENT_TYPE)
            .with_body(body.into_bytes())
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Returns the path component of the target.
    pub fn path(&self) -> &str {
        match self.target.split_once('?') {
            Some((path, _)) => path,
            None => &self.target,
        }
    }

    /// Returns the query string, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, query)| query)
    }

    /// Returns the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decodes the urlencoded body into bind input.
    ///
    /// Every value arrives as text; repeated names collect into an array.
    /// A body that is not valid UTF-8 is decoded lossily.
    pub fn form(&self) -> InputFields {
        form_urlencoded::parse(&self.body)
            .map(|(name, value)| (name.into_owned(), Value::Text(value.into_owned())))
            .collect()
    }
}

/// The admin's answer to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminResponse {
    /// HTTP status code.
    pub status: u16,
    /// Value of the `content-type` header.
    pub content_type: String,
    /// Additional headers.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: String,
}

impl AdminResponse {
    /// Creates an HTML response.
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8".to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Creates a plain-text response.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8".to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Creates a `303 See Other` redirect.
    pub fn redirect(location: impl Into<String>) -> Self {
        let location = location.into();
        Self::text(303, format!("see {location}")).with_header("location", location)
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true for 2xx and 3xx statuses.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}
