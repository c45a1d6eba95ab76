//! # DocAdmin Server
//!
//! Request-level admin engine for DocAdmin.
//!
//! This crate provides:
//! - The [`Admin`] engine: list, detail, create and update for every
//!   registered collection
//! - Transport-neutral [`AdminRequest`] / [`AdminResponse`] types
//! - Authorization hooks (closures, or HMAC-SHA256 tokens)
//! - A [`Renderer`] seam with a minimal HTML default
//!
//! # Request flow
//!
//! [`Admin::handle`] processes each request in a fixed order:
//! 1. The authorizer, if any, must accept the request
//! 2. A document store must be configured
//! 3. The route table maps the path to an action and strips the prefix
//! 4. The action runs and its outcome is rendered
//!
//! # Authentication
//!
//! ```rust,ignore
//! use docadmin_server::{Admin, TokenAuthorizer, TokenConfig};
//!
//! let auth = TokenAuthorizer::new(TokenConfig::new(secret))?;
//! let token = auth.issue_token("alice");
//!
//! let admin = Admin::builder(registry)
//!     .store(store)
//!     .authorizer(Arc::new(auth))
//!     .build()?;
//! // Clients send `x-admin-token: <token>`
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod config;
mod error;
mod handler;
mod render;
mod request;
mod router;
mod server;

pub use auth::{Authorizer, TokenAuthorizer, TokenConfig, TOKEN_HEADER};
pub use config::{AdminConfig, RouteConfig};
pub use error::{AdminError, AdminResult};
pub use render::{
    escape, form_text, CollectionLink, DetailView, FieldInput, FormField, FormView, HtmlRenderer,
    IndexView, ListView, NamespaceView, Renderer, Summary,
};
pub use request::{AdminRequest, AdminResponse, Method, FORM_CONTENT_TYPE};
pub use router::{Action, RouteMatch, Router, Target};
pub use server::{Admin, AdminBuilder};
