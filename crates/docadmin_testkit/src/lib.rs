//! # DocAdmin Testkit
//!
//! Test utilities for DocAdmin.
//!
//! This crate provides:
//! - Sample record shapes and a pre-populated registry
//! - Store doubles that count calls or always fail
//! - A renderer that records every call it receives
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docadmin_testkit::prelude::*;
//!
//! #[test]
//! fn lists_users() {
//!     let harness = TestAdmin::new();
//!     harness.admin.handle(&AdminRequest::get("/list/db1.users"));
//!     assert_eq!(harness.store.fetch_all_calls(), 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod doubles;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::doubles::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use docadmin_core::{InputFields, TypeRegistry, Value};
    pub use docadmin_server::{Admin, AdminRequest, AdminResponse, Method};
}

pub use doubles::*;
pub use fixtures::*;
pub use generators::*;
