//! # DocAdmin Core
//!
//! The dynamic type registry and generic record-binding engine behind the
//! DocAdmin admin interface.
//!
//! The core never sees concrete record types at compile time. Embedding
//! applications register ordinary serde types under collection identifiers;
//! the core keeps a [`RecordDescriptor`] for each and uses it to create,
//! load, inspect and bind instances through one generic code path.
//!
//! ## Components
//!
//! - [`TypeRegistry`] - collection identifier to descriptor
//! - [`RecordDescriptor`] / [`RecordInstance`] - runtime shape handle and
//!   its instances
//! - [`bind`] - field-by-name binding with coercion and per-field errors
//! - [`CollectionIndex`] / [`IndexCache`] - namespace grouping, built once
//!
//! ## Example
//!
//! ```rust
//! use docadmin_core::{bind, InputFields, TypeRegistry};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct User {
//!     name: String,
//!     age: i64,
//! }
//!
//! let registry = TypeRegistry::new();
//! registry.register::<User>("app.users").unwrap();
//!
//! let mut user = registry.instantiate("app.users").unwrap();
//! bind(&mut user, &InputFields::new().with("name", "Alice").with("age", "30")).unwrap();
//!
//! let user = user.into_inner::<User>().unwrap();
//! assert_eq!((user.name.as_str(), user.age), ("Alice", 30));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod binder;
mod descriptor;
mod error;
mod index;
mod registry;

pub use binder::{bind, BindErrors, FieldError, InputFields};
pub use descriptor::{FieldDef, FieldKind, RecordDescriptor, RecordInstance, RecordShape};
pub use error::{CoreError, CoreResult};
pub use index::{CollectionIndex, IndexCache};
pub use registry::TypeRegistry;

pub use docadmin_codec::Value;
pub use docadmin_store::{CollectionName, DocumentId};
