//! # DocAdmin Store
//!
//! The document-store collaborator interface for DocAdmin.
//!
//! The admin engine needs exactly four operations from a store, keyed by
//! namespace and collection: fetch-all, fetch-by-identity, insert-new and
//! replace-existing. [`DocumentStore`] captures that boundary; drivers for
//! real databases implement it outside this workspace.
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For tests, demos and ephemeral sessions

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod memory;
mod types;

pub use backend::{Document, DocumentStore};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use types::{CollectionName, DocumentId, InvalidCollectionName, SEPARATOR};
