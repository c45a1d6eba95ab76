//! Collection and document identifiers.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Separator between the namespace and collection segments.
pub const SEPARATOR: char = '.';

/// A malformed collection identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid collection name {name:?}: {reason}")]
pub struct InvalidCollectionName {
    /// The rejected identifier.
    pub name: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

/// Identifier of one administrable collection: `<namespace>.<collection>`.
///
/// Splitting on `.` yields exactly two non-empty segments. The namespace is
/// the database the collection lives in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionName {
    full: String,
    split: usize,
}

impl CollectionName {
    /// Parses a `<namespace>.<collection>` identifier.
    ///
    /// # Errors
    ///
    /// Returns an error unless the identifier has exactly two non-empty
    /// segments.
    pub fn parse(name: &str) -> Result<Self, InvalidCollectionName> {
        let reject = |reason| InvalidCollectionName {
            name: name.to_string(),
            reason,
        };

        let mut segments = name.split(SEPARATOR);
        let (Some(namespace), Some(collection), None) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(reject("expected exactly one '.' separator"));
        };
        if namespace.is_empty() {
            return Err(reject("namespace is empty"));
        }
        if collection.is_empty() {
            return Err(reject("collection is empty"));
        }

        Ok(Self {
            full: name.to_string(),
            split: namespace.len(),
        })
    }

    /// Builds an identifier from its two segments.
    ///
    /// # Errors
    ///
    /// Returns an error if either segment is empty or contains the separator.
    pub fn new(namespace: &str, collection: &str) -> Result<Self, InvalidCollectionName> {
        Self::parse(&format!("{namespace}{SEPARATOR}{collection}"))
    }

    /// Returns the namespace (database) segment.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.full[..self.split]
    }

    /// Returns the collection segment.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.full[self.split + SEPARATOR.len_utf8()..]
    }

    /// Returns the full identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl FromStr for CollectionName {
    type Err = InvalidCollectionName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.full
    }
}

/// Store-assigned identity of a document.
///
/// Document IDs are random 128-bit UUIDs, assigned on insert and never
/// reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new random document ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a document ID from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Parses the hyphenated (or simple) textual form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for DocumentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_splits_segments() {
        let name = CollectionName::parse("db1.users").unwrap();
        assert_eq!(name.namespace(), "db1");
        assert_eq!(name.collection(), "users");
        assert_eq!(name.as_str(), "db1.users");
        assert_eq!(name.to_string(), "db1.users");
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", "users", ".users", "db1.", "db1.users.archive", "a..b", "."] {
            assert!(CollectionName::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn new_joins_segments() {
        let name = CollectionName::new("shop", "orders").unwrap();
        assert_eq!(name, "shop.orders".parse().unwrap());
        assert!(CollectionName::new("a.b", "c").is_err());
    }

    #[test]
    fn error_names_the_input() {
        let err = CollectionName::parse("nodot").unwrap_err();
        assert_eq!(err.name, "nodot");
        assert!(err.to_string().contains("nodot"));
    }

    #[test]
    fn document_id_text_form() {
        let id = DocumentId::new();
        assert_eq!(DocumentId::parse(&id.to_string()), Some(id));
        assert_eq!(DocumentId::parse("not-an-id"), None);
        assert_ne!(DocumentId::new(), id);
    }

    #[test]
    fn document_id_from_bytes() {
        let id = DocumentId::from_bytes([7; 16]);
        assert_eq!(id.as_bytes(), &[7; 16]);
    }

    proptest! {
        #[test]
        fn well_formed_names_parse(ns in "[a-z][a-z0-9_]{0,8}", coll in "[a-z][a-z0-9_]{0,8}") {
            let name = CollectionName::parse(&format!("{ns}.{coll}")).unwrap();
            prop_assert_eq!(name.namespace(), ns.as_str());
            prop_assert_eq!(name.collection(), coll.as_str());
        }
    }
}
