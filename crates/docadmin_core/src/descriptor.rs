//! Record descriptors and bound record instances.
//!
//! A [`RecordDescriptor`] is the runtime handle the core keeps for a record
//! shape it was never compiled against. It can produce zero-valued
//! instances, rebuild instances from persisted documents, and list the
//! shape's fields with their kinds.
//!
//! Shapes need no admin-specific code. Anything implementing
//! [`RecordShape`] qualifies, and that trait is implemented for every
//! `Serialize + DeserializeOwned + Default + Debug + Send + Sync` type:
//!
//! ```rust
//! use docadmin_core::{RecordDescriptor, FieldKind};
//! use docadmin_store::CollectionName;
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct User {
//!     name: String,
//!     age: i64,
//! }
//!
//! let name = CollectionName::parse("app.users").unwrap();
//! let descriptor = Arc::new(RecordDescriptor::of::<User>(name).unwrap());
//! assert_eq!(descriptor.field("age").unwrap().kind, FieldKind::Integer);
//!
//! let instance = descriptor.instantiate();
//! assert_eq!(instance.downcast_ref::<User>().unwrap().age, 0);
//! ```

use crate::error::{CoreError, CoreResult};
use docadmin_codec::{from_value, to_value, CodecResult, Value};
use docadmin_store::CollectionName;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Marker for types that can be administered.
///
/// Blanket-implemented; never implement it by hand.
pub trait RecordShape:
    Serialize + DeserializeOwned + Default + fmt::Debug + Send + Sync + 'static
{
}

impl<T> RecordShape for T where
    T: Serialize + DeserializeOwned + Default + fmt::Debug + Send + Sync + 'static
{
}

/// Object-safe view of a concrete record.
pub(crate) trait ErasedRecord: fmt::Debug + Send + Sync {
    fn to_value(&self) -> CodecResult<Value>;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: RecordShape> ErasedRecord for T {
    fn to_value(&self) -> CodecResult<Value> {
        to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Monomorphized constructors captured at registration time.
#[derive(Clone, Copy)]
struct ShapeOps {
    zero: fn() -> Box<dyn ErasedRecord>,
    decode: fn(&Value) -> CodecResult<Box<dyn ErasedRecord>>,
}

fn zero_of<T: RecordShape>() -> Box<dyn ErasedRecord> {
    Box::new(T::default())
}

fn decode_of<T: RecordShape>(value: &Value) -> CodecResult<Box<dyn ErasedRecord>> {
    Ok(Box::new(from_value::<T>(value)?))
}

/// Declared kind of a record field, derived from its zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Boolean.
    Bool,
    /// Signed integer.
    Integer,
    /// Text.
    Text,
    /// Byte string.
    Bytes,
    /// Sequence.
    Array,
    /// Nested map or struct.
    Map,
    /// Optional field whose zero value is null.
    Nullable,
}

impl FieldKind {
    /// Kind of the field whose zero value is `zero`.
    pub fn of(zero: &Value) -> Self {
        match zero {
            Value::Null => FieldKind::Nullable,
            Value::Bool(_) => FieldKind::Bool,
            Value::Integer(_) => FieldKind::Integer,
            Value::Bytes(_) => FieldKind::Bytes,
            Value::Text(_) => FieldKind::Text,
            Value::Array(_) => FieldKind::Array,
            Value::Map(_) => FieldKind::Map,
        }
    }

    /// Lowercase name used in messages and form controls.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Integer => "integer",
            FieldKind::Text => "text",
            FieldKind::Bytes => "bytes",
            FieldKind::Array => "array",
            FieldKind::Map => "map",
            FieldKind::Nullable => "nullable",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field of a record shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Serialized field name.
    pub name: String,
    /// Declared kind.
    pub kind: FieldKind,
}

/// Runtime description of a registered record shape.
///
/// Immutable once built; shared through `Arc` by the registry and every
/// instance it produces.
pub struct RecordDescriptor {
    collection: CollectionName,
    type_name: &'static str,
    type_id: TypeId,
    fields: Vec<FieldDef>,
    zero: Value,
    ops: ShapeOps,
}

impl RecordDescriptor {
    /// Builds the descriptor of `T` for `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedShape`] if the zero value of `T` is not
    /// a map of fields or cannot be read back into `T`.
    pub fn of<T: RecordShape>(collection: CollectionName) -> CoreResult<Self> {
        let type_name = std::any::type_name::<T>();
        let zero = to_value(&T::default())
            .map_err(|e| CoreError::unsupported_shape(type_name, e.to_string()))?;

        let Some(pairs) = zero.as_map() else {
            return Err(CoreError::unsupported_shape(
                type_name,
                format!("zero value is {}, expected a map of fields", zero.kind_name()),
            ));
        };
        let fields = pairs
            .iter()
            .map(|(name, value)| FieldDef {
                name: name.clone(),
                kind: FieldKind::of(value),
            })
            .collect();

        from_value::<T>(&zero).map_err(|e| {
            CoreError::unsupported_shape(type_name, format!("zero value does not read back: {e}"))
        })?;

        Ok(Self {
            collection,
            type_name,
            type_id: TypeId::of::<T>(),
            fields,
            zero,
            ops: ShapeOps {
                zero: zero_of::<T>,
                decode: decode_of::<T>,
            },
        })
    }

    /// Returns the collection this shape is registered under.
    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// Returns the Rust type name of the shape.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns true if the shape is `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true if the shape declares `name`.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Returns the zero value as a document.
    pub fn zero_value(&self) -> &Value {
        &self.zero
    }

    /// Allocates a fresh zero-valued instance.
    pub fn instantiate(self: &Arc<Self>) -> RecordInstance {
        RecordInstance {
            descriptor: Arc::clone(self),
            record: (self.ops.zero)(),
        }
    }

    /// Rebuilds an instance from a persisted document body.
    ///
    /// Declared fields found in `body` override the zero value; missing
    /// fields keep it; undeclared keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDocument`] if `body` is not a map or a
    /// stored field does not fit its declared type.
    pub fn load(self: &Arc<Self>, body: &Value) -> CoreResult<RecordInstance> {
        let Some(stored) = body.as_map() else {
            return Err(CoreError::invalid_document(
                self.collection.as_str(),
                format!("expected a map, got {}", body.kind_name()),
            ));
        };

        let mut merged = self.zero.clone();
        for (name, value) in stored {
            if self.has_field(name) {
                merged.insert(name.clone(), value.clone());
            }
        }

        let record = self
            .decode(&merged)
            .map_err(|e| CoreError::invalid_document(self.collection.as_str(), e.to_string()))?;

        Ok(RecordInstance {
            descriptor: Arc::clone(self),
            record,
        })
    }

    pub(crate) fn decode(&self, value: &Value) -> CodecResult<Box<dyn ErasedRecord>> {
        (self.ops.decode)(value)
    }
}

impl fmt::Debug for RecordDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDescriptor")
            .field("collection", &self.collection)
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// A record instance of a registered shape.
///
/// Created zero-valued by [`RecordDescriptor::instantiate`] or from a stored
/// document by [`RecordDescriptor::load`], then populated by
/// [`crate::bind`]. Owned by the operation that created it.
pub struct RecordInstance {
    descriptor: Arc<RecordDescriptor>,
    record: Box<dyn ErasedRecord>,
}

impl RecordInstance {
    /// Returns the descriptor of this instance's shape.
    pub fn descriptor(&self) -> &Arc<RecordDescriptor> {
        &self.descriptor
    }

    /// Returns the collection this instance belongs to.
    pub fn collection(&self) -> &CollectionName {
        self.descriptor.collection()
    }

    /// Serializes the instance into a document body.
    ///
    /// # Errors
    ///
    /// Returns an error if the record holds a value outside the document
    /// model (for example a float).
    pub fn to_value(&self) -> CoreResult<Value> {
        Ok(self.record.to_value()?)
    }

    /// Returns `(field, value)` pairs in declaration order.
    ///
    /// # Errors
    ///
    /// Same as [`RecordInstance::to_value`].
    pub fn field_values(&self) -> CoreResult<Vec<(String, Value)>> {
        let mut body = self.to_value()?;
        Ok(self
            .descriptor
            .fields()
            .iter()
            .map(|f| {
                let value = body.remove(&f.name).unwrap_or_default();
                (f.name.clone(), value)
            })
            .collect())
    }

    /// Returns the current value of one field.
    ///
    /// # Errors
    ///
    /// Same as [`RecordInstance::to_value`].
    pub fn get(&self, field: &str) -> CoreResult<Option<Value>> {
        Ok(self.to_value()?.remove(field))
    }

    /// Borrows the concrete record if it is a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.record.as_any().downcast_ref::<T>()
    }

    /// Unwraps the concrete record if it is a `T`.
    pub fn into_inner<T: 'static>(self) -> Option<T> {
        self.record.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }

    pub(crate) fn set_record(&mut self, record: Box<dyn ErasedRecord>) {
        self.record = record;
    }
}

impl fmt::Debug for RecordInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordInstance")
            .field("collection", self.descriptor.collection())
            .field("record", &self.record)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
        age: i64,
        admin: bool,
        email: Option<String>,
        roles: Vec<String>,
    }

    fn descriptor() -> Arc<RecordDescriptor> {
        let name = CollectionName::parse("db1.users").unwrap();
        Arc::new(RecordDescriptor::of::<User>(name).unwrap())
    }

    #[test]
    fn fields_follow_declaration_order() {
        let d = descriptor();
        let fields: Vec<_> = d.fields().iter().map(|f| (f.name.as_str(), f.kind)).collect();
        assert_eq!(
            fields,
            [
                ("name", FieldKind::Text),
                ("age", FieldKind::Integer),
                ("admin", FieldKind::Bool),
                ("email", FieldKind::Nullable),
                ("roles", FieldKind::Array),
            ]
        );
    }

    #[test]
    fn instantiate_yields_zero_value() {
        let d = descriptor();
        let instance = d.instantiate();

        assert!(d.is::<User>());
        assert_eq!(instance.downcast_ref::<User>(), Some(&User::default()));
        assert_eq!(instance.collection().as_str(), "db1.users");
    }

    #[test]
    fn downcast_to_wrong_type_is_none() {
        let instance = descriptor().instantiate();
        assert!(instance.downcast_ref::<String>().is_none());
        assert!(instance.into_inner::<String>().is_none());
    }

    #[test]
    fn load_merges_over_zero_value() {
        let d = descriptor();
        let body = Value::map([
            ("name", Value::from("Bob")),
            ("legacy_field", Value::from(1i64)),
        ]);

        let user = d.load(&body).unwrap().into_inner::<User>().unwrap();
        assert_eq!(user.name, "Bob");
        assert_eq!(user.age, 0);
    }

    #[test]
    fn load_rejects_mistyped_document() {
        let d = descriptor();
        let body = Value::map([("age", Value::from("thirty"))]);
        assert!(matches!(d.load(&body), Err(CoreError::InvalidDocument { .. })));
        assert!(matches!(d.load(&Value::Integer(1)), Err(CoreError::InvalidDocument { .. })));
    }

    #[test]
    fn field_values_in_declaration_order() {
        let d = descriptor();
        let body = Value::map([("age", Value::from(30i64)), ("name", Value::from("Bob"))]);
        let instance = d.load(&body).unwrap();

        let values = instance.field_values().unwrap();
        assert_eq!(values[0], ("name".to_string(), Value::from("Bob")));
        assert_eq!(values[1], ("age".to_string(), Value::from(30i64)));
        assert_eq!(instance.get("admin").unwrap(), Some(Value::Bool(false)));
        assert_eq!(instance.get("missing").unwrap(), None);
    }

    #[test]
    fn scalar_shapes_are_unsupported() {
        let name = CollectionName::parse("db1.counters").unwrap();
        let result = RecordDescriptor::of::<i64>(name);
        assert!(matches!(result, Err(CoreError::UnsupportedShape { .. })));
    }

    #[test]
    fn float_fields_are_unsupported() {
        #[derive(Debug, Default, Serialize, Deserialize)]
        struct Reading {
            value: f64,
        }

        let name = CollectionName::parse("db1.readings").unwrap();
        let result = RecordDescriptor::of::<Reading>(name);
        assert!(matches!(result, Err(CoreError::UnsupportedShape { .. })));
    }
}
