//! Generic record binding.
//!
//! Populates a [`RecordInstance`] from untyped `name -> value` input by
//! matching input names against the descriptor's fields and coercing each
//! value to the field's declared kind.
//!
//! Binding rules:
//! - Undeclared input names are ignored
//! - Declared fields missing from input keep their current value
//! - A value that cannot be coerced is reported for that field only; the
//!   remaining fields are still bound
//! - Empty text for a non-text field counts as missing
//! - Blank elements of a submitted sequence are dropped

use crate::descriptor::{FieldKind, RecordInstance};
use crate::error::CoreResult;
use docadmin_codec::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Untyped input to bind: field names paired with values.
///
/// Repeated names (multi-select controls, repeated query keys) collect into
/// an array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFields {
    pairs: Vec<(String, Value)>,
}

impl InputFields {
    /// Creates empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, collecting repeats of `name` into an array.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.pairs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, Value::Array(items))) => items.push(value),
            Some((_, existing)) => {
                let first = std::mem::take(existing);
                *existing = Value::Array(vec![first, value]);
            }
            None => self.pairs.push((name, value)),
        }
    }

    /// Builder form of [`InputFields::push`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value.into());
        self
    }

    /// Returns the value submitted for `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.pairs.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Iterates over `(name, value)` pairs in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns the number of distinct names.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for InputFields {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut input = InputFields::new();
        for (name, value) in iter {
            input.push(name, value);
        }
        input
    }
}

/// A single field that failed to bind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// What was wrong with the submitted value.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field that failed during one binding pass, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindErrors {
    errors: Vec<FieldError>,
}

impl BindErrors {
    /// Wraps a list of field errors.
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Returns the failed fields.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns the error for `field`, if it failed.
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    /// Returns true if `field` failed.
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Returns the number of failed fields.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for BindErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to bind {} field(s)", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            f.write_str(if i == 0 { ": " } else { "; " })?;
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BindErrors {}

/// Binds `input` into `instance`.
///
/// Fields that bind cleanly are applied even when others fail. The caller
/// decides whether a partially bound record may be persisted.
///
/// # Errors
///
/// Returns [`crate::CoreError::Binding`] listing every failed field, or a
/// codec error if the instance itself cannot be serialized.
pub fn bind(instance: &mut RecordInstance, input: &InputFields) -> CoreResult<()> {
    let descriptor = Arc::clone(instance.descriptor());
    let mut document = instance.to_value()?;
    let mut bound = None;
    let mut errors = Vec::new();

    for (name, raw) in input.iter() {
        let Some(field) = descriptor.field(name) else {
            tracing::debug!(
                collection = %descriptor.collection(),
                field = name,
                "ignoring undeclared input field"
            );
            continue;
        };

        let candidates = match candidates(raw, field.kind) {
            Ok(candidates) if candidates.is_empty() => continue,
            Ok(candidates) => candidates,
            Err(message) => {
                errors.push(FieldError::new(name, message));
                continue;
            }
        };

        let previous = document.get(name).cloned();
        let mut rejection = None;
        for candidate in candidates {
            document.insert(name, candidate);
            match descriptor.decode(&document) {
                Ok(record) => {
                    bound = Some(record);
                    rejection = None;
                    break;
                }
                Err(e) => rejection = Some(e),
            }
        }

        if let Some(e) = rejection {
            match previous {
                Some(value) => document.insert(name, value),
                None => document.remove(name),
            };
            errors.push(FieldError::new(
                name,
                format!("invalid {} value {raw}: {e}", field.kind),
            ));
        }
    }

    if let Some(record) = bound {
        instance.set_record(record);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(
            collection = %descriptor.collection(),
            failed = errors.len(),
            "binding finished with field errors"
        );
        Err(BindErrors::new(errors).into())
    }
}

/// Values to try for `raw` in a field of `kind`, most literal first.
///
/// An empty list means the input counts as missing.
fn candidates(raw: &Value, kind: FieldKind) -> Result<Vec<Value>, String> {
    let mismatch = || format!("expected {kind}, got {} {raw}", raw.kind_name());

    match (kind, raw) {
        (FieldKind::Text, Value::Text(_)) => Ok(vec![raw.clone()]),
        (FieldKind::Text, Value::Integer(n)) => Ok(vec![Value::Text(n.to_string())]),
        (FieldKind::Text, Value::Bool(b)) => Ok(vec![Value::Text(b.to_string())]),

        (_, Value::Text(s)) if s.trim().is_empty() && kind != FieldKind::Nullable => Ok(vec![]),

        (FieldKind::Integer, Value::Integer(_)) => Ok(vec![raw.clone()]),
        (FieldKind::Integer, Value::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(|n| vec![Value::Integer(n)])
            .map_err(|_| format!("expected integer, got {s:?}")),

        (FieldKind::Bool, Value::Bool(_)) => Ok(vec![raw.clone()]),
        (FieldKind::Bool, Value::Text(s)) => parse_bool(s)
            .map(|b| vec![Value::Bool(b)])
            .ok_or_else(|| format!("expected bool, got {s:?}")),
        (FieldKind::Bool, Value::Integer(0)) => Ok(vec![Value::Bool(false)]),
        (FieldKind::Bool, Value::Integer(1)) => Ok(vec![Value::Bool(true)]),

        (FieldKind::Bytes, Value::Bytes(_)) => Ok(vec![raw.clone()]),
        (FieldKind::Bytes, Value::Text(s)) => Ok(vec![Value::Bytes(s.as_bytes().to_vec())]),

        (FieldKind::Array, Value::Array(items)) => {
            // Blank elements come from the spare control of a repeated input
            let kept: Vec<Value> = items.iter().filter(|v| !is_blank(v)).cloned().collect();
            let inferred = Value::Array(kept.iter().map(infer).collect());
            Ok(dedup(vec![Value::Array(kept), inferred]))
        }
        (FieldKind::Array, Value::Map(_)) => Err(mismatch()),
        (FieldKind::Array, scalar) => Ok(dedup(vec![
            Value::Array(vec![scalar.clone()]),
            Value::Array(vec![infer(scalar)]),
        ])),

        (FieldKind::Map, Value::Map(_)) => Ok(vec![raw.clone()]),

        (FieldKind::Nullable, Value::Text(s)) if s.trim().is_empty() => Ok(vec![Value::Null]),
        (FieldKind::Nullable, _) => Ok(dedup(vec![raw.clone(), infer(raw)])),

        _ => Err(mismatch()),
    }
}

/// Best guess at the typed value behind a piece of text.
fn infer(value: &Value) -> Value {
    let Value::Text(s) = value else {
        return value.clone();
    };
    let trimmed = s.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::Integer(n);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => value.clone(),
    }
}

fn is_blank(value: &Value) -> bool {
    matches!(value, Value::Text(s) if s.trim().is_empty())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn dedup(mut values: Vec<Value>) -> Vec<Value> {
    values.dedup();
    values
}
