//! Result handles: identity-bearing, attribute-bearing records.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::Vector3d;

/// A typed field value carried by a [`ResultHandle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Double(f64),
    Integer(i64),
    Timestamp(DateTime<Utc>),
    Vector(Vector3d),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<Vector3d> for FieldValue {
    fn from(value: Vector3d) -> Self {
        FieldValue::Vector(value)
    }
}

/// Stable identity of a result, derived from a natural key.
///
/// Derived with SHA-256 so it is identical across processes and runs,
/// unlike `std`'s randomly seeded hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(u64);

impl HandleId {
    /// Derives an id from a natural key such as a map name.
    pub fn from_key(key: &str) -> Self {
        let digest = Sha256::digest(key.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(bytes))
    }

    /// Wraps a raw id value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// An immutable record produced by a data source.
///
/// Equality and hashing consider the id only. Two handles with the same id
/// and different field values are equal, which is what lets a diff tick
/// report value changes as `changed` rather than as a remove and an add.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultHandle {
    id: HandleId,
    fields: BTreeMap<String, FieldValue>,
}

impl ResultHandle {
    /// Creates a handle with no fields.
    pub fn new(id: HandleId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    /// Creates a handle keyed by a natural key.
    pub fn keyed(key: &str) -> Self {
        Self::new(HandleId::from_key(key))
    }

    /// Adds a field, replacing any previous value under the same name.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// All fields, ordered by name.
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Keeps only the fields whose names appear in `names`.
    pub fn restricted<'a, I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let keep: std::collections::HashSet<&str> = names.into_iter().map(String::as_str).collect();
        self.fields.retain(|name, _| keep.contains(name.as_str()));
        self
    }

    /// Compares field contents, which `==` deliberately ignores.
    pub fn same_values(&self, other: &ResultHandle) -> bool {
        self.fields == other.fields
    }
}

impl PartialEq for ResultHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ResultHandle {}

impl Hash for ResultHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Borrow<HandleId> for ResultHandle {
    fn borrow(&self) -> &HandleId {
        &self.id
    }
}

/// A set of results, keyed by identity.
pub type ResultSet = HashSet<ResultHandle>;
