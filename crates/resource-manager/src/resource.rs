//! Resource envelopes and the spec capability.
//!
//! A resource travels on the wire as `{"type": ..., "spec": ...}`. The
//! conversion between a typed [`Resource<T>`] and the generic string-keyed
//! mapping handed to encoders happens only through [`Resource::to_values`]
//! and [`Resource::from_values`].

use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{EncodingError, InvalidSpec};

/// Generic representation of a decoded document.
pub type Values = Map<String, Value>;

/// Opaque identity of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Creates an id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the id and returns the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Id {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Domain payload of a resource type.
///
/// Each resource type provides one implementation. The serde impls define the
/// shape of the `spec` field on the wire.
pub trait ResourceSpec: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Returns true if the value already carries an identity.
    fn has_id(&self) -> bool;

    /// Checks the value's own invariants.
    fn validate(&self) -> Result<(), InvalidSpec>;
}

/// Wire envelope around a single spec value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource<T> {
    /// Singular resource type name.
    #[serde(rename = "type", default)]
    pub resource_type: String,

    /// The domain payload.
    pub spec: T,
}

impl<T: ResourceSpec> Resource<T> {
    /// Wraps a spec value.
    pub fn new(resource_type: impl Into<String>, spec: T) -> Self {
        Self {
            resource_type: resource_type.into(),
            spec,
        }
    }

    /// Flattens the envelope into a generic mapping.
    pub fn to_values(&self) -> Result<Values, EncodingError> {
        match serde_json::to_value(self)? {
            Value::Object(values) => Ok(values),
            _ => Err(EncodingError::NotAMapping),
        }
    }

    /// Converts a generic mapping into a typed envelope.
    ///
    /// This is where the spec's type constraints are enforced: missing or
    /// mistyped fields fail here.
    pub fn from_values(values: Values) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(values))
    }

    /// Consumes the envelope and returns the spec.
    pub fn into_spec(self) -> T {
        self.spec
    }
}

/// Wire envelope around a page of resources.
///
/// `count` is the size of the whole matching set, not of `items`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceList {
    /// Total number of matching records.
    pub count: usize,

    /// The requested page, each item shaped like a single-resource response.
    pub items: Vec<Values>,
}

impl ResourceList {
    /// Creates an empty page for a matching set of `count` records.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            items: Vec::new(),
        }
    }

    /// Appends a resource, flattened to its generic mapping.
    pub fn push<T: ResourceSpec>(&mut self, resource: &Resource<T>) -> Result<(), EncodingError> {
        self.items.push(resource.to_values()?);
        Ok(())
    }

    /// Decodes every item back into a typed envelope.
    pub fn decode_items<T: ResourceSpec>(&self) -> Result<Vec<Resource<T>>, serde_json::Error> {
        self.items
            .iter()
            .cloned()
            .map(Resource::from_values)
            .collect()
    }

    /// Flattens the page into a generic mapping.
    pub fn to_values(&self) -> Result<Values, EncodingError> {
        match serde_json::to_value(self)? {
            Value::Object(values) => Ok(values),
            _ => Err(EncodingError::NotAMapping),
        }
    }
}
