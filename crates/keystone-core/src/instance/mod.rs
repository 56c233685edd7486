//! Instance identity serialization.
//!
//! An instance key is the runtime tuple of key values, in effective-key
//! order. The textual form is a JSON array of single-entry objects, one per
//! slot, each naming its tag: `[{"text":"INV-1"},{"int":2}]`. Decoding only
//! needs the key shape, never the schema graph.


use derive_more::Display;
use keystone_schema::types::Primitive;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error as ThisError;

///
/// KeyCodecError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum KeyCodecError {
    #[error("malformed instance key: {reason}")]
    Malformed { reason: String },

    #[error("instance key has {found} value(s), expected {expected}")]
    KeyArityMismatch { expected: usize, found: usize },

    #[error("instance key slot {slot} holds a {found} value, expected {expected}")]
    KeyTypeMismatch {
        slot: usize,
        expected: KeyTag,
        found: KeyTag,
    },
}

impl KeyCodecError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for KeyCodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}

///
/// KeyTag
/// Wire tag of one key slot. Every primitive except `Float64` has one.
///

#[remain::sorted]
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum KeyTag {
    #[display("bool")]
    Bool,
    #[display("date")]
    Date,
    #[display("decimal")]
    Decimal,
    #[display("int")]
    Int,
    #[display("text")]
    Text,
    #[display("timestamp")]
    Timestamp,
    #[display("uuid")]
    Uuid,
    #[display("year_month")]
    YearMonth,
}

impl KeyTag {
    #[must_use]
    pub const fn of(primitive: Primitive) -> Option<Self> {
        match primitive {
            Primitive::Bool => Some(Self::Bool),
            Primitive::Date => Some(Self::Date),
            Primitive::Decimal => Some(Self::Decimal),
            Primitive::Float64 => None,
            Primitive::Int => Some(Self::Int),
            Primitive::Text => Some(Self::Text),
            Primitive::Timestamp => Some(Self::Timestamp),
            Primitive::Uuid => Some(Self::Uuid),
            Primitive::YearMonth => Some(Self::YearMonth),
        }
    }

    /// Object key used for this tag in the textual form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Decimal => "decimal",
            Self::Int => "int",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Uuid => "uuid",
            Self::YearMonth => "year_month",
        }
    }
}

///
/// KeyValue
///
/// Decimal and temporal values travel in their canonical string form; the
/// codec keeps them verbatim.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyValue {
    Bool(bool),
    Date(String),
    Decimal(String),
    Int(i64),
    Text(String),
    Timestamp(String),
    Uuid(String),

    /// `yyyymm`
    YearMonth(i32),
}

impl KeyValue {
    #[must_use]
    pub const fn tag(&self) -> KeyTag {
        match self {
            Self::Bool(_) => KeyTag::Bool,
            Self::Date(_) => KeyTag::Date,
            Self::Decimal(_) => KeyTag::Decimal,
            Self::Int(_) => KeyTag::Int,
            Self::Text(_) => KeyTag::Text,
            Self::Timestamp(_) => KeyTag::Timestamp,
            Self::Uuid(_) => KeyTag::Uuid,
            Self::YearMonth(_) => KeyTag::YearMonth,
        }
    }

    fn to_json(&self) -> JsonValue {
        let value = match self {
            Self::Bool(v) => JsonValue::Bool(*v),
            Self::Int(v) => JsonValue::from(*v),
            Self::YearMonth(v) => JsonValue::from(*v),
            Self::Date(v)
            | Self::Decimal(v)
            | Self::Text(v)
            | Self::Timestamp(v)
            | Self::Uuid(v) => JsonValue::String(v.clone()),
        };

        let mut entry = Map::new();
        entry.insert(self.tag().label().to_string(), value);

        JsonValue::Object(entry)
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for KeyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

///
/// KeyShape
///

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub struct KeyShape(Vec<KeyTag>);

impl KeyShape {
    #[must_use]
    pub const fn new(tags: Vec<KeyTag>) -> Self {
        Self(tags)
    }

    #[must_use]
    pub fn tags(&self) -> &[KeyTag] {
        &self.0
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check a value tuple against this shape.
    pub fn check(&self, values: &[KeyValue]) -> Result<(), KeyCodecError> {
        if values.len() != self.0.len() {
            return Err(KeyCodecError::KeyArityMismatch {
                expected: self.0.len(),
                found: values.len(),
            });
        }

        for (slot, (value, &expected)) in values.iter().zip(&self.0).enumerate() {
            let found = value.tag();
            if found != expected {
                return Err(KeyCodecError::KeyTypeMismatch {
                    slot,
                    expected,
                    found,
                });
            }
        }

        Ok(())
    }
}

///
/// InstanceKey
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct InstanceKey(Vec<KeyValue>);

impl InstanceKey {
    #[must_use]
    pub const fn new(values: Vec<KeyValue>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn values(&self) -> &[KeyValue] {
        &self.0
    }

    #[must_use]
    pub fn into_values(self) -> Vec<KeyValue> {
        self.0
    }

    #[must_use]
    pub fn shape(&self) -> KeyShape {
        KeyShape::new(self.0.iter().map(KeyValue::tag).collect())
    }

    #[must_use]
    pub fn encode(&self) -> String {
        JsonValue::Array(self.0.iter().map(KeyValue::to_json).collect()).to_string()
    }

    pub fn decode(text: &str, shape: &KeyShape) -> Result<Self, KeyCodecError> {
        let raw: JsonValue = serde_json::from_str(text)?;
        if !raw.is_array() {
            return Err(KeyCodecError::malformed("expected an array of tagged values"));
        }

        let values: Vec<KeyValue> = serde_json::from_value(raw)?;
        shape.check(&values)?;

        Ok(Self(values))
    }
}

impl From<Vec<KeyValue>> for InstanceKey {
    fn from(values: Vec<KeyValue>) -> Self {
        Self(values)
    }
}

///
/// InstanceIdentity
///
/// Persisted instances are addressed by their key. Instances created on a
/// client and not yet stored carry an opaque token instead.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum InstanceIdentity {
    Persisted(InstanceKey),
    Unsaved(String),
}

impl InstanceIdentity {
    #[must_use]
    pub fn unsaved(token: impl Into<String>) -> Self {
        Self::Unsaved(token.into())
    }

    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }

    #[must_use]
    pub const fn key(&self) -> Option<&InstanceKey> {
        match self {
            Self::Persisted(key) => Some(key),
            Self::Unsaved(_) => None,
        }
    }

    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Persisted(key) => key.encode(),
            Self::Unsaved(token) => JsonValue::String(token.clone()).to_string(),
        }
    }

    /// Restore an identity from its textual form. A leading `[` means a
    /// persisted key, anything else a JSON string token.
    pub fn restore(text: &str, shape: &KeyShape) -> Result<Self, KeyCodecError> {
        if text.trim_start().starts_with('[') {
            return InstanceKey::decode(text, shape).map(Self::Persisted);
        }

        let token: String = serde_json::from_str(text)?;

        Ok(Self::Unsaved(token))
    }
}

impl From<InstanceKey> for InstanceIdentity {
    fn from(key: InstanceKey) -> Self {
        Self::Persisted(key)
    }
}
