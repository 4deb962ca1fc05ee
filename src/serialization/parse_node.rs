use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use iso8601_duration::Duration;
use log::trace;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::{value_kind, Parsable, SerializationError, JSON_CONTENT_TYPE};

/// A node of a parsed JSON document.
///
/// Typed getters return `Ok(None)` for `null` and an error when the node holds a value of
/// another JSON type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseNode {
    value: Value,
}

impl ParseNode {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Parses `content`. Only `application/json` is understood, media type parameters such as
    /// `charset` are ignored.
    pub fn from_content(content_type: &str, content: &[u8]) -> Result<Self, SerializationError> {
        let media_type = content_type.split(';').next().unwrap_or_default().trim();
        if !media_type.eq_ignore_ascii_case(JSON_CONTENT_TYPE) {
            return Err(SerializationError::UnsupportedContentType(
                content_type.to_string(),
            ));
        }
        trace!("parsing {} bytes of {}", content.len(), media_type);
        Ok(Self::new(serde_json::from_slice(content)?))
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// The member `name` of an object node. Missing members, `null` members and non-object
    /// nodes all give `None`.
    pub fn get_child_node(&self, name: &str) -> Option<ParseNode> {
        self.value
            .get(name)
            .filter(|child| !child.is_null())
            .cloned()
            .map(Self::new)
    }

    fn unexpected(&self, expected: &'static str) -> SerializationError {
        SerializationError::UnexpectedType {
            expected,
            found: value_kind(&self.value),
        }
    }

    pub fn get_string_value(&self) -> Result<Option<String>, SerializationError> {
        match &self.value {
            Value::Null => Ok(None),
            Value::String(value) => Ok(Some(value.clone())),
            _ => Err(self.unexpected("string")),
        }
    }

    pub fn get_bool_value(&self) -> Result<Option<bool>, SerializationError> {
        match &self.value {
            Value::Null => Ok(None),
            Value::Bool(value) => Ok(Some(*value)),
            _ => Err(self.unexpected("boolean")),
        }
    }

    pub fn get_i64_value(&self) -> Result<Option<i64>, SerializationError> {
        match &self.value {
            Value::Null => Ok(None),
            Value::Number(number) => number
                .as_i64()
                .map(Some)
                .ok_or_else(|| SerializationError::OutOfRange {
                    value: number.to_string(),
                    target: "i64",
                }),
            _ => Err(self.unexpected("number")),
        }
    }

    pub fn get_i32_value(&self) -> Result<Option<i32>, SerializationError> {
        self.get_i64_value()?
            .map(|value| {
                i32::try_from(value).map_err(|_| SerializationError::OutOfRange {
                    value: value.to_string(),
                    target: "i32",
                })
            })
            .transpose()
    }

    pub fn get_f64_value(&self) -> Result<Option<f64>, SerializationError> {
        match &self.value {
            Value::Null => Ok(None),
            Value::Number(number) => number
                .as_f64()
                .map(Some)
                .ok_or_else(|| SerializationError::OutOfRange {
                    value: number.to_string(),
                    target: "f64",
                }),
            _ => Err(self.unexpected("number")),
        }
    }

    /// An RFC 3339 date-time such as `2023-03-01T10:15:00Z`.
    pub fn get_time_value(&self) -> Result<Option<DateTime<FixedOffset>>, SerializationError> {
        self.get_string_value()?
            .map(|value| {
                DateTime::parse_from_rfc3339(&value)
                    .map_err(|source| SerializationError::InvalidTime { value, source })
            })
            .transpose()
    }

    /// A calendar date such as `2023-01-31`.
    pub fn get_date_only_value(&self) -> Result<Option<NaiveDate>, SerializationError> {
        self.get_string_value()?
            .map(|value| {
                NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                    .map_err(|source| SerializationError::InvalidTime { value, source })
            })
            .transpose()
    }

    /// A time of day such as `09:30:00` or `17:45:30.5000000`.
    pub fn get_time_only_value(&self) -> Result<Option<NaiveTime>, SerializationError> {
        self.get_string_value()?
            .map(|value| {
                value
                    .parse::<NaiveTime>()
                    .map_err(|source| SerializationError::InvalidTime { value, source })
            })
            .transpose()
    }

    /// An ISO 8601 duration such as `PT1H30M`.
    pub fn get_iso_duration_value(&self) -> Result<Option<Duration>, SerializationError> {
        self.get_string_value()?
            .map(|value| {
                value
                    .parse::<Duration>()
                    .map_err(|_| SerializationError::InvalidDuration { value })
            })
            .transpose()
    }

    pub fn get_uuid_value(&self) -> Result<Option<Uuid>, SerializationError> {
        self.get_string_value()?
            .map(|value| {
                Uuid::parse_str(&value)
                    .map_err(|source| SerializationError::InvalidUuid { value, source })
            })
            .transpose()
    }

    /// Binary content, encoded as standard base64.
    pub fn get_byte_array_value(&self) -> Result<Option<Vec<u8>>, SerializationError> {
        self.get_string_value()?
            .map(|value| STANDARD.decode(value).map_err(SerializationError::from))
            .transpose()
    }

    pub fn get_enum_value<E>(&self) -> Result<Option<E>, SerializationError>
    where
        E: FromStr<Err = SerializationError>,
    {
        self.get_string_value()?
            .map(|value| value.parse::<E>())
            .transpose()
    }

    pub fn get_object_value<T: Parsable>(&self) -> Result<Option<T>, SerializationError> {
        if self.is_null() {
            return Ok(None);
        }
        T::create_from_discriminator_value(Some(self)).map(Some)
    }

    /// Each element is created through `T`'s discriminator, so a collection of a polymorphic
    /// type may hold different variants.
    pub fn get_collection_of_object_values<T: Parsable>(
        &self,
    ) -> Result<Option<Vec<T>>, SerializationError> {
        match &self.value {
            Value::Null => Ok(None),
            Value::Array(items) => items
                .iter()
                .map(|item| T::create_from_discriminator_value(Some(&Self::new(item.clone()))))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            _ => Err(self.unexpected("array")),
        }
    }

    pub fn get_collection_of_primitive_values<T: DeserializeOwned>(
        &self,
    ) -> Result<Option<Vec<T>>, SerializationError> {
        match &self.value {
            Value::Null => Ok(None),
            Value::Array(items) => items
                .iter()
                .map(|item| T::deserialize(item).map_err(SerializationError::from))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            _ => Err(self.unexpected("array")),
        }
    }

    /// Reads the whole node into `T` through its serde implementation.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, SerializationError> {
        Ok(T::deserialize(&self.value)?)
    }
}

impl From<Value> for ParseNode {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
