use std::fmt::Display;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use iso8601_duration::Duration;
use log::trace;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{value_kind, AdditionalData, SerializationError, JSON_CONTENT_TYPE};

/// Builds a JSON document member by member.
///
/// `write_*` methods skip `None` values entirely, nothing is written for an absent property.
/// Keyed writes turn an empty writer into an object.
#[derive(Debug, Default)]
pub struct SerializationWriter {
    root: Value,
}

impl SerializationWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }

    fn root_object(&mut self) -> Result<&mut Map<String, Value>, SerializationError> {
        if self.root.is_null() {
            self.root = Value::Object(Map::new());
        }
        match &mut self.root {
            Value::Object(members) => Ok(members),
            other => Err(SerializationError::UnexpectedType {
                expected: "object",
                found: value_kind(other),
            }),
        }
    }

    fn write_value(&mut self, key: &str, value: Option<Value>) -> Result<(), SerializationError> {
        if let Some(value) = value {
            self.root_object()?.insert(key.to_string(), value);
        }
        Ok(())
    }

    /// Writes an unkeyed value. Objects are merged into the document, anything else becomes
    /// the document itself as long as nothing has been written yet.
    fn write_root(&mut self, value: Value) -> Result<(), SerializationError> {
        match value {
            Value::Object(members) => {
                self.root_object()?.extend(members);
                Ok(())
            }
            value if self.root.is_null() => {
                self.root = value;
                Ok(())
            }
            value => Err(SerializationError::UnexpectedType {
                expected: value_kind(&self.root),
                found: value_kind(&value),
            }),
        }
    }

    pub fn write_string_value(
        &mut self,
        key: &str,
        value: Option<&str>,
    ) -> Result<(), SerializationError> {
        self.write_value(key, value.map(|value| Value::String(value.to_string())))
    }

    pub fn write_bool_value(
        &mut self,
        key: &str,
        value: Option<bool>,
    ) -> Result<(), SerializationError> {
        self.write_value(key, value.map(Value::Bool))
    }

    pub fn write_i32_value(
        &mut self,
        key: &str,
        value: Option<i32>,
    ) -> Result<(), SerializationError> {
        self.write_value(key, value.map(Value::from))
    }

    pub fn write_i64_value(
        &mut self,
        key: &str,
        value: Option<i64>,
    ) -> Result<(), SerializationError> {
        self.write_value(key, value.map(Value::from))
    }

    /// Non-finite numbers have no JSON form and are written as `null`.
    pub fn write_f64_value(
        &mut self,
        key: &str,
        value: Option<f64>,
    ) -> Result<(), SerializationError> {
        self.write_value(key, value.map(Value::from))
    }

    pub fn write_time_value(
        &mut self,
        key: &str,
        value: Option<DateTime<FixedOffset>>,
    ) -> Result<(), SerializationError> {
        self.write_value(key, value.map(|value| Value::String(value.to_rfc3339())))
    }

    pub fn write_date_only_value(
        &mut self,
        key: &str,
        value: Option<NaiveDate>,
    ) -> Result<(), SerializationError> {
        self.write_value(
            key,
            value.map(|value| Value::String(value.format("%Y-%m-%d").to_string())),
        )
    }

    pub fn write_time_only_value(
        &mut self,
        key: &str,
        value: Option<NaiveTime>,
    ) -> Result<(), SerializationError> {
        self.write_value(key, value.map(|value| Value::String(value.to_string())))
    }

    pub fn write_iso_duration_value(
        &mut self,
        key: &str,
        value: Option<&Duration>,
    ) -> Result<(), SerializationError> {
        self.write_value(key, value.map(|value| Value::String(value.to_string())))
    }

    pub fn write_uuid_value(
        &mut self,
        key: &str,
        value: Option<Uuid>,
    ) -> Result<(), SerializationError> {
        self.write_value(key, value.map(|value| Value::String(value.to_string())))
    }

    pub fn write_byte_array_value(
        &mut self,
        key: &str,
        value: Option<&[u8]>,
    ) -> Result<(), SerializationError> {
        self.write_value(key, value.map(|value| Value::String(STANDARD.encode(value))))
    }

    pub fn write_enum_value<E: Display>(
        &mut self,
        key: &str,
        value: Option<E>,
    ) -> Result<(), SerializationError> {
        self.write_value(key, value.map(|value| Value::String(value.to_string())))
    }

    /// Writes `value` under `key`, or merges its members into the document when `key` is `None`.
    pub fn write_object_value<T: Serialize + ?Sized>(
        &mut self,
        key: Option<&str>,
        value: Option<&T>,
    ) -> Result<(), SerializationError> {
        let Some(value) = value else {
            return Ok(());
        };
        let value = serde_json::to_value(value)?;
        match key {
            Some(key) => self.write_value(key, Some(value)),
            None => self.write_root(value),
        }
    }

    pub fn write_collection_of_object_values<T: Serialize>(
        &mut self,
        key: Option<&str>,
        values: Option<&[T]>,
    ) -> Result<(), SerializationError> {
        let Some(values) = values else {
            return Ok(());
        };
        let values = serde_json::to_value(values)?;
        match key {
            Some(key) => self.write_value(key, Some(values)),
            None => self.write_root(values),
        }
    }

    pub fn write_collection_of_primitive_values<T: Serialize>(
        &mut self,
        key: &str,
        values: Option<&[T]>,
    ) -> Result<(), SerializationError> {
        let values = values.map(serde_json::to_value).transpose()?;
        self.write_value(key, values)
    }

    /// Writes every additional data entry as a member of the document, after what was
    /// written so far.
    pub fn write_additional_data(
        &mut self,
        data: &AdditionalData,
    ) -> Result<(), SerializationError> {
        if data.is_empty() {
            return Ok(());
        }
        let members = self.root_object()?;
        for (key, value) in data {
            members.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    pub fn get_serialized_content(&self) -> Result<Vec<u8>, SerializationError> {
        let content = serde_json::to_vec(&self.root)?;
        trace!("serialized {} bytes", content.len());
        Ok(content)
    }

    pub fn into_value(self) -> Value {
        self.root
    }
}
