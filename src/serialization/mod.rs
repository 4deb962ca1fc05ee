//! Reading and writing OData JSON payloads.
//!
//! [`ParseNode`] wraps a parsed JSON document and hands out typed values, [`SerializationWriter`]
//! collects values into a JSON object. Generated models implement [`Parsable`] and
//! [`AdditionalDataHolder`] on top of their serde derives.
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub mod base64_bytes;
pub mod iso_duration;
mod parse_node;
mod writer;

pub use crate::error::SerializationError;
pub use parse_node::ParseNode;
pub use writer::SerializationWriter;

/// Members of a payload that the model does not declare, in the order they were read.
pub type AdditionalData = IndexMap<String, Value>;

/// Name of the OData type annotation used as the discriminator.
pub const ODATA_TYPE: &str = "@odata.type";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A model that keeps the members it does not declare.
pub trait AdditionalDataHolder {
    fn additional_data(&self) -> &AdditionalData;
    fn additional_data_mut(&mut self) -> &mut AdditionalData;
    fn set_additional_data(&mut self, value: AdditionalData);
}

/// A model that can be read from a [`ParseNode`] and written to a [`SerializationWriter`].
pub trait Parsable: Serialize + DeserializeOwned {
    /// The `@odata.type` annotation carried by the value, if any.
    fn odata_type(&self) -> Option<&str>;

    /// Builds a value from `node`, picking the concrete type from its discriminator where the
    /// model is polymorphic. A missing node yields a freshly constructed value.
    fn create_from_discriminator_value(
        node: Option<&ParseNode>,
    ) -> Result<Self, SerializationError>;

    fn serialize_into(&self, writer: &mut SerializationWriter) -> Result<(), SerializationError> {
        writer.write_object_value(None, Some(self))
    }
}

/// Parses `content` as `application/json` into `T`.
pub fn deserialize_from_json<T: Parsable>(content: &[u8]) -> Result<T, SerializationError> {
    let node = ParseNode::from_content(JSON_CONTENT_TYPE, content)?;
    T::create_from_discriminator_value(Some(&node))
}

/// Writes `value` as an `application/json` document.
pub fn serialize_to_json<T: Parsable>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut writer = SerializationWriter::new();
    value.serialize_into(&mut writer)?;
    writer.get_serialized_content()
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
