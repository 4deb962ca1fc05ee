use indexmap::IndexMap;
use monostate::MustBe;
use serde::{Deserialize, Serialize};

/// Last segment of a `#/components/schemas/<name>` reference.
pub fn schema_name_from_ref(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub schema_path: String,
}

impl SchemaRef {
    pub fn get_schema_name(&self) -> &str {
        schema_name_from_ref(&self.schema_path)
    }
}

/// OpenAPI discriminator object. `mapping` values are schema references.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    pub property_name: String,
    #[serde(default)]
    pub mapping: IndexMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
#[serde(untagged)]
pub enum SchemaDef {
    Object {
        title: Option<String>,
        description: Option<String>,
        #[serde(rename = "type")]
        schema_type: MustBe!("object"),
        properties: Option<IndexMap<String, Schema>>,
        discriminator: Option<Discriminator>,
    },
    // must be tried before `String`, both carry `type: string`
    Enum {
        title: Option<String>,
        description: Option<String>,
        #[serde(rename = "type")]
        schema_type: MustBe!("string"),
        #[serde(rename = "enum")]
        enum_values: Vec<String>,
    },
    String {
        description: Option<String>,
        #[serde(rename = "type")]
        schema_type: MustBe!("string"),
        format: Option<String>,
        default: Option<String>,
    },
    Integer {
        description: Option<String>,
        #[serde(rename = "type")]
        schema_type: MustBe!("integer"),
        format: Option<String>,
    },
    Number {
        description: Option<String>,
        #[serde(rename = "type")]
        schema_type: MustBe!("number"),
        format: Option<String>,
    },
    Boolean {
        description: Option<String>,
        #[serde(rename = "type")]
        schema_type: MustBe!("boolean"),
    },
    Array {
        description: Option<String>,
        #[serde(rename = "type")]
        schema_type: MustBe!("array"),
        items: Box<Schema>,
    },
    AllOf {
        title: Option<String>,
        description: Option<String>,
        #[serde(rename = "allOf")]
        all_of: Vec<Schema>,
    },
    AnyOf {
        description: Option<String>,
        #[serde(rename = "anyOf")]
        any_of: Vec<Schema>,
    },
}

impl SchemaDef {
    pub fn description(&self) -> Option<&str> {
        match self {
            SchemaDef::Object { description, .. }
            | SchemaDef::Enum { description, .. }
            | SchemaDef::String { description, .. }
            | SchemaDef::Integer { description, .. }
            | SchemaDef::Number { description, .. }
            | SchemaDef::Boolean { description, .. }
            | SchemaDef::Array { description, .. }
            | SchemaDef::AllOf { description, .. }
            | SchemaDef::AnyOf { description, .. } => description.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
/// A Schema can either be a $ref to another Schema or a Definition of a Schema.
/// This deserializer assumes all top-level types are `SchemaDef`
pub enum Schema {
    Ref(SchemaRef),
    Def(SchemaDef),
}

impl Schema {
    pub fn description(&self) -> Option<&str> {
        match self {
            Schema::Ref(_) => None,
            Schema::Def(def) => def.description(),
        }
    }
}
