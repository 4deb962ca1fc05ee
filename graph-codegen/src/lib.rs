//! Generates Rust models for Microsoft Graph from the `components.schemas` section of its
//! OpenAPI description.
//!
//! Every object schema becomes a struct with optional fields, unknown members are kept in
//! an additional data bag and polymorphic types get an `Any<Name>` enum dispatched on
//! `@odata.type`. The generated code relies on a runtime serialization module, see
//! [`GeneratorConfig::serialization_path`].
use anyhow::Context;
use deserializer::SchemaDef;
use indexmap::IndexMap;

pub mod config;
pub mod deserializer;
mod generator;
pub(crate) mod parser;

pub use config::GeneratorConfig;

const GENERATED_HEADER: &str = "// Code generated by graph-codegen from the Microsoft Graph \
    OpenAPI description. DO NOT EDIT.\n";

pub fn generate_rust(
    input: IndexMap<String, SchemaDef>,
    config: &GeneratorConfig,
) -> anyhow::Result<String> {
    let entities = parser::parse_schema_def_collection(input, config)?;
    let code = generator::generate_rust(entities, config)?;
    Ok(format!("{GENERATED_HEADER}{code}\n"))
}

/// Reads an OpenAPI document and generates code for its `components.schemas`.
pub fn generate_rust_from_yaml(input: &str, config: &GeneratorConfig) -> anyhow::Result<String> {
    let document = serde_yaml::from_str::<serde_yaml::Value>(input)
        .context("failed to parse OpenAPI document")?;
    let schemas = document
        .get("components")
        .and_then(|components| components.get("schemas"))
        .cloned()
        .context("OpenAPI document has no components.schemas")?;
    let schemas = serde_yaml::from_value::<IndexMap<String, SchemaDef>>(schemas)
        .context("failed to read components.schemas")?;
    generate_rust(schemas, config)
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn test_generate_graph_models() {
        let content = include_str!("../../resources/graph-beta.yaml");
        let code = generate_rust_from_yaml(content, &GeneratorConfig::default()).unwrap();
        let file = syn::parse_file(&code).unwrap();
        assert!(!file.items.is_empty());

        let code = code.replace(' ', "");
        assert!(code.contains("pubstructCustomer{#[serde(flatten)]entity:Entity"));
        assert!(code.contains("pubenumAnyMobileApp"));
        assert!(code.contains("pubenumAnyAndroidManagedStoreApp"));
        assert!(code.contains("pubenumAnyAccessReviewSettings"));
        assert!(code.contains("app:Option<Box<AnyMobileApp>>"));
        assert!(code.contains("pubenumMobileAppPublishingState"));
        assert!(code.contains("minimum_lead_time:Option<iso8601_duration::Duration>"));
        assert!(code.contains("start:Option<chrono::NaiveTime>"));
        assert!(code.contains("speed:Option<f32>"));
    }

    #[test]
    fn test_rejects_document_without_schemas() {
        let err = generate_rust_from_yaml("openapi: 3.0.4\n", &GeneratorConfig::default());
        assert!(err.is_err());
    }
}
