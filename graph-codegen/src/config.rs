use anyhow::{anyhow, Context};
use proc_macro2::TokenStream;
use serde::{Deserialize, Serialize};

use crate::generator::pascal_case;

/// Settings for a generator run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// Namespace stripped from schema names before they become Rust type names.
    pub odata_namespace: String,
    /// Module path, as seen from the generated code, of the runtime serialization layer.
    pub serialization_path: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            odata_namespace: "microsoft.graph".to_string(),
            serialization_path: "crate::serialization".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_yaml(input: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(input).context("invalid generator config")
    }

    /// Rust type name for a schema, e.g. `microsoft.graph.macOSKernelExtension` becomes
    /// `MacOSKernelExtension`. Names outside the namespace keep every segment.
    pub fn type_name(&self, schema_name: &str) -> String {
        let local = schema_name
            .strip_prefix(self.odata_namespace.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(schema_name);
        pascal_case(local)
    }

    pub(crate) fn serialization_path(&self) -> anyhow::Result<TokenStream> {
        self.serialization_path.parse::<TokenStream>().map_err(|e| {
            anyhow!(
                "invalid serialization path {:?}: {e:?}",
                self.serialization_path
            )
        })
    }
}
