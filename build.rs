use std::{env, path::Path, process::Command};

use anyhow::Context;
use graph_codegen::GeneratorConfig;

const SCHEMA: &str = "resources/graph-beta.yaml";

fn main() -> anyhow::Result<()> {
    println!("cargo:rerun-if-changed={SCHEMA}");
    let out_dir = env::var("OUT_DIR").context("OUT_DIR is not set")?;
    let dest_path = Path::new(&out_dir).join("models.rs");
    let yaml_data =
        std::fs::read_to_string(SCHEMA).with_context(|| format!("failed to read {SCHEMA}"))?;
    let codegen = graph_codegen::generate_rust_from_yaml(&yaml_data, &GeneratorConfig::default())?;
    std::fs::write(&dest_path, codegen)
        .with_context(|| format!("failed to write {}", dest_path.display()))?;
    // formatting only helps when reading the output, a missing rustfmt is not an error
    let _ = Command::new("rustfmt")
        .args(["--edition", "2021"])
        .arg(&dest_path)
        .output();
    Ok(())
}
