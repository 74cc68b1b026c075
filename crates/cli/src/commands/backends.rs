use anyhow::Result;
use serde::Serialize;

use lineage_core::analyzer::{default_backend_registry, ANALYZER_BIN_ENV, DEFAULT_ANALYZER_BIN};

#[derive(Debug, Serialize)]
pub struct BackendInfo {
    pub name: String,
    pub description: String,
}

/// Describe the analyzer backends known to this binary.
pub fn backend_infos() -> Vec<BackendInfo> {
    let registry = default_backend_registry();
    registry
        .names()
        .into_iter()
        .map(|name| {
            let description = match name.as_str() {
                "snapshot" => "Reads a model previously exported by the analyzer (--model)".to_string(),
                "command" => format!(
                    "Runs the analyzer exporter ({} or `{}`) and reads the model from stdout",
                    ANALYZER_BIN_ENV, DEFAULT_ANALYZER_BIN
                ),
                other => format!("Backend '{}'", other),
            };
            BackendInfo { name, description }
        })
        .collect()
}

/// List available analyzer backends.
pub fn list_backends_command(json: bool) -> Result<()> {
    let entries = backend_infos();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("Backends: (none)");
        return Ok(());
    }

    println!("Backends:");
    for entry in entries {
        println!("- {}: {}", entry.name, entry.description);
    }

    Ok(())
}
