use std::path::PathBuf;

use anyhow::{anyhow, Result};

use lineage_core::config::{DirectoryConfig, ProjectConfig, DEFAULT_CONFIG_FILENAME};

use crate::canonicalize_or_current;

/// Write a default project config to `out` (or `lineage.json` in the current directory).
pub fn init_config_command(
    out: Option<&str>,
    name: Option<String>,
    contracts_dir: Option<String>,
    force: bool,
) -> Result<PathBuf> {
    let path = canonicalize_or_current(out.unwrap_or(DEFAULT_CONFIG_FILENAME))?;
    if path.exists() && !force {
        return Err(anyhow!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }

    let mut config = ProjectConfig::default();
    if let Some(name) = name {
        config.name = name;
    }
    if let Some(dir) = contracts_dir {
        config.target_contracts = DirectoryConfig::new(dir);
    }
    config.write_to(&path)?;

    println!("Project configuration written to: {}", path.display());
    Ok(path)
}
