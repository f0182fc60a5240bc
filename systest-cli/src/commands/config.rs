//! Write or show the configuration.

use anyhow::{bail, Context, Result};
use std::path::Path;

use systest_client::config::default_path;
use systest_client::HarnessConfig;

/// Write a config file with every default filled in.
pub fn init(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_path().context("Could not determine config directory")?,
    };

    if path.exists() && !force {
        bail!(
            "Config already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    HarnessConfig::default().write_to(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Print the effective configuration.
pub fn show(config: &HarnessConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
