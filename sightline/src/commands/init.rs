use anyhow::{bail, Result};
use std::path::Path;
use tracing::info;

use crate::config::Config;

/// Run the init command
pub fn run(config_path: &Path) -> Result<()> {
    if Config::exists(config_path) {
        bail!(
            "Config already exists at {}\nUse a different --config path or delete the existing config.",
            config_path.display()
        );
    }

    let config = Config::default();
    config.save(config_path)?;

    info!("Config initialized at {}", config_path.display());
    println!("Config saved to: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Point [node] at a bitcore node running with -addressindex");
    println!("  2. Set the node's RPC username and password");
    println!("  3. Run 'sightline serve' to start the API");

    Ok(())
}
