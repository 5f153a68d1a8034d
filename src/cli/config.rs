//! CLI configuration view
//!
//! `sitepulse config` prints the resolved configuration as TOML, with
//! secrets masked.

use crate::server::load_validated_config;
use anyhow::{Context, Result};

pub fn run() -> Result<()> {
    let config = load_validated_config()?;
    let rendered =
        toml::to_string_pretty(&config.public()).context("Failed to serialize configuration")?;
    print!("{}", rendered);
    Ok(())
}
