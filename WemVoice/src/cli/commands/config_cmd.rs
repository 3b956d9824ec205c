//! CLI commands for the configuration file

use std::path::Path;

use anyhow::bail;

use crate::config::WemVoiceConfig;

/// Write the default configuration to `output`, or print it
pub fn init(output: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let Some(output) = output else {
        print!("{}", WemVoiceConfig::default_toml()?);
        return Ok(());
    };

    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }

    WemVoiceConfig::default().save(output)?;
    println!("Wrote default configuration to {}", output.display());
    Ok(())
}

/// Print the configuration a run would use
pub fn show(config: Option<&Path>) -> anyhow::Result<()> {
    let config = WemVoiceConfig::load_or_default(config)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
