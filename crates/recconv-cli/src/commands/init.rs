//! Init / Config 命令

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use recconv_core::PluginConfig;

use super::load_config;

pub fn run(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = recconv_core::expand_home(&config_path.unwrap_or_else(PluginConfig::default_path));
    write_default(&path, force)?;

    let config = PluginConfig::default();
    println!("Configuration initialized at: {}", path.display());
    println!("\nDefault configuration:");
    println!("  OneBot: {}", config.onebot.url);
    println!("  Data dir: {}", config.data_dir.display());
    println!("  Output format: {}", config.format);
    println!("\nEdit the configuration file to set up TTS and the OneBot access token.");

    Ok(())
}

fn write_default(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists, use --force to overwrite",
            path.display()
        );
    }
    PluginConfig::default().save(path)?;
    Ok(())
}

/// 打印生效的配置
pub fn show(config_path: Option<PathBuf>) -> Result<()> {
    let (path, config) = load_config(config_path)?;
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    if let Err(e) = config.validate() {
        println!("\n⚠️ {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_default_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        write_default(&path, false).unwrap();
        assert!(PluginConfig::load(&path).is_ok());

        std::fs::write(&path, "{}").unwrap();
        assert!(write_default(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        write_default(&path, true).unwrap();
        assert_ne!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
