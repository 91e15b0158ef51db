//! `treegen config` — Configuration management commands.

use std::path::{Path, PathBuf};

use treegen_config::{AppConfig, resolve_strategies};

use super::load_config;

pub fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e);
        }
    };
    println!("   ✅ Config parsed successfully");

    let buses = match config.buses() {
        Ok(buses) => buses,
        Err(e) => {
            println!("   ❌ {e}");
            return Err(e.into());
        }
    };
    println!("   ✅ {} bus record(s) decoded", buses.len());

    let strategies = match resolve_strategies(&config.strategies, buses.len()) {
        Ok(strategies) => strategies,
        Err(e) => {
            println!("   ❌ {e}");
            return Err(e.into());
        }
    };

    let mut warnings = Vec::new();
    if config.records_file.is_some() && !config.records.is_empty() {
        warnings.push("Both records_file and records are set; inline records are ignored");
    }
    if warnings.is_empty() {
        println!("   ✅ All checks passed");
    } else {
        println!();
        for w in &warnings {
            println!("   ⚠️  {w}");
        }
    }

    println!();
    println!("   SystemVerilog: {}", config.svh_output.display());
    println!("   C++ header:    {}", config.hpp_output.display());
    for (bus, strategy) in buses.iter().zip(&strategies) {
        println!(
            "   Bus:           {} ({} channels, {strategy})",
            bus.name,
            bus.leaves.len()
        );
    }

    Ok(())
}

pub fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub fn path(config_path: Option<&Path>) {
    println!("{}", resolved_path(config_path).display());
}

pub fn init(config_path: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolved_path(config_path);
    if path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }
    std::fs::write(&path, AppConfig::default_toml())?;
    println!("✅ Wrote default config to {}", path.display());
    Ok(())
}

fn resolved_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let path = resolved_path(Some(Path::new("/tmp/custom.toml")));
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("treegen.toml");
        init(Some(&path), false).unwrap();
        let written = AppConfig::load_from(&path).unwrap();
        assert_eq!(written, AppConfig::default());

        assert!(init(Some(&path), false).is_err());
        assert!(init(Some(&path), true).is_ok());
    }
}
