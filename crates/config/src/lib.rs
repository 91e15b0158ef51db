//! Configuration loading, validation, and strategy selection for treegen.
//!
//! Loads configuration from `treegen.toml` (or the file named by
//! `TREEGEN_CONFIG`) with environment variable overrides. Command-line flags
//! are applied on top by the binary. Validates all settings before any tree
//! is planned.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use treegen_core::{BusConfig, Strategy};

/// Bus records of the record/replay packing module, used when neither the
/// config file nor the command line supplies any.
const DEFAULT_RECORDS: &str = include_str!("default_records.txt");

/// The root configuration structure.
///
/// Maps directly to `treegen.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the SystemVerilog parameter package is written
    #[serde(default = "default_svh_output")]
    pub svh_output: PathBuf,

    /// Where the C++ decoder header is written
    #[serde(default = "default_hpp_output")]
    pub hpp_output: PathBuf,

    /// Divide strategies: none (default for every bus), one (for every bus),
    /// or one per bus in record order
    #[serde(default)]
    pub strategies: Vec<Strategy>,

    /// File with one packed record per line; takes precedence over `records`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_file: Option<PathBuf>,

    /// Inline packed records
    #[serde(default)]
    pub records: Vec<String>,
}

fn default_svh_output() -> PathBuf {
    PathBuf::from("cl_fpgarr_packing_cfg.svh")
}
fn default_hpp_output() -> PathBuf {
    PathBuf::from("cl_fpgarr_buscfg.hpp")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            svh_output: default_svh_output(),
            hpp_output: default_hpp_output(),
            strategies: vec![],
            records_file: None,
            records: vec![],
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path.
    ///
    /// The path is `TREEGEN_CONFIG` if set, else `./treegen.toml`. Also
    /// checks environment variables:
    /// - `TREEGEN_STRATEGY` (comma-separated strategy names)
    /// - `TREEGEN_SVH_OUTPUT`
    /// - `TREEGEN_HPP_OUTPUT`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_at(&Self::config_path())
    }

    /// Load configuration from `path`, then apply the environment overrides.
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;

        if let Ok(names) = std::env::var("TREEGEN_STRATEGY") {
            let names: Vec<&str> = names.split(',').filter(|n| !n.trim().is_empty()).collect();
            config.strategies = parse_strategies(&names)?;
        }
        if let Ok(path) = std::env::var("TREEGEN_SVH_OUTPUT") {
            config.svh_output = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("TREEGEN_HPP_OUTPUT") {
            config.hpp_output = PathBuf::from(path);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// The config file path: `TREEGEN_CONFIG` or `./treegen.toml`.
    pub fn config_path() -> PathBuf {
        std::env::var("TREEGEN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("treegen.toml"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_outputs()?;

        // Inline records can be checked now; a records file is read later.
        if self.records_file.is_none() && !self.records.is_empty() {
            resolve_strategies(&self.strategies, self.records.len())?;
        }

        Ok(())
    }

    /// Check that both artifact paths are set and distinct.
    pub fn validate_outputs(&self) -> Result<(), ConfigError> {
        if self.svh_output.as_os_str().is_empty() || self.hpp_output.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "svh_output and hpp_output must not be empty".into(),
            ));
        }

        if self.svh_output == self.hpp_output {
            return Err(ConfigError::ValidationError(format!(
                "svh_output and hpp_output both point to {}",
                self.svh_output.display()
            )));
        }

        Ok(())
    }

    /// The raw records to process, in order.
    ///
    /// `records_file` wins over inline `records`, which win over the
    /// built-in records.
    pub fn raw_records(&self) -> Result<Vec<String>, ConfigError> {
        if let Some(path) = &self.records_file {
            return read_records_file(path);
        }
        if !self.records.is_empty() {
            return Ok(self.records.clone());
        }
        Ok(default_records())
    }

    /// Decode every record. The first malformed record aborts the load.
    pub fn buses(&self) -> Result<Vec<BusConfig>, ConfigError> {
        self.raw_records()?
            .iter()
            .enumerate()
            .map(|(line, record)| {
                BusConfig::from_record(record).map_err(|source| ConfigError::RecordError {
                    record: line + 1,
                    source,
                })
            })
            .collect()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// The built-in bus records.
pub fn default_records() -> Vec<String> {
    parse_records(DEFAULT_RECORDS)
}

/// Split record text into records: one per line, ignoring blank lines and
/// `#` comments.
pub fn parse_records(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Read a records file.
pub fn read_records_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(parse_records(&content))
}

/// Parse strategy names.
pub fn parse_strategies(names: &[impl AsRef<str>]) -> Result<Vec<Strategy>, ConfigError> {
    names
        .iter()
        .map(|name| {
            name.as_ref().parse::<Strategy>().map_err(|_| ConfigError::UnknownStrategy {
                name: name.as_ref().trim().to_string(),
                choices: Strategy::choices(),
            })
        })
        .collect()
}

/// Assign one strategy to each of `bus_count` buses.
///
/// No strategy means the default for every bus, a single strategy applies
/// to every bus, and otherwise there must be exactly one per bus.
pub fn resolve_strategies(
    requested: &[Strategy],
    bus_count: usize,
) -> Result<Vec<Strategy>, ConfigError> {
    match requested {
        [] => Ok(vec![Strategy::default(); bus_count]),
        [only] => Ok(vec![*only; bus_count]),
        many if many.len() == bus_count => Ok(many.to_vec()),
        many => Err(ConfigError::StrategyCount {
            requested: many.len(),
            buses: bus_count,
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Unknown divide strategy '{name}' (choices: {choices})")]
    UnknownStrategy { name: String, choices: String },

    #[error("{requested} divide strategies given for {buses} buses (give none, one, or one per bus)")]
    StrategyCount { requested: usize, buses: usize },

    #[error("Bus record {record} is malformed: {source}")]
    RecordError {
        record: usize,
        #[source]
        source: treegen_core::DecodeError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.svh_output, PathBuf::from("cl_fpgarr_packing_cfg.svh"));
        assert_eq!(config.hpp_output, PathBuf::from("cl_fpgarr_buscfg.hpp"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig {
            strategies: vec![Strategy::Greedy, Strategy::KnapsackDp],
            records: default_records(),
            ..AppConfig::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn strategies_parse_from_toml_names() {
        let config: AppConfig = toml::from_str(r#"strategies = ["divdp", "greedy"]"#).unwrap();
        assert_eq!(config.strategies, vec![Strategy::KnapsackDp, Strategy::Greedy]);
    }

    #[test]
    fn unknown_strategy_in_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("treegen.toml");
        std::fs::write(&path, r#"strategies = ["balanced"]"#).unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/treegen.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn same_output_paths_rejected() {
        let config = AppConfig {
            hpp_output: PathBuf::from("cl_fpgarr_packing_cfg.svh"),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn strategy_count_checked_against_inline_records() {
        let config = AppConfig {
            strategies: vec![Strategy::Greedy, Strategy::KnapsackDp, Strategy::SumBalance],
            records: default_records(),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StrategyCount {
                requested: 3,
                buses: 2
            })
        ));
    }

    #[test]
    fn built_in_records_decode() {
        let buses = AppConfig::default().buses().unwrap();
        let names: Vec<&str> = buses.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["record", "validate"]);
        assert_eq!(
            buses[0].weights(),
            vec![32, 36, 32, 32, 36, 32, 32, 36, 32, 531, 18, 91, 593, 91]
        );
        assert_eq!(buses[0].leaves[0].name, "sda_AW");
        assert_eq!(buses[0].leaves[13].name, "pcis_AR");
        assert_eq!(buses[0].loge_count, 25);
        assert_eq!(buses[0].loge_names[24], "pcis_R");
        assert_eq!(buses[1].weights(), vec![34, 2, 34, 2, 34, 2, 91, 593, 91, 531, 18]);
        assert_eq!(buses[1].leaves[0].name, "sda_R");
        assert_eq!(buses[1].offset_width, 11);
    }

    #[test]
    fn records_file_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buses.txt");
        let record = BusConfig::from_widths("tiny", &[8, 16, 24], 4)
            .to_record()
            .unwrap();
        std::fs::write(&path, format!("# one bus\n\n{record}\n")).unwrap();
        let config = AppConfig {
            records_file: Some(path),
            records: default_records(),
            ..AppConfig::default()
        };
        let buses = config.buses().unwrap();
        assert_eq!(buses.len(), 1);
        assert_eq!(buses[0].name, "tiny");
    }

    #[test]
    fn malformed_record_reports_its_position() {
        let config = AppConfig {
            records: vec![default_records()[0].clone(), "broken, 1".into()],
            ..AppConfig::default()
        };
        let err = config.buses().unwrap_err();
        assert!(matches!(err, ConfigError::RecordError { record: 2, .. }));
        assert!(err.to_string().contains("record 2"));
    }

    #[test]
    fn resolve_replicates_default_and_single() {
        assert_eq!(
            resolve_strategies(&[], 2).unwrap(),
            vec![Strategy::SumBalance, Strategy::SumBalance]
        );
        assert_eq!(
            resolve_strategies(&[Strategy::Greedy], 3).unwrap(),
            vec![Strategy::Greedy; 3]
        );
        assert_eq!(
            resolve_strategies(&[Strategy::Greedy, Strategy::KnapsackDp], 2).unwrap(),
            vec![Strategy::Greedy, Strategy::KnapsackDp]
        );
    }

    #[test]
    fn resolve_rejects_count_mismatch() {
        let err = resolve_strategies(&[Strategy::Greedy, Strategy::KnapsackDp], 3).unwrap_err();
        assert!(err.to_string().contains("2 divide strategies given for 3 buses"));
    }

    #[test]
    fn parse_strategies_rejects_unknown() {
        let err = parse_strategies(&["dividebysum", "nope"]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStrategy { ref name, .. } if name == "nope"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("cl_fpgarr_packing_cfg.svh"));
        assert!(toml_str.contains("cl_fpgarr_buscfg.hpp"));
    }
}
