//! Configuration management for svcps.
//!
//! This module handles loading, merging, and validating configuration from
//! files and CLI arguments. It supports YAML, JSON, and TOML formats, with
//! precedence CLI > config file > built-in defaults.

use crate::cli::{Args, ConfigFormat, LogLevel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_FORMAT: &str = "pid,R;parent_pid,R;virtual_size,R,iBytes;resident_size,R,iBytes;start_time,L,format=%Y-%m-%d %H:%M;uptime,R,duration;command,L";
pub const DEFAULT_FORMAT_SEP: &str = ";";
pub const DEFAULT_ALIGN: &str = "R";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Services to inspect when none are given on the command line
    pub service: Option<Vec<String>>,

    /// Show the header row
    pub headers: Option<bool>,

    /// Column layout, same syntax as --format
    pub format: Option<String>,

    /// Separator between column entries
    #[serde(alias = "format-sep")]
    pub format_sep: Option<String>,

    /// Alignment for columns that do not specify one
    #[serde(alias = "default-align")]
    pub default_align: Option<String>,

    /// Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: None,
            headers: Some(true),
            format: Some(DEFAULT_FORMAT.to_string()),
            format_sep: Some(DEFAULT_FORMAT_SEP.to_string()),
            default_align: Some(DEFAULT_ALIGN.to_string()),
            log_level: Some("warn".into()),
        }
    }
}

impl Config {
    pub fn effective_format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }

    pub fn effective_format_sep(&self) -> &str {
        self.format_sep.as_deref().unwrap_or(DEFAULT_FORMAT_SEP)
    }

    pub fn effective_default_align(&self) -> &str {
        self.default_align.as_deref().unwrap_or(DEFAULT_ALIGN)
    }

    pub fn effective_headers(&self) -> bool {
        self.headers.unwrap_or(true)
    }
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if !args.service.is_empty() {
        config.service = Some(args.service.clone());
    }
    if args.no_headers {
        config.headers = Some(false);
    }
    if let Some(format) = &args.format {
        config.format = Some(format.clone());
    }
    if let Some(sep) = &args.format_sep {
        config.format_sep = Some(sep.clone());
    }
    if let Some(align) = &args.default_align {
        config.default_align = Some(align.clone());
    }
    if let Some(level) = args.log_level {
        let name = match level {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        config.log_level = Some(name.to_string());
    }

    Ok(config)
}

/// Configuration loading with multiple format support, decided by file
/// extension (YAML unless .json or .toml).
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = if let Some(p) = path {
        p.to_path_buf()
    } else {
        // Try default locations
        let defaults = [
            "/etc/svcps/svcps.yaml",
            "/etc/svcps/svcps.yml",
            "/etc/svcps/svcps.toml",
            "./svcps.yaml",
            "./svcps.yml",
            "./svcps.toml",
        ];

        match defaults.iter().find(|p| Path::new(p).exists()) {
            Some(p) => PathBuf::from(p),
            None => return Ok(Config::default()),
        }
    };

    if !path.exists() {
        anyhow::bail!("config file not found: {}", path.display());
    }

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Serializes the effective configuration in the requested format.
pub fn show_config(config: &Config, format: ConfigFormat) -> anyhow::Result<String> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.effective_headers());
        assert_eq!(config.effective_format(), DEFAULT_FORMAT);
        assert_eq!(config.effective_format_sep(), ";");
        assert_eq!(config.effective_default_align(), "R");
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svcps.yaml");
        fs::write(&path, "format: pid\nheaders: true\nservice: [nginx]\n").unwrap();

        let args = Args::parse_from([
            "svcps",
            "-c",
            path.to_str().unwrap(),
            "-o",
            "pid;uptime",
            "--no-headers",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.effective_format(), "pid;uptime");
        assert!(!config.effective_headers());
        // Untouched file values survive the merge.
        assert_eq!(config.service, Some(vec!["nginx".to_string()]));
    }

    #[test]
    fn test_load_toml_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svcps.toml");
        fs::write(&path, "format = \"pid\"\nheaders = false\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.effective_format(), "pid");
        assert!(!config.effective_headers());
    }

    #[test]
    fn test_load_json_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svcps.json");
        fs::write(&path, r#"{"format": "pid", "format-sep": "|"}"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.effective_format(), "pid");
        assert_eq!(config.effective_format_sep(), "|");
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let args = Args::parse_from(["svcps", "-c", "/definitely/missing.yaml"]);
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn test_show_config_round_trips_yaml() {
        let config = Config::default();
        let rendered = show_config(&config, ConfigFormat::Yaml).unwrap();
        let parsed: Config = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(parsed.effective_format(), config.effective_format());
    }
}
