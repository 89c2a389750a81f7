//! Layered configuration
//!
//! Settings are read from, in increasing precedence: built-in defaults, the
//! user config file, the project's `hh_autoload.toml`, and `HH_AUTOLOAD_*`
//! environment variables. Command-line flags are applied on top by the binary.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use log::debug;
use serde::Deserialize;

use crate::dirs;

/// Project configuration file name, looked up in the root directory
pub const PROJECT_CONFIG_FILE: &str = "hh_autoload.toml";

const ENV_PREFIX: &str = "HH_AUTOLOAD_";

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Reference the root relative to the generated file instead of by
    /// absolute path
    pub relative_root: bool,
    pub failure_handler: Option<String>,
    /// Replaces `failure_handler` in dev builds
    pub dev_failure_handler: Option<String>,
    /// Root-relative files required in addition to the builder's files
    pub extra_files: Vec<PathBuf>,
    /// Root-relative directory the artifact is written to
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relative_root: true,
            failure_handler: None,
            dev_failure_handler: None,
            extra_files: Vec::new(),
            output_dir: PathBuf::from("vendor"),
        }
    }
}

/// One source of settings; unset fields leave lower layers untouched
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub relative_root: Option<bool>,
    pub failure_handler: Option<String>,
    pub dev_failure_handler: Option<String>,
    pub extra_files: Option<Vec<PathBuf>>,
    pub output_dir: Option<PathBuf>,
}

impl ConfigLayer {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Collect `HH_AUTOLOAD_*` variables from `vars`
    pub fn from_env(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        let mut layer = Self::default();
        for (key, value) in vars {
            let Some(setting) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match setting {
                "RELATIVE_ROOT" => layer.relative_root = Some(parse_bool(&key, &value)?),
                "FAILURE_HANDLER" => layer.failure_handler = non_empty(value),
                "DEV_FAILURE_HANDLER" => layer.dev_failure_handler = non_empty(value),
                "OUTPUT_DIR" => layer.output_dir = Some(PathBuf::from(value)),
                _ => debug!("Ignoring unknown environment variable {key}"),
            }
        }
        Ok(layer)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key} must be a boolean, got '{other}'"),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl Config {
    /// Load all layers for the project rooted at `root`
    pub fn load(root: &Path) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_file) = dirs::user_config_file() {
            if user_file.is_file() {
                debug!("Loading user config from {}", user_file.display());
                config.apply(ConfigLayer::from_file(&user_file)?);
            }
        }

        let project_file = root.join(PROJECT_CONFIG_FILE);
        if project_file.is_file() {
            debug!("Loading project config from {}", project_file.display());
            config.apply(ConfigLayer::from_file(&project_file)?);
        }

        config.apply(ConfigLayer::from_env(std::env::vars())?);
        Ok(config)
    }

    /// Overlay every field that `layer` sets
    pub fn apply(&mut self, layer: ConfigLayer) {
        if let Some(relative_root) = layer.relative_root {
            self.relative_root = relative_root;
        }
        if layer.failure_handler.is_some() {
            self.failure_handler = layer.failure_handler;
        }
        if layer.dev_failure_handler.is_some() {
            self.dev_failure_handler = layer.dev_failure_handler;
        }
        if let Some(extra_files) = layer.extra_files {
            self.extra_files = extra_files;
        }
        if let Some(output_dir) = layer.output_dir {
            self.output_dir = output_dir;
        }
    }

    /// Handler to wire for a dev or production build
    pub fn failure_handler_for(&self, is_dev: bool) -> Option<&str> {
        if is_dev {
            self.dev_failure_handler
                .as_deref()
                .or(self.failure_handler.as_deref())
        } else {
            self.failure_handler.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.relative_root);
        assert_eq!(config.output_dir, PathBuf::from("vendor"));
        assert!(config.failure_handler_for(true).is_none());
    }

    #[test]
    fn test_project_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(PROJECT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
relative_root = false
failure_handler = "App\\Autoload\\Handler"
extra_files = ["bootstrap.hack"]
"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply(ConfigLayer::from_file(&path).unwrap());

        assert!(!config.relative_root);
        assert_eq!(
            config.failure_handler.as_deref(),
            Some("App\\Autoload\\Handler")
        );
        assert_eq!(config.extra_files, vec![PathBuf::from("bootstrap.hack")]);
        assert_eq!(config.output_dir, PathBuf::from("vendor"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(PROJECT_CONFIG_FILE);
        fs::write(&path, "roots = [\"src\"]\n").unwrap();
        assert!(ConfigLayer::from_file(&path).is_err());
    }

    #[test]
    fn test_env_layer() {
        let layer = ConfigLayer::from_env(env(&[
            ("HH_AUTOLOAD_RELATIVE_ROOT", "off"),
            ("HH_AUTOLOAD_DEV_FAILURE_HANDLER", "Dev\\Handler"),
            ("HH_AUTOLOAD_FAILURE_HANDLER", ""),
            ("HH_AUTOLOAD_UNKNOWN", "x"),
            ("PATH", "/usr/bin"),
        ]))
        .unwrap();

        assert_eq!(
            layer,
            ConfigLayer {
                relative_root: Some(false),
                dev_failure_handler: Some("Dev\\Handler".to_owned()),
                ..ConfigLayer::default()
            }
        );
    }

    #[test]
    fn test_env_rejects_bad_bool() {
        let err = ConfigLayer::from_env(env(&[("HH_AUTOLOAD_RELATIVE_ROOT", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("HH_AUTOLOAD_RELATIVE_ROOT"));
    }

    #[test]
    fn test_dev_failure_handler_precedence() {
        let config = Config {
            failure_handler: Some("Prod".to_owned()),
            dev_failure_handler: Some("Dev".to_owned()),
            ..Config::default()
        };
        assert_eq!(config.failure_handler_for(true), Some("Dev"));
        assert_eq!(config.failure_handler_for(false), Some("Prod"));

        let config = Config {
            failure_handler: Some("Prod".to_owned()),
            ..Config::default()
        };
        assert_eq!(config.failure_handler_for(true), Some("Prod"));
    }

    #[test]
    fn test_later_layer_wins() {
        let mut config = Config::default();
        config.apply(ConfigLayer {
            output_dir: Some(PathBuf::from("build")),
            relative_root: Some(false),
            ..ConfigLayer::default()
        });
        config.apply(ConfigLayer {
            relative_root: Some(true),
            ..ConfigLayer::default()
        });
        assert!(config.relative_root);
        assert_eq!(config.output_dir, PathBuf::from("build"));
    }
}
