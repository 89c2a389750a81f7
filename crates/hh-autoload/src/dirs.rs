use std::path::PathBuf;

use etcetera::{BaseStrategy, choose_base_strategy};

const APP_DIR: &str = "hh-autoload";

/// Per-user configuration directory, e.g. `~/.config/hh-autoload`
pub fn user_config_dir() -> Option<PathBuf> {
    choose_base_strategy()
        .ok()
        .map(|strategy| strategy.config_dir().join(APP_DIR))
}

/// Location of the per-user configuration file
pub fn user_config_file() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join("config.toml"))
}
