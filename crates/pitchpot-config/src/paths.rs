//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/pitchpot/config.toml`
//! - macOS: `~/Library/Application Support/pitchpot/config.toml`
//! - Windows: `%APPDATA%\pitchpot\config.toml`
//!
//! ```rust,no_run
//! use pitchpot_config::paths;
//!
//! println!("config file: {}", paths::default_config_path().display());
//! ```

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "pitchpot";

/// File name of the user configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path of the user configuration file (which may not exist).
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE_NAME)
}

/// Ensure the user config directory exists.
///
/// Creates the directory and any parent directories if they don't exist.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}
