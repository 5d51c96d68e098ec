//! Platform configuration and data paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/chat-contract/`, `~/.local/share/chat-contract/`
//! - macOS: `~/Library/Application Support/chat-contract/`
//! - Windows: `%APPDATA%\chat-contract\`

use std::io;
use std::path::PathBuf;

/// Name used for the configuration and data directories
const APP_NAME: &str = "chat-contract";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the directory holding run reports
pub fn reports_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().join("reports"))
}

/// Ensure the reports directory exists
pub fn ensure_reports_dir() -> io::Result<Option<PathBuf>> {
    if let Some(dir) = reports_dir() {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(Some(dir))
    } else {
        Ok(None)
    }
}
