use std::path::PathBuf;

use directories::ProjectDirs;

/// Per-user configuration directory, e.g. `~/.config/church-console` on Linux
pub fn config_dir() -> PathBuf {
    ProjectDirs::from("org", "church", "church-console")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".church-console"))
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn credentials_file() -> PathBuf {
    config_dir().join("credentials.toml")
}
