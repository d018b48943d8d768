//! Shared filesystem paths with test-friendly overrides.

use std::path::PathBuf;

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var).map(PathBuf::from)
}

fn fallback_home_dir() -> PathBuf {
    home::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Config directory (default: XDG config dir or ~/.config/managesw).
#[must_use]
pub fn config_dir() -> PathBuf {
    env_path("MANAGESW_CONFIG_DIR").unwrap_or_else(|| {
        dirs::config_dir()
            .map(|d| d.join("managesw"))
            .unwrap_or_else(|| fallback_home_dir().join(".config/managesw"))
    })
}

/// Config file inside [`config_dir`].
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Socket path for the Unix socket transport (default: `$XDG_RUNTIME_DIR/managesw.sock`).
#[must_use]
pub fn socket_path() -> PathBuf {
    env_path("MANAGESW_SOCKET").unwrap_or_else(|| {
        dirs::runtime_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("managesw.sock")
    })
}
