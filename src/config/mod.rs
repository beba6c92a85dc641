mod settings;

pub use settings::{ApiSettings, Config, DEFAULT_BASE_URL};

use crate::error::{CobrosError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Get the config directory path (XDG-style, falling back to ~/.cobros/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "cobros") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        CobrosError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".cobros"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Load config.toml, falling back to defaults when the file does not exist
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| CobrosError::ConfigParse { path, source: e })
}

/// Apply the command-line override on top of the file settings.
/// The result is resolved once and handed to the API client.
pub fn resolve_api(config: &Config, base_override: Option<&str>) -> (String, Option<Duration>) {
    let base = match base_override {
        Some(url) if !url.trim().is_empty() => url.trim().to_string(),
        _ => config.api.base_url.clone(),
    };
    let timeout = config.api.timeout_secs.map(Duration::from_secs);
    (base, timeout)
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
# Root address of the Noa Cobros backend
base_url = "http://127.0.0.1:5056"
# timeout_secs = 10   # optional, requests wait indefinitely when unset
"#;
