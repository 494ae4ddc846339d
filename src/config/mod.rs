mod schema;

pub use schema::{Config, Settings, DEFAULT_LOG_LEVEL};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

const CONFIG_ENV_VAR: &str = "JBDAP_CONFIG";

/// resolve the config file location
///
/// order: explicit path, `JBDAP_CONFIG`, `~/.jbdap/config.json`
pub fn get_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(expand(&path.to_string_lossy()));
    }

    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(expand(&path));
    }

    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    Ok(home.join(".jbdap").join("config.json"))
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

/// load the config; a missing file yields the defaults
pub fn load(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = json5::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Verify configuration file and return a list of errors
pub fn verify(path: &Path) -> Result<Vec<String>> {
    let mut errors = Vec::new();

    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: Config = match json5::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            return Err(anyhow!("invalid config: {}", e));
        }
    };

    let level = config.settings.log_level.trim();
    if level.is_empty() {
        errors.push("settings.log_level: must not be empty".to_string());
    } else if let Err(e) = EnvFilter::try_new(level) {
        errors.push(format!(
            "settings.log_level: invalid filter '{}': {}",
            level, e
        ));
    }

    Ok(errors)
}
