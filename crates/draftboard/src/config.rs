// Configuration loading and parsing (draftboard.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::metrics::DEFAULT_DIFF_CLAMP;
use crate::player::Platform;
use crate::ranking::merge::UnrankedPolicy;

/// Name of the config file inside `config/` (and `defaults/`).
pub const CONFIG_FILE: &str = "draftboard.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub adp: AdpConfig,
    pub rankings: RankingsConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdpConfig {
    pub sleeper_url: String,
    pub underdog_url: String,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    #[serde(default = "default_platform")]
    pub default_platform: Platform,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingsConfig {
    /// Path of the persisted custom order, relative to the working directory.
    pub path: String,
    #[serde(default)]
    pub unranked_policy: UnrankedPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_diff_clamp")]
    pub diff_clamp: f64,
    pub board_limit: usize,
}

fn default_platform() -> Platform {
    Platform::Sleeper
}

fn default_diff_clamp() -> f64 {
    DEFAULT_DIFF_CLAMP
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/draftboard.toml` relative to `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Parse config text without validation.
pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

/// Make sure `config/draftboard.toml` exists, seeding it from
/// `defaults/draftboard.toml` on first run. An existing config is never
/// touched. Returns the path written, if any.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no {CONFIG_FILE} in config/ or defaults/ under {}; \
                 run from the draftboard crate directory",
                base_dir.display()
            ),
        });
    }

    let copy_err = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    };
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(copy_err)?;
    }

    // create_new so a config written concurrently is not clobbered.
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(copy_err(e)),
    };
    let mut src = std::fs::File::open(&source).map_err(copy_err)?;
    std::io::copy(&mut src, &mut dest).map_err(copy_err)?;

    info!("created {} from defaults", target.display());
    Ok(Some(target))
}

/// Load `config/draftboard.toml` from the working directory, seeding it from
/// `defaults/` first if needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let base = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&base)?;
    load_config_from(&base)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| {
        debug!("cannot read {}: {}", path.display(), e);
        ConfigError::FileNotFound {
            path: path.to_path_buf(),
        }
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let urls: &[(&str, &str)] = &[
        ("adp.sleeper_url", config.adp.sleeper_url.as_str()),
        ("adp.underdog_url", config.adp.underdog_url.as_str()),
    ];
    for (name, url) in urls {
        if url.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    // cache_ttl_secs = 0 is allowed and turns the cache off.
    if config.adp.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "adp.request_timeout_secs".into(),
            message: "must be > 0".into(),
        });
    }

    if config.rankings.path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "rankings.path".into(),
            message: "must not be empty".into(),
        });
    }

    let clamp = config.display.diff_clamp;
    if !clamp.is_finite() || clamp <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "display.diff_clamp".into(),
            message: format!("must be a finite number > 0, got {clamp}"),
        });
    }

    if config.display.board_limit == 0 {
        return Err(ConfigError::ValidationError {
            field: "display.board_limit".into(),
            message: "must be > 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
