use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TODOAPP_CONFIG_PATH";
const ENDPOINT_ENV_VAR: &str = "TODOAPP_ENDPOINT";
const API_KEY_ENV_VAR: &str = "TODOAPP_API_KEY";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub error: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        paint(self.accent, self.reset, text)
    }

    pub fn mutedize(&self, text: &str) -> String {
        paint(self.muted, self.reset, text)
    }

    pub fn errorize(&self, text: &str) -> String {
        paint(self.error, self.reset, text)
    }
}

fn paint(color: &str, reset: &str, text: &str) -> String {
    if color.is_empty() {
        text.to_string()
    } else {
        format!("{color}{text}{reset}")
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            error: "\x1b[38;5;203m",
            reset: "\x1b[0m",
        },
        Some("solarized") => Palette {
            accent: "\x1b[38;5;108m",
            muted: "\x1b[38;5;250m",
            error: "\x1b[38;5;160m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            accent: "",
            muted: "",
            error: "",
            reset: "",
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned = canonical_key(raw);
    if cleaned.is_empty() {
        return Some("default".into());
    }

    match cleaned.as_str() {
        "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        _ => Some(cleaned),
    }
}

/// Lowercases and collapses runs of non-alphanumerics into single underscores.
pub fn canonical_key(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    #[serde(rename = "API_KEY")]
    ApiKey,
    #[default]
    #[serde(rename = "AMAZON_COGNITO_USER_POOLS")]
    UserPool,
}

impl AuthMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match canonical_key(raw).as_str() {
            "api_key" | "apikey" => Some(Self::ApiKey),
            "amazon_cognito_user_pools" | "user_pool" | "user_pools" | "cognito" => {
                Some(Self::UserPool)
            }
            _ => None,
        }
    }
}

/// Field names follow the Amplify `amplifyconfiguration.json` layout so that
/// file can be used as-is. Keys not listed here (regions, other services)
/// are ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, rename = "aws_appsync_graphqlEndpoint", alias = "endpoint")]
    pub endpoint: Option<String>,
    #[serde(default, rename = "aws_appsync_authenticationType", alias = "auth_type")]
    pub auth_mode: AuthMode,
    #[serde(default, rename = "aws_appsync_apiKey", alias = "api_key")]
    pub api_key: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub theme: Option<String>,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn require_endpoint(&self) -> Result<&str, AppError> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
            .ok_or_else(|| AppError::invalid_data("GraphQL endpoint is not configured"))
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub auth_mode: Option<AuthMode>,
    pub theme: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(app_dir()?.join(CONFIG_FILE_NAME))
}

/// Per-user directory holding `config.json` and `session.json`.
pub fn app_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("todoapp"))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join("todoapp"))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    let load = match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    };
    ConfigLoad {
        config: apply_env(load.config),
        error: load.error,
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    Ok(normalize_config_theme(config))
}

fn apply_env(config: Config) -> Config {
    apply_env_values(
        config,
        std::env::var(ENDPOINT_ENV_VAR).ok(),
        std::env::var(API_KEY_ENV_VAR).ok(),
    )
}

fn apply_env_values(
    mut config: Config,
    endpoint: Option<String>,
    api_key: Option<String>,
) -> Config {
    if let Some(endpoint) = endpoint.filter(|value| !value.trim().is_empty()) {
        config.endpoint = Some(endpoint.trim().to_string());
    }
    if let Some(api_key) = api_key.filter(|value| !value.trim().is_empty()) {
        config.api_key = Some(api_key.trim().to_string());
    }
    config
}

fn normalize_config_theme(mut config: Config) -> Config {
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    config
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_ref()
        && let Some(normalized) = canonical_theme_name(theme)
    {
        merged.theme = Some(normalized);
    }
    if let Some(endpoint) = overrides.endpoint.as_ref() {
        merged.endpoint = Some(endpoint.clone());
    }
    if let Some(api_key) = overrides.api_key.as_ref() {
        merged.api_key = Some(api_key.clone());
    }
    if let Some(auth_mode) = overrides.auth_mode {
        merged.auth_mode = auth_mode;
    }
    if let Some(timeout) = overrides.request_timeout_secs {
        merged.request_timeout_secs = Some(timeout);
    }

    merged
}
