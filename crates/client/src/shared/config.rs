use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides `api.base_url`
pub const API_URL_ENV: &str = "ZENCAT_API_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Access cookie lifetime when the token response has no usable `expires_in`
    #[serde(default = "default_access_ttl_secs")]
    pub access_token_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_token_ttl_days: u64,
    /// Route the navigation listener sends the user to when the session dies
    #[serde(default = "default_login_route")]
    pub login_route: String,
    /// Directory for the persisted cookie jar and local storage.
    /// In-memory only when unset.
    #[serde(default)]
    pub storage_dir: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_token_ttl_secs: default_access_ttl_secs(),
            refresh_token_ttl_days: default_refresh_ttl_days(),
            login_route: default_login_route(),
            storage_dir: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_access_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_refresh_ttl_days() -> u64 {
    7
}

fn default_login_route() -> String {
    "/login".to_string()
}

impl Config {
    /// Cookies get the `Secure` flag when the API is served over HTTPS
    pub fn is_secure(&self) -> bool {
        self.api.base_url.starts_with("https://")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn storage_dir(&self) -> Option<PathBuf> {
        self.session.storage_dir.as_ref().map(PathBuf::from)
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[api]
base_url = "http://127.0.0.1:8000"
request_timeout_secs = 30

[session]
access_token_ttl_secs = 86400
refresh_token_ttl_days = 7
login_route = "/login"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// `ZENCAT_API_URL` overrides the base URL in both cases.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = match find_config_file() {
        Some(config_path) => {
            tracing::info!("Loading config from: {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            parse_config(&contents)?
        }
        None => {
            tracing::info!("Using default embedded configuration");
            parse_config(DEFAULT_CONFIG)?
        }
    };

    if let Ok(base_url) = std::env::var(API_URL_ENV) {
        if !base_url.trim().is_empty() {
            tracing::info!("API base URL overridden by {}", API_URL_ENV);
            config.api.base_url = base_url.trim().to_string();
        }
    }

    Ok(config)
}

fn find_config_file() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let config_path = exe_path.parent()?.join("config.toml");
    if config_path.exists() {
        Some(config_path)
    } else {
        tracing::warn!("config.toml not found at: {}", config_path.display());
        None
    }
}

/// Parse and validate a TOML configuration
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if !config.api.base_url.starts_with("http://") && !config.api.base_url.starts_with("https://")
    {
        anyhow::bail!(
            "api.base_url must start with http:// or https://, got {:?}",
            config.api.base_url
        );
    }
    Ok(config)
}

#[cfg(test)]
pub(crate) fn test_config(base_url: &str) -> Config {
    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
        },
        session: SessionConfig::default(),
    }
}
