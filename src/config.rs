use crate::cli::{Cli, OutputFormat};
use crate::client::{DEFAULT_AUTH_URL, DEFAULT_NAMESPACE, DEFAULT_REST_URL, Session};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

impl From<ConfigError> for crate::error::Error {
    fn from(err: ConfigError) -> Self {
        crate::error::Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub credentials: CredentialsConfig,
    pub endpoints: EndpointsConfig,
    pub network: NetworkConfig,
    pub output: OutputConfig,
}

/// API credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    /// API key sent with every request
    pub api_key: String,
    /// Shared secret; requests are signed only when present
    pub secret: Option<String>,
    /// Auth token obtained through the external auth flow
    pub auth_token: Option<String>,
}

impl CredentialsConfig {
    pub fn session(&self) -> Session {
        let mut session = Session::new(self.api_key.clone());
        if let Some(secret) = &self.secret {
            session = session.with_secret(secret.clone());
        }
        if let Some(token) = &self.auth_token {
            session = session.with_auth_token(token.clone());
        }
        session
    }
}

/// Endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EndpointsConfig {
    /// REST endpoint every method call goes to
    pub rest_url: String,
    /// Auth endpoint for signed auth URLs
    pub auth_url: String,
    /// First segment of every method path
    pub namespace: String,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// HTTP request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormatConfig,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    #[default]
    Human,
    Json,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            rest_url: DEFAULT_REST_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("flickr-rpc/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            let file_config = Self::load_from_file(config_path).await?;
            config = Self::merge_configs(config, file_config);
        } else if let Some(found_config) = Self::find_config_file().await? {
            config = Self::merge_configs(config, found_config);
        }

        config = Self::apply_environment_overrides(config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        let config_names = [
            "flickr-rpc.toml",
            "flickr-rpc.json",
            ".flickr-rpc.toml",
            ".flickr-rpc.json",
        ];

        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("flickr-rpc");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(api_key) = env.get("FLICKR_API_KEY") {
            config.credentials.api_key = api_key;
        }
        if let Some(secret) = env.get("FLICKR_SECRET") {
            config.credentials.secret = Some(secret);
        }
        if let Some(token) = env.get("FLICKR_AUTH_TOKEN") {
            config.credentials.auth_token = Some(token);
        }

        if let Some(rest_url) = env.get("FLICKR_REST_URL") {
            config.endpoints.rest_url = rest_url;
        }

        if let Some(timeout) = env.get("FLICKR_TIMEOUT") {
            config.network.timeout_seconds = timeout.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid FLICKR_TIMEOUT value: {}", timeout))
            })?;
        }

        if let Some(format) = env.get("FLICKR_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid FLICKR_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(api_key) = &cli.api_key {
            config.credentials.api_key = api_key.clone();
        }
        if cli.secret.is_some() {
            config.credentials.secret = cli.secret.clone();
        }
        if cli.auth_token.is_some() {
            config.credentials.auth_token = cli.auth_token.clone();
        }
        if let Some(timeout) = cli.timeout {
            config.network.timeout_seconds = timeout;
        }
        if let Some(format) = &cli.output_format {
            config.output.format = (*format).into();
        }
        config
    }

    /// Merge two configurations (second takes precedence for set values)
    pub fn merge_configs(mut base: Config, override_config: Config) -> Config {
        if !override_config.credentials.api_key.is_empty() {
            base.credentials.api_key = override_config.credentials.api_key;
        }
        if override_config.credentials.secret.is_some() {
            base.credentials.secret = override_config.credentials.secret;
        }
        if override_config.credentials.auth_token.is_some() {
            base.credentials.auth_token = override_config.credentials.auth_token;
        }

        base.endpoints = override_config.endpoints;
        base.network = override_config.network;
        base.output = override_config.output;

        base
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.credentials.api_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "An API key is required (FLICKR_API_KEY or --api-key)".to_string(),
            ));
        }

        if config.network.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        for (name, value) in [
            ("rest_url", &config.endpoints.rest_url),
            ("auth_url", &config.endpoints.auth_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                ConfigError::Validation(format!("Invalid {}: {} - {}", name, value, e))
            })?;
        }

        if config.endpoints.namespace.is_empty() || config.endpoints.namespace.contains('.') {
            return Err(ConfigError::Validation(format!(
                "Invalid method namespace: {:?}",
                config.endpoints.namespace
            )));
        }

        Ok(())
    }
}
