use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use url::Url;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000/api/v1";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub backend: BackendConfig,
    pub map: MapConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let backend = BackendConfig::new(
            env::var("APP_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            non_empty_var("APP_BACKEND_TOKEN"),
        )?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            backend,
            map: MapConfig {
                api_key: non_empty_var("APP_MAP_API_KEY"),
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location and credentials of the listings REST backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    pub api_token: Option<String>,
}

impl BackendConfig {
    pub fn new(base_url: impl AsRef<str>, api_token: Option<String>) -> Result<Self, ConfigError> {
        let raw = base_url.as_ref().trim().trim_end_matches('/');
        let base_url = Url::parse(raw).map_err(|source| ConfigError::InvalidBackendUrl {
            value: raw.to_string(),
            source: Some(source),
        })?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBackendUrl {
                value: raw.to_string(),
                source: None,
            });
        }

        Ok(Self {
            base_url,
            api_token,
        })
    }
}

/// Mapping provider settings handed to clients as-is.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    pub api_key: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidBackendUrl {
        value: String,
        source: Option<url::ParseError>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBackendUrl { value, .. } => {
                write!(f, "APP_BACKEND_URL '{value}' is not an absolute http(s) URL")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidBackendUrl { source, .. } => {
                source.as_ref().map(|err| err as &(dyn std::error::Error + 'static))
            }
        }
    }
}
