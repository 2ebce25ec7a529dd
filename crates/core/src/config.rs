use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::credentials::SessionPolicy;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub catalog: CatalogConfig,
    pub gateway: GatewayConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    pub session_ttl_hours: u32,
    pub remember_me_ttl_days: u32,
    pub reset_token_ttl_minutes: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
    pub view_history_limit: usize,
    pub recently_viewed_default: usize,
    pub recommendation_limit: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    pub backend_url: String,
    pub timeout_secs: u64,
    pub bind_address: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub server_port: Option<u16>,
    pub gateway_port: Option<u16>,
    pub backend_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://storefront.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8000,
                graceful_shutdown_secs: 15,
            },
            auth: AuthConfig {
                session_ttl_hours: 24,
                remember_me_ttl_days: 30,
                reset_token_ttl_minutes: 60,
            },
            catalog: CatalogConfig {
                view_history_limit: 20,
                recently_viewed_default: 4,
                recommendation_limit: 8,
            },
            gateway: GatewayConfig {
                backend_url: "http://127.0.0.1:8000".to_string(),
                timeout_secs: 10,
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                allowed_origins: vec!["http://localhost:3000".to_string()],
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AuthConfig {
    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            session_ttl: Duration::hours(i64::from(self.session_ttl_hours)),
            remember_me_ttl: Duration::days(i64::from(self.remember_me_ttl_days)),
            reset_token_ttl: Duration::minutes(i64::from(self.reset_token_ttl_minutes)),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("storefront.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(auth) = patch.auth {
            if let Some(hours) = auth.session_ttl_hours {
                self.auth.session_ttl_hours = hours;
            }
            if let Some(days) = auth.remember_me_ttl_days {
                self.auth.remember_me_ttl_days = days;
            }
            if let Some(minutes) = auth.reset_token_ttl_minutes {
                self.auth.reset_token_ttl_minutes = minutes;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(limit) = catalog.view_history_limit {
                self.catalog.view_history_limit = limit;
            }
            if let Some(limit) = catalog.recently_viewed_default {
                self.catalog.recently_viewed_default = limit;
            }
            if let Some(limit) = catalog.recommendation_limit {
                self.catalog.recommendation_limit = limit;
            }
        }

        if let Some(gateway) = patch.gateway {
            if let Some(backend_url) = gateway.backend_url {
                self.gateway.backend_url = backend_url;
            }
            if let Some(timeout_secs) = gateway.timeout_secs {
                self.gateway.timeout_secs = timeout_secs;
            }
            if let Some(bind_address) = gateway.bind_address {
                self.gateway.bind_address = bind_address;
            }
            if let Some(port) = gateway.port {
                self.gateway.port = port;
            }
            if let Some(allowed_origins) = gateway.allowed_origins {
                self.gateway.allowed_origins = allowed_origins;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("STOREFRONT_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("STOREFRONT_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_env("STOREFRONT_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_env("STOREFRONT_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("STOREFRONT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("STOREFRONT_SERVER_PORT") {
            self.server.port = parse_env("STOREFRONT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_env("STOREFRONT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("STOREFRONT_AUTH_SESSION_TTL_HOURS") {
            self.auth.session_ttl_hours = parse_env("STOREFRONT_AUTH_SESSION_TTL_HOURS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_AUTH_REMEMBER_ME_TTL_DAYS") {
            self.auth.remember_me_ttl_days =
                parse_env("STOREFRONT_AUTH_REMEMBER_ME_TTL_DAYS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_AUTH_RESET_TOKEN_TTL_MINUTES") {
            self.auth.reset_token_ttl_minutes =
                parse_env("STOREFRONT_AUTH_RESET_TOKEN_TTL_MINUTES", &value)?;
        }

        if let Some(value) = read_env("STOREFRONT_CATALOG_VIEW_HISTORY_LIMIT") {
            self.catalog.view_history_limit =
                parse_env("STOREFRONT_CATALOG_VIEW_HISTORY_LIMIT", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_CATALOG_RECENTLY_VIEWED_DEFAULT") {
            self.catalog.recently_viewed_default =
                parse_env("STOREFRONT_CATALOG_RECENTLY_VIEWED_DEFAULT", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_CATALOG_RECOMMENDATION_LIMIT") {
            self.catalog.recommendation_limit =
                parse_env("STOREFRONT_CATALOG_RECOMMENDATION_LIMIT", &value)?;
        }

        if let Some(value) = read_env("STOREFRONT_GATEWAY_BACKEND_URL") {
            self.gateway.backend_url = value;
        }
        if let Some(value) = read_env("STOREFRONT_GATEWAY_TIMEOUT_SECS") {
            self.gateway.timeout_secs = parse_env("STOREFRONT_GATEWAY_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_GATEWAY_BIND_ADDRESS") {
            self.gateway.bind_address = value;
        }
        if let Some(value) = read_env("STOREFRONT_GATEWAY_PORT") {
            self.gateway.port = parse_env("STOREFRONT_GATEWAY_PORT", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_GATEWAY_ALLOWED_ORIGINS") {
            self.gateway.allowed_origins = split_list(&value);
        }

        let log_level =
            read_env("STOREFRONT_LOGGING_LEVEL").or_else(|| read_env("STOREFRONT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STOREFRONT_LOGGING_FORMAT").or_else(|| read_env("STOREFRONT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(port) = overrides.gateway_port {
            self.gateway.port = port;
        }
        if let Some(backend_url) = overrides.backend_url {
            self.gateway.backend_url = backend_url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_auth(&self.auth)?;
        validate_catalog(&self.catalog)?;
        validate_gateway(&self.gateway)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("storefront.toml"), PathBuf::from("config/storefront.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_auth(auth: &AuthConfig) -> Result<(), ConfigError> {
    let checks = [
        ("auth.session_ttl_hours", auth.session_ttl_hours),
        ("auth.remember_me_ttl_days", auth.remember_me_ttl_days),
        ("auth.reset_token_ttl_minutes", auth.reset_token_ttl_minutes),
    ];
    for (key, value) in checks {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{key} must be greater than zero")));
        }
    }
    Ok(())
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    let checks = [
        ("catalog.view_history_limit", catalog.view_history_limit),
        ("catalog.recently_viewed_default", catalog.recently_viewed_default),
        ("catalog.recommendation_limit", catalog.recommendation_limit),
    ];
    for (key, value) in checks {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{key} must be greater than zero")));
        }
    }
    Ok(())
}

fn validate_gateway(gateway: &GatewayConfig) -> Result<(), ConfigError> {
    let url = gateway.backend_url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "gateway.backend_url must start with http:// or https://".to_string(),
        ));
    }

    if gateway.timeout_secs == 0 || gateway.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "gateway.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if gateway.port == 0 {
        return Err(ConfigError::Validation("gateway.port must be greater than zero".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    auth: Option<AuthPatch>,
    catalog: Option<CatalogPatch>,
    gateway: Option<GatewayPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthPatch {
    session_ttl_hours: Option<u32>,
    remember_me_ttl_days: Option<u32>,
    reset_token_ttl_minutes: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    view_history_limit: Option<usize>,
    recently_viewed_default: Option<usize>,
    recommendation_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayPatch {
    backend_url: Option<String>,
    timeout_secs: Option<u64>,
    bind_address: Option<String>,
    port: Option<u16>,
    allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
