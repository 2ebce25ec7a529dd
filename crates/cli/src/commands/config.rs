use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use storefront_core::config::{AppConfig, LoadOptions};
use toml::Value;

/// One effective setting: dotted key, rendered value, and env keys that can set it.
struct Field {
    key_path: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

impl Field {
    fn new(
        key_path: &'static str,
        value: impl ToString,
        env_keys: &'static [&'static str],
    ) -> Self {
        Self { key_path, value: value.to_string(), env_keys }
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in effective_fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    lines.join("\n")
}

fn effective_fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field::new("database.url", &config.database.url, &["STOREFRONT_DATABASE_URL"]),
        Field::new(
            "database.max_connections",
            config.database.max_connections,
            &["STOREFRONT_DATABASE_MAX_CONNECTIONS"],
        ),
        Field::new(
            "database.timeout_secs",
            config.database.timeout_secs,
            &["STOREFRONT_DATABASE_TIMEOUT_SECS"],
        ),
        Field::new(
            "server.bind_address",
            &config.server.bind_address,
            &["STOREFRONT_SERVER_BIND_ADDRESS"],
        ),
        Field::new("server.port", config.server.port, &["STOREFRONT_SERVER_PORT"]),
        Field::new(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs,
            &["STOREFRONT_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        Field::new(
            "auth.session_ttl_hours",
            config.auth.session_ttl_hours,
            &["STOREFRONT_AUTH_SESSION_TTL_HOURS"],
        ),
        Field::new(
            "auth.remember_me_ttl_days",
            config.auth.remember_me_ttl_days,
            &["STOREFRONT_AUTH_REMEMBER_ME_TTL_DAYS"],
        ),
        Field::new(
            "auth.reset_token_ttl_minutes",
            config.auth.reset_token_ttl_minutes,
            &["STOREFRONT_AUTH_RESET_TOKEN_TTL_MINUTES"],
        ),
        Field::new(
            "catalog.view_history_limit",
            config.catalog.view_history_limit,
            &["STOREFRONT_CATALOG_VIEW_HISTORY_LIMIT"],
        ),
        Field::new(
            "catalog.recently_viewed_default",
            config.catalog.recently_viewed_default,
            &["STOREFRONT_CATALOG_RECENTLY_VIEWED_DEFAULT"],
        ),
        Field::new(
            "catalog.recommendation_limit",
            config.catalog.recommendation_limit,
            &["STOREFRONT_CATALOG_RECOMMENDATION_LIMIT"],
        ),
        Field::new(
            "gateway.backend_url",
            &config.gateway.backend_url,
            &["STOREFRONT_GATEWAY_BACKEND_URL"],
        ),
        Field::new(
            "gateway.timeout_secs",
            config.gateway.timeout_secs,
            &["STOREFRONT_GATEWAY_TIMEOUT_SECS"],
        ),
        Field::new(
            "gateway.bind_address",
            &config.gateway.bind_address,
            &["STOREFRONT_GATEWAY_BIND_ADDRESS"],
        ),
        Field::new("gateway.port", config.gateway.port, &["STOREFRONT_GATEWAY_PORT"]),
        Field::new(
            "gateway.allowed_origins",
            config.gateway.allowed_origins.join(","),
            &["STOREFRONT_GATEWAY_ALLOWED_ORIGINS"],
        ),
        Field::new(
            "logging.level",
            &config.logging.level,
            &["STOREFRONT_LOGGING_LEVEL", "STOREFRONT_LOG_LEVEL"],
        ),
        Field::new(
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            &["STOREFRONT_LOGGING_FORMAT", "STOREFRONT_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("storefront.toml"), PathBuf::from("config/storefront.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
