use std::env;
use std::fs;
use std::path::Path;

use agribazaar_core::config::{resolve_config_path, AppConfig, LoadOptions, LogFormat};
use serde::Serialize;
use serde_json::json;
use toml::Value;

use super::CommandResult;

const COMMAND: &str = "config";

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            )
        }
    };

    let config_file_path = resolve_config_path(None);
    let sources = SourceResolver {
        file_doc: load_config_file_doc(config_file_path.as_deref()),
        file_path: config_file_path.map(|path| path.display().to_string()),
    };

    let entries = vec![
        sources.entry(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["AGRIBAZAAR_SERVER_BIND_ADDRESS"],
        ),
        sources.entry("server.port", config.server.port.to_string(), &["AGRIBAZAAR_SERVER_PORT"]),
        sources.entry(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["AGRIBAZAAR_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        sources.entry(
            "backend.user_endpoint",
            config.backend.user_endpoint.clone(),
            &["AGRIBAZAAR_BACKEND_USER_ENDPOINT"],
        ),
        sources.entry(
            "backend.timeout_secs",
            config.backend.timeout_secs.to_string(),
            &["AGRIBAZAAR_BACKEND_TIMEOUT_SECS"],
        ),
        sources.entry(
            "payment.destination",
            config.payment.destination.clone(),
            &["AGRIBAZAAR_PAYMENT_DESTINATION"],
        ),
        sources.entry(
            "logging.level",
            config.logging.level.clone(),
            &["AGRIBAZAAR_LOGGING_LEVEL", "AGRIBAZAAR_LOG_LEVEL"],
        ),
        sources.entry(
            "logging.format",
            format_name(config.logging.format).to_string(),
            &["AGRIBAZAAR_LOGGING_FORMAT", "AGRIBAZAAR_LOG_FORMAT"],
        ),
    ];

    CommandResult::success_with(
        COMMAND,
        format!("effective config resolved for {}", config.listen_address()),
        Some(json!({
            "precedence": "env > file > default",
            "config_file": sources.file_path,
            "entries": entries,
        })),
    )
}

struct SourceResolver {
    file_doc: Option<Value>,
    file_path: Option<String>,
}

impl SourceResolver {
    fn entry(&self, key: &'static str, value: String, env_keys: &[&str]) -> ConfigEntry {
        ConfigEntry { key, value, source: self.source(key, env_keys) }
    }

    fn source(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| is_set(key)) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.file_doc {
            if contains_path(doc, key_path) {
                let file_path = self.file_path.as_deref().unwrap_or("config file");
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn is_set(key: &str) -> bool {
    env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
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

fn format_name(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    }
}
