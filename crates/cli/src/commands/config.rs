use std::env;
use std::fs;
use std::path::Path;

use callflow_core::config::{resolve_config_path, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

use crate::commands::{load_config, CommandResult};

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config("config", options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let livekit_url =
        if config.livekit.url.is_empty() { "<unset>" } else { config.livekit.url.as_str() };
    let livekit_key = config.livekit.api_key.as_deref().map(redact_key);
    let providers = &config.providers;

    let fields = [
        ("livekit.url", livekit_url.to_string(), &["LIVEKIT_URL"][..]),
        (
            "livekit.api_key",
            livekit_key.unwrap_or_else(|| "<unset>".to_string()),
            &["LIVEKIT_API_KEY"][..],
        ),
        (
            "livekit.api_secret",
            redact_secret(config.livekit.api_secret.as_ref()),
            &["LIVEKIT_API_SECRET"][..],
        ),
        ("providers.stt_model", providers.stt_model.clone(), &["CALLFLOW_STT_MODEL"][..]),
        ("providers.llm_model", providers.llm_model.clone(), &["CALLFLOW_LLM_MODEL"][..]),
        (
            "providers.tts_provider",
            providers.tts_provider.to_string(),
            &["CALLFLOW_TTS_PROVIDER"][..],
        ),
        (
            "providers.deepgram_api_key",
            redact_secret(providers.deepgram_api_key.as_ref()),
            &["DEEPGRAM_API_KEY"][..],
        ),
        (
            "providers.openai_api_key",
            redact_secret(providers.openai_api_key.as_ref()),
            &["OPENAI_API_KEY"][..],
        ),
        (
            "providers.cartesia_api_key",
            redact_secret(providers.cartesia_api_key.as_ref()),
            &["CARTESIA_API_KEY"][..],
        ),
        (
            "providers.elevenlabs_api_key",
            redact_secret(providers.elevenlabs_api_key.as_ref()),
            &["ELEVEN_API_KEY"][..],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["CALLFLOW_LOGGING_LEVEL", "CALLFLOW_LOG_LEVEL"][..],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            &["CALLFLOW_LOGGING_FORMAT", "CALLFLOW_LOG_FORMAT"][..],
        ),
    ];

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in fields {
        lines.push(render_line(key, &value, source(key, env_keys)));
    }
    CommandResult { exit_code: 0, output: lines.join("\n") }
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

/// Keeps the `API` prefix LiveKit keys carry and hides the rest.
fn redact_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.get(..3) {
        Some(prefix) if trimmed.len() > 6 => format!("{prefix}***"),
        _ => "<redacted>".to_string(),
    }
}

fn redact_secret(secret: Option<&SecretString>) -> String {
    match secret {
        Some(secret) if secret.expose_secret().trim().is_empty() => "<empty>".to_string(),
        Some(_) => "<redacted>".to_string(),
        None => "<unset>".to_string(),
    }
}
