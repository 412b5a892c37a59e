use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::{DEFAULT_LLM_MODEL, DEFAULT_STT_MODEL};
use crate::voice::TtsProvider;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub livekit: LiveKitConfig,
    pub providers: ProviderConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LiveKitConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub stt_model: String,
    pub llm_model: String,
    pub tts_provider: TtsProvider,
    pub deepgram_api_key: Option<SecretString>,
    pub openai_api_key: Option<SecretString>,
    pub cartesia_api_key: Option<SecretString>,
    pub elevenlabs_api_key: Option<SecretString>,
}

#[derive(Clone, Debug)]
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
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

impl LoadOptions {
    /// Options for a `--config` flag: a given path must exist, otherwise the
    /// default locations are searched.
    pub fn from_flag(config_path: Option<PathBuf>) -> Self {
        Self { require_file: config_path.is_some(), config_path }
    }
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
            livekit: LiveKitConfig { url: String::new(), api_key: None, api_secret: None },
            providers: ProviderConfig {
                stt_model: DEFAULT_STT_MODEL.to_string(),
                llm_model: DEFAULT_LLM_MODEL.to_string(),
                tts_provider: TtsProvider::Cartesia,
                deepgram_api_key: None,
                openai_api_key: None,
                cartesia_api_key: None,
                elevenlabs_api_key: None,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
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

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("callflow.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(livekit) = patch.livekit {
            if let Some(url) = livekit.url {
                self.livekit.url = url;
            }
            if let Some(api_key) = livekit.api_key {
                self.livekit.api_key = Some(api_key);
            }
            if let Some(livekit_api_secret_value) = livekit.api_secret {
                self.livekit.api_secret = Some(secret_value(livekit_api_secret_value));
            }
        }

        if let Some(providers) = patch.providers {
            if let Some(stt_model) = providers.stt_model {
                self.providers.stt_model = stt_model;
            }
            if let Some(llm_model) = providers.llm_model {
                self.providers.llm_model = llm_model;
            }
            if let Some(tts_provider) = providers.tts_provider {
                self.providers.tts_provider =
                    parse_tts_provider("providers.tts_provider", &tts_provider)?;
            }
            if let Some(value) = providers.deepgram_api_key {
                self.providers.deepgram_api_key = Some(secret_value(value));
            }
            if let Some(value) = providers.openai_api_key {
                self.providers.openai_api_key = Some(secret_value(value));
            }
            if let Some(value) = providers.cartesia_api_key {
                self.providers.cartesia_api_key = Some(secret_value(value));
            }
            if let Some(value) = providers.elevenlabs_api_key {
                self.providers.elevenlabs_api_key = Some(secret_value(value));
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

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("LIVEKIT_URL") {
            self.livekit.url = value;
        }
        if let Some(value) = read_env("LIVEKIT_API_KEY") {
            self.livekit.api_key = Some(value);
        }
        if let Some(value) = read_env("LIVEKIT_API_SECRET") {
            self.livekit.api_secret = Some(secret_value(value));
        }

        if let Some(value) = read_env("CALLFLOW_STT_MODEL") {
            self.providers.stt_model = value;
        }
        if let Some(value) = read_env("CALLFLOW_LLM_MODEL") {
            self.providers.llm_model = value;
        }
        if let Some(value) = read_env("CALLFLOW_TTS_PROVIDER") {
            self.providers.tts_provider = parse_tts_provider("CALLFLOW_TTS_PROVIDER", &value)?;
        }
        if let Some(value) = read_env("DEEPGRAM_API_KEY") {
            self.providers.deepgram_api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("OPENAI_API_KEY") {
            self.providers.openai_api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("CARTESIA_API_KEY") {
            self.providers.cartesia_api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("ELEVEN_API_KEY") {
            self.providers.elevenlabs_api_key = Some(secret_value(value));
        }

        let log_level =
            read_env("CALLFLOW_LOGGING_LEVEL").or_else(|| read_env("CALLFLOW_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CALLFLOW_LOGGING_FORMAT").or_else(|| read_env("CALLFLOW_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_livekit(&self.livekit)?;
        validate_providers(&self.providers)?;
        validate_logging(&self.logging)?;
        Ok(())
    }

    /// Checks that a worker could actually reach the transport and the
    /// selected speech providers.
    pub fn validate_credentials(&self) -> Result<(), ConfigError> {
        if self.livekit.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "livekit.url is required to run a worker (set LIVEKIT_URL)".to_string(),
            ));
        }
        if self.livekit.api_key.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            return Err(ConfigError::Validation(
                "livekit.api_key is required to run a worker (set LIVEKIT_API_KEY)".to_string(),
            ));
        }
        if !has_secret(self.livekit.api_secret.as_ref()) {
            return Err(ConfigError::Validation(
                "livekit.api_secret is required to run a worker (set LIVEKIT_API_SECRET)"
                    .to_string(),
            ));
        }

        let (tts_key, tts_env) = match self.providers.tts_provider {
            TtsProvider::Cartesia => (&self.providers.cartesia_api_key, "CARTESIA_API_KEY"),
            TtsProvider::ElevenLabs => (&self.providers.elevenlabs_api_key, "ELEVEN_API_KEY"),
        };
        if !has_secret(tts_key.as_ref()) {
            return Err(ConfigError::Validation(format!(
                "providers.{}_api_key is required for the selected tts provider (set {tts_env})",
                self.providers.tts_provider
            )));
        }

        if self.providers.stt_model.starts_with("deepgram/")
            && !has_secret(self.providers.deepgram_api_key.as_ref())
        {
            return Err(ConfigError::Validation(
                "providers.deepgram_api_key is required for deepgram stt models (set DEEPGRAM_API_KEY)"
                    .to_string(),
            ));
        }
        if self.providers.llm_model.starts_with("openai/")
            && !has_secret(self.providers.openai_api_key.as_ref())
        {
            return Err(ConfigError::Validation(
                "providers.openai_api_key is required for openai llm models (set OPENAI_API_KEY)"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

/// The config file `load` would read: the explicit path when it exists,
/// else `callflow.toml` or `config/callflow.toml` in the working directory.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("callflow.toml"), PathBuf::from("config/callflow.toml")]
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

fn validate_livekit(livekit: &LiveKitConfig) -> Result<(), ConfigError> {
    let url = livekit.url.trim();
    if url.is_empty() {
        return Ok(());
    }

    let supported = ["ws://", "wss://", "http://", "https://"];
    if !supported.iter().any(|scheme| url.starts_with(scheme)) {
        return Err(ConfigError::Validation(
            "livekit.url must start with ws://, wss://, http:// or https://".to_string(),
        ));
    }

    Ok(())
}

fn validate_providers(providers: &ProviderConfig) -> Result<(), ConfigError> {
    if providers.stt_model.trim().is_empty() {
        return Err(ConfigError::Validation("providers.stt_model must not be empty".to_string()));
    }
    if providers.llm_model.trim().is_empty() {
        return Err(ConfigError::Validation("providers.llm_model must not be empty".to_string()));
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

// Only the two names in the voice tables are accepted here; the lenient
// fallback in `TtsProvider::resolve` is reserved for voice lookups.
fn parse_tts_provider(key: &str, value: &str) -> Result<TtsProvider, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "cartesia" => Ok(TtsProvider::Cartesia),
        "elevenlabs" => Ok(TtsProvider::ElevenLabs),
        _ => {
            Err(ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
        }
    }
}

fn has_secret(secret: Option<&SecretString>) -> bool {
    secret.map(|value| !value.expose_secret().trim().is_empty()).unwrap_or(false)
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    livekit: Option<LiveKitPatch>,
    providers: Option<ProvidersPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LiveKitPatch {
    url: Option<String>,
    api_key: Option<String>,
    api_secret: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProvidersPatch {
    stt_model: Option<String>,
    llm_model: Option<String>,
    tts_provider: Option<String>,
    deepgram_api_key: Option<String>,
    openai_api_key: Option<String>,
    cartesia_api_key: Option<String>,
    elevenlabs_api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, LoadOptions, LogFormat};
    use crate::voice::TtsProvider;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const MANAGED_VARS: &[&str] = &[
        "LIVEKIT_URL",
        "LIVEKIT_API_KEY",
        "LIVEKIT_API_SECRET",
        "CALLFLOW_STT_MODEL",
        "CALLFLOW_LLM_MODEL",
        "CALLFLOW_TTS_PROVIDER",
        "DEEPGRAM_API_KEY",
        "OPENAI_API_KEY",
        "CARTESIA_API_KEY",
        "ELEVEN_API_KEY",
        "CALLFLOW_LOG_LEVEL",
        "CALLFLOW_LOG_FORMAT",
        "CALLFLOW_LOGGING_LEVEL",
        "CALLFLOW_LOGGING_FORMAT",
        "TEST_LIVEKIT_SECRET",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_load_without_file_or_env() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.providers.stt_model == "deepgram/nova-2", "default stt model")?;
        ensure(config.providers.llm_model == "openai/gpt-4o-mini", "default llm model")?;
        ensure(config.providers.tts_provider == TtsProvider::Cartesia, "default tts provider")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "default format is compact")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);

        env::set_var("TEST_LIVEKIT_SECRET", "secret-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("callflow.toml");
            fs::write(
                &path,
                r#"
[livekit]
url = "wss://example.livekit.cloud"
api_key = "APIkey"
api_secret = "${TEST_LIVEKIT_SECRET}"

[providers]
tts_provider = "elevenlabs"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            let secret = config.livekit.api_secret.as_ref().map(|value| value.expose_secret());
            ensure(secret == Some("secret-from-env"), "secret should be interpolated from env")?;
            ensure(
                config.providers.tts_provider == TtsProvider::ElevenLabs,
                "tts provider should come from the file",
            )?;
            Ok(())
        })();

        clear_vars(MANAGED_VARS);
        result
    }

    #[test]
    fn precedence_defaults_file_env() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);

        env::set_var("LIVEKIT_URL", "wss://from-env.livekit.cloud");
        env::set_var("CALLFLOW_LLM_MODEL", "openai/gpt-4o");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("callflow.toml");
            fs::write(
                &path,
                r#"
[livekit]
url = "wss://from-file.livekit.cloud"

[providers]
llm_model = "openai/from-file"
stt_model = "deepgram/nova-3"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions::from_flag(Some(path)))
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.livekit.url == "wss://from-env.livekit.cloud",
                "env livekit url should win over file",
            )?;
            ensure(config.providers.llm_model == "openai/gpt-4o", "env llm model should win")?;
            ensure(config.providers.stt_model == "deepgram/nova-3", "file stt model should apply")?;
            ensure(config.logging.level == "warn", "file log level should apply")?;
            Ok(())
        })();

        clear_vars(MANAGED_VARS);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);

        env::set_var("CALLFLOW_LOG_LEVEL", "warn");
        env::set_var("CALLFLOW_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json logging format should be set from env var",
            )
        })();

        clear_vars(MANAGED_VARS);
        result
    }

    #[test]
    fn invalid_tts_provider_in_env_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);

        env::set_var("CALLFLOW_TTS_PROVIDER", "polly");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected invalid provider to fail".to_string()),
            Err(error) => ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. }
                        if key == "CALLFLOW_TTS_PROVIDER"
                ),
                "error should name CALLFLOW_TTS_PROVIDER",
            ),
        };

        clear_vars(MANAGED_VARS);
        result
    }

    #[test]
    fn credential_check_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);

        env::set_var("LIVEKIT_URL", "wss://example.livekit.cloud");
        env::set_var("LIVEKIT_API_KEY", "APIkey");
        env::set_var("LIVEKIT_API_SECRET", "secret");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let error = match config.validate_credentials() {
                Ok(()) => return Err("expected credential failure but check passed".to_string()),
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("CARTESIA_API_KEY")
            );
            ensure(has_message, "credential failure should mention CARTESIA_API_KEY")
        })();

        clear_vars(MANAGED_VARS);
        result
    }

    #[test]
    fn explicit_config_path_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");

        match AppConfig::load(LoadOptions::from_flag(Some(missing.clone()))) {
            Ok(_) => Err("expected a missing explicit config file to fail".to_string()),
            Err(error) => ensure(
                matches!(error, ConfigError::MissingConfigFile(ref path) if *path == missing),
                "error should name the missing file",
            ),
        }
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(MANAGED_VARS);

        env::set_var("LIVEKIT_API_SECRET", "lk-secret-value");
        env::set_var("CARTESIA_API_KEY", "sk-cartesia-secret");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("lk-secret-value"), "debug output should not contain secret")?;
            ensure(
                !debug.contains("sk-cartesia-secret"),
                "debug output should not contain provider key",
            )
        })();

        clear_vars(MANAGED_VARS);
        result
    }
}
