mod loader;
pub mod secrets;
pub mod value;

use std::collections::HashMap;
use std::path::Path;

pub use secrets::{DefaultSecretResolver, SecretResolver};
pub use value::{ConfigValue, FromConfigValue};

/// Environment variable naming the active profile.
pub const PROFILE_ENV: &str = "OOM_PROFILE";

/// Only environment variables with this prefix are overlaid onto the config.
pub const ENV_PREFIX: &str = "OOM_";

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The requested key was not found in the configuration.
    NotFound(String),
    /// The value could not be converted to the requested type.
    TypeMismatch { key: String, expected: &'static str },
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Layered configuration for the verifier.
///
/// Resolution order (lowest to highest priority):
/// 1. `application.yaml`
/// 2. `application-{profile}.yaml`
/// 3. `.env` and `.env.{profile}` (loaded into the process environment, never
///    overwriting variables that are already set)
/// 4. `OOM_*` environment variables
///
/// An environment variable overrides the existing key whose upper-cased,
/// underscore-joined form matches it, so `OOM_POOL_MAX_CONNECTIONS` replaces
/// `oom.pool.max_connections`. Variables that match no existing key land under
/// the plain lower-cased dotted form (`OOM_MYSQL_URL` -> `oom.mysql.url`).
///
/// Profile is determined by: `OOM_PROFILE` env var > argument > default `"dev"`.
#[derive(Debug, Clone)]
pub struct OomConfig {
    values: HashMap<String, ConfigValue>,
    profile: String,
}

impl OomConfig {
    /// Load from the current working directory with the default secret resolver.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), profile, &DefaultSecretResolver)
    }

    /// Load from `dir`: YAML files and `.env` files are looked up there.
    pub fn load_from(
        dir: &Path,
        profile: &str,
        resolver: &dyn SecretResolver,
    ) -> Result<Self, ConfigError> {
        let active_profile = std::env::var(PROFILE_ENV).unwrap_or_else(|_| profile.to_string());

        let mut values = HashMap::new();
        loader::load_yaml_file(&dir.join("application.yaml"), &mut values)?;
        loader::load_yaml_file(
            &dir.join(format!("application-{active_profile}.yaml")),
            &mut values,
        )?;

        loader::load_dotenv(&dir.join(".env"))?;
        loader::load_dotenv(&dir.join(format!(".env.{active_profile}")))?;

        resolve_string_values(&mut values, resolver)?;
        overlay_env(&mut values, std::env::vars());

        tracing::debug!(profile = %active_profile, keys = values.len(), "Configuration loaded");
        Ok(OomConfig {
            values,
            profile: active_profile,
        })
    }

    /// Create a config from a YAML string.
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_str(yaml, &mut values)?;
        Ok(OomConfig {
            values,
            profile: profile.to_string(),
        })
    }

    pub fn empty() -> Self {
        OomConfig {
            values: HashMap::new(),
            profile: "test".to_string(),
        }
    }

    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Get a typed value for the given dot-separated key.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .lookup(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    /// Get a typed value, returning `default` if the key is missing.
    ///
    /// A present value of the wrong type is still an error.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> Result<V, ConfigError> {
        match self.get(key) {
            Err(ConfigError::NotFound(_)) => Ok(default),
            other => other,
        }
    }

    /// Like [`get`](Self::get) but a missing key is `None`.
    pub fn get_opt<V: FromConfigValue>(&self, key: &str) -> Result<Option<V>, ConfigError> {
        match self.get(key) {
            Ok(v) => Ok(Some(v)),
            Err(ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Exact key first, then any key with the same environment form, which is
    /// where an `OOM_*` override lands when no file declared the key.
    fn lookup(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key).or_else(|| {
            let wanted = env_form(key);
            self.values
                .iter()
                .find(|(k, _)| env_form(k) == wanted)
                .map(|(_, v)| v)
        })
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }
}

fn resolve_string_values(
    values: &mut HashMap<String, ConfigValue>,
    resolver: &dyn SecretResolver,
) -> Result<(), ConfigError> {
    for value in values.values_mut() {
        if let ConfigValue::String(s) = value {
            if s.contains("${") {
                *s = secrets::resolve_placeholders(s, resolver)?;
            }
        }
    }
    Ok(())
}

/// Upper-cased, underscore-joined form of a dotted key.
fn env_form(key: &str) -> String {
    key.to_uppercase().replace(['.', '-'], "_")
}

fn overlay_env(
    values: &mut HashMap<String, ConfigValue>,
    vars: impl IntoIterator<Item = (String, String)>,
) {
    let by_env_form: HashMap<String, String> =
        values.keys().map(|k| (env_form(k), k.clone())).collect();
    for (env_key, env_val) in vars {
        if !env_key.starts_with(ENV_PREFIX) || env_key == PROFILE_ENV {
            continue;
        }
        let config_key = match by_env_form.get(&env_key) {
            Some(key) => key.clone(),
            None => {
                let key = env_key.to_lowercase().replace('_', ".");
                tracing::debug!(env = %env_key, key = %key, "Environment override matches no configured key");
                key
            }
        };
        tracing::trace!(env = %env_key, key = %config_key, "Environment override");
        values.insert(config_key, ConfigValue::String(env_val));
    }
}
