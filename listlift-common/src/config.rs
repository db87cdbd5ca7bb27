//! Configuration resolution for listlift
//!
//! Provides two-tier credential resolution with ENV -> TOML priority. The
//! resolved `Config` value is handed to the Spotify client at construction;
//! nothing reads ambient process state after startup.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const ENV_CLIENT_ID: &str = "LISTLIFT_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "LISTLIFT_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "LISTLIFT_REDIRECT_URI";
pub const ENV_TOKEN_CACHE: &str = "LISTLIFT_TOKEN_CACHE";

/// Redirect URI registered for the app when none is configured
pub const DEFAULT_REDIRECT_URI: &str = "http://example.com/";

/// Optional keys from the TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub token_cache: Option<PathBuf>,
}

impl TomlConfig {
    /// Load the TOML file at `path`; a missing file yields empty defaults
    /// (credentials may still arrive via environment variables).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }
}

/// Fully-resolved configuration passed to the Spotify client
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Where the OAuth token JSON is cached between runs
    pub token_cache: PathBuf,
}

impl Config {
    /// Resolve from the default config file location plus environment
    pub fn load() -> Result<Self> {
        let toml_config = TomlConfig::load(&default_config_path()?)?;
        Self::resolve(&toml_config)
    }

    /// Resolve each key with ENV -> TOML priority
    pub fn resolve(toml_config: &TomlConfig) -> Result<Self> {
        let client_id = resolve_key(ENV_CLIENT_ID, toml_config.client_id.as_deref(), "client_id")
            .ok_or_else(|| missing_credential_error("client_id", ENV_CLIENT_ID))?;
        let client_secret = resolve_key(
            ENV_CLIENT_SECRET,
            toml_config.client_secret.as_deref(),
            "client_secret",
        )
        .ok_or_else(|| missing_credential_error("client_secret", ENV_CLIENT_SECRET))?;
        let redirect_uri = resolve_key(
            ENV_REDIRECT_URI,
            toml_config.redirect_uri.as_deref(),
            "redirect_uri",
        )
        .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());
        let token_cache = match std::env::var(ENV_TOKEN_CACHE) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => match &toml_config.token_cache {
                Some(path) => path.clone(),
                None => default_token_cache()?,
            },
        };

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
            token_cache,
        })
    }
}

/// Resolve one string key, warning when both sources carry a value
fn resolve_key(env_name: &str, toml_value: Option<&str>, key_name: &str) -> Option<String> {
    let env_value = std::env::var(env_name).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v)).map(str::to_string);

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in both {} and config file. Using environment (highest priority).",
            key_name, env_name
        );
    }

    env_value.or(toml_value)
}

fn missing_credential_error(key_name: &str, env_name: &str) -> Error {
    Error::Config(format!(
        "Spotify {key} not configured. Please configure using one of:\n\
         1. Environment: {env}=your-value-here\n\
         2. TOML config: ~/.config/listlift/config.toml ({key} = \"your-value\")\n\
         \n\
         Register an app at: https://developer.spotify.com/dashboard",
        key = key_name,
        env = env_name,
    ))
}

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Default config file path: `<platform config dir>/listlift/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("listlift").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Default token cache path: `<platform config dir>/listlift/token.json`
pub fn default_token_cache() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("listlift").join("token.json"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};

    // Tests in this module mutate process environment; serialize them.
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn clear_env() {
        std::env::remove_var(ENV_CLIENT_ID);
        std::env::remove_var(ENV_CLIENT_SECRET);
        std::env::remove_var(ENV_REDIRECT_URI);
        std::env::remove_var(ENV_TOKEN_CACHE);
    }

    #[test]
    fn toml_file_supplies_credentials() {
        let _guard = lock_env();
        clear_env();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "client_id = \"id-from-toml\"\nclient_secret = \"secret-from-toml\"\n\
             redirect_uri = \"http://localhost:8080/\"\ntoken_cache = \"/tmp/ll-token.json\""
        )
        .unwrap();

        let toml_config = TomlConfig::load(file.path()).unwrap();
        let config = Config::resolve(&toml_config).unwrap();
        assert_eq!(config.client_id, "id-from-toml");
        assert_eq!(config.client_secret, "secret-from-toml");
        assert_eq!(config.redirect_uri, "http://localhost:8080/");
        assert_eq!(config.token_cache, PathBuf::from("/tmp/ll-token.json"));
    }

    #[test]
    fn env_overrides_toml() {
        let _guard = lock_env();
        clear_env();
        std::env::set_var(ENV_CLIENT_ID, "id-from-env");
        std::env::set_var(ENV_CLIENT_SECRET, "secret-from-env");

        let toml_config = TomlConfig {
            client_id: Some("id-from-toml".to_string()),
            client_secret: Some("secret-from-toml".to_string()),
            redirect_uri: None,
            token_cache: Some(PathBuf::from("/tmp/ll-token.json")),
        };
        let config = Config::resolve(&toml_config).unwrap();
        assert_eq!(config.client_id, "id-from-env");
        assert_eq!(config.client_secret, "secret-from-env");
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);

        clear_env();
    }

    #[test]
    fn missing_credentials_is_config_error() {
        let _guard = lock_env();
        clear_env();

        let result = Config::resolve(&TomlConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let toml_config = TomlConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert!(toml_config.client_id.is_none());
        assert!(toml_config.client_secret.is_none());
    }

    #[test]
    fn whitespace_credentials_rejected() {
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
        assert!(is_valid_key("abc123"));
    }
}
