//! Spotify credentials.
//!
//! Credentials come from a TOML file and can be overridden per field by
//! environment variables:
//!
//! ```toml
//! username = "spotify-user"
//! client_id = "..."
//! client_secret = "..."
//! redirect_uri = "http://localhost:8888"   # optional
//! ```
//!
//! Lookup order for the file: `--credentials`, `./spotify_credentials.toml`,
//! `~/.config/playlist-import/spotify_credentials.toml`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ImportError, Result};

pub const CREDENTIALS_FILE: &str = "spotify_credentials.toml";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8888";

/// Environment overrides, one per field
pub const ENV_USERNAME: &str = "SPOTIFY_USERNAME";
pub const ENV_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "SPOTIFY_REDIRECT_URI";

/// Fields as they appear in the credentials file, all optional
#[derive(Debug, Default, Deserialize)]
struct CredentialsFile {
    username: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
}

/// Account and app registration used to authorize against Spotify
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl Credentials {
    /// Load credentials from the first file found plus the process environment
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) => Some(read_file(path)?),
            None => default_paths()
                .into_iter()
                .find(|p| p.is_file())
                .map(|p| read_file(&p))
                .transpose()?,
        };
        Self::from_sources(file.unwrap_or_default(), |key| std::env::var(key).ok())
    }

    /// Parse credentials from TOML text, without environment overrides
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: CredentialsFile = toml::from_str(content)?;
        Self::from_sources(file, |_| None)
    }

    fn from_sources(file: CredentialsFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let pick = |key: &str, value: Option<String>| -> Option<String> {
            env(key).or(value).filter(|v| !v.trim().is_empty())
        };
        let require = |key: &str, field: &str, value: Option<String>| -> Result<String> {
            pick(key, value).ok_or_else(|| {
                ImportError::Config(format!(
                    "missing {} (set it in {} or via {})",
                    field, CREDENTIALS_FILE, key
                ))
            })
        };

        Ok(Credentials {
            username: require(ENV_USERNAME, "username", file.username)?,
            client_id: require(ENV_CLIENT_ID, "client_id", file.client_id)?,
            client_secret: require(ENV_CLIENT_SECRET, "client_secret", file.client_secret)?,
            redirect_uri: pick(ENV_REDIRECT_URI, file.redirect_uri)
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
        })
    }

    /// Where the OAuth token for this user is cached between runs
    pub fn token_cache_path(&self) -> PathBuf {
        PathBuf::from(format!(".cache-{}", self.username))
    }
}

fn read_file(path: &Path) -> Result<CredentialsFile> {
    debug!("reading credentials from {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| {
        ImportError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(toml::from_str(&content)?)
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CREDENTIALS_FILE)];
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(
            PathBuf::from(home)
                .join(".config/playlist-import")
                .join(CREDENTIALS_FILE),
        );
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const FULL: &str = r#"
        username = "alice"
        client_id = "id123"
        client_secret = "s3cret"
    "#;

    #[test]
    fn test_from_toml_defaults_redirect() {
        let creds = Credentials::from_toml(FULL).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.client_id, "id123");
        assert_eq!(creds.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(creds.token_cache_path(), PathBuf::from(".cache-alice"));
    }

    #[test]
    fn test_missing_field_is_config_error() {
        let err = Credentials::from_toml("username = \"alice\"").unwrap_err();
        assert!(matches!(err, ImportError::Config(_)));
        assert!(err.to_string().contains("client_id"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            Credentials::from_toml("username = ").unwrap_err(),
            ImportError::Config(_)
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let file: CredentialsFile = toml::from_str(FULL).unwrap();
        let env: HashMap<&str, &str> = [
            (ENV_CLIENT_SECRET, "from-env"),
            (ENV_REDIRECT_URI, "http://127.0.0.1:9090/callback"),
        ]
        .into_iter()
        .collect();

        let creds =
            Credentials::from_sources(file, |key| env.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.client_secret, "from-env");
        assert_eq!(creds.redirect_uri, "http://127.0.0.1:9090/callback");
    }

    #[test]
    fn test_env_only() {
        let creds = Credentials::from_sources(CredentialsFile::default(), |key| match key {
            ENV_USERNAME => Some("bob".to_string()),
            ENV_CLIENT_ID => Some("cid".to_string()),
            ENV_CLIENT_SECRET => Some("csecret".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(creds.username, "bob");
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let err = Credentials::from_toml("username = \"alice\"\nclient_id = \" \"\nclient_secret = \"x\"")
            .unwrap_err();
        assert!(err.to_string().contains("client_id"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.toml");
        fs::write(&path, FULL).unwrap();

        let creds = Credentials::load(Some(&path)).unwrap();
        assert!(!creds.client_id.is_empty());

        assert!(Credentials::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::from_toml(FULL).unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("s3cret"));
    }
}
