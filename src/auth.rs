//! Spotify OAuth (authorization code flow) with an on-disk token cache.
//!
//! On the first run the user opens the printed authorize URL, approves the
//! app and pastes the URL they were redirected to. The resulting token is
//! cached next to the working directory and refreshed when it expires.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Credentials;
use crate::error::{ImportError, Result};

pub const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Permissions needed to create and fill playlists
pub const SCOPES: &str = "playlist-modify-public playlist-modify-private";

/// Treat tokens as expired this many seconds early
const EXPIRY_MARGIN_SECS: i64 = 60;

// ============================================================================
// Token Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
    #[serde(default)]
    scope: String,
}

/// Token as stored in the cache file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds)
    pub expires_at: i64,
    pub scope: String,
}

impl CachedToken {
    fn from_response(response: TokenResponse, now: i64) -> Self {
        CachedToken {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: now + response.expires_in,
            scope: response.scope,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= now
    }

    /// True if every scope we need was granted
    pub fn covers_scopes(&self) -> bool {
        SCOPES
            .split_whitespace()
            .all(|needed| self.scope.split_whitespace().any(|granted| granted == needed))
    }
}

// ============================================================================
// Cache
// ============================================================================

pub fn load_cached_token(path: &Path) -> Option<CachedToken> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(token) => Some(token),
        Err(e) => {
            warn!("ignoring unreadable token cache {}: {}", path.display(), e);
            None
        }
    }
}

pub fn save_cached_token(path: &Path, token: &CachedToken) -> Result<()> {
    fs::write(path, serde_json::to_string(token)?)?;
    Ok(())
}

// ============================================================================
// Authorization Code Flow
// ============================================================================

/// URL the user opens to approve the app
pub fn authorize_url(creds: &Credentials) -> Result<Url> {
    Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", creds.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", creds.redirect_uri.as_str()),
            ("scope", SCOPES),
        ],
    )
    .map_err(|e| ImportError::Config(format!("invalid authorize url: {}", e)))
}

/// Extract the authorization code from the redirect URL the user pasted
pub fn code_from_redirect(redirect: &str) -> Result<String> {
    let url = Url::parse(redirect.trim())
        .map_err(|e| ImportError::Authentication(format!("invalid redirect url: {}", e)))?;

    let mut code = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => {
                return Err(ImportError::Authentication(format!(
                    "authorization declined: {}",
                    value
                )))
            }
            _ => {}
        }
    }
    code.ok_or_else(|| ImportError::Authentication("redirect url has no code".to_string()))
}

fn basic_auth_header(creds: &Credentials) -> String {
    let pair = format!("{}:{}", creds.client_id, creds.client_secret);
    format!("Basic {}", STANDARD.encode(pair))
}

fn request_token(agent: &ureq::Agent, creds: &Credentials, form: &[(&str, &str)]) -> Result<CachedToken> {
    let response: TokenResponse = agent
        .post(TOKEN_URL)
        .set("Authorization", &basic_auth_header(creds))
        .send_form(form)?
        .into_json()?;
    Ok(CachedToken::from_response(response, Utc::now().timestamp()))
}

pub fn exchange_code(agent: &ureq::Agent, creds: &Credentials, code: &str) -> Result<CachedToken> {
    request_token(
        agent,
        creds,
        &[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", creds.redirect_uri.as_str()),
        ],
    )
}

/// Refresh an expired token. Spotify may omit the refresh token in the
/// response, in which case the old one stays valid.
pub fn refresh_token(agent: &ureq::Agent, creds: &Credentials, refresh: &str) -> Result<CachedToken> {
    let mut token = request_token(agent, creds, &[("grant_type", "refresh_token"), ("refresh_token", refresh)])?;
    if token.refresh_token.is_none() {
        token.refresh_token = Some(refresh.to_string());
    }
    if token.scope.is_empty() {
        token.scope = SCOPES.to_string();
    }
    Ok(token)
}

fn prompt_for_redirect(url: &Url, input: &mut impl BufRead) -> Result<String> {
    eprintln!("Open this URL in a browser and approve access:\n\n    {}\n", url);
    eprint!("Paste the URL you were redirected to: ");
    io::stderr().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    if line.trim().is_empty() {
        return Err(ImportError::Authentication("no redirect url entered".to_string()));
    }
    Ok(line)
}

fn obtain_token(agent: &ureq::Agent, creds: &Credentials, cache_path: &Path) -> Result<String> {
    if let Some(cached) = load_cached_token(cache_path) {
        if cached.covers_scopes() {
            if !cached.is_expired(Utc::now().timestamp()) {
                debug!("using cached token from {}", cache_path.display());
                return Ok(cached.access_token);
            }
            if let Some(refresh) = &cached.refresh_token {
                match refresh_token(agent, creds, refresh) {
                    Ok(token) => {
                        info!("refreshed access token");
                        if let Err(e) = save_cached_token(cache_path, &token) {
                            warn!("could not cache token: {}", e);
                        }
                        return Ok(token.access_token);
                    }
                    Err(e) => warn!("token refresh failed, authorizing again: {}", e),
                }
            }
        }
    }

    let url = authorize_url(creds)?;
    let redirect = prompt_for_redirect(&url, &mut io::stdin().lock())?;
    let code = code_from_redirect(&redirect)?;
    let token = exchange_code(agent, creds, &code)?;

    if let Err(e) = save_cached_token(cache_path, &token) {
        warn!("could not cache token: {}", e);
    }
    Ok(token.access_token)
}

/// Get a usable access token, from the cache or interactively.
/// Any failure is reported as an authentication failure.
pub fn authenticate(agent: &ureq::Agent, creds: &Credentials) -> Result<String> {
    obtain_token(agent, creds, &creds.token_cache_path()).map_err(|e| match e {
        ImportError::Authentication(_) => e,
        other => ImportError::Authentication(other.to_string()),
    })
}
