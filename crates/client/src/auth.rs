//! Session token handling: a persisted `token` cookie and its decoded claims.
//!
//! Claims are decoded without verifying the signature. Verification is the
//! API's job; the client only needs the identity to display and the expiry.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const TOKEN_COOKIE: &str = "token";
pub const TOKEN_MAX_AGE_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
struct StoredCookie {
    name: String,
    value: String,
    expires_at: DateTime<Utc>,
}

/// File-backed stand-in for the browser cookie holding the session token.
#[derive(Debug, Clone)]
pub struct CookieJar {
    path: PathBuf,
}

impl CookieJar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored token, or `None` when there is no cookie or its max-age elapsed.
    pub fn read_token(&self, now: DateTime<Utc>) -> Result<Option<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let cookie: StoredCookie = serde_json::from_str(&content)?;
        if cookie.name != TOKEN_COOKIE || cookie.expires_at <= now {
            return Ok(None);
        }
        Ok(Some(cookie.value))
    }

    pub fn store_token(&self, token: &str, now: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let cookie = StoredCookie {
            name: TOKEN_COOKIE.to_string(),
            value: token.to_string(),
            expires_at: now + Duration::seconds(TOKEN_MAX_AGE_SECS),
        };
        fs::write(&self.path, serde_json::to_string(&cookie)?)?;
        Ok(())
    }

    /// Logout.
    pub fn clear_token(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    nameid: Option<String>,
    unique_name: Option<String>,
    email: Option<String>,
    exp: Option<i64>,
}

/// Identity carried by the session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub id: String,
    pub nome: String,
    pub email: String,
    pub exp: Option<i64>,
}

/// Decodes the token payload. Malformed tokens yield `None`.
pub fn decode_claims(token: &str) -> Option<SessionClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<RawClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => {
            let raw = data.claims;
            Some(SessionClaims {
                id: raw.nameid.unwrap_or_default(),
                nome: raw.unique_name.unwrap_or_default(),
                email: raw.email.unwrap_or_default(),
                exp: raw.exp,
            })
        }
        Err(e) => {
            tracing::warn!("Failed to decode session token: {e}");
            None
        }
    }
}

pub fn is_expired(exp: i64, now: DateTime<Utc>) -> bool {
    now.timestamp() >= exp
}

/// A token is valid when it decodes and carries an `exp` that is still in the future.
pub fn is_token_valid(token: &str, now: DateTime<Utc>) -> bool {
    decode_claims(token)
        .and_then(|claims| claims.exp)
        .is_some_and(|exp| !is_expired(exp, now))
}

/// Guard for the dashboard: the token to use, or `None` when the user must log in again.
pub fn authenticated_token(jar: &CookieJar, now: DateTime<Utc>) -> Option<String> {
    match jar.read_token(now) {
        Ok(Some(token)) if is_token_valid(&token, now) => Some(token),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("Could not read {}: {e}", jar.path().display());
            None
        }
    }
}
