// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 PhimHub contributors

use crate::config::Config;
use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Claims we care about from the PhimHub JWT payload. The signature is not
/// verified client-side; the token is only inspected for expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl JwtClaims {
    pub fn is_expired(&self) -> bool {
        match self.exp {
            Some(exp) => exp <= Utc::now().timestamp(),
            None => false,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

/// Decode the payload segment of a JWT without verifying the signature.
pub fn decode_claims(token: &str) -> Result<JwtClaims> {
    let mut segments = token.split('.');
    let payload = segments
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Token has no payload segment"))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .with_context(|| "Token payload is not valid base64")?;

    let claims: JwtClaims =
        serde_json::from_slice(&bytes).with_context(|| "Token payload is not valid JSON")?;

    Ok(claims)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    saved_at: DateTime<Utc>,
}

/// Persists one bearer token per server under the config directory.
#[derive(Debug)]
pub struct TokenStore {
    tokens_dir: PathBuf,
}

impl TokenStore {
    pub fn new() -> Result<Self> {
        let config_dir = Config::ensure_config_dir()?;
        let tokens_dir = config_dir.join("tokens");

        if !tokens_dir.exists() {
            fs::create_dir_all(&tokens_dir).with_context(|| {
                format!("Failed to create tokens directory: {}", tokens_dir.display())
            })?;
        }

        Ok(Self { tokens_dir })
    }

    fn token_path(&self, server_hash: &str) -> PathBuf {
        self.tokens_dir.join(format!("{}.json", server_hash))
    }

    /// Load the stored token for a server. An expired or undecodable token
    /// is treated as absent, matching how the web client seeds its session.
    pub fn load(&self, server_hash: &str) -> Result<Option<String>> {
        let path = self.token_path(server_hash);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read token file: {}", path.display()))?;

        let stored: StoredToken =
            serde_json::from_str(&content).with_context(|| "Failed to parse token JSON")?;

        match decode_claims(&stored.token) {
            Ok(claims) if claims.is_expired() => {
                debug!("Stored token for {} is expired, discarding", server_hash);
                let _ = fs::remove_file(&path);
                Ok(None)
            }
            Ok(_) => Ok(Some(stored.token)),
            Err(e) => {
                debug!("Stored token for {} is undecodable: {}", server_hash, e);
                let _ = fs::remove_file(&path);
                Ok(None)
            }
        }
    }

    pub fn save(&self, server_hash: &str, token: &str) -> Result<()> {
        let path = self.token_path(server_hash);
        let stored = StoredToken {
            token: token.to_string(),
            saved_at: Utc::now(),
        };

        let content =
            serde_json::to_string_pretty(&stored).with_context(|| "Failed to serialize token")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write token file: {}", path.display()))?;

        Ok(())
    }

    pub fn clear(&self, server_hash: &str) -> Result<()> {
        let path = self.token_path(server_hash);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove token file: {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{}.{}.signature", header, payload)
    }

    #[test]
    fn decodes_exp_and_email() {
        let token = make_token(&serde_json::json!({
            "sub": "42",
            "email": "user@example.com",
            "exp": 4102444800i64,
        }));

        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.email.as_deref(), Some("user@example.com"));
        assert_eq!(claims.exp, Some(4102444800));
        assert!(!claims.is_expired());
    }

    #[test]
    fn past_exp_is_expired() {
        let token = make_token(&serde_json::json!({ "exp": 1000000000i64 }));
        let claims = decode_claims(&token).unwrap();
        assert!(claims.is_expired());
    }

    #[test]
    fn missing_exp_never_expires() {
        let token = make_token(&serde_json::json!({ "sub": "42" }));
        let claims = decode_claims(&token).unwrap();
        assert!(!claims.is_expired());
    }

    #[test]
    fn garbage_token_is_an_error() {
        assert!(decode_claims("not-a-jwt").is_err());
        assert!(decode_claims("a.%%%.c").is_err());
    }
}
