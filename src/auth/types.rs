// Authentication types

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AuthError, TokenKind};

/// Token pair returned by the DHL Parcel auth endpoints.
///
/// Expirations are absolute UTC epoch seconds. Field names match the
/// carrier's JSON so the bundle is stored exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBundle {
    pub access_token: String,
    pub access_token_expiration: i64,
    pub refresh_token: String,
    pub refresh_token_expiration: i64,
}

impl TokenBundle {
    /// True once the access token expiration lies strictly in the past
    pub fn is_access_token_expired(&self) -> bool {
        is_expired_at(self.access_token_expiration, Utc::now().timestamp())
    }

    /// True once the refresh token expiration lies strictly in the past
    pub fn is_refresh_token_expired(&self) -> bool {
        is_expired_at(self.refresh_token_expiration, Utc::now().timestamp())
    }
}

/// Static account credentials
#[derive(Clone)]
pub struct Credentials {
    pub user_id: String,
    /// Only needed when no usable refresh token is available
    pub key: Option<String>,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, key: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            key,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("key", &self.key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// In-memory copy of the active token bundle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: Option<String>,
    pub access_token_exp: Option<i64>,
    pub refresh_token: Option<String>,
    pub refresh_token_exp: Option<i64>,
}

impl AuthSession {
    pub fn from_bundle(bundle: &TokenBundle) -> Self {
        Self {
            access_token: Some(bundle.access_token.clone()),
            access_token_exp: Some(bundle.access_token_expiration),
            refresh_token: Some(bundle.refresh_token.clone()),
            refresh_token_exp: Some(bundle.refresh_token_expiration),
        }
    }

    /// Check whether the given token has expired at `now` (epoch seconds).
    ///
    /// Fails when the expiration was never populated.
    pub fn is_token_expired_at(&self, kind: TokenKind, now: i64) -> Result<bool, AuthError> {
        let expiration = match kind {
            TokenKind::Access => self.access_token_exp,
            TokenKind::Refresh => self.refresh_token_exp,
        }
        .ok_or(AuthError::MissingExpiration(kind))?;

        Ok(is_expired_at(expiration, now))
    }

    pub fn is_token_expired(&self, kind: TokenKind) -> Result<bool, AuthError> {
        self.is_token_expired_at(kind, Utc::now().timestamp())
    }
}

fn is_expired_at(expiration: i64, now: i64) -> bool {
    expiration < now
}

/// Full authentication request body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRequest<'a> {
    pub user_id: &'a str,
    pub key: &'a str,
}

/// Refresh exchange request body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest<'a> {
    pub refresh_token: &'a str,
}

/// Unprocessed response of an auth exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}
