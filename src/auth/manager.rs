use std::sync::Arc;
use tokio::sync::RwLock;

use super::exchange;
use super::transport::AuthTransport;
use super::types::{AuthSession, Credentials, TokenBundle};
use crate::error::{AuthError, StoreError, TokenKind};
use crate::store::TokenStore;

/// URLs of the two auth exchanges
#[derive(Debug, Clone)]
pub struct AuthEndpoints {
    pub auth_url: String,
    pub refresh_url: String,
}

/// Authentication manager
/// Decides on every call whether to refresh or re-acquire tokens and keeps the
/// token store and the in-memory session in step
pub struct AuthManager {
    credentials: Credentials,

    endpoints: AuthEndpoints,

    /// Durable token cache, possibly shared with other managers
    store: Arc<TokenStore>,

    /// Transport for the unauthenticated exchange calls
    transport: Arc<dyn AuthTransport>,

    /// Currently active token fields
    session: RwLock<AuthSession>,
}

impl AuthManager {
    pub fn new(
        credentials: Credentials,
        endpoints: AuthEndpoints,
        store: Arc<TokenStore>,
        transport: Arc<dyn AuthTransport>,
    ) -> Self {
        Self {
            credentials,
            endpoints,
            store,
            transport,
            session: RwLock::new(AuthSession::default()),
        }
    }

    /// Obtain a token bundle for this account.
    ///
    /// 1. no cached bundle: authenticate with user id + key
    /// 2. cached access token expired, refresh token present and still valid: refresh
    /// 3. anything else: authenticate with user id + key
    ///
    /// Case 3 also covers a still-valid access token, so every call performs
    /// exactly one exchange. The result is persisted before it is returned.
    pub async fn authenticate(&self) -> Result<TokenBundle, AuthError> {
        let lock = self.store.account_lock(&self.credentials.user_id);
        let _guard = lock.lock().await;

        let Some(cached) = self.load_cached()? else {
            tracing::info!(
                "No cached tokens for user {}, authenticating with API key",
                self.credentials.user_id
            );
            return self.authenticate_with_key().await;
        };

        let session = AuthSession::from_bundle(&cached);
        *self.session.write().await = session.clone();

        let has_refresh_token = session.refresh_token.as_deref().is_some_and(|t| !t.is_empty());

        if has_refresh_token
            && session.is_token_expired(TokenKind::Access)?
            && !session.is_token_expired(TokenKind::Refresh)?
        {
            tracing::info!("Cached access token expired, using refresh token");
            self.refresh_locked().await
        } else {
            tracing::info!("Cached tokens cannot be refreshed, authenticating with API key");
            self.authenticate_with_key().await
        }
    }

    /// Run a refresh exchange with the refresh token of the current session.
    ///
    /// Fails with `RefreshUnavailable` when the session holds no refresh token
    /// or the refresh token has expired.
    pub async fn refresh(&self) -> Result<TokenBundle, AuthError> {
        let lock = self.store.account_lock(&self.credentials.user_id);
        let _guard = lock.lock().await;
        self.refresh_locked().await
    }

    /// Snapshot of the in-memory session
    pub async fn session(&self) -> AuthSession {
        self.session.read().await.clone()
    }

    pub fn user_id(&self) -> &str {
        &self.credentials.user_id
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    fn load_cached(&self) -> Result<Option<TokenBundle>, AuthError> {
        match self.store.get(&self.credentials.user_id) {
            Ok(bundle) => Ok(bundle),
            Err(StoreError::KeyNotFound(_)) => Ok(None),
            Err(StoreError::Serialization(e)) => {
                tracing::warn!(
                    "Ignoring unreadable cached tokens for user {}: {}",
                    self.credentials.user_id,
                    e
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn authenticate_with_key(&self) -> Result<TokenBundle, AuthError> {
        let key = self.credentials.key.as_deref().ok_or(AuthError::MissingKey)?;

        let bundle = exchange::full_authentication(
            self.transport.as_ref(),
            &self.endpoints.auth_url,
            &self.credentials.user_id,
            key,
        )
        .await?;

        self.persist(bundle).await
    }

    async fn refresh_locked(&self) -> Result<TokenBundle, AuthError> {
        let session = self.session.read().await.clone();

        let refresh_token = session
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::RefreshUnavailable(
                "no refresh token found; run full authentication",
            ))?;

        if !matches!(session.is_token_expired(TokenKind::Refresh), Ok(false)) {
            return Err(AuthError::RefreshUnavailable(
                "refresh token has expired; run full authentication",
            ));
        }

        let bundle = exchange::refresh_exchange(
            self.transport.as_ref(),
            &self.endpoints.refresh_url,
            refresh_token,
        )
        .await?;

        self.persist(bundle).await
    }

    /// Store first, then swap the session in one assignment
    async fn persist(&self, bundle: TokenBundle) -> Result<TokenBundle, AuthError> {
        self.store.write(&self.credentials.user_id, &bundle, true)?;
        *self.session.write().await = AuthSession::from_bundle(&bundle);
        Ok(bundle)
    }
}
