//! Identity endpoint client.
//!
//! `AuthClient` owns credential acquisition and renewal: register, login,
//! refresh, and the local-only logout. Register and login differ only in
//! route and payload, so both run through one grant helper that persists
//! the returned pair and raises the session flag.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::session::{SessionController, SessionState};
use crate::auth::store::{CredentialStore, TokenPair};
use crate::error::{Error, Result};
use crate::models::{RegistrationData, UserCredentials};

/// Identity endpoint routes
const REGISTER_ROUTE: &str = "/register";
const AUTHENTICATE_ROUTE: &str = "/authenticate";
const REFRESH_ROUTE: &str = "/refresh-token";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Success payload of the register and authenticate routes. Profile echo
/// fields in the same body are ignored.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    refresh_token: String,
}

/// Success payload of the refresh route; a new refresh token is optional.
#[derive(Debug, Deserialize)]
struct RefreshGrant {
    access_token: String,
    refresh_token: Option<String>,
}

pub struct AuthClient {
    client: Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    session: Arc<SessionController>,
    /// Serializes credential mutations: a refresh response must never
    /// overwrite a pair a concurrent logout already cleared.
    mutation: Mutex<()>,
}

impl AuthClient {
    pub fn new(
        base_url: impl Into<String>,
        store: Arc<dyn CredentialStore>,
        session: Arc<SessionController>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            store,
            session,
            mutation: Mutex::new(()),
        })
    }

    /// Register a new account. `birth_date` is normalized before
    /// transmission; on success the granted pair is persisted and the
    /// session flag raised.
    pub async fn register(&self, data: &RegistrationData) -> Result<TokenPair> {
        let body = data.normalized()?;
        let _guard = self.mutation.lock().await;
        let tokens = self.grant_session(REGISTER_ROUTE, &body).await?;
        info!(login = %data.login, "registration succeeded");
        Ok(tokens)
    }

    /// Authenticate an existing account; same persistence contract as
    /// `register`.
    pub async fn login(&self, credentials: &UserCredentials) -> Result<TokenPair> {
        let _guard = self.mutation.lock().await;
        let tokens = self.grant_session(AUTHENTICATE_ROUTE, credentials).await?;
        info!(login = %credentials.login, "login succeeded");
        Ok(tokens)
    }

    /// Drop the session. Local-only and infallible: the store is cleared,
    /// the flag lowered, and no endpoint is called.
    pub async fn logout(&self) {
        let _guard = self.mutation.lock().await;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear credential store during logout");
        }
        self.session.set(SessionState::Unauthenticated);
        info!("logged out");
    }

    /// Exchange the stored refresh token for a new access token. The
    /// stored refresh token is retained unless the endpoint issues a new
    /// one. A 401/403 answer means the refresh token itself is dead: the
    /// store is cleared and the flag lowered before the error surfaces.
    pub async fn refresh(&self) -> Result<TokenPair> {
        let _guard = self.mutation.lock().await;
        let current = self.store.get()?.ok_or(Error::NoSession)?;

        let url = format!("{}{}", self.base_url, REFRESH_ROUTE);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "refresh_token": &current.refresh_token }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                // Session is unrecoverable without a fresh login.
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "failed to clear credential store after rejected refresh");
                }
                self.session.set(SessionState::Unauthenticated);
                warn!(%status, "refresh token rejected, session dropped");
            }
            return Err(Error::rejected(status, &text));
        }

        let grant: RefreshGrant = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("refresh grant: {e}")))?;

        let tokens = TokenPair {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token.unwrap_or(current.refresh_token),
        };
        self.store.save(&tokens)?;
        self.session.set(SessionState::Authenticated);
        debug!("access token refreshed");
        Ok(tokens)
    }

    /// POST `body` to an identity route, persist the granted pair, raise
    /// the flag. Caller must hold the mutation guard.
    async fn grant_session<B: Serialize>(&self, route: &str, body: &B) -> Result<TokenPair> {
        let url = format!("{}{}", self.base_url, route);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(%status, route, "identity endpoint rejected request");
            return Err(Error::rejected(status, &text));
        }

        let grant: TokenGrant = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("token grant: {e}")))?;

        let tokens = TokenPair {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
        };
        self.store.save(&tokens)?;
        self.session.set(SessionState::Authenticated);
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_grant_deserializes() {
        let json = r#"{"access_token":"at_abc","refresh_token":"rt_def","login":"alice"}"#;
        let grant: TokenGrant = serde_json::from_str(json).unwrap();
        assert_eq!(grant.access_token, "at_abc");
        assert_eq!(grant.refresh_token, "rt_def");
    }

    #[test]
    fn token_grant_requires_both_tokens() {
        let json = r#"{"access_token":"at_abc"}"#;
        assert!(serde_json::from_str::<TokenGrant>(json).is_err());
    }

    #[test]
    fn refresh_grant_accepts_missing_refresh_token() {
        let json = r#"{"access_token":"at_new"}"#;
        let grant: RefreshGrant = serde_json::from_str(json).unwrap();
        assert_eq!(grant.access_token, "at_new");
        assert!(grant.refresh_token.is_none());
    }
}
