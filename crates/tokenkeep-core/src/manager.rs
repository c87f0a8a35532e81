//! Top-level wiring for the session and identity module.
//!
//! `SessionManager` takes the place of an application shell: it owns the
//! credential store, the session flag, the identity client, and the
//! profile gateway, and performs the one-time startup derivation of the
//! flag from persisted state.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::ApiGateway;
use crate::auth::{
    AuthClient, CredentialStore, FileCredentialStore, SessionController, SessionState, TokenPair,
};
use crate::config::Config;
use crate::error::Result;
use crate::models::{Profile, RegistrationData, UserCredentials};

pub struct SessionManager {
    session: Arc<SessionController>,
    auth: AuthClient,
    api: ApiGateway,
}

impl SessionManager {
    /// Build with the file-backed store in the configured data directory.
    pub fn new(config: &Config) -> Result<Self> {
        let store = Arc::new(FileCredentialStore::new(&config.data_dir()?));
        Self::with_store(config, store)
    }

    /// Build with an injected store backend.
    pub fn with_store(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let session = Arc::new(SessionController::from_store(store.as_ref()));
        let auth = AuthClient::new(
            &config.api_base_url,
            Arc::clone(&store),
            Arc::clone(&session),
        )?;
        let api = ApiGateway::new(&config.api_base_url, store)?;
        Ok(Self { session, auth, api })
    }

    pub fn state(&self) -> SessionState {
        self.session.current()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Observe session transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    pub async fn register(&self, data: &RegistrationData) -> Result<TokenPair> {
        self.auth.register(data).await
    }

    pub async fn login(&self, credentials: &UserCredentials) -> Result<TokenPair> {
        self.auth.login(credentials).await
    }

    pub async fn logout(&self) {
        self.auth.logout().await
    }

    pub async fn refresh(&self) -> Result<TokenPair> {
        self.auth.refresh().await
    }

    pub async fn fetch_profile(&self) -> Result<Profile> {
        self.api.fetch_profile().await
    }

    pub async fn update_profile(&self, profile: &Profile) -> Result<Profile> {
        self.api.update_profile(profile).await
    }

    /// Direct access for callers composing their own flows.
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn api(&self) -> &ApiGateway {
        &self.api
    }
}
