//! Authenticated request gateway for the profile endpoint.
//!
//! Stateless wrapper: each call snapshots the access token from the
//! credential store, attaches the bearer header, and performs exactly one
//! request. Renewal after a rejection is the caller's policy; the gateway
//! never retries and never writes the store.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::auth::store::CredentialStore;
use crate::error::{Error, Result};
use crate::models::Profile;

/// Profile endpoint route
const PROFILE_ROUTE: &str = "/profile";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct ApiGateway {
    client: Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
}

impl ApiGateway {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            store,
        })
    }

    /// Perform one bearer-authenticated request against `path`. Fails with
    /// `NoSession` before any network I/O when the store holds no
    /// credential.
    pub async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let tokens = self.store.get()?.ok_or(Error::NoSession)?;

        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&tokens.access_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(%status, %method, path, "request rejected");
            return Err(Error::from_status(status, &text));
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.call::<()>(Method::GET, path, None).await?;
        response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("GET {path}: {e}")))
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.call(Method::PUT, path, Some(body)).await?;
        response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("PUT {path}: {e}")))
    }

    /// Fetch the caller's profile.
    pub async fn fetch_profile(&self) -> Result<Profile> {
        self.get(PROFILE_ROUTE).await
    }

    /// Update the caller's profile. `birth_date` is normalized the same
    /// way registration normalizes it.
    pub async fn update_profile(&self, profile: &Profile) -> Result<Profile> {
        let body = profile.normalized()?;
        self.put(PROFILE_ROUTE, &body).await
    }
}
