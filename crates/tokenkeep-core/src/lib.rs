//! Client-side session and identity management.
//!
//! This crate authenticates a user against a remote identity service,
//! persists the issued token pair, attaches it to profile requests, and
//! renews it on expiry. It provides:
//! - `CredentialStore`: durable token persistence with file, OS-keychain,
//!   and in-memory backends
//! - `AuthClient`: register / login / logout / refresh against the
//!   identity endpoint
//! - `ApiGateway`: bearer-authenticated profile reads and writes
//! - `SessionController`: the authenticated/unauthenticated flag with
//!   subscribe/notify
//! - `SessionManager`: ready-made wiring of all of the above

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;

pub use api::ApiGateway;
pub use auth::{
    AuthClient, CredentialStore, FileCredentialStore, KeyringCredentialStore,
    MemoryCredentialStore, SessionController, SessionState, TokenPair,
};
pub use config::Config;
pub use error::{Error, Result};
pub use manager::SessionManager;
pub use models::{normalize_birth_date, Profile, RegistrationData, UserCredentials};
