//! Authentication module: credential persistence, the session flag, and
//! the identity endpoint client.
//!
//! This module provides:
//! - `CredentialStore`: durable token-pair storage (file, keychain, memory)
//! - `SessionController`: the authenticated/unauthenticated flag
//! - `AuthClient`: register, login, logout, and refresh

pub mod client;
pub mod session;
pub mod store;

pub use client::AuthClient;
pub use session::{SessionController, SessionState};
pub use store::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, MemoryCredentialStore, TokenPair,
};
