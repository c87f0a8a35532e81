//! Profile endpoint module.
//!
//! Requests to the profile endpoint are bearer-authenticated with the
//! access token held in the credential store.

pub mod gateway;

pub use gateway::ApiGateway;
