//! Domain and wire types exchanged with the identity and profile endpoints.

pub mod user;

pub use user::{normalize_birth_date, Profile, RegistrationData, UserCredentials};
