use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Login form input. Transient - never persisted by this library.
#[derive(Clone, Serialize)]
pub struct UserCredentials {
    pub login: String,
    pub password: String,
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration form input. `birth_date` accepts either a plain
/// `YYYY-MM-DD` date or a full RFC 3339 instant and is normalized before
/// transmission.
#[derive(Clone, Serialize)]
pub struct RegistrationData {
    pub login: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub phone_number: String,
}

impl fmt::Debug for RegistrationData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationData")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("birth_date", &self.birth_date)
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

impl RegistrationData {
    /// Copy of the data with `birth_date` normalized for the wire.
    pub(crate) fn normalized(&self) -> Result<Self> {
        let mut data = self.clone();
        data.birth_date = normalize_birth_date(&self.birth_date)?;
        Ok(data)
    }
}

/// Profile payload, passed through to and from the profile endpoint.
/// `created_at`/`updated_at` are server-set and omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Profile {
    /// Copy of the profile with `birth_date` normalized for the wire.
    pub(crate) fn normalized(&self) -> Result<Self> {
        let mut profile = self.clone();
        profile.birth_date = normalize_birth_date(&self.birth_date)?;
        Ok(profile)
    }
}

/// Normalize a birth date to a full ISO-8601 UTC instant.
///
/// A plain `YYYY-MM-DD` becomes midnight UTC of that date; an RFC 3339
/// instant is re-anchored to UTC. Output carries millisecond precision
/// (`1990-05-01T00:00:00.000Z`).
pub fn normalize_birth_date(input: &str) -> Result<String> {
    let trimmed = input.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true));
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|e| Error::InvalidDate(format!("{trimmed}: {e}")))?;
    let instant = date.and_time(NaiveTime::MIN).and_utc();
    Ok(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}
