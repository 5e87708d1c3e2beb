//! Login credentials and the bearer token issued for them.
//!
//! Both carry secrets, so neither exposes its secret through `Debug` or
//! `Display`. Callers that need the raw value go through `expose_secret`.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::email::Email;

/// Email of the seeded customer account.
pub const DEFAULT_EMAIL: &str = "customer@example.com";

/// Password of the seeded customer account.
pub const DEFAULT_PASSWORD: &str = "customer123";

/// Email/password pair submitted to the login endpoint.
#[derive(Clone)]
pub struct Credentials {
    /// Account email.
    pub email: Email,
    /// Account password.
    pub password: SecretString,
}

impl Credentials {
    /// Create credentials from an email and a password.
    #[must_use]
    pub const fn new(email: Email, password: SecretString) -> Self {
        Self { email, password }
    }

    /// Borrow the credentials as the JSON body of a login request.
    #[must_use]
    pub fn payload(&self) -> LoginPayload<'_> {
        LoginPayload {
            email: self.email.as_str(),
            password: self.password.expose_secret(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /api/auth/login`.
///
/// Borrowed from [`Credentials`] for the duration of one request so the
/// password is never copied into a long-lived value.
#[derive(Serialize)]
pub struct LoginPayload<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Opaque access token returned by login.
///
/// Held in memory for a single run and sent as `Authorization: Bearer`.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    /// Wrap a raw token string.
    ///
    /// Returns `None` for an empty (or whitespace-only) token, which the
    /// checks treat as "login did not issue a token".
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self(SecretString::from(raw)))
    }

    /// The raw token value.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fixture() -> Credentials {
        Credentials::new(
            Email::parse(DEFAULT_EMAIL).unwrap(),
            SecretString::from(DEFAULT_PASSWORD.to_owned()),
        )
    }

    #[test]
    fn test_payload_json() {
        let json = serde_json::to_value(fixture().payload()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"email": "customer@example.com", "password": "customer123"})
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", fixture());
        assert!(debug.contains("customer@example.com"));
        assert!(!debug.contains("customer123"));
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(BearerToken::new("").is_none());
        assert!(BearerToken::new("   ").is_none());
    }

    #[test]
    fn test_token_debug_redacted() {
        let token = BearerToken::new("abc.def.ghi").unwrap();
        assert_eq!(token.expose_secret(), "abc.def.ghi");
        assert!(!format!("{token:?}").contains("abc"));
    }
}
