//! Smoke-check configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional; the defaults target a local development server seeded with
//! the standard customer account.
//!
//! - `SMOKE_BASE_URL` - Shop API origin (default: `http://localhost:3001`)
//! - `SMOKE_EMAIL` - Login email (default: `customer@example.com`)
//! - `SMOKE_PASSWORD` - Login password (default: `customer123`)
//! - `SMOKE_FEATURE_FILE` - Feature-tracking file (default: `feature_list.json`)

use std::path::PathBuf;

use secrecy::SecretString;
use shop_smoke_core::credential::{DEFAULT_EMAIL, DEFAULT_PASSWORD};
use shop_smoke_core::{Credentials, Email};
use thiserror::Error;
use url::Url;

/// Default shop API origin.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Default feature-tracking file, relative to the working directory.
pub const DEFAULT_FEATURE_FILE: &str = "feature_list.json";

const BASE_URL_VAR: &str = "SMOKE_BASE_URL";
const EMAIL_VAR: &str = "SMOKE_EMAIL";
const PASSWORD_VAR: &str = "SMOKE_PASSWORD";
const FEATURE_FILE_VAR: &str = "SMOKE_FEATURE_FILE";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct SmokeConfig {
    /// Shop API base URL, always ending in `/`
    pub base_url: Url,
    /// Account used by the login step
    pub credentials: Credentials,
    /// Feature-tracking file
    pub feature_file: PathBuf,
}

impl SmokeConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(
            BASE_URL_VAR,
            &lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        )?;

        let email = lookup(EMAIL_VAR).unwrap_or_else(|| DEFAULT_EMAIL.to_owned());
        let email = Email::parse(&email)
            .map_err(|e| ConfigError::Invalid(EMAIL_VAR.to_owned(), e.to_string()))?;
        let password = lookup(PASSWORD_VAR).unwrap_or_else(|| DEFAULT_PASSWORD.to_owned());

        let feature_file = lookup(FEATURE_FILE_VAR)
            .map_or_else(|| PathBuf::from(DEFAULT_FEATURE_FILE), PathBuf::from);

        Ok(Self {
            base_url,
            credentials: Credentials::new(email, SecretString::from(password)),
            feature_file,
        })
    }

    /// Replace the base URL, e.g. from a command-line flag.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `raw` is not an absolute http(s) URL.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url("--base-url", raw)?;
        Ok(self)
    }
}

/// Parse a base URL, requiring http(s) and normalising the path to end in
/// `/` so relative API paths are joined beneath it.
fn parse_base_url(source: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid(source.to_owned(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(
            source.to_owned(),
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
