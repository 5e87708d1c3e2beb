//! Smoke checks against the shop API.
//!
//! Each checker is a fixed sequence of stages. A stage returns
//! `Result<_, CheckError>`; the checker tags the first error with the stage
//! name and stops, so the first failure short-circuits everything after it.
//!
//! - [`auth`] - unauthenticated rejection, login, authenticated access
//! - [`workflow`] - catalog, cart, checkout and order history

pub mod auth;
pub mod workflow;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::probe::ProbeError;
use crate::report::Reporter;

/// API paths used by the checks.
pub mod endpoints {
    pub const LOGIN: &str = "/api/auth/login";
    pub const PROFILE: &str = "/api/user/profile";
    pub const PRODUCTS: &str = "/api/products";
    pub const CATEGORIES: &str = "/api/categories";
    pub const BRANDS: &str = "/api/brands";
    pub const CART: &str = "/api/cart";
    pub const CART_ITEMS: &str = "/api/cart/items";
    pub const SHIPPING_METHODS: &str = "/api/checkout/shipping-methods";
    pub const VALIDATE_ADDRESS: &str = "/api/checkout/validate-address";
    pub const ORDERS: &str = "/api/orders";
}

/// Longest response excerpt quoted in a diagnostic.
const MAX_EXCERPT: usize = 200;

/// Why a single stage failed.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The request never produced a response body.
    #[error(transparent)]
    Transport(#[from] ProbeError),

    /// The body is not JSON.
    #[error("Invalid JSON response from {endpoint}: {body}")]
    MalformedJson { endpoint: &'static str, body: String },

    /// The body is JSON but not the expected shape.
    #[error("Unexpected response from {endpoint}: {reason}")]
    UnexpectedShape {
        endpoint: &'static str,
        reason: String,
    },

    /// The body is well-formed but the condition does not hold.
    #[error("{0}")]
    Rejected(String),
}

/// The first failing stage of a checker.
#[derive(Debug, Error)]
#[error("failed at {stage}: {source}")]
pub struct StageFailure {
    /// Name of the stage.
    pub stage: &'static str,
    /// What went wrong.
    #[source]
    pub source: CheckError,
}

impl StageFailure {
    /// Build a `map_err` adapter that tags errors with `stage`.
    pub fn at(stage: &'static str) -> impl FnOnce(CheckError) -> Self {
        move |source| Self { stage, source }
    }
}

/// Decode a response body from `endpoint` into `T`.
///
/// Malformed JSON and a wrong shape are reported separately so the
/// diagnostic says which one happened.
pub(crate) fn decode<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T, CheckError> {
    let value: Value = serde_json::from_str(body).map_err(|_| CheckError::MalformedJson {
        endpoint,
        body: excerpt(body),
    })?;

    serde_json::from_value(value).map_err(|e| CheckError::UnexpectedShape {
        endpoint,
        reason: e.to_string(),
    })
}

/// Render an optional JSON value for display, without quotes around strings.
pub(crate) fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "n/a".to_owned(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub(crate) fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "<empty body>".to_owned();
    }
    match body.char_indices().nth(MAX_EXCERPT) {
        Some((cut, _)) => format!("{}...", body.get(..cut).unwrap_or(body)),
        None => body.to_owned(),
    }
}

/// Print the outcome of a checker run and pass the result through.
///
/// On failure the stage's own diagnostic is printed first, then a closing
/// line naming the stage.
pub(crate) fn conclude<R: Reporter>(
    out: &mut R,
    name: &str,
    result: Result<(), StageFailure>,
) -> Result<(), StageFailure> {
    match &result {
        Ok(()) => {
            out.line(String::new());
            out.banner(&format!("✓ {name} PASSED"));
        }
        Err(failure) => {
            out.fail(&failure.source.to_string());
            out.line(String::new());
            out.fail(&format!("{name} failed at {}", failure.stage));
        }
    }
    result
}
