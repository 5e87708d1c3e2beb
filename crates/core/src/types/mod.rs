//! Core types for Shop Smoke.
//!
//! This module provides type-safe wrappers for the data the checks exchange
//! with the shop API and the feature-tracking file.

pub mod api;
pub mod credential;
pub mod email;
pub mod feature;
pub mod id;

pub use api::*;
pub use credential::{BearerToken, Credentials, LoginPayload};
pub use email::{Email, EmailError};
pub use feature::{FeatureError, FeatureList, FeatureRecord, UpdateSummary};
pub use id::*;
