//! Shop Smoke Core - Shared types library.
//!
//! This crate provides the types used by the `shop-smoke` checks:
//! - credentials and the bearer token issued by login
//! - typed envelopes for the JSON bodies of the shop API
//! - the fixed request payloads the workflow checker submits
//! - feature records from the feature-tracking file
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no network access and
//! no file access. The CLI crate owns every side effect.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers, API envelopes and feature records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
