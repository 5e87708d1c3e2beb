//! Shop Smoke - black-box checks for the shop HTTP API.
//!
//! The `shop-smoke` binary is a thin clap wrapper around this library; the
//! integration tests drive the same entry points against a stub server.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`probe`] - HTTP probe returning raw response bodies
//! - [`report`] - ✓/✗ diagnostic sinks
//! - [`checks`] - Auth flow and shopping workflow checkers
//! - [`commands`] - Feature-tracking file maintenance

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checks;
pub mod commands;
pub mod config;
pub mod probe;
pub mod report;
