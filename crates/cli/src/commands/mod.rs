//! CLI commands that are not API checks.

pub mod features;
