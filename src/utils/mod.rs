//! Shared helpers.

pub mod progress;
