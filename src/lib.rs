//! Molasses library crate
//!
//! Exposes the friction core so benchmarks and external hosts can exercise
//! the edit-path and analysis-path components without going through the
//! demo editor.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod occurrences;
pub mod overlay;
pub mod pass;
pub mod region;
pub mod syntax;
pub mod ui;
