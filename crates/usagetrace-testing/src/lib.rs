//! Testing infrastructure for usagetrace integration tests.
//!
//! - `TestWorld`: an isolated home directory with the three tools' log roots
//! - `fixtures`: builders for session-log lines in each tool's format
//! - `assertions`: helpers for inspecting canonical records

pub mod assertions;
pub mod fixtures;
pub mod world;

pub use world::{CliResult, TestWorld};
