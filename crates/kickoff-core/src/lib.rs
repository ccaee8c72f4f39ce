//! Core types and trait definitions for the Kickoff prediction board.
//!
//! This crate has no HTTP or database dependencies. All other crates depend
//! on it.

pub mod blog;
pub mod error;
pub mod matchday;
pub mod prediction;
pub mod store;

pub use error::{Error, Result};
