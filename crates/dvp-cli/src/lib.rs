//! dvp command line interface
//!
//! The binary in `main.rs` only parses arguments; commands live here so
//! they can be exercised from tests.

pub mod commands;
pub mod common;
pub mod errors;

pub use common::GlobalOpts;
