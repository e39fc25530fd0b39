//! QueryScope CLI library.
//!
//! Exposes the argument, input and output layers for testing.
//! The main entry point is the `queryscope` binary.

pub mod cli;
pub mod input;
pub mod output;

pub use cli::Args;
