//! Bender CLI library
//!
//! Command implementations for the `bender` binary: checking whole
//! component libraries, resolving a single component and driving its
//! watches from the command line.

pub mod cli;
pub mod commands;
pub mod library;
pub mod logging;
pub mod render;
