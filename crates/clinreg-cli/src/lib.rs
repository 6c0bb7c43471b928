//! Command-line front end: argument parsing, logging setup and summaries.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
