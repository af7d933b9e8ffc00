//! Command-line client for the record import service
//!
//! Argument parsing, configuration and output live here so the binary stays a
//! thin wrapper: it parses [`cli::Cli`], resolves [`config`], and hands the
//! command to [`commands::run`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod output;

#[cfg(test)]
pub(crate) mod test_utils;
