//! CLI module for flatr - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for flattening the
//! review load, inspecting the upcoming load, and undoing the last run.

pub mod commands;

pub use commands::Cli;
