//! Forta publish CLI library.
//!
//! Argument definitions, subcommand handlers and terminal output for the
//! `forta-publish` binary. The handlers translate flags into the library's
//! `Params` structs and print what the library returns.

pub mod cli;
pub mod commands;
pub mod output;
pub mod terminal;

pub use cli::{Cli, Command};
pub use commands::dispatch;
