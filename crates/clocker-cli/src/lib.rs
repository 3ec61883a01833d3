//! clocker CLI library.
//!
//! Argument definitions, configuration and the command implementations
//! behind the `clocker` binary.

mod cli;
pub mod commands;
mod config;
pub mod render;
mod store;

pub use cli::{Cli, Commands};
pub use config::{Config, DATABASE_FILE};
pub use store::{LOCK_FILE, Store};
