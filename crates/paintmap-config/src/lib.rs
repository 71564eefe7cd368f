//! Configuration for the paintmap tools.
//!
//! Settings persist to disk as `config.ron` and can be overridden from the
//! command line via clap. Unknown or missing fields fall back to defaults so
//! old config files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, MapsConfig, PreviewConfig};
pub use error::ConfigError;
