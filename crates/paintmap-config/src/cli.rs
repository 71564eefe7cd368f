//! Command-line overrides for values in `config.ron`.

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Arguments shared by every paintmap subcommand.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// Path to config directory (overrides default location).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Elevation raster.
    #[arg(long, global = true)]
    pub heightmap: Option<PathBuf>,

    /// Region raster.
    #[arg(long, global = true)]
    pub regionmap: Option<PathBuf>,

    /// Region manifest (RON).
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Preview worker threads (0 = one per core).
    #[arg(long, global = true)]
    pub threads: Option<usize>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref path) = args.heightmap {
            self.maps.heightmap = path.clone();
        }
        if let Some(ref path) = args.regionmap {
            self.maps.regionmap = path.clone();
        }
        if let Some(ref path) = args.manifest {
            self.maps.manifest = path.clone();
        }
        if let Some(threads) = args.threads {
            self.preview.worker_threads = threads;
        }
    }
}
