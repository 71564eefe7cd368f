//! `paintmap`: inspect and preview a painted map set.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `paintmap probe 1200 -340` to see how one column resolves, or
//! `paintmap render --out preview --radius 8192` to write preview images.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use paintmap_config::{CliArgs, Config, ConfigError};
use paintmap_terrain::debug_viz::{PreviewArea, PreviewCanvas};
use paintmap_terrain::{
    ColumnProbe, MapLoadError, MapSources, MapStore, SubmitError, TileRequest, TileSampler,
    WorldMaps,
};
use tracing::info;

/// Largest accepted `--radius`, in blocks.
const MAX_RADIUS: i64 = 1 << 24;

/// How long to wait for a single tile before giving up.
const TILE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "paintmap", about = "Terrain heights and regions from painted maps")]
struct Cli {
    #[command(flatten)]
    overrides: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Print everything the maps say about one column.
    Probe {
        /// World X.
        #[arg(allow_negative_numbers = true)]
        x: i32,
        /// World Z.
        #[arg(allow_negative_numbers = true)]
        z: i32,
    },
    /// Render `elevation.png` and `regions.png` centred on the world origin.
    Render {
        /// Output directory.
        #[arg(long, default_value = "preview")]
        out: PathBuf,
        /// Half-width of the rendered square, in blocks.
        #[arg(long, default_value_t = 4096, value_parser = clap::value_parser!(i32).range(1..=MAX_RADIUS))]
        radius: i32,
        /// World blocks per preview pixel (overrides config).
        #[arg(long)]
        blocks_per_pixel: Option<i32>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Maps(#[from] MapLoadError),

    #[error("failed to start tile sampler: {0}")]
    Sampler(#[source] std::io::Error),

    #[error("failed to create {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write preview: {0}")]
    Preview(#[from] image::ImageError),

    #[error("preview stalled with {0} tiles outstanding")]
    Stalled(usize),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "paintmap failed");
            eprintln!("paintmap: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_dir = match cli.overrides.config.clone() {
        Some(dir) => dir,
        None => Config::default_dir()?,
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&cli.overrides);

    let log_dir = config_dir.join("logs");
    if let Err(e) = paintmap_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config)) {
        eprintln!("Failed to initialise logging: {e}");
    }

    let sources = MapSources {
        heightmap: config.maps.heightmap.clone(),
        regionmap: config.maps.regionmap.clone(),
        manifest: config.maps.manifest.clone(),
    };
    let maps = WorldMaps::load(&sources)?;

    match cli.command {
        Command::Probe { x, z } => {
            print!("{}", format_probe(&maps, &maps.probe(x, z)));
            Ok(())
        }
        Command::Render {
            out,
            radius,
            blocks_per_pixel,
        } => {
            let area = PreviewArea::around_origin(
                radius,
                blocks_per_pixel.unwrap_or(config.preview.blocks_per_pixel),
            );
            let store = Arc::new(MapStore::new(maps));
            let canvas = render_previews(
                store,
                area,
                config.preview.tile_size,
                config.preview_threads(),
            )?;
            write_previews(&canvas, &out)
        }
    }
}

fn format_probe(maps: &WorldMaps, probe: &ColumnProbe) -> String {
    let resolver = maps.resolver();
    let kind = if probe.surface_y < maps.sea_level() {
        "water"
    } else {
        "land"
    };
    format!(
        "column ({}, {})\n  \
         warped pixel   ({}, {})\n  \
         painted colour {}\n  \
         palette match  {}\n  \
         region         {}\n  \
         elevation      {:.4}\n  \
         surface y      {} ({kind}, sea level {})\n",
        probe.world.0,
        probe.world.1,
        probe.warped_pixel.0,
        probe.warped_pixel.1,
        probe.raw_color,
        resolver.name(probe.matched_region),
        resolver.name(probe.region),
        probe.elevation,
        probe.surface_y,
        maps.sea_level(),
    )
}

/// Sample every tile of `area` on a worker pool and paint the previews.
fn render_previews(
    store: Arc<MapStore>,
    area: PreviewArea,
    tile_size: u32,
    threads: usize,
) -> Result<PreviewCanvas, CliError> {
    let start = Instant::now();
    let maps = store.snapshot();
    let sampler = TileSampler::new(store, threads, 64, 128).map_err(CliError::Sampler)?;

    let mut pending: VecDeque<TileRequest> = area.tile_requests(tile_size).into();
    let mut total = pending.len();
    let mut canvas = PreviewCanvas::new(area);
    let mut done = 0;

    while done < total {
        while let Some(request) = pending.pop_front() {
            match sampler.submit(request) {
                Ok(()) => {}
                Err(SubmitError::QueueFull(request)) => {
                    pending.push_front(request);
                    break;
                }
                Err(SubmitError::AlreadyPending(_)) => total -= 1,
            }
        }
        if done == total {
            break;
        }
        let Some(tile) = sampler.wait_result(TILE_TIMEOUT) else {
            return Err(CliError::Stalled(total - done));
        };
        canvas.paint(&tile, maps.resolver());
        done += 1;
    }

    info!(
        tiles = total,
        width = area.width,
        height = area.height,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "preview rendered"
    );
    Ok(canvas)
}

fn write_previews(canvas: &PreviewCanvas, out: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(out).map_err(|source| CliError::OutputDir {
        path: out.to_path_buf(),
        source,
    })?;
    let elevation = out.join("elevation.png");
    let regions = out.join("regions.png");
    canvas.elevation().save_png(&elevation)?;
    canvas.regions().save_png(&regions)?;
    info!(elevation = %elevation.display(), regions = %regions.display(), "previews written");
    Ok(())
}
