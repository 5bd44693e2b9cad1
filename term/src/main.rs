use anyhow::Context;
use clap::Parser;
use rand::Rng;
use std::io;
use std::path::PathBuf;
use tripwire_core::{CellCount, Coord, GameController};

mod app;
mod error;
mod screen;
mod settings;
mod tileset;

use app::App;
use settings::Settings;
use tileset::Tileset;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board width in tiles
    #[arg(long)]
    width: Option<Coord>,

    /// Board height in tiles
    #[arg(long)]
    height: Option<Coord>,

    /// Number of mines
    #[arg(short, long)]
    mines: Option<CellCount>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tileset file, one glyph per line
    #[arg(short, long)]
    tileset: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let config = settings
        .game_config(args.width, args.height, args.mines)
        .context("Invalid board configuration")?;
    let tileset = match args.tileset.as_ref().or(settings.tileset.as_ref()) {
        Some(path) => Tileset::load(path)?,
        None => Tileset::default(),
    };
    let seed = args
        .seed
        .or(settings.seed)
        .unwrap_or_else(|| rand::rng().random());
    log::debug!("seed: {}", seed);

    let game = GameController::new(config, seed)?;
    log::debug!("App started");
    App::new(game, tileset).run(io::stdin().lock(), &mut io::stdout())
}
