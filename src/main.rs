use std::{path::PathBuf, sync::mpsc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

pub use utils::{moore_offsets, Pos};
mod utils;

pub use error::SimError;
pub mod error;

pub use config::Config;
mod config;

pub use grid::Grid;
mod grid;

pub use world::{HashedWorld, World};
pub mod world;

pub use sim::{drain_events, ClockState, Observer, Sim, SimEvent, SimHandle, Stats};
mod sim;

mod pattern;

pub use view::View;
mod view;

/// Run the game of life on a fixed square arena in the terminal.
///
/// Keys: arrows move the cursor, enter toggles a cell, space starts or
/// pauses, `+`/`-` change the speed, `c` clears, `q` quits.
#[derive(Parser)]
#[command(name = "lifearena", version)]
struct Args {
    /// Text pattern to start from: `#` is alive, one line per row.
    pattern: Option<PathBuf>,

    /// Built-in pattern to start from, used when no file is given.
    #[arg(long)]
    preset: Option<String>,

    /// Column and row of the pattern's top left cell; centered when absent.
    #[arg(long, value_parser = parse_offset)]
    offset: Option<Pos>,

    /// Side of the arena in pixels.
    #[arg(long, default_value_t = config::DEFAULT_SIZE)]
    size: i32,

    /// Cells per side.
    #[arg(long, default_value_t = config::DEFAULT_SPOTS)]
    spots: i32,

    /// Milliseconds between generations.
    #[arg(long, default_value_t = config::DEFAULT_INTERVAL_MS)]
    interval: u64,

    /// Start running right away instead of waiting for space.
    #[arg(long)]
    autostart: bool,
}

fn parse_offset(arg: &str) -> Result<Pos, String> {
    let (col, row) = arg
        .split_once(',')
        .ok_or_else(|| format!("expected <col>,<row>, got `{arg}`"))?;
    let col = col.trim().parse().map_err(|e| format!("bad column: {e}"))?;
    let row = row.trim().parse().map_err(|e| format!("bad row: {e}"))?;
    Ok(pos!(col, row))
}

fn load_pattern(args: &Args, grid: &Grid) -> Result<Vec<Pos>> {
    let cells = match (&args.pattern, &args.preset) {
        (Some(path), _) => pattern::read(path)?,
        (None, Some(name)) => pattern::preset(name)?,
        (None, None) => vec![],
    };
    let actives = pattern::place(grid, &cells, args.offset).context("pattern does not fit")?;
    Ok(actives)
}

pub fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = Config {
        size: args.size,
        spots: args.spots,
        initial_interval: Duration::from_millis(args.interval),
        ..Config::default()
    };
    let grid = config.grid().context("invalid arena")?;
    let actives = load_pattern(&args, &grid)?;
    info!(
        "arena {}px, {}x{} cells of {}px, {} alive",
        grid.size(),
        grid.cells_per_side(),
        grid.cells_per_side(),
        grid.cell_size(),
        actives.len()
    );

    let (events_sender, events) = mpsc::channel();
    let simulation: Sim<HashedWorld> = Sim::spawn(&config, actives, events_sender)?;
    let handle = simulation.handle();
    if args.autostart {
        handle.start()?;
    }

    let view = View::spawn(grid, simulation.handle(), events);
    let result = view.join();

    handle.shutdown()?;
    drop(handle);
    simulation.join();
    result
}

#[test]
fn test_parse_offset() {
    assert_eq!(parse_offset("3,4"), Ok(pos!(3, 4)));
    assert_eq!(parse_offset(" 0 , 99"), Ok(pos!(0, 99)));
    assert!(parse_offset("3").is_err());
    assert!(parse_offset("a,4").is_err());
}
