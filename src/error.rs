use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid must have at least one spot per side")]
    NoSpots,
    #[error("arena size {size} is too small for {spots} spots per side")]
    ArenaTooSmall { size: i32, spots: i32 },
    #[error("arena size {size} with {spots} spots per side does not fit cell arithmetic")]
    ArenaTooLarge { size: i32, spots: i32 },
    #[error("interval bounds are inverted: min {min}ms > max {max}ms")]
    InvertedBounds { min: u64, max: u64 },
    #[error("interval step must be positive")]
    ZeroStep,
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("could not read pattern file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
    #[error("pattern cell at column {col}, row {row} lies outside the {spots}x{spots} grid")]
    OutOfBounds { col: i32, row: i32, spots: i32 },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("the simulation thread is no longer running")]
    Disconnected,
}
