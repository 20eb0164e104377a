//! Configuration errors raised before any clause reaches a solver

use crate::puzzle::Coord;
use thiserror::Error;

/// Errors in puzzle configuration: bad dimensions, malformed presets, conflicting modes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("grid must have at least one column and one row (got {cols}x{rows})")]
    InvalidDimensions { cols: usize, rows: usize },

    #[error(
        "given static line is not contiguous: each coordinate must move by exactly 1 \
         along either the x or the y axis from the previous one (index {index}: \
         ({}, {}) -> ({}, {}))",
        from.0, from.1, to.0, to.1
    )]
    NonContiguousPath { index: usize, from: Coord, to: Coord },

    #[error("static line needs at least two points (got {len})")]
    PathTooShort { len: usize },

    #[error("node ({}, {}) is outside the {node_cols}x{node_rows} node grid", node.0, node.1)]
    NodeOutOfBounds { node: Coord, node_cols: usize, node_rows: usize },

    #[error("board has {found_cols}x{found_rows} tiles but the grid is {cols}x{rows}")]
    BoardDimensionMismatch {
        cols: usize,
        rows: usize,
        found_cols: usize,
        found_rows: usize,
    },

    #[error("invalid tile '{literal}' at row {row}, column {col} (expected B, W or empty)")]
    InvalidTile { literal: String, row: usize, col: usize },

    #[error("start and end cannot both be at ({}, {})", node.0, node.1)]
    CoincidentEndpoints { node: Coord },

    #[error("a static board and a static line cannot be combined in one puzzle")]
    ConflictingPresets,

    #[error("{mode} mode requires a {preset} preset")]
    MissingPreset { mode: &'static str, preset: &'static str },
}
