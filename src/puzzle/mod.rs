//! Puzzle geometry and caller-supplied presets

pub mod grid;
pub mod io;
pub mod preset;

pub use grid::{Coord, Direction, EdgeSlot, Grid};
pub use io::{example_board, example_line, load_board_from_file, parse_line};
pub use preset::{BoardPreset, LinePreset, Preset, TileColor};
