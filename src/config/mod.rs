//! Configuration management for the puzzle solver

pub mod settings;

pub use settings::{
    BoardConfig, CliOverrides, OutputConfig, OutputFormat, PresetConfig, PuzzleConfig, PuzzleMode,
    Settings, SolverBackend, SolverConfig,
};
