//! Configuration settings for the puzzle solver

use crate::error::PuzzleError;
use crate::puzzle::{BoardPreset, Coord, Grid, LinePreset, Preset};
use crate::sat::EncodingOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub puzzle: PuzzleConfig,
    #[serde(default)]
    pub preset: PresetConfig,
    pub solver: SolverConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleConfig {
    pub cols: usize,
    pub rows: usize,
    pub mode: PuzzleMode,
}

/// Which boards count as solutions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleMode {
    /// Any layout; `Valid` is reported per solution
    Free,
    /// Only solved boards
    Solved,
    /// A fixed coloring, searching for loops that solve it
    Board,
    /// A fixed loop, searching for colorings it solves
    Line,
}

impl PuzzleMode {
    pub fn requires_solved(self) -> bool {
        !matches!(self, PuzzleMode::Free)
    }

    /// Threshold between sampling and streaming enumeration
    pub fn default_allowance(self) -> usize {
        match self {
            PuzzleMode::Line => 10,
            PuzzleMode::Free | PuzzleMode::Solved | PuzzleMode::Board => 60,
        }
    }

    fn name(self) -> &'static str {
        match self {
            PuzzleMode::Free => "free",
            PuzzleMode::Solved => "solved",
            PuzzleMode::Board => "board",
            PuzzleMode::Line => "line",
        }
    }
}

impl fmt::Display for PuzzleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<BoardConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<LinePreset>,
}

/// A board as written in a config file: tile rows top row first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub start: Coord,
    pub end: Coord,
    pub tiles: Vec<String>,
}

impl BoardConfig {
    pub fn to_preset(&self) -> Result<BoardPreset, PuzzleError> {
        BoardPreset::from_text_rows(self.start, self.end, &self.tiles)
    }
}

impl From<&BoardPreset> for BoardConfig {
    fn from(board: &BoardPreset) -> Self {
        Self {
            start: board.start,
            end: board.end,
            tiles: board.text_rows(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Largest solution count still enumerated by sampling; mode default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bruteforce_allowance: Option<usize>,
    /// List every solution instead of only the first
    pub enumerate: bool,
    /// Also report the total number of solutions
    pub count: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    Cadical,
    Batsat,
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Cadical => write!(f, "cadical"),
            SolverBackend::Batsat => write!(f, "batsat"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            puzzle: PuzzleConfig {
                cols: 3,
                rows: 3,
                mode: PuzzleMode::Solved,
            },
            preset: PresetConfig::default(),
            solver: SolverConfig {
                backend: SolverBackend::Cadical,
                bruteforce_allowance: None,
                enumerate: false,
                count: false,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                output_directory: None,
            },
        }
    }
}

impl Settings {
    /// Settings for a fixed board
    pub fn with_board(board: &BoardPreset) -> Self {
        let mut settings = Self::default();
        settings.puzzle.cols = board.cols;
        settings.puzzle.rows = board.rows;
        settings.puzzle.mode = PuzzleMode::Board;
        settings.preset.board = Some(BoardConfig::from(board));
        settings
    }

    /// Settings for a fixed line on a `cols x rows` grid
    pub fn with_line(cols: usize, rows: usize, line: LinePreset) -> Self {
        let mut settings = Self::default();
        settings.puzzle.cols = cols;
        settings.puzzle.rows = rows;
        settings.puzzle.mode = PuzzleMode::Line;
        settings.preset.line = Some(line);
        settings
    }

    /// Load settings from a YAML file.
    ///
    /// Presets are not checked against the mode here: command line overrides
    /// may still supply or replace them, so call [`Settings::validate`] after
    /// [`Settings::merge_with_cli`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        self.encoding_options()?;
        Ok(())
    }

    pub fn grid(&self) -> Result<Grid, PuzzleError> {
        Grid::new(self.puzzle.cols, self.puzzle.rows)
    }

    pub fn bruteforce_allowance(&self) -> usize {
        self.solver
            .bruteforce_allowance
            .unwrap_or_else(|| self.puzzle.mode.default_allowance())
    }

    /// The preset the mode calls for, if any.
    ///
    /// Presets the mode does not use are ignored, but a board and a line are
    /// never accepted together.
    pub fn active_preset(&self) -> Result<Option<Preset>, PuzzleError> {
        if self.preset.board.is_some() && self.preset.line.is_some() {
            return Err(PuzzleError::ConflictingPresets);
        }

        let mode = self.puzzle.mode;
        match mode {
            PuzzleMode::Free | PuzzleMode::Solved => Ok(None),
            PuzzleMode::Board => {
                let board = self.preset.board.as_ref().ok_or(PuzzleError::MissingPreset {
                    mode: mode.name(),
                    preset: "board",
                })?;
                Ok(Some(Preset::Board(board.to_preset()?)))
            }
            PuzzleMode::Line => {
                let line = self.preset.line.clone().ok_or(PuzzleError::MissingPreset {
                    mode: mode.name(),
                    preset: "line",
                })?;
                Ok(Some(Preset::Line(line)))
            }
        }
    }

    /// Everything the encoder needs, checked against the grid
    pub fn encoding_options(&self) -> Result<EncodingOptions, PuzzleError> {
        let grid = self.grid()?;
        let preset = self.active_preset()?;
        if let Some(preset) = &preset {
            preset.check_against(&grid)?;
        }
        Ok(EncodingOptions {
            grid,
            require_solved: self.puzzle.mode.requires_solved(),
            preset,
        })
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(mode) = cli_overrides.mode {
            self.puzzle.mode = mode;
        }
        if let Some(cols) = cli_overrides.cols {
            self.puzzle.cols = cols;
        }
        if let Some(rows) = cli_overrides.rows {
            self.puzzle.rows = rows;
        }
        // A preset on the command line replaces both presets from the file
        if let Some(ref line) = cli_overrides.line {
            self.preset.line = Some(line.clone());
            self.preset.board = None;
        }
        if let Some(ref board) = cli_overrides.board {
            self.puzzle.cols = board.cols;
            self.puzzle.rows = board.rows;
            self.preset.board = Some(BoardConfig::from(board));
            self.preset.line = None;
        }
        if let Some(allowance) = cli_overrides.bruteforce_allowance {
            self.solver.bruteforce_allowance = Some(allowance);
        }
        if let Some(backend) = cli_overrides.backend {
            self.solver.backend = backend;
        }
        if cli_overrides.enumerate {
            self.solver.enumerate = true;
        }
        if cli_overrides.count {
            self.solver.count = true;
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = Some(output_dir.clone());
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub mode: Option<PuzzleMode>,
    pub cols: Option<usize>,
    pub rows: Option<usize>,
    pub line: Option<LinePreset>,
    pub board: Option<BoardPreset>,
    pub bruteforce_allowance: Option<usize>,
    pub backend: Option<SolverBackend>,
    pub enumerate: bool,
    pub count: bool,
    pub format: Option<OutputFormat>,
    pub output_dir: Option<PathBuf>,
}
