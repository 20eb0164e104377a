//! Assembles the full puzzle formula from its constraint builders

use super::constraints::Formula;
use super::model::CompiledModel;
use super::presets::PresetBinder;
use super::region::RegionConstraints;
use super::topology::TopologyConstraints;
use super::variables::VariableStatistics;
use crate::config::SolverBackend;
use crate::error::PuzzleError;
use crate::puzzle::{Grid, Preset};
use tracing::debug;

/// Everything that shapes the formula
#[derive(Debug, Clone)]
pub struct EncodingOptions {
    pub grid: Grid,
    /// Assert `Valid` instead of reporting it per solution
    pub require_solved: bool,
    pub preset: Option<Preset>,
}

impl EncodingOptions {
    /// Free board: any layout, solved or not
    pub fn free(grid: Grid) -> Self {
        Self {
            grid,
            require_solved: false,
            preset: None,
        }
    }

    pub fn solved(grid: Grid) -> Self {
        Self {
            require_solved: true,
            ..Self::free(grid)
        }
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self
    }
}

/// Main SAT encoder for the puzzle
pub struct SatEncoder {
    options: EncodingOptions,
}

impl SatEncoder {
    pub fn new(options: EncodingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncodingOptions {
        &self.options
    }

    /// Build the formula. Preset errors surface here, before any solver runs.
    pub fn encode(&self) -> Result<Formula, PuzzleError> {
        let grid = self.options.grid;
        if let Some(preset) = &self.options.preset {
            preset.check_against(&grid)?;
        }

        let mut formula = Formula::new(grid);
        TopologyConstraints::new(grid).encode(&mut formula);

        // A fixed board dictates its own empty tiles
        let limit_empty_tiles = !matches!(self.options.preset, Some(Preset::Board(_)));
        RegionConstraints::new(grid, limit_empty_tiles, self.options.require_solved)
            .encode(&mut formula);

        if let Some(preset) = &self.options.preset {
            PresetBinder::new(grid).bind(&mut formula, preset)?;
        }

        debug!(
            grid = %grid,
            variables = formula.variables().variable_count(),
            clauses = formula.clause_count(),
            "formula encoded"
        );
        Ok(formula)
    }

    /// Encode and fix the formula for `backend`
    pub fn compile(&self, backend: SolverBackend) -> Result<CompiledModel, PuzzleError> {
        Ok(self.encode()?.compile(backend))
    }

    /// Encode and summarize the result
    pub fn statistics(&self) -> Result<EncodingStatistics, PuzzleError> {
        let formula = self.encode()?;
        Ok(EncodingStatistics {
            grid: self.options.grid,
            require_solved: self.options.require_solved,
            preset: self.options.preset.as_ref().map(|preset| match preset {
                Preset::Board(_) => "board",
                Preset::Line(_) => "line",
            }),
            total_clauses: formula.clause_count(),
            variables: formula.variables().statistics(),
        })
    }
}

/// Statistics about the SAT encoding
#[derive(Debug, Clone)]
pub struct EncodingStatistics {
    pub grid: Grid,
    pub require_solved: bool,
    pub preset: Option<&'static str>,
    pub total_clauses: usize,
    pub variables: VariableStatistics,
}

impl std::fmt::Display for EncodingStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Encoding Statistics:")?;
        writeln!(f, "  Grid: {}", self.grid)?;
        writeln!(f, "  Solved boards only: {}", self.require_solved)?;
        writeln!(f, "  Preset: {}", self.preset.unwrap_or("none"))?;
        writeln!(f, "  Total clauses: {}", self.total_clauses)?;
        write!(f, "{}", self.variables)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{example_board, example_line, LinePreset};
    use crate::sat::variables::VariableType;

    #[test]
    fn test_encoder_creation() {
        let grid = Grid::new(2, 2).unwrap();
        let encoder = SatEncoder::new(EncodingOptions::free(grid));
        assert!(!encoder.options().require_solved);

        let formula = encoder.encode().unwrap();
        assert!(formula.clause_count() > 0);
        // The constant is the first variable
        assert_eq!(formula.variables().describe(1), Some(&VariableType::False));
    }

    #[test]
    fn test_solved_mode_pins_valid() {
        let grid = Grid::new(2, 2).unwrap();
        let formula = SatEncoder::new(EncodingOptions::solved(grid)).encode().unwrap();
        let valid = formula.variables().lookup(&VariableType::Valid).unwrap();
        assert!(formula.clauses().iter().any(|c| c.literals == vec![valid]));

        let free = SatEncoder::new(EncodingOptions::free(grid)).encode().unwrap();
        assert!(!free.clauses().iter().any(|c| c.literals == vec![valid]));
    }

    #[test]
    fn test_preset_checked_before_encoding() {
        let grid = Grid::new(2, 2).unwrap();
        let options = EncodingOptions::solved(grid).with_preset(Preset::Board(example_board()));
        assert!(matches!(
            SatEncoder::new(options).encode(),
            Err(PuzzleError::BoardDimensionMismatch { .. })
        ));

        let line = LinePreset::new(vec![(2, 2), (3, 2)]).unwrap();
        let options = EncodingOptions::solved(grid).with_preset(Preset::Line(line));
        assert!(matches!(
            SatEncoder::new(options).encode(),
            Err(PuzzleError::NodeOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_statistics() {
        let grid = Grid::new(3, 3).unwrap();
        let options = EncodingOptions::solved(grid).with_preset(Preset::Line(example_line()));
        let stats = SatEncoder::new(options).statistics().unwrap();
        assert_eq!(stats.preset, Some("line"));
        assert!(stats.variables.total_variables > 0);
        let text = stats.to_string();
        assert!(text.contains("Grid: 3x3"));
        assert!(text.contains("Preset: line"));
    }
}
