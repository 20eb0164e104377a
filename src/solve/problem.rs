//! A configured puzzle: encoded once, then queried

use super::{MultiValidationResult, Solution, SolutionValidator, ValidationResult};
use crate::config::Settings;
use crate::puzzle::Preset;
use crate::sat::{CompiledModel, EncodingStatistics, EnumerationStrategy, SatEncoder, SolutionEnumerator};
use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Represents one puzzle instance ready for solving
pub struct PuzzleProblem {
    settings: Settings,
    encoder: SatEncoder,
    model: CompiledModel,
    validator: SolutionValidator,
}

/// What a full solve produced
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Solutions that passed validation, in enumeration order
    pub solutions: Vec<Solution>,
    /// Solutions kept after validation when enumerating, or the model count
    /// when only the first solution was requested with counting on
    pub total: Option<usize>,
    /// `None` when only the first solution was requested
    pub strategy: Option<EnumerationStrategy>,
    pub validation: MultiValidationResult,
    pub elapsed: Duration,
}

impl PuzzleProblem {
    /// Encode the puzzle described by `settings`.
    ///
    /// Configuration errors surface here, before any solver call.
    pub fn new(settings: Settings) -> Result<Self> {
        let options = settings
            .encoding_options()
            .context("Invalid puzzle configuration")?;
        let limit_empty_tiles = !matches!(options.preset, Some(Preset::Board(_)));
        let validator = SolutionValidator::new(options.require_solved, limit_empty_tiles);

        let encoder = SatEncoder::new(options);
        let model = encoder
            .compile(settings.solver.backend)
            .context("Failed to encode puzzle")?;
        info!(
            mode = %settings.puzzle.mode,
            variables = model.variables().variable_count(),
            clauses = model.clauses().len(),
            "puzzle encoded"
        );

        Ok(Self {
            settings,
            encoder,
            model,
            validator,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn model(&self) -> &CompiledModel {
        &self.model
    }

    pub fn encoding_statistics(&self) -> Result<EncodingStatistics> {
        Ok(self.encoder.statistics()?)
    }

    pub fn is_satisfiable(&self) -> Result<bool> {
        self.model.is_satisfiable().context("SAT solving failed")
    }

    pub fn first_solution(&self) -> Result<Option<Solution>> {
        let Some(assignment) = self.model.solve_one().context("SAT solving failed")? else {
            return Ok(None);
        };
        Ok(Some(Solution::decode(self.model.variables(), &assignment, 0)?))
    }

    pub fn count_solutions(&self) -> Result<usize> {
        self.model.count_solutions().context("SAT counting failed")
    }

    /// Every distinct solution, decoded lazily
    pub fn solutions(
        &self,
    ) -> Result<(EnumerationStrategy, Option<usize>, impl Iterator<Item = Result<Solution>> + '_)> {
        let enumeration = SolutionEnumerator::new(&self.model, self.settings.bruteforce_allowance())
            .enumerate()
            .context("SAT enumeration failed")?;
        let (strategy, total) = (enumeration.strategy(), enumeration.total());
        let variables = self.model.variables();
        let stream = enumeration
            .enumerate()
            .map(move |(index, assignment)| Solution::decode(variables, &assignment?, index));
        Ok((strategy, total, stream))
    }

    /// Like [`PuzzleProblem::solutions`], each solution paired with its
    /// re-validation. Nothing is collected, so this suits instances whose
    /// solutions do not fit in memory.
    pub fn validated_solutions(
        &self,
    ) -> Result<(
        EnumerationStrategy,
        Option<usize>,
        impl Iterator<Item = Result<(Solution, ValidationResult)>> + '_,
    )> {
        let (strategy, total, stream) = self.solutions()?;
        let validator = self.validator;
        let stream = stream.map(move |solution| {
            let solution = solution?;
            let result = validator.validate(&solution);
            Ok((solution, result))
        });
        Ok((strategy, total, stream))
    }

    pub fn validator(&self) -> &SolutionValidator {
        &self.validator
    }

    /// Solve according to the settings: the first solution, or all of them,
    /// each re-validated. Solutions failing validation are dropped with a
    /// warning, and an enumerated total counts only the ones kept.
    ///
    /// The report holds every solution; use
    /// [`PuzzleProblem::validated_solutions`] to stream large instances.
    pub fn solve(&self) -> Result<SolveReport> {
        let start_time = Instant::now();

        let (candidates, strategy) = if self.settings.solver.enumerate {
            let (strategy, _, stream) = self.solutions()?;
            (stream.collect::<Result<Vec<_>>>()?, Some(strategy))
        } else {
            (self.first_solution()?.into_iter().collect(), None)
        };

        let validation = self.validator.validate_all(&candidates);
        if validation.invalid_solutions > 0 {
            warn!(invalid = validation.invalid_solutions, "solutions failed validation");
        }
        let solutions: Vec<Solution> = candidates
            .into_iter()
            .zip(&validation.individual_results)
            .filter(|(_, result)| result.is_valid)
            .map(|(solution, _)| solution)
            .collect();

        let total = if self.settings.solver.enumerate {
            Some(solutions.len())
        } else if self.settings.solver.count {
            Some(self.count_solutions()?)
        } else {
            None
        };

        let elapsed = start_time.elapsed();
        info!(
            found = solutions.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "solve finished"
        );

        Ok(SolveReport {
            solutions,
            total,
            strategy,
            validation,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PuzzleMode, SolverBackend};
    use crate::puzzle::{example_line, LinePreset};
    use std::collections::HashSet;

    fn settings(cols: usize, rows: usize, mode: PuzzleMode) -> Settings {
        let mut settings = Settings::default();
        settings.puzzle.cols = cols;
        settings.puzzle.rows = rows;
        settings.puzzle.mode = mode;
        settings
    }

    #[test]
    fn test_problem_creation() {
        let problem = PuzzleProblem::new(settings(2, 2, PuzzleMode::Free)).unwrap();
        assert!(!problem.model().clauses().is_empty());
        let stats = problem.encoding_statistics().unwrap();
        assert_eq!(stats.total_clauses, problem.model().clauses().len());
    }

    #[test]
    fn test_invalid_configuration_fails_early() {
        let mut bad = settings(1, 1, PuzzleMode::Line);
        bad.preset.line = Some(LinePreset::new(vec![(0, 0), (0, 1), (0, 2)]).unwrap());
        assert!(PuzzleProblem::new(bad).is_err());
    }

    #[test]
    fn test_single_tile_has_no_solution() {
        // One tile cannot be both black and white
        let problem = PuzzleProblem::new(settings(1, 1, PuzzleMode::Free)).unwrap();
        assert!(!problem.is_satisfiable().unwrap());
        assert!(problem.first_solution().unwrap().is_none());
        assert_eq!(problem.count_solutions().unwrap(), 0);
    }

    #[test]
    fn test_first_solution() {
        let problem = PuzzleProblem::new(settings(2, 1, PuzzleMode::Solved)).unwrap();
        let solution = problem.first_solution().unwrap().unwrap();
        assert!(solution.solved);
        assert_eq!(solution.index, 0);
    }

    #[test]
    fn test_solutions_match_count() {
        let mut s = settings(2, 1, PuzzleMode::Free);
        s.solver.backend = SolverBackend::Batsat;
        let problem = PuzzleProblem::new(s).unwrap();
        let count = problem.count_solutions().unwrap();
        let (_, _, stream) = problem.solutions().unwrap();
        let boards: Vec<Solution> = stream.map(|s| s.unwrap()).collect();
        assert_eq!(boards.len(), count);
        let distinct: HashSet<_> = boards
            .iter()
            .map(|s| (s.board_rows(), s.edges().to_vec(), s.start, s.end))
            .collect();
        assert_eq!(distinct.len(), count);
    }

    #[test]
    fn test_solve_fixed_line() {
        let mut s = Settings::with_line(3, 3, example_line());
        s.solver.enumerate = true;
        let report = PuzzleProblem::new(s).unwrap().solve().unwrap();
        assert!(!report.solutions.is_empty());
        assert_eq!(report.validation.invalid_solutions, 0);
        assert_eq!(report.total, Some(report.solutions.len()));
        for solution in &report.solutions {
            assert!(solution.solved);
            assert_eq!(solution.path(), example_line().points());
        }
    }

    #[test]
    fn test_total_counts_only_kept_solutions() {
        let mut s = settings(2, 1, PuzzleMode::Solved);
        s.solver.enumerate = true;
        let problem = PuzzleProblem::new(s).unwrap();
        let report = problem.solve().unwrap();
        let kept = report.solutions.len();
        assert_eq!(report.total, Some(kept));
        assert_eq!(report.validation.valid_solutions, kept);
        assert_eq!(
            report.validation.valid_solutions + report.validation.invalid_solutions,
            problem.count_solutions().unwrap()
        );
    }

    #[test]
    fn test_validated_solutions_stream() {
        let mut s = settings(2, 1, PuzzleMode::Free);
        s.solver.bruteforce_allowance = Some(0);
        let problem = PuzzleProblem::new(s).unwrap();
        let (strategy, total, mut stream) = problem.validated_solutions().unwrap();
        assert_eq!(strategy, EnumerationStrategy::Streaming);
        assert_eq!(total, None);

        let (first, result) = stream.next().unwrap().unwrap();
        assert_eq!(first.index, 0);
        assert!(result.is_valid, "{:?}", result.violations);
        assert_eq!(stream.count() + 1, problem.count_solutions().unwrap());
    }

    #[test]
    fn test_solve_first_with_count() {
        let mut s = settings(2, 1, PuzzleMode::Solved);
        s.solver.count = true;
        let report = PuzzleProblem::new(s).unwrap().solve().unwrap();
        assert_eq!(report.solutions.len(), 1);
        assert!(report.strategy.is_none());
        assert!(report.total.unwrap() >= 1);
    }
}
