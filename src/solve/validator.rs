//! Re-checks decoded solutions against the puzzle rules without the solver

use super::solution::Solution;
use crate::puzzle::{Coord, Direction, TileColor};
use rayon::prelude::*;
use std::fmt;
use tracing::warn;

/// Validates solutions directly on the decoded board and loop
#[derive(Debug, Clone, Copy)]
pub struct SolutionValidator {
    require_solved: bool,
    limit_empty_tiles: bool,
}

/// A single broken rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    CoincidentEndpoints,
    WrongDegree { node: Coord, expected: usize, found: usize },
    EdgeOffLoop { node: Coord },
    DetachedLoopNode { node: Coord },
    PathEndsEarly { last: Coord },
    MissingLabel { node: Coord },
    MultipleLabels { node: Coord, labels: Vec<usize> },
    WrongLabel { node: Coord, expected: usize, found: usize },
    StrayLabel { node: Coord },
    MissingColor { color: TileColor },
    TooManyEmpty { found: usize },
    EmptyTouchesBoth { cell: Coord },
    WhiteTouchesBlack { cell: Coord },
    SolvedFlagMismatch { claimed: bool, actual: bool },
    NotSolved,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::CoincidentEndpoints => write!(f, "start and end coincide"),
            Violation::WrongDegree { node, expected, found } => {
                write!(f, "node {:?} has {} active edges, expected {}", node, found, expected)
            }
            Violation::EdgeOffLoop { node } => write!(f, "node {:?} has an edge but is off the loop", node),
            Violation::DetachedLoopNode { node } => {
                write!(f, "node {:?} is on the loop but not reachable from the start", node)
            }
            Violation::PathEndsEarly { last } => write!(f, "path from the start stops at {:?}", last),
            Violation::MissingLabel { node } => write!(f, "loop node {:?} has no distance label", node),
            Violation::MultipleLabels { node, labels } => {
                write!(f, "node {:?} has several distance labels {:?}", node, labels)
            }
            Violation::WrongLabel { node, expected, found } => {
                write!(f, "node {:?} is {} steps from the start but labelled {}", node, expected, found)
            }
            Violation::StrayLabel { node } => write!(f, "off-loop node {:?} has a distance label", node),
            Violation::MissingColor { color } => write!(f, "no {} tile", color),
            Violation::TooManyEmpty { found } => write!(f, "{} empty tiles on a free board", found),
            Violation::EmptyTouchesBoth { cell } => write!(f, "empty tile {:?} touches both colors", cell),
            Violation::WhiteTouchesBlack { cell } => write!(f, "white tile {:?} touches a black tile", cell),
            Violation::SolvedFlagMismatch { claimed, actual } => {
                write!(f, "model says solved={} but the board is solved={}", claimed, actual)
            }
            Violation::NotSolved => write!(f, "board is not solved"),
        }
    }
}

/// Result of solution validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub index: usize,
    pub is_valid: bool,
    /// Whether the board itself satisfies the coloring rules
    pub board_solved: bool,
    pub violations: Vec<Violation>,
}

impl SolutionValidator {
    pub fn new(require_solved: bool, limit_empty_tiles: bool) -> Self {
        Self {
            require_solved,
            limit_empty_tiles,
        }
    }

    /// Check every rule and collect what is broken
    pub fn validate(&self, solution: &Solution) -> ValidationResult {
        let mut violations = Vec::new();
        self.check_topology(solution, &mut violations);
        self.check_labels(solution, &mut violations);
        self.check_cardinality(solution, &mut violations);
        let board_solved = self.check_regions(solution, &mut violations);

        if solution.solved != board_solved {
            violations.push(Violation::SolvedFlagMismatch {
                claimed: solution.solved,
                actual: board_solved,
            });
        }
        if self.require_solved && !board_solved {
            violations.push(Violation::NotSolved);
        }

        for violation in &violations {
            warn!(solution = solution.index, "{}", violation);
        }

        ValidationResult {
            index: solution.index,
            is_valid: violations.is_empty(),
            board_solved,
            violations,
        }
    }

    /// Validate a batch in parallel
    pub fn validate_all(&self, solutions: &[Solution]) -> MultiValidationResult {
        let results: Vec<ValidationResult> =
            solutions.par_iter().map(|solution| self.validate(solution)).collect();
        let valid_solutions = results.iter().filter(|r| r.is_valid).count();

        MultiValidationResult {
            total_solutions: solutions.len(),
            valid_solutions,
            invalid_solutions: solutions.len() - valid_solutions,
            total_violations: results.iter().map(|r| r.violations.len()).sum(),
            individual_results: results,
        }
    }

    /// One path from start to end with correct degrees and nothing else drawn
    fn check_topology(&self, solution: &Solution, violations: &mut Vec<Violation>) {
        if solution.start == solution.end {
            violations.push(Violation::CoincidentEndpoints);
        }

        for node in solution.grid.nodes() {
            let degree = solution.degree(node);
            if !solution.is_on_loop(node) {
                if degree > 0 {
                    violations.push(Violation::EdgeOffLoop { node });
                }
                continue;
            }
            let expected = if node == solution.start || node == solution.end { 1 } else { 2 };
            if degree != expected {
                violations.push(Violation::WrongDegree { node, expected, found: degree });
            }
        }

        let path = solution.path();
        if let Some(&last) = path.last() {
            if last != solution.end {
                violations.push(Violation::PathEndsEarly { last });
            }
        }
        for &node in solution.on_loop() {
            if !path.contains(&node) {
                violations.push(Violation::DetachedLoopNode { node });
            }
        }
    }

    /// Labels count steps from the start along the path
    fn check_labels(&self, solution: &Solution, violations: &mut Vec<Violation>) {
        let path = solution.path();
        for node in solution.grid.nodes() {
            let labels = solution.labels(node);
            if !solution.is_on_loop(node) {
                if !labels.is_empty() {
                    violations.push(Violation::StrayLabel { node });
                }
                continue;
            }
            match labels {
                [] => violations.push(Violation::MissingLabel { node }),
                [label] => {
                    if let Some(expected) = path.iter().position(|&n| n == node) {
                        if *label != expected {
                            violations.push(Violation::WrongLabel { node, expected, found: *label });
                        }
                    }
                }
                _ => violations.push(Violation::MultipleLabels {
                    node,
                    labels: labels.to_vec(),
                }),
            }
        }
    }

    fn check_cardinality(&self, solution: &Solution, violations: &mut Vec<Violation>) {
        for color in [TileColor::White, TileColor::Black] {
            if solution.count_tiles(color) == 0 {
                violations.push(Violation::MissingColor { color });
            }
        }
        let empty = solution.count_tiles(TileColor::Empty);
        if self.limit_empty_tiles && empty > 1 {
            violations.push(Violation::TooManyEmpty { found: empty });
        }
    }

    /// Recompute the touching rule; rule breaks are violations only when a
    /// solved board is required. Returns whether the board is solved.
    fn check_regions(&self, solution: &Solution, violations: &mut Vec<Violation>) -> bool {
        let mut solved = true;
        for cell in solution.grid.cells() {
            let touches = |color: TileColor| {
                Direction::ALL.iter().any(|&direction| {
                    solution.touches_across(cell, direction)
                        && solution
                            .grid
                            .cell_neighbor(cell, direction)
                            .is_some_and(|neighbor| solution.tile(neighbor) == color)
                })
            };
            let broken = match solution.tile(cell) {
                TileColor::Empty if touches(TileColor::Black) && touches(TileColor::White) => {
                    Some(Violation::EmptyTouchesBoth { cell })
                }
                TileColor::White if touches(TileColor::Black) => {
                    Some(Violation::WhiteTouchesBlack { cell })
                }
                _ => None,
            };
            if let Some(violation) = broken {
                solved = false;
                if self.require_solved {
                    violations.push(violation);
                }
            }
        }
        solved
    }
}

/// Result of validating multiple solutions
#[derive(Debug, Clone)]
pub struct MultiValidationResult {
    pub total_solutions: usize,
    pub valid_solutions: usize,
    pub invalid_solutions: usize,
    pub total_violations: usize,
    pub individual_results: Vec<ValidationResult>,
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Validation of solution {}: {}",
            self.index + 1,
            if self.is_valid { "VALID" } else { "INVALID" }
        )?;
        writeln!(f, "Board solved: {}", self.board_solved)?;
        for violation in &self.violations {
            writeln!(f, "  - {}", violation)?;
        }
        Ok(())
    }
}

impl fmt::Display for MultiValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Multi-Solution Validation Results:")?;
        writeln!(f, "  Total solutions: {}", self.total_solutions)?;
        writeln!(f, "  Valid solutions: {}", self.valid_solutions)?;
        writeln!(f, "  Invalid solutions: {}", self.invalid_solutions)?;
        writeln!(f, "  Total violations: {}", self.total_violations)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverBackend;
    use crate::puzzle::Grid;
    use crate::sat::{EncodingOptions, SatEncoder};

    fn solutions(options: EncodingOptions) -> Vec<Solution> {
        let model = SatEncoder::new(options).compile(SolverBackend::Cadical).unwrap();
        model
            .all_solutions()
            .unwrap()
            .take(20)
            .enumerate()
            .map(|(i, a)| Solution::decode(model.variables(), &a.unwrap(), i).unwrap())
            .collect()
    }

    #[test]
    fn test_solver_output_validates() {
        let grid = Grid::new(2, 1).unwrap();
        let found = solutions(EncodingOptions::free(grid));
        assert!(!found.is_empty());

        let result = SolutionValidator::new(false, true).validate_all(&found);
        assert_eq!(result.valid_solutions, found.len(), "{}", result);
        assert_eq!(result.total_violations, 0);
    }

    #[test]
    fn test_solved_mode_validates() {
        let grid = Grid::new(2, 2).unwrap();
        let found = solutions(EncodingOptions::solved(grid));
        assert!(!found.is_empty());
        let validator = SolutionValidator::new(true, true);
        for solution in &found {
            let result = validator.validate(solution);
            assert!(result.is_valid, "{}", result);
            assert!(result.board_solved);
        }
    }

    #[test]
    fn test_tampered_solution_rejected() {
        let grid = Grid::new(2, 1).unwrap();
        let mut solution = solutions(EncodingOptions::solved(grid)).remove(0);
        // Flip the reported flag: the recomputed board disagrees
        solution.solved = false;
        let result = SolutionValidator::new(false, true).validate(&solution);
        assert!(!result.is_valid);
        assert!(result
            .violations
            .contains(&Violation::SolvedFlagMismatch { claimed: false, actual: true }));
    }

    #[test]
    fn test_violation_messages() {
        let text = Violation::WrongDegree { node: (1, 2), expected: 2, found: 3 }.to_string();
        assert_eq!(text, "node (1, 2) has 3 active edges, expected 2");
        assert_eq!(Violation::MissingColor { color: TileColor::White }.to_string(), "no W tile");
    }
}
