//! Puzzle instances, decoded solutions and their validation

pub mod problem;
pub mod solution;
pub mod validator;

pub use problem::{PuzzleProblem, SolveReport};
pub use solution::{Solution, SolutionSummary};
pub use validator::{MultiValidationResult, SolutionValidator, ValidationResult, Violation};
