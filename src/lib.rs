//! Black and White Squares SAT Solver
//!
//! Encodes the single-loop tile puzzle as a propositional formula and
//! enumerates its solutions: one simple path of segments between grid corners
//! that keeps white tiles away from black ones, and no empty tile touching
//! both colors.

pub mod config;
pub mod error;
pub mod puzzle;
pub mod sat;
pub mod solve;
pub mod utils;

pub use config::Settings;
pub use error::PuzzleError;
pub use solve::{PuzzleProblem, Solution, SolveReport};

use anyhow::Result;

/// Main entry point: encode the configured puzzle and solve it
pub fn solve_puzzle(settings: Settings) -> Result<SolveReport> {
    let problem = PuzzleProblem::new(settings)?;
    problem.solve()
}
