//! Lists every distinct solution of a compiled model exactly once.
//!
//! Small instances (at most `bruteforce_allowance` models) are drawn eagerly
//! from a single session and checked against a seen-set; larger ones stream
//! lazily from [`CompiledModel::all_solutions`].

use super::model::{AllSolutions, CompiledModel};
use super::solver::Assignment;
use anyhow::Result;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumerationStrategy {
    /// Draw models one at a time and keep only unseen ones
    Sampling,
    /// Hand out the solver's exhaustive stream as-is
    Streaming,
}

impl fmt::Display for EnumerationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumerationStrategy::Sampling => write!(f, "sampling"),
            EnumerationStrategy::Streaming => write!(f, "streaming"),
        }
    }
}

pub struct SolutionEnumerator<'a> {
    model: &'a CompiledModel,
    bruteforce_allowance: usize,
}

impl<'a> SolutionEnumerator<'a> {
    pub fn new(model: &'a CompiledModel, bruteforce_allowance: usize) -> Self {
        Self {
            model,
            bruteforce_allowance,
        }
    }

    /// Pick a strategy from a bounded count, then produce the solutions.
    ///
    /// Counting stops one past the allowance, so a large instance is never
    /// enumerated twice.
    pub fn enumerate(&self) -> Result<Enumeration> {
        let probe = self
            .model
            .count_solutions_up_to(self.bruteforce_allowance.saturating_add(1))?;

        if probe <= self.bruteforce_allowance {
            info!(total = probe, allowance = self.bruteforce_allowance, "sampling solutions");
            let solutions = self.sample(probe)?;
            Ok(Enumeration {
                strategy: EnumerationStrategy::Sampling,
                total: Some(probe),
                stream: SolutionStream::Sampled(solutions.into_iter()),
            })
        } else {
            info!(allowance = self.bruteforce_allowance, "more solutions than allowance, streaming");
            Ok(Enumeration {
                strategy: EnumerationStrategy::Streaming,
                total: None,
                stream: SolutionStream::Streamed(self.model.all_solutions()?),
            })
        }
    }

    /// Draw until `total` distinct models are in hand.
    ///
    /// The session blocks each drawn model, so duplicates only appear if the
    /// backend ignores a blocking clause; those are skipped.
    fn sample(&self, total: usize) -> Result<Vec<Assignment>> {
        let mut session = self.model.session()?;
        let mut seen: HashSet<Assignment> = HashSet::with_capacity(total);
        let mut solutions = Vec::with_capacity(total);
        let mut draws = 0usize;

        while solutions.len() < total {
            let Some(assignment) = session.solve()? else {
                anyhow::bail!(
                    "Solver ran out of models after {} of {} solutions",
                    solutions.len(),
                    total
                );
            };
            draws += 1;
            session.add_clause(&assignment.blocking_clause_over(self.model.projection()))?;
            if seen.insert(assignment.clone()) {
                solutions.push(assignment);
            } else {
                warn!(draws, "solver repeated a model");
            }
        }

        debug!(draws, distinct = solutions.len(), "sampling finished");
        Ok(solutions)
    }
}

/// The outcome of [`SolutionEnumerator::enumerate`]; iterate it for the models.
pub struct Enumeration {
    strategy: EnumerationStrategy,
    total: Option<usize>,
    stream: SolutionStream,
}

impl Enumeration {
    pub fn strategy(&self) -> EnumerationStrategy {
        self.strategy
    }

    /// Known only when the instance was small enough to sample
    pub fn total(&self) -> Option<usize> {
        self.total
    }
}

enum SolutionStream {
    Sampled(std::vec::IntoIter<Assignment>),
    Streamed(AllSolutions),
}

impl Iterator for Enumeration {
    type Item = Result<Assignment>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.stream {
            SolutionStream::Sampled(solutions) => solutions.next().map(Ok),
            SolutionStream::Streamed(solutions) => solutions.next(),
        }
    }
}
