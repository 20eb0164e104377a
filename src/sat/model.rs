//! A finished formula, fixed for querying against a solver backend

use super::constraints::{Clause, Formula};
use super::solver::Assignment;
use super::solver_factory::UnifiedSatSolver;
use super::variables::VariableManager;
use crate::config::SolverBackend;
use anyhow::Result;
use tracing::trace;

/// Read-only clause set plus the registry that names its variables.
///
/// Every query opens its own solver session, so queries never observe each
/// other's blocking clauses.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    variables: VariableManager,
    clauses: Vec<Clause>,
    backend: SolverBackend,
    projection: Vec<i32>,
}

impl Formula {
    /// Fix the formula for querying with `backend`
    pub fn compile(self, backend: SolverBackend) -> CompiledModel {
        let (variables, clauses) = self.into_parts();
        let mut projection: Vec<i32> = variables
            .iter()
            .filter(|(_, var_type)| var_type.is_decision())
            .map(|(var, _)| var)
            .collect();
        if projection.is_empty() {
            projection = (1..=variables.variable_count() as i32).collect();
        }
        projection.sort_unstable();
        CompiledModel {
            variables,
            clauses,
            backend,
            projection,
        }
    }
}

impl CompiledModel {
    pub fn variables(&self) -> &VariableManager {
        &self.variables
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn backend(&self) -> SolverBackend {
        self.backend
    }

    /// Variables a blocking clause ranges over.
    ///
    /// Decision variables when the registry has any, every variable otherwise.
    pub fn projection(&self) -> &[i32] {
        &self.projection
    }

    /// A fresh solver loaded with every clause
    pub fn session(&self) -> Result<UnifiedSatSolver> {
        let mut solver = UnifiedSatSolver::new(self.backend);
        solver.reserve(self.variables.variable_count());
        solver.add_clauses(&self.clauses)?;
        Ok(solver)
    }

    pub fn is_satisfiable(&self) -> Result<bool> {
        Ok(self.solve_one()?.is_some())
    }

    pub fn solve_one(&self) -> Result<Option<Assignment>> {
        self.session()?.solve()
    }

    /// Exact number of satisfying assignments
    pub fn count_solutions(&self) -> Result<usize> {
        self.count_solutions_up_to(usize::MAX)
    }

    /// Number of satisfying assignments, stopping once `limit` are found
    pub fn count_solutions_up_to(&self, limit: usize) -> Result<usize> {
        let mut count = 0;
        for assignment in self.all_solutions()? {
            assignment?;
            count += 1;
            if count >= limit {
                break;
            }
        }
        Ok(count)
    }

    /// Every satisfying assignment, each exactly once, in one lazy pass
    pub fn all_solutions(&self) -> Result<AllSolutions> {
        Ok(AllSolutions {
            solver: self.session()?,
            projection: self.projection.clone(),
            found: 0,
            exhausted: false,
        })
    }
}

/// Streams models by blocking each one before asking for the next
pub struct AllSolutions {
    solver: UnifiedSatSolver,
    projection: Vec<i32>,
    found: usize,
    exhausted: bool,
}

impl AllSolutions {
    /// Models yielded so far
    pub fn found(&self) -> usize {
        self.found
    }

    fn advance(&mut self) -> Result<Option<Assignment>> {
        let Some(assignment) = self.solver.solve()? else {
            return Ok(None);
        };
        self.solver
            .add_clause(&assignment.blocking_clause_over(&self.projection))?;
        self.found += 1;
        trace!(found = self.found, "model blocked");
        Ok(Some(assignment))
    }
}

impl Iterator for AllSolutions {
    type Item = Result<Assignment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.advance() {
            Ok(Some(assignment)) => Some(Ok(assignment)),
            Ok(None) => {
                self.exhausted = true;
                None
            }
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}
