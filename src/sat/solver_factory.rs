//! Factory for creating SAT solver instances based on configuration

use super::batsat_solver::BatsatSatSolver;
use super::constraints::Clause;
use super::solver::{Assignment, SatSolver};
use crate::config::SolverBackend;
use anyhow::Result;

/// Unified SAT solver interface that can use different backends
pub enum UnifiedSatSolver {
    Cadical(SatSolver),
    Batsat(BatsatSatSolver),
}

impl UnifiedSatSolver {
    /// Create a new solver instance based on the specified backend
    pub fn new(backend: SolverBackend) -> Self {
        match backend {
            SolverBackend::Cadical => UnifiedSatSolver::Cadical(SatSolver::new()),
            SolverBackend::Batsat => UnifiedSatSolver::Batsat(BatsatSatSolver::new()),
        }
    }

    /// Extracted assignments cover at least `count` variables
    pub fn reserve(&mut self, count: usize) {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.reserve(count),
            UnifiedSatSolver::Batsat(solver) => solver.reserve(count),
        }
    }

    /// Add clauses to the solver
    pub fn add_clauses(&mut self, clauses: &[Clause]) -> Result<()> {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.add_clauses(clauses),
            UnifiedSatSolver::Batsat(solver) => solver.add_clauses(clauses),
        }
    }

    /// Add a single clause to the solver
    pub fn add_clause(&mut self, clause: &Clause) -> Result<()> {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.add_clause(clause),
            UnifiedSatSolver::Batsat(solver) => solver.add_clause(clause),
        }
    }

    /// Solve and return a model, or `None` when unsatisfiable
    pub fn solve(&mut self) -> Result<Option<Assignment>> {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.solve(),
            UnifiedSatSolver::Batsat(solver) => solver.solve(),
        }
    }

    /// Forbid `assignment` in every later solve
    pub fn add_blocking_clause(&mut self, assignment: &Assignment) -> Result<()> {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.add_blocking_clause(assignment),
            UnifiedSatSolver::Batsat(solver) => solver.add_blocking_clause(assignment),
        }
    }

    /// Get the number of variables
    pub fn variable_count(&self) -> usize {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.variable_count(),
            UnifiedSatSolver::Batsat(solver) => solver.variable_count(),
        }
    }

    /// Get the number of clauses
    pub fn clause_count(&self) -> usize {
        match self {
            UnifiedSatSolver::Cadical(solver) => solver.clause_count(),
            UnifiedSatSolver::Batsat(solver) => solver.clause_count(),
        }
    }

    /// Get the backend type being used
    pub fn backend(&self) -> SolverBackend {
        match self {
            UnifiedSatSolver::Cadical(_) => SolverBackend::Cadical,
            UnifiedSatSolver::Batsat(_) => SolverBackend::Batsat,
        }
    }
}

impl Default for UnifiedSatSolver {
    fn default() -> Self {
        UnifiedSatSolver::Cadical(SatSolver::new())
    }
}
