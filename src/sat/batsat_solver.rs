//! BatSat backend, reached through the rustsat solver interface

use super::constraints::Clause;
use super::solver::Assignment;
use anyhow::{anyhow, Result};
use rustsat::solvers::{Solve, SolverResult};
use rustsat::types::{Clause as RsClause, Lit, TernaryVal, Var};
use rustsat_batsat::BasicSolver;

/// Pure-Rust alternative to [`super::solver::SatSolver`] with the same surface
pub struct BatsatSatSolver {
    solver: BasicSolver,
    variable_count: usize,
    clause_count: usize,
}

impl BatsatSatSolver {
    pub fn new() -> Self {
        Self {
            solver: BasicSolver::default(),
            variable_count: 0,
            clause_count: 0,
        }
    }

    pub fn reserve(&mut self, count: usize) {
        self.variable_count = self.variable_count.max(count);
    }

    pub fn add_clauses(&mut self, clauses: &[Clause]) -> Result<()> {
        for clause in clauses {
            self.add_clause(clause)?;
        }
        Ok(())
    }

    pub fn add_clause(&mut self, clause: &Clause) -> Result<()> {
        if clause.is_empty() {
            anyhow::bail!("Cannot add empty clause (unsatisfiable)");
        }

        let mut lits = Vec::with_capacity(clause.literals.len());
        for &literal in &clause.literals {
            let var = literal.unsigned_abs() as usize;
            if var == 0 {
                anyhow::bail!("Literal 0 is not a variable");
            }
            self.variable_count = self.variable_count.max(var);
            lits.push(to_lit(literal));
        }

        self.solver
            .add_clause(RsClause::from(&lits[..]))
            .map_err(|e| anyhow!("BatSat rejected clause: {e}"))?;
        self.clause_count += 1;
        Ok(())
    }

    pub fn solve(&mut self) -> Result<Option<Assignment>> {
        let result = self
            .solver
            .solve()
            .map_err(|e| anyhow!("BatSat failed: {e}"))?;
        match result {
            SolverResult::Sat => self.extract_assignment().map(Some),
            SolverResult::Unsat => Ok(None),
            SolverResult::Interrupted => {
                anyhow::bail!("BatSat stopped without deciding satisfiability")
            }
        }
    }

    pub fn add_blocking_clause(&mut self, assignment: &Assignment) -> Result<()> {
        self.add_clause(&assignment.blocking_clause())
    }

    fn extract_assignment(&self) -> Result<Assignment> {
        if self.variable_count == 0 {
            return Ok(Assignment::from_values(Vec::new()));
        }
        let high = Var::new(self.variable_count as u32 - 1);
        let solution = self
            .solver
            .solution(high)
            .map_err(|e| anyhow!("BatSat has no model: {e}"))?;
        let values = (0..self.variable_count as u32)
            .map(|index| matches!(solution.var_value(Var::new(index)), TernaryVal::True))
            .collect();
        Ok(Assignment::from_values(values))
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn clause_count(&self) -> usize {
        self.clause_count
    }
}

impl Default for BatsatSatSolver {
    fn default() -> Self {
        Self::new()
    }
}

fn to_lit(literal: i32) -> Lit {
    let var = Var::new(literal.unsigned_abs() - 1);
    if literal > 0 {
        var.pos_lit()
    } else {
        var.neg_lit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batsat_basic() {
        let mut solver = BatsatSatSolver::new();
        solver.add_clause(&Clause::new(vec![1, 2])).unwrap();
        solver.add_clause(&Clause::unit(-1)).unwrap();
        assert_eq!(solver.clause_count(), 2);

        let assignment = solver.solve().unwrap().unwrap();
        assert!(!assignment.value(1));
        assert!(assignment.value(2));
    }

    #[test]
    fn test_batsat_unsat() {
        let mut solver = BatsatSatSolver::new();
        solver.add_clause(&Clause::unit(1)).unwrap();
        solver.add_clause(&Clause::unit(-1)).unwrap();
        assert!(solver.solve().unwrap().is_none());
    }

    #[test]
    fn test_batsat_enumerates_with_blocking() {
        let mut solver = BatsatSatSolver::new();
        solver.reserve(2);
        solver.add_clause(&Clause::new(vec![1, 2])).unwrap();

        let mut count = 0;
        while let Some(assignment) = solver.solve().unwrap() {
            assert_eq!(assignment.len(), 2);
            solver.add_blocking_clause(&assignment).unwrap();
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn test_batsat_rejects_empty_clause() {
        let mut solver = BatsatSatSolver::new();
        assert!(solver.add_clause(&Clause::new(vec![])).is_err());
    }
}
