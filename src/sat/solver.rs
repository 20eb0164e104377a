//! SAT solver integration using CaDiCaL

use super::constraints::Clause;
use anyhow::Result;
use cadical::Solver;
use std::fmt;

/// A total truth assignment over variables `1..=len`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    /// `values[i]` is the value of variable `i + 1`
    pub fn from_values(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// Value of a variable; variables beyond the assignment read as false.
    pub fn value(&self, var: i32) -> bool {
        usize::try_from(var - 1)
            .ok()
            .and_then(|index| self.values.get(index))
            .copied()
            .unwrap_or(false)
    }

    /// Whether a literal holds.
    pub fn holds(&self, literal: i32) -> bool {
        self.value(literal.abs()) == (literal > 0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, bool)> + '_ {
        self.values.iter().enumerate().map(|(i, &v)| (i as i32 + 1, v))
    }

    /// The clause every other assignment satisfies and this one falsifies.
    pub fn blocking_clause(&self) -> Clause {
        Clause::new(self.iter().map(|(var, value)| if value { -var } else { var }).collect())
    }

    /// Like [`Assignment::blocking_clause`], restricted to `vars`.
    pub fn blocking_clause_over(&self, vars: &[i32]) -> Clause {
        Clause::new(vars.iter().map(|&var| if self.value(var) { -var } else { var }).collect())
    }

    pub fn satisfies(&self, clause: &Clause) -> bool {
        clause.is_satisfied_by(|var| self.value(var))
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Assignment of {} variables: ", self.values.len())?;
        for (i, (var, value)) in self.iter().take(10).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", var, if value { "T" } else { "F" })?;
        }
        if self.values.len() > 10 {
            write!(f, ", ...")?;
        }
        Ok(())
    }
}

/// SAT solver wrapper for CaDiCaL
pub struct SatSolver {
    solver: Solver,
    variable_count: usize,
    clause_count: usize,
}

impl SatSolver {
    /// Create a new SAT solver instance
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
        }
    }

    /// Make extracted assignments cover at least `count` variables, even ones
    /// no clause mentions.
    pub fn reserve(&mut self, count: usize) {
        self.variable_count = self.variable_count.max(count);
    }

    /// Add clauses to the solver
    pub fn add_clauses(&mut self, clauses: &[Clause]) -> Result<()> {
        for clause in clauses {
            self.add_clause(clause)?;
        }
        Ok(())
    }

    /// Add a single clause to the solver
    pub fn add_clause(&mut self, clause: &Clause) -> Result<()> {
        if clause.is_empty() {
            anyhow::bail!("Cannot add empty clause (unsatisfiable)");
        }

        for &literal in &clause.literals {
            let var = literal.unsigned_abs() as usize;
            if var > self.variable_count {
                self.variable_count = var;
            }
        }

        self.solver.add_clause(clause.literals.iter().copied());

        self.clause_count += 1;
        Ok(())
    }

    /// Solve and return a satisfying assignment, or `None` when unsatisfiable
    pub fn solve(&mut self) -> Result<Option<Assignment>> {
        match self.solver.solve() {
            Some(true) => Ok(Some(self.extract_assignment())),
            Some(false) => Ok(None),
            None => anyhow::bail!("CaDiCaL stopped without deciding satisfiability"),
        }
    }

    /// Exclude `assignment` from every later solve
    pub fn add_blocking_clause(&mut self, assignment: &Assignment) -> Result<()> {
        self.add_clause(&assignment.blocking_clause())
    }

    fn extract_assignment(&self) -> Assignment {
        let values = (1..=self.variable_count as i32)
            .map(|var| self.solver.value(var).unwrap_or(false))
            .collect();
        Assignment::from_values(values)
    }

    /// Get the number of variables
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Get the number of clauses
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }
}

impl Default for SatSolver {
    fn default() -> Self {
        Self::new()
    }
}
