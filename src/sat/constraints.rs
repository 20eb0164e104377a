//! Clauses, the append-only formula, and the cardinality/gate helpers the
//! constraint builders are written in

use super::variables::{VariableManager, VariableType};
use crate::puzzle::Grid;
use itertools::Itertools;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub literals: Vec<i32>, // Positive for variable, negative for negation
}

impl Clause {
    /// Create a new clause from literals
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    /// Create a unit clause (single literal)
    pub fn unit(literal: i32) -> Self {
        Self { literals: vec![literal] }
    }

    /// Create a binary clause (two literals)
    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self { literals: vec![lit1, lit2] }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Check if clause is unit
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }

    /// Whether `assignment(var)` satisfies this clause.
    pub fn is_satisfied_by(&self, assignment: impl Fn(i32) -> bool) -> bool {
        self.literals
            .iter()
            .any(|&lit| assignment(lit.abs()) == (lit > 0))
    }
}

/// A growing conjunction of clauses plus the registry naming its variables.
///
/// The constant `false` atom is registered first and pinned by a unit clause.
/// Clauses added afterwards are simplified against it: a `false` literal is
/// dropped, a `true` literal (its negation) discards the clause.
#[derive(Debug, Clone)]
pub struct Formula {
    variables: VariableManager,
    clauses: Vec<Clause>,
    falsum: i32,
}

impl Formula {
    pub fn new(grid: Grid) -> Self {
        let mut variables = VariableManager::new(grid);
        let falsum = variables.falsum();
        Self {
            variables,
            clauses: vec![Clause::unit(-falsum)],
            falsum,
        }
    }

    pub fn grid(&self) -> Grid {
        self.variables.grid()
    }

    pub fn variables(&self) -> &VariableManager {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableManager {
        &mut self.variables
    }

    /// Shorthand for registering a variable.
    pub fn var(&mut self, var_type: VariableType) -> i32 {
        self.variables.get_variable(var_type)
    }

    /// The constant `false` literal. Its negation is the constant `true`.
    pub fn falsum(&self) -> i32 {
        self.falsum
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// Give up the formula for querying; nothing can be appended afterwards.
    pub fn into_parts(self) -> (VariableManager, Vec<Clause>) {
        (self.variables, self.clauses)
    }

    /// Append a clause after constant folding and duplicate removal.
    ///
    /// A clause left with no literals becomes the unit `false`, making the
    /// formula unsatisfiable rather than handing an empty clause to a solver.
    pub fn add_clause(&mut self, literals: impl IntoIterator<Item = i32>) {
        let mut kept: Vec<i32> = Vec::new();
        for lit in literals {
            if lit == -self.falsum || kept.contains(&-lit) {
                return;
            }
            if lit != self.falsum && !kept.contains(&lit) {
                kept.push(lit);
            }
        }
        if kept.is_empty() {
            kept.push(self.falsum);
        }
        self.clauses.push(Clause::new(kept));
    }

    pub fn add_unit(&mut self, literal: i32) {
        self.add_clause([literal]);
    }

    /// `a ⇒ b`
    pub fn imply(&mut self, a: i32, b: i32) {
        self.add_clause([-a, b]);
    }

    pub fn at_least_one(&mut self, literals: &[i32]) {
        self.add_clause(literals.iter().copied());
    }

    /// Pairwise exclusion.
    pub fn at_most_one(&mut self, literals: &[i32]) {
        self.at_most_k_when(&[], literals, 1);
    }

    pub fn exactly_one(&mut self, literals: &[i32]) {
        self.at_least_one(literals);
        self.at_most_one(literals);
    }

    /// At most `k` of `literals` hold whenever every literal in `guard` holds.
    ///
    /// Every `(k+1)`-subset gets a clause saying one of its members is false.
    pub fn at_most_k_when(&mut self, guard: &[i32], literals: &[i32], k: usize) {
        if k >= literals.len() {
            return;
        }
        for subset in literals.iter().copied().combinations(k + 1) {
            let clause = guard
                .iter()
                .map(|&g| -g)
                .chain(subset.into_iter().map(|lit| -lit))
                .collect::<Vec<_>>();
            self.add_clause(clause);
        }
    }

    /// At least `k` of `literals` hold whenever every literal in `guard` holds.
    ///
    /// Every `(n-k+1)`-subset must contain a true member.
    pub fn at_least_k_when(&mut self, guard: &[i32], literals: &[i32], k: usize) {
        if k == 0 {
            return;
        }
        let negated_guard = guard.iter().map(|&g| -g);
        if k > literals.len() {
            self.add_clause(negated_guard);
            return;
        }
        for subset in literals.iter().copied().combinations(literals.len() - k + 1) {
            let clause = negated_guard.clone().chain(subset).collect::<Vec<_>>();
            self.add_clause(clause);
        }
    }

    pub fn exactly_k_when(&mut self, guard: &[i32], literals: &[i32], k: usize) {
        self.at_least_k_when(guard, literals, k);
        self.at_most_k_when(guard, literals, k);
    }

    /// `output ⇔ ∧ inputs`
    pub fn define_and(&mut self, output: i32, inputs: &[i32]) {
        for &input in inputs {
            self.add_clause([-output, input]);
        }
        self.add_clause(std::iter::once(output).chain(inputs.iter().map(|&i| -i)));
    }

    /// `output ⇔ ∨ inputs`
    pub fn define_or(&mut self, output: i32, inputs: &[i32]) {
        for &input in inputs {
            self.add_clause([-input, output]);
        }
        self.add_clause(std::iter::once(-output).chain(inputs.iter().copied()));
    }

    /// A literal equivalent to `∧ inputs`, folding constants before
    /// introducing a fresh gate.
    pub fn and_gate(&mut self, inputs: &[i32]) -> i32 {
        if inputs.contains(&self.falsum) {
            return self.falsum;
        }
        let mut live: Vec<i32> = inputs.iter().copied().filter(|&i| i != -self.falsum).collect();
        live.dedup();
        match live.as_slice() {
            [] => -self.falsum,
            [single] => *single,
            _ => {
                let gate = self.variables.fresh_gate();
                self.define_and(gate, &live);
                gate
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula() -> Formula {
        Formula::new(Grid::new(2, 2).unwrap())
    }

    /// Brute-force every assignment of the listed variables, with the constant pinned.
    fn models(formula: &Formula, vars: &[i32]) -> Vec<Vec<bool>> {
        let falsum = formula.falsum();
        let mut result = Vec::new();
        for mask in 0u32..(1 << vars.len()) {
            let value = |var: i32| {
                if var == falsum {
                    return false;
                }
                let pos = vars.iter().position(|&v| v == var).unwrap();
                mask & (1 << pos) != 0
            };
            if formula.clauses().iter().all(|c| c.is_satisfied_by(value)) {
                result.push((0..vars.len()).map(|i| mask & (1 << i) != 0).collect());
            }
        }
        result
    }

    fn fresh(formula: &mut Formula, n: usize) -> Vec<i32> {
        (0..n).map(|_| formula.variables_mut().fresh_gate()).collect()
    }

    #[test]
    fn test_clause_creation() {
        assert!(Clause::new(vec![]).is_empty());
        assert!(Clause::unit(3).is_unit());
        assert_eq!(Clause::binary(1, -2).literals, vec![1, -2]);
    }

    #[test]
    fn test_constant_folding() {
        let mut f = formula();
        let falsum = f.falsum();
        let before = f.clause_count();

        // Satisfied by the constant true: dropped entirely
        f.add_clause([3, -falsum]);
        assert_eq!(f.clause_count(), before);

        // The constant false literal is removed
        f.add_clause([falsum, 3, 3]);
        assert_eq!(f.clauses().last().unwrap().literals, vec![3]);

        // Tautologies are dropped
        f.add_clause([4, -4]);
        assert_eq!(f.clause_count(), before + 1);

        // Nothing left: the clause becomes `false`
        f.add_clause([falsum]);
        assert_eq!(f.clauses().last().unwrap().literals, vec![falsum]);
    }

    #[test]
    fn test_exactly_one() {
        let mut f = formula();
        let vars = fresh(&mut f, 3);
        f.exactly_one(&vars);
        let found = models(&f, &vars);
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|m| m.iter().filter(|&&b| b).count() == 1));
    }

    #[test]
    fn test_exactly_two_of_four() {
        let mut f = formula();
        let vars = fresh(&mut f, 4);
        f.exactly_k_when(&[], &vars, 2);
        let found = models(&f, &vars);
        assert_eq!(found.len(), 6);
        assert!(found.iter().all(|m| m.iter().filter(|&&b| b).count() == 2));
    }

    #[test]
    fn test_guarded_cardinality() {
        let mut f = formula();
        let vars = fresh(&mut f, 4);
        let (guard, edges) = (vars[0], &vars[1..]);
        f.exactly_k_when(&[guard], edges, 1);
        for model in models(&f, &vars) {
            let count = model[1..].iter().filter(|&&b| b).count();
            if model[0] {
                assert_eq!(count, 1);
            }
        }
        // Unguarded assignments stay free
        assert_eq!(models(&f, &vars).len(), 8 + 3);
    }

    #[test]
    fn test_at_least_more_than_available() {
        let mut f = formula();
        let vars = fresh(&mut f, 2);
        f.at_least_k_when(&[vars[0]], &vars[1..], 2);
        let found = models(&f, &vars);
        assert!(found.iter().all(|m| !m[0]));
    }

    #[test]
    fn test_define_and_or() {
        let mut f = formula();
        let vars = fresh(&mut f, 4);
        f.define_and(vars[0], &vars[2..]);
        f.define_or(vars[1], &vars[2..]);
        let found = models(&f, &vars);
        assert_eq!(found.len(), 4);
        for m in found {
            assert_eq!(m[0], m[2] && m[3]);
            assert_eq!(m[1], m[2] || m[3]);
        }
    }

    #[test]
    fn test_and_gate_folds_constants() {
        let mut f = formula();
        let falsum = f.falsum();
        let vars = fresh(&mut f, 2);
        assert_eq!(f.and_gate(&[vars[0], falsum]), falsum);
        assert_eq!(f.and_gate(&[vars[0], -falsum]), vars[0]);
        assert_eq!(f.and_gate(&[]), -falsum);

        let count = f.variables().variable_count();
        let gate = f.and_gate(&vars);
        assert_eq!(f.variables().variable_count(), count + 1);
        let all = [vars[0], vars[1], gate];
        for m in models(&f, &all) {
            assert_eq!(m[2], m[0] && m[1]);
        }
    }
}
