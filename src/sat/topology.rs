//! Loop topology: one simple path of active edges from a unique start to a
//! unique end, with no branches and no detached cycles.
//!
//! Degrees alone admit extra disjoint cycles, each locally consistent. Every
//! loop node must therefore carry a distance label reachable from the start
//! by steps of exactly one, which only the path through the start can supply.

use super::constraints::Formula;
use crate::puzzle::{Coord, Direction, Grid};
use itertools::Itertools;

/// Emits the topology clauses for every node of a grid
pub struct TopologyConstraints {
    grid: Grid,
}

impl TopologyConstraints {
    pub fn new(grid: Grid) -> Self {
        Self { grid }
    }

    /// Append all topology clauses to `formula`
    pub fn encode(&self, formula: &mut Formula) {
        self.encode_endpoints(formula);

        for node in self.grid.nodes() {
            self.encode_node_presence(formula, node);
            self.encode_edge_validity(formula, node);
            self.encode_degree(formula, node);
            self.encode_distance_labels(formula, node);
        }

        self.encode_label_uniqueness(formula);
    }

    /// Exactly one start and exactly one end among all nodes
    fn encode_endpoints(&self, formula: &mut Formula) {
        let starts: Vec<i32> = self
            .grid
            .nodes()
            .map(|node| formula.variables_mut().start(node))
            .collect();
        let ends: Vec<i32> = self
            .grid
            .nodes()
            .map(|node| formula.variables_mut().end(node))
            .collect();
        formula.exactly_one(&starts);
        formula.exactly_one(&ends);
    }

    /// A node is not both start and end, and either one lies on the loop
    fn encode_node_presence(&self, formula: &mut Formula, node: Coord) {
        let vars = formula.variables_mut();
        let (start, end, on_loop) = (vars.start(node), vars.end(node), vars.on_loop(node));

        formula.add_clause([-start, -end]);
        formula.imply(start, on_loop);
        formula.imply(end, on_loop);
    }

    /// An active edge puts both of its endpoints on the loop.
    ///
    /// Edges crossing the boundary are the constant `false` and never registered.
    fn encode_edge_validity(&self, formula: &mut Formula, node: Coord) {
        for direction in [Direction::Up, Direction::Right] {
            let Some(neighbor) = self.grid.node_neighbor(node, direction) else {
                continue;
            };
            let vars = formula.variables_mut();
            let edge = vars.edge(node, direction);
            let here = vars.on_loop(node);
            let there = vars.on_loop(neighbor);
            formula.imply(edge, here);
            formula.imply(edge, there);
        }
    }

    /// Endpoints have exactly one active edge, every other loop node exactly two
    fn encode_degree(&self, formula: &mut Formula, node: Coord) {
        let vars = formula.variables_mut();
        let edges: Vec<i32> = Direction::ALL.iter().map(|&d| vars.edge(node, d)).collect();
        let (start, end, on_loop) = (vars.start(node), vars.end(node), vars.on_loop(node));

        formula.exactly_k_when(&[on_loop, start], &edges, 1);
        formula.exactly_k_when(&[on_loop, end], &edges, 1);
        formula.exactly_k_when(&[on_loop, -start, -end], &edges, 2);
    }

    /// Label 0 belongs to the start; label `k` needs an active edge to a
    /// neighbor labelled `k-1`; a loop node has exactly one label, an
    /// off-loop node none.
    fn encode_distance_labels(&self, formula: &mut Formula, node: Coord) {
        let max_distance = self.grid.max_distance();
        let vars = formula.variables_mut();
        let start = vars.start(node);
        let on_loop = vars.on_loop(node);
        let labels: Vec<i32> = (0..max_distance).map(|k| vars.distance(node, k)).collect();

        formula.imply(start, labels[0]);
        formula.imply(labels[0], start);

        for k in 1..max_distance {
            let predecessors: Vec<i32> = Direction::ALL
                .iter()
                .map(|&direction| match self.grid.node_neighbor(node, direction) {
                    Some(neighbor) => {
                        let vars = formula.variables_mut();
                        let edge = vars.edge(node, direction);
                        let previous = vars.distance(neighbor, k - 1);
                        formula.and_gate(&[edge, previous])
                    }
                    None => formula.falsum(),
                })
                .collect();
            formula.add_clause(std::iter::once(-labels[k]).chain(predecessors));
        }

        for &label in &labels {
            formula.imply(label, on_loop);
        }
        formula.add_clause(std::iter::once(-on_loop).chain(labels.iter().copied()));
        formula.at_most_one(&labels);
    }

    /// No two nodes share a distance label
    fn encode_label_uniqueness(&self, formula: &mut Formula) {
        let nodes = self.grid.nodes().collect_vec();
        for k in 0..self.grid.max_distance() {
            let holders: Vec<i32> = nodes
                .iter()
                .map(|&node| formula.variables_mut().distance(node, k))
                .collect();
            formula.at_most_one(&holders);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::variables::VariableType;

    fn encoded(cols: usize, rows: usize) -> Formula {
        let grid = Grid::new(cols, rows).unwrap();
        let mut formula = Formula::new(grid);
        TopologyConstraints::new(grid).encode(&mut formula);
        formula
    }

    /// Evaluate the formula under an assignment given as a list of true variables.
    fn satisfied(formula: &Formula, true_vars: &[VariableType]) -> bool {
        let vars = formula.variables();
        let true_ids: Vec<i32> = true_vars.iter().filter_map(|t| vars.lookup(t)).collect();
        assert_eq!(true_ids.len(), true_vars.len(), "every listed variable is registered");

        // Gates take the value of their definition; evaluate them in allocation order.
        let mut values = vec![false; vars.variable_count() + 1];
        for id in &true_ids {
            values[*id as usize] = true;
        }
        for clause in formula.clauses() {
            // Gate definitions are emitted as (-g ∨ a), (-g ∨ b), (g ∨ -a ∨ -b)
            if let [g, rest @ ..] = clause.literals.as_slice() {
                if *g > 0
                    && rest.iter().all(|l| *l < 0)
                    && matches!(vars.describe(*g), Some(VariableType::Gate { .. }))
                {
                    values[*g as usize] = rest.iter().all(|l| values[(-l) as usize]);
                }
            }
        }
        formula
            .clauses()
            .iter()
            .all(|c| c.is_satisfied_by(|v| values[v as usize]))
    }

    fn path_assignment(path: &[Coord]) -> Vec<VariableType> {
        let mut true_vars = vec![
            VariableType::Start { x: path[0].0, y: path[0].1 },
            VariableType::End { x: path[path.len() - 1].0, y: path[path.len() - 1].1 },
        ];
        for (k, &(x, y)) in path.iter().enumerate() {
            true_vars.push(VariableType::OnLoop { x, y });
            true_vars.push(VariableType::Distance { x, y, k });
        }
        for pair in path.windows(2) {
            let direction = Direction::between(pair[0], pair[1]).unwrap();
            let (node, direction) = if direction.is_forward() {
                (pair[0], direction)
            } else {
                (pair[1], direction.opposite())
            };
            true_vars.push(VariableType::Edge { x: node.0, y: node.1, direction });
        }
        true_vars
    }

    #[test]
    fn test_simple_path_satisfies() {
        let formula = encoded(1, 1);
        let path = [(0, 0), (0, 1), (1, 1), (1, 0)];
        assert!(satisfied(&formula, &path_assignment(&path)));
    }

    #[test]
    fn test_wrong_labels_rejected() {
        let formula = encoded(1, 1);
        let mut vars = path_assignment(&[(0, 0), (0, 1), (1, 1)]);
        // Swap the label of the middle node for a skipped value
        vars.retain(|v| *v != VariableType::Distance { x: 0, y: 1, k: 1 });
        vars.push(VariableType::Distance { x: 0, y: 1, k: 2 });
        assert!(!satisfied(&formula, &vars));
    }

    #[test]
    fn test_detached_cycle_rejected() {
        // A path along the bottom plus a separate square cycle above it
        let formula = encoded(2, 3);
        let mut vars = path_assignment(&[(0, 0), (1, 0), (2, 0)]);
        let cycle = [(0, 2), (0, 3), (1, 3), (1, 2)];
        for &(x, y) in &cycle {
            vars.push(VariableType::OnLoop { x, y });
        }
        vars.push(VariableType::Edge { x: 0, y: 2, direction: Direction::Up });
        vars.push(VariableType::Edge { x: 0, y: 3, direction: Direction::Right });
        vars.push(VariableType::Edge { x: 1, y: 2, direction: Direction::Up });
        vars.push(VariableType::Edge { x: 0, y: 2, direction: Direction::Right });
        // Degrees are all fine, but no label assignment can reach the cycle
        for (k, &(x, y)) in cycle.iter().enumerate() {
            vars.push(VariableType::Distance { x, y, k: 3 + k });
        }
        assert!(!satisfied(&formula, &vars));
    }

    #[test]
    fn test_branch_rejected() {
        let formula = encoded(2, 1);
        let mut vars = path_assignment(&[(0, 0), (1, 0), (2, 0)]);
        // Spur off the middle node
        vars.push(VariableType::OnLoop { x: 1, y: 1 });
        vars.push(VariableType::Edge { x: 1, y: 0, direction: Direction::Up });
        vars.push(VariableType::Distance { x: 1, y: 1, k: 2 });
        assert!(!satisfied(&formula, &vars));
    }

    #[test]
    fn test_start_equals_end_rejected() {
        let formula = encoded(1, 1);
        let vars = vec![
            VariableType::Start { x: 0, y: 0 },
            VariableType::End { x: 0, y: 0 },
            VariableType::OnLoop { x: 0, y: 0 },
            VariableType::Distance { x: 0, y: 0, k: 0 },
        ];
        assert!(!satisfied(&formula, &vars));
    }

    #[test]
    fn test_label_count_matches_grid() {
        let formula = encoded(2, 2);
        let vars = formula.variables();
        let max = Grid::new(2, 2).unwrap().max_distance();
        assert!(vars.lookup(&VariableType::Distance { x: 2, y: 2, k: max - 1 }).is_some());
        assert!(vars.lookup(&VariableType::Distance { x: 2, y: 2, k: max }).is_none());
    }
}
