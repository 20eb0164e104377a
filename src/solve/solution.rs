//! A decoded puzzle solution: tile colors, the loop, and its labels

use crate::puzzle::{Coord, Direction, EdgeSlot, Grid, TileColor};
use crate::sat::{Assignment, VariableManager, VariableType};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One satisfying assignment, read back into puzzle terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Position in the enumeration, starting at 0
    pub index: usize,
    pub grid: Grid,
    /// Row-major by grid coordinates, `y * cols + x`
    tiles: Vec<TileColor>,
    pub start: Coord,
    pub end: Coord,
    on_loop: Vec<Coord>,
    edges: Vec<EdgeSlot>,
    /// Distance labels per node, indexed like [`Grid::node_index`]
    labels: Vec<Vec<usize>>,
    /// Nodes from start following active edges
    path: Vec<Coord>,
    /// Whether the `Valid` predicate held
    pub solved: bool,
}

impl Solution {
    /// Read a model back through the registry.
    ///
    /// Fails only when the model does not name exactly one start and one end.
    pub fn decode(variables: &VariableManager, assignment: &Assignment, index: usize) -> Result<Self> {
        let grid = variables.grid();
        let mut tiles = vec![TileColor::Empty; grid.cell_count()];
        let mut starts = Vec::new();
        let mut ends = Vec::new();
        let mut on_loop = Vec::new();
        let mut edges = Vec::new();
        let mut labels = vec![Vec::new(); grid.node_count()];
        let mut solved = false;

        for (id, var_type) in variables.iter() {
            if !assignment.value(id) {
                continue;
            }
            match *var_type {
                VariableType::White { x, y } => tiles[grid.cell_index((x, y))] = TileColor::White,
                VariableType::Black { x, y } => tiles[grid.cell_index((x, y))] = TileColor::Black,
                VariableType::Start { x, y } => starts.push((x, y)),
                VariableType::End { x, y } => ends.push((x, y)),
                VariableType::OnLoop { x, y } => on_loop.push((x, y)),
                VariableType::Edge { x, y, direction } => edges.push(EdgeSlot { node: (x, y), direction }),
                VariableType::Distance { x, y, k } => labels[grid.node_index((x, y))].push(k),
                VariableType::Valid => solved = true,
                _ => {}
            }
        }

        let &[start] = starts.as_slice() else {
            anyhow::bail!("Model {} has {} start nodes", index, starts.len());
        };
        let &[end] = ends.as_slice() else {
            anyhow::bail!("Model {} has {} end nodes", index, ends.len());
        };

        on_loop.sort_unstable();
        edges.sort_unstable();
        let path = trace_path(&grid, &edges, start);

        Ok(Self {
            index,
            grid,
            tiles,
            start,
            end,
            on_loop,
            edges,
            labels,
            path,
            solved,
        })
    }

    pub fn tile(&self, cell: Coord) -> TileColor {
        self.tiles[self.grid.cell_index(cell)]
    }

    pub fn tiles(&self) -> &[TileColor] {
        &self.tiles
    }

    /// Tile rows as text, top row first
    pub fn board_rows(&self) -> Vec<String> {
        (0..self.grid.rows)
            .rev()
            .map(|y| (0..self.grid.cols).map(|x| self.tile((x, y)).symbol()).collect())
            .collect()
    }

    pub fn count_tiles(&self, color: TileColor) -> usize {
        self.tiles.iter().filter(|&&tile| tile == color).count()
    }

    pub fn on_loop(&self) -> &[Coord] {
        &self.on_loop
    }

    pub fn is_on_loop(&self, node: Coord) -> bool {
        self.on_loop.binary_search(&node).is_ok()
    }

    pub fn edges(&self) -> &[EdgeSlot] {
        &self.edges
    }

    pub fn is_edge_active(&self, slot: EdgeSlot) -> bool {
        self.edges.binary_search(&slot).is_ok()
    }

    /// Whether the segment from `node` towards `direction` is drawn
    pub fn has_edge(&self, node: Coord, direction: Direction) -> bool {
        self.grid
            .node_edge(node, direction)
            .is_some_and(|slot| self.is_edge_active(slot))
    }

    pub fn degree(&self, node: Coord) -> usize {
        Direction::ALL
            .iter()
            .filter(|&&direction| self.has_edge(node, direction))
            .count()
    }

    pub fn labels(&self, node: Coord) -> &[usize] {
        &self.labels[self.grid.node_index(node)]
    }

    pub fn path(&self) -> &[Coord] {
        &self.path
    }

    /// Whether tiles `cell` and its neighbor share a border with no loop on it
    pub fn touches_across(&self, cell: Coord, direction: Direction) -> bool {
        self.grid.cell_neighbor(cell, direction).is_some()
            && !self.is_edge_active(self.grid.cell_border(cell, direction))
    }

    pub fn summary(&self) -> SolutionSummary {
        SolutionSummary {
            index: self.index,
            grid: self.grid,
            loop_length: self.path.len().saturating_sub(1),
            white_tiles: self.count_tiles(TileColor::White),
            black_tiles: self.count_tiles(TileColor::Black),
            empty_tiles: self.count_tiles(TileColor::Empty),
            solved: self.solved,
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Create from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save to file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

/// Walk active edges from `start`, never revisiting a node
fn trace_path(grid: &Grid, edges: &[EdgeSlot], start: Coord) -> Vec<Coord> {
    let active: HashSet<EdgeSlot> = edges.iter().copied().collect();
    let mut path = vec![start];
    let mut visited: HashSet<Coord> = HashSet::from([start]);
    let mut current = start;

    loop {
        let next = Direction::ALL.iter().find_map(|&direction| {
            let slot = grid.node_edge(current, direction)?;
            let neighbor = grid.node_neighbor(current, direction)?;
            (active.contains(&slot) && !visited.contains(&neighbor)).then_some(neighbor)
        });
        match next {
            Some(node) => {
                visited.insert(node);
                path.push(node);
                current = node;
            }
            None => break,
        }
    }
    path
}

/// Summary information about a solution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionSummary {
    pub index: usize,
    pub grid: Grid,
    pub loop_length: usize,
    pub white_tiles: usize,
    pub black_tiles: usize,
    pub empty_tiles: usize,
    pub solved: bool,
}

impl std::fmt::Display for SolutionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Solution {}: {} grid, loop of {} segments, {}W/{}B/{}E tiles, {}",
            self.index + 1,
            self.grid,
            self.loop_length,
            self.white_tiles,
            self.black_tiles,
            self.empty_tiles,
            if self.solved { "solved" } else { "not solved" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::constraints::Formula;

    /// Register the listed variables and mark them true
    fn assignment_for(grid: Grid, true_vars: &[VariableType]) -> (VariableManager, Assignment) {
        let mut formula = Formula::new(grid);
        for &var_type in true_vars {
            formula.var(var_type);
        }
        let vars = formula.variables().clone();
        let values = (1..=vars.variable_count() as i32)
            .map(|id| vars.describe(id).is_some_and(|t| true_vars.contains(t)))
            .collect();
        (vars, Assignment::from_values(values))
    }

    fn one_by_one() -> Solution {
        let grid = Grid::new(1, 1).unwrap();
        let (vars, assignment) = assignment_for(
            grid,
            &[
                VariableType::Start { x: 0, y: 0 },
                VariableType::End { x: 1, y: 0 },
                VariableType::OnLoop { x: 0, y: 0 },
                VariableType::OnLoop { x: 0, y: 1 },
                VariableType::OnLoop { x: 1, y: 1 },
                VariableType::OnLoop { x: 1, y: 0 },
                VariableType::Edge { x: 0, y: 0, direction: Direction::Up },
                VariableType::Edge { x: 0, y: 1, direction: Direction::Right },
                VariableType::Edge { x: 1, y: 0, direction: Direction::Up },
                VariableType::Distance { x: 0, y: 0, k: 0 },
                VariableType::Distance { x: 0, y: 1, k: 1 },
                VariableType::Distance { x: 1, y: 1, k: 2 },
                VariableType::Distance { x: 1, y: 0, k: 3 },
                VariableType::Black { x: 0, y: 0 },
            ],
        );
        Solution::decode(&vars, &assignment, 0).unwrap()
    }

    #[test]
    fn test_decode() {
        let solution = one_by_one();
        assert_eq!(solution.start, (0, 0));
        assert_eq!(solution.end, (1, 0));
        assert_eq!(solution.tile((0, 0)), TileColor::Black);
        assert_eq!(solution.path(), &[(0, 0), (0, 1), (1, 1), (1, 0)]);
        assert_eq!(solution.labels((1, 1)), &[2]);
        assert_eq!(solution.degree((0, 1)), 2);
        assert_eq!(solution.degree((1, 0)), 1);
        assert!(solution.has_edge((1, 1), Direction::Down));
        assert!(!solution.has_edge((0, 0), Direction::Right));
        assert!(!solution.solved);
        assert_eq!(solution.board_rows(), vec!["B".to_string()]);
    }

    #[test]
    fn test_decode_requires_single_start() {
        let grid = Grid::new(1, 1).unwrap();
        let (vars, assignment) = assignment_for(grid, &[VariableType::End { x: 0, y: 0 }]);
        assert!(Solution::decode(&vars, &assignment, 3).is_err());
    }

    #[test]
    fn test_summary() {
        let summary = one_by_one().summary();
        assert_eq!(summary.loop_length, 3);
        assert_eq!(summary.black_tiles, 1);
        assert!(summary.to_string().contains("not solved"));
    }

    #[test]
    fn test_json_round_trip() {
        let solution = one_by_one();
        let json = solution.to_json().unwrap();
        assert_eq!(Solution::from_json(&json).unwrap(), solution);
    }
}
