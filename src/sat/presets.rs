//! Binds a fixed board or a fixed line into the formula as hard constraints

use super::constraints::Formula;
use crate::error::PuzzleError;
use crate::puzzle::{BoardPreset, Direction, Grid, LinePreset, Preset, TileColor};

/// Turns a preset into unit clauses. Presets are consumed once and discarded.
pub struct PresetBinder {
    grid: Grid,
}

impl PresetBinder {
    pub fn new(grid: Grid) -> Self {
        Self { grid }
    }

    pub fn bind(&self, formula: &mut Formula, preset: &Preset) -> Result<(), PuzzleError> {
        match preset {
            Preset::Board(board) => self.bind_board(formula, board),
            Preset::Line(line) => self.bind_line(formula, line),
        }
    }

    /// Fix every tile color plus the start and end nodes
    pub fn bind_board(&self, formula: &mut Formula, board: &BoardPreset) -> Result<(), PuzzleError> {
        board.check_against(&self.grid)?;

        let vars = formula.variables_mut();
        let start = vars.start(board.start);
        let end = vars.end(board.end);
        formula.add_unit(start);
        formula.add_unit(end);

        for cell in self.grid.cells() {
            let vars = formula.variables_mut();
            let literal = match board.tile(cell) {
                TileColor::White => vars.white(cell),
                TileColor::Black => vars.black(cell),
                TileColor::Empty => vars.empty(cell),
            };
            formula.add_unit(literal);
        }
        Ok(())
    }

    /// Fix the endpoints, every node on the line, and the edge of every step
    pub fn bind_line(&self, formula: &mut Formula, line: &LinePreset) -> Result<(), PuzzleError> {
        line.check_against(&self.grid)?;

        let vars = formula.variables_mut();
        let start = vars.start(line.start());
        let end = vars.end(line.end());
        formula.add_unit(start);
        formula.add_unit(end);

        let points = line.points();
        for (index, pair) in points.windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            let slot = Direction::between(from, to)
                .and_then(|direction| self.grid.node_edge(from, direction))
                .ok_or(PuzzleError::NonContiguousPath { index, from, to })?;

            let vars = formula.variables_mut();
            let on_loop = vars.on_loop(from);
            let edge = vars.edge_slot(slot);
            formula.add_unit(on_loop);
            formula.add_unit(edge);
        }

        let last = formula.variables_mut().on_loop(line.end());
        formula.add_unit(last);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{example_board, example_line};
    use crate::sat::variables::VariableType;

    fn units(formula: &Formula) -> Vec<VariableType> {
        formula
            .clauses()
            .iter()
            .filter(|c| c.is_unit() && c.literals[0] > 0)
            .filter_map(|c| formula.variables().describe(c.literals[0]).copied())
            .collect()
    }

    #[test]
    fn test_bind_line() {
        let grid = Grid::new(1, 1).unwrap();
        let mut formula = Formula::new(grid);
        let line = LinePreset::new(vec![(0, 0), (0, 1), (1, 1)]).unwrap();
        PresetBinder::new(grid).bind_line(&mut formula, &line).unwrap();

        let fixed = units(&formula);
        assert!(fixed.contains(&VariableType::Start { x: 0, y: 0 }));
        assert!(fixed.contains(&VariableType::End { x: 1, y: 1 }));
        assert!(fixed.contains(&VariableType::OnLoop { x: 0, y: 1 }));
        assert!(fixed.contains(&VariableType::OnLoop { x: 1, y: 1 }));
        assert!(fixed.contains(&VariableType::Edge { x: 0, y: 0, direction: Direction::Up }));
        assert!(fixed.contains(&VariableType::Edge { x: 0, y: 1, direction: Direction::Right }));
    }

    #[test]
    fn test_bind_line_backward_steps_normalized() {
        let grid = Grid::new(3, 3).unwrap();
        let mut formula = Formula::new(grid);
        PresetBinder::new(grid).bind_line(&mut formula, &example_line()).unwrap();

        let fixed = units(&formula);
        // (3,3) -> (3,2) is stored as the up edge of (3,2)
        assert!(fixed.contains(&VariableType::Edge { x: 3, y: 2, direction: Direction::Up }));
        // (2,2) -> (2,1) likewise
        assert!(fixed.contains(&VariableType::Edge { x: 2, y: 1, direction: Direction::Up }));
        // (1,1) -> (0,1) is the right edge of (0,1)
        assert!(fixed.contains(&VariableType::Edge { x: 0, y: 1, direction: Direction::Right }));
    }

    #[test]
    fn test_bind_line_out_of_bounds() {
        let grid = Grid::new(1, 1).unwrap();
        let mut formula = Formula::new(grid);
        let line = LinePreset::new(vec![(1, 1), (2, 1)]).unwrap();
        let err = PresetBinder::new(grid).bind_line(&mut formula, &line).unwrap_err();
        assert!(matches!(err, PuzzleError::NodeOutOfBounds { node: (2, 1), .. }));
    }

    #[test]
    fn test_bind_board() {
        let grid = Grid::new(3, 3).unwrap();
        let mut formula = Formula::new(grid);
        PresetBinder::new(grid)
            .bind(&mut formula, &Preset::Board(example_board()))
            .unwrap();

        let fixed = units(&formula);
        assert!(fixed.contains(&VariableType::Start { x: 3, y: 3 }));
        assert!(fixed.contains(&VariableType::End { x: 0, y: 0 }));
        assert!(fixed.contains(&VariableType::Empty { x: 1, y: 1 }));
        assert!(fixed.contains(&VariableType::Black { x: 0, y: 2 }));
        assert!(fixed.contains(&VariableType::White { x: 2, y: 0 }));
        let colors = fixed
            .iter()
            .filter(|v| matches!(v, VariableType::White { .. } | VariableType::Black { .. } | VariableType::Empty { .. }))
            .count();
        assert_eq!(colors, 9);
    }

    #[test]
    fn test_bind_board_wrong_size() {
        let grid = Grid::new(2, 2).unwrap();
        let mut formula = Formula::new(grid);
        let err = PresetBinder::new(grid).bind_board(&mut formula, &example_board()).unwrap_err();
        assert!(matches!(err, PuzzleError::BoardDimensionMismatch { .. }));
    }
}
