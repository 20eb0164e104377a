//! Tile coloring and the "touching" rule that decides whether a board is solved.
//!
//! Two tiles touch when they share a border that carries no active loop
//! segment; the loop acts as a wall between regions.

use super::constraints::Formula;
use crate::puzzle::{Coord, Direction, Grid};

/// Emits coloring, touching and validity clauses for every tile
pub struct RegionConstraints {
    grid: Grid,
    /// At most one empty tile. Dropped when a fixed board dictates the layout.
    limit_empty_tiles: bool,
    /// Assert the board is solved instead of leaving `Valid` free
    require_solved: bool,
}

impl RegionConstraints {
    pub fn new(grid: Grid, limit_empty_tiles: bool, require_solved: bool) -> Self {
        Self {
            grid,
            limit_empty_tiles,
            require_solved,
        }
    }

    /// Append all region clauses to `formula`
    pub fn encode(&self, formula: &mut Formula) {
        let mut violations = Vec::with_capacity(2 * self.grid.cell_count());

        for cell in self.grid.cells() {
            self.encode_coloring(formula, cell);
            self.encode_touching(formula, cell);
            violations.extend(self.encode_violations(formula, cell));
        }

        // ¬Valid ⇔ some tile violates the rules
        let valid = formula.variables_mut().valid();
        formula.define_or(-valid, &violations);
        if self.require_solved {
            formula.add_unit(valid);
        }

        self.encode_cardinality(formula);
    }

    /// A tile is white, black, or empty, never two at once
    fn encode_coloring(&self, formula: &mut Formula, cell: Coord) {
        let vars = formula.variables_mut();
        let (white, black, empty) = (vars.white(cell), vars.black(cell), vars.empty(cell));

        // w ⇒ ¬b and b ⇒ ¬w are the same clause
        formula.add_clause([-white, -black]);
        formula.define_and(empty, &[-black, -white]);
    }

    /// `TouchesBlack` / `TouchesWhite`: some neighbor of that color across an open border
    fn encode_touching(&self, formula: &mut Formula, cell: Coord) {
        let mut black_terms = Vec::with_capacity(4);
        let mut white_terms = Vec::with_capacity(4);

        for direction in Direction::ALL {
            let Some(neighbor) = self.grid.cell_neighbor(cell, direction) else {
                continue;
            };
            let vars = formula.variables_mut();
            let border = vars.edge_slot(self.grid.cell_border(cell, direction));
            let (black, white) = (vars.black(neighbor), vars.white(neighbor));
            black_terms.push(formula.and_gate(&[black, -border]));
            white_terms.push(formula.and_gate(&[white, -border]));
        }

        let vars = formula.variables_mut();
        let (touches_black, touches_white) = (vars.touches_black(cell), vars.touches_white(cell));
        formula.define_or(touches_black, &black_terms);
        formula.define_or(touches_white, &white_terms);
    }

    /// Define the two per-tile violations and return them
    fn encode_violations(&self, formula: &mut Formula, cell: Coord) -> [i32; 2] {
        let vars = formula.variables_mut();
        let empty = vars.empty(cell);
        let white = vars.white(cell);
        let touches_black = vars.touches_black(cell);
        let touches_white = vars.touches_white(cell);
        let empty_touches_both = vars.empty_touches_both(cell);
        let white_touches_black = vars.white_touches_black(cell);

        formula.define_and(empty_touches_both, &[empty, touches_black, touches_white]);
        formula.define_and(white_touches_black, &[white, touches_black]);
        [empty_touches_both, white_touches_black]
    }

    /// At least one white and one black tile; at most one empty tile on a free board
    fn encode_cardinality(&self, formula: &mut Formula) {
        let cells: Vec<Coord> = self.grid.cells().collect();
        let vars = formula.variables_mut();
        let whites: Vec<i32> = cells.iter().map(|&c| vars.white(c)).collect();
        let blacks: Vec<i32> = cells.iter().map(|&c| vars.black(c)).collect();
        let empties: Vec<i32> = cells.iter().map(|&c| vars.empty(c)).collect();

        formula.at_least_one(&whites);
        formula.at_least_one(&blacks);
        if self.limit_empty_tiles {
            formula.at_most_one(&empties);
        }
    }
}
