//! Proposition registry for the SAT encoding

use crate::puzzle::{Coord, Direction, EdgeSlot, Grid};
use anyhow::Result;
use std::collections::HashMap;
use std::fmt;

/// Every proposition the encoding can refer to, keyed by role and coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariableType {
    /// The constant `false` atom, pinned by a unit clause
    False,
    /// The board is solved: no empty tile touches both colors, no white touches black
    Valid,
    White { x: usize, y: usize },
    Black { x: usize, y: usize },
    Empty { x: usize, y: usize },
    TouchesBlack { x: usize, y: usize },
    TouchesWhite { x: usize, y: usize },
    EmptyTouchesBoth { x: usize, y: usize },
    WhiteTouchesBlack { x: usize, y: usize },
    Start { x: usize, y: usize },
    End { x: usize, y: usize },
    OnLoop { x: usize, y: usize },
    /// Edge from node `(x, y)` toward `direction` (always up or right)
    Edge { x: usize, y: usize, direction: Direction },
    /// Node `(x, y)` lies `k` steps along the loop from the start
    Distance { x: usize, y: usize, k: usize },
    /// Tseitin auxiliary introduced by a gate definition
    Gate { id: usize },
}

impl VariableType {
    /// Short role name, used for statistics and debugging output.
    pub fn role(&self) -> &'static str {
        match self {
            VariableType::False => "false",
            VariableType::Valid => "valid",
            VariableType::White { .. } => "white",
            VariableType::Black { .. } => "black",
            VariableType::Empty { .. } => "empty",
            VariableType::TouchesBlack { .. } => "touches_black",
            VariableType::TouchesWhite { .. } => "touches_white",
            VariableType::EmptyTouchesBoth { .. } => "empty_touches_both",
            VariableType::WhiteTouchesBlack { .. } => "white_touches_black",
            VariableType::Start { .. } => "start",
            VariableType::End { .. } => "end",
            VariableType::OnLoop { .. } => "on_loop",
            VariableType::Edge { .. } => "edge",
            VariableType::Distance { .. } => "distance",
            VariableType::Gate { .. } => "gate",
        }
    }

    /// Named propositions are the puzzle predicates; gates and the constant are plumbing.
    pub fn is_named(&self) -> bool {
        !matches!(self, VariableType::False | VariableType::Gate { .. })
    }

    /// Colors, edges and endpoints. Every other variable is defined from
    /// these, so two models differ exactly when these differ.
    pub fn is_decision(&self) -> bool {
        matches!(
            self,
            VariableType::White { .. }
                | VariableType::Black { .. }
                | VariableType::Start { .. }
                | VariableType::End { .. }
                | VariableType::Edge { .. }
        )
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            VariableType::False | VariableType::Valid => write!(f, "{}", self.role()),
            VariableType::Gate { id } => write!(f, "gate#{}", id),
            VariableType::Edge { x, y, direction } => write!(f, "edge({},{},{:?})", x, y, direction),
            VariableType::Distance { x, y, k } => write!(f, "distance({},{},{})", x, y, k),
            VariableType::White { x, y }
            | VariableType::Black { x, y }
            | VariableType::Empty { x, y }
            | VariableType::TouchesBlack { x, y }
            | VariableType::TouchesWhite { x, y }
            | VariableType::EmptyTouchesBoth { x, y }
            | VariableType::WhiteTouchesBlack { x, y }
            | VariableType::Start { x, y }
            | VariableType::End { x, y }
            | VariableType::OnLoop { x, y } => write!(f, "{}({},{})", self.role(), x, y),
        }
    }
}

/// Manages SAT variables and their mapping to integers
///
/// Repeated lookups of the same `VariableType` always return the same id, so
/// builders written independently agree on their atoms.
#[derive(Debug, Clone)]
pub struct VariableManager {
    /// Map from variable type to SAT variable ID (positive integer)
    variable_map: HashMap<VariableType, i32>,
    /// Reverse map, index `id - 1`
    variable_types: Vec<VariableType>,
    next_id: i32,
    next_gate: usize,
    grid: Grid,
}

impl VariableManager {
    /// Create an empty registry for `grid`
    pub fn new(grid: Grid) -> Self {
        Self {
            variable_map: HashMap::new(),
            variable_types: Vec::new(),
            next_id: 1, // SAT variables start from 1
            next_gate: 0,
            grid,
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Get or create the variable for `var_type`.
    ///
    /// Coordinates outside the grid are a caller bug, checked in debug builds.
    pub fn get_variable(&mut self, var_type: VariableType) -> i32 {
        if let Some(&id) = self.variable_map.get(&var_type) {
            return id;
        }
        debug_assert!(
            self.validate_variable(&var_type).is_ok(),
            "{} is outside the {} grid",
            var_type,
            self.grid
        );

        let id = self.next_id;
        self.next_id += 1;
        self.variable_map.insert(var_type, id);
        self.variable_types.push(var_type);
        id
    }

    /// Checked variant of [`VariableManager::get_variable`].
    pub fn try_variable(&mut self, var_type: VariableType) -> Result<i32> {
        self.validate_variable(&var_type)?;
        Ok(self.get_variable(var_type))
    }

    /// Look up an existing variable without registering it.
    pub fn lookup(&self, var_type: &VariableType) -> Option<i32> {
        self.variable_map.get(var_type).copied()
    }

    /// The role and coordinates behind a variable id.
    pub fn describe(&self, id: i32) -> Option<&VariableType> {
        usize::try_from(id - 1).ok().and_then(|index| self.variable_types.get(index))
    }

    /// Allocate a fresh Tseitin auxiliary.
    pub fn fresh_gate(&mut self) -> i32 {
        let id = self.next_gate;
        self.next_gate += 1;
        self.get_variable(VariableType::Gate { id })
    }

    pub fn falsum(&mut self) -> i32 {
        self.get_variable(VariableType::False)
    }

    pub fn valid(&mut self) -> i32 {
        self.get_variable(VariableType::Valid)
    }

    pub fn white(&mut self, (x, y): Coord) -> i32 {
        self.get_variable(VariableType::White { x, y })
    }

    pub fn black(&mut self, (x, y): Coord) -> i32 {
        self.get_variable(VariableType::Black { x, y })
    }

    pub fn empty(&mut self, (x, y): Coord) -> i32 {
        self.get_variable(VariableType::Empty { x, y })
    }

    pub fn touches_black(&mut self, (x, y): Coord) -> i32 {
        self.get_variable(VariableType::TouchesBlack { x, y })
    }

    pub fn touches_white(&mut self, (x, y): Coord) -> i32 {
        self.get_variable(VariableType::TouchesWhite { x, y })
    }

    pub fn empty_touches_both(&mut self, (x, y): Coord) -> i32 {
        self.get_variable(VariableType::EmptyTouchesBoth { x, y })
    }

    pub fn white_touches_black(&mut self, (x, y): Coord) -> i32 {
        self.get_variable(VariableType::WhiteTouchesBlack { x, y })
    }

    pub fn start(&mut self, (x, y): Coord) -> i32 {
        self.get_variable(VariableType::Start { x, y })
    }

    pub fn end(&mut self, (x, y): Coord) -> i32 {
        self.get_variable(VariableType::End { x, y })
    }

    pub fn on_loop(&mut self, (x, y): Coord) -> i32 {
        self.get_variable(VariableType::OnLoop { x, y })
    }

    pub fn distance(&mut self, (x, y): Coord, k: usize) -> i32 {
        self.get_variable(VariableType::Distance { x, y, k })
    }

    /// The edge leaving `node` toward `direction`, or the constant `false`
    /// atom when that edge would cross the grid boundary.
    pub fn edge(&mut self, node: Coord, direction: Direction) -> i32 {
        match self.grid.node_edge(node, direction) {
            Some(slot) => self.edge_slot(slot),
            None => self.falsum(),
        }
    }

    pub fn edge_slot(&mut self, slot: EdgeSlot) -> i32 {
        let (x, y) = slot.node;
        self.get_variable(VariableType::Edge { x, y, direction: slot.direction })
    }

    /// Get the total number of variables created
    pub fn variable_count(&self) -> usize {
        (self.next_id - 1) as usize
    }

    /// Iterate over every registered `(id, type)` pair in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &VariableType)> {
        self.variable_types.iter().enumerate().map(|(i, t)| (i as i32 + 1, t))
    }

    /// Validate that a variable type is within bounds
    fn validate_variable(&self, var_type: &VariableType) -> Result<()> {
        let grid = self.grid;
        match *var_type {
            VariableType::False | VariableType::Valid | VariableType::Gate { .. } => {}
            VariableType::White { x, y }
            | VariableType::Black { x, y }
            | VariableType::Empty { x, y }
            | VariableType::TouchesBlack { x, y }
            | VariableType::TouchesWhite { x, y }
            | VariableType::EmptyTouchesBoth { x, y }
            | VariableType::WhiteTouchesBlack { x, y } => {
                if !grid.contains_cell((x, y)) {
                    anyhow::bail!("Tile ({}, {}) out of bounds for {} grid", x, y, grid);
                }
            }
            VariableType::Start { x, y } | VariableType::End { x, y } | VariableType::OnLoop { x, y } => {
                if !grid.contains_node((x, y)) {
                    anyhow::bail!("Node ({}, {}) out of bounds for {} grid", x, y, grid);
                }
            }
            VariableType::Edge { x, y, direction } => {
                if !grid.contains_edge(EdgeSlot { node: (x, y), direction }) {
                    anyhow::bail!(
                        "Edge {:?} from node ({}, {}) leaves the {} grid",
                        direction, x, y, grid
                    );
                }
            }
            VariableType::Distance { x, y, k } => {
                if !grid.contains_node((x, y)) {
                    anyhow::bail!("Node ({}, {}) out of bounds for {} grid", x, y, grid);
                }
                if k >= grid.max_distance() {
                    anyhow::bail!("Distance {} exceeds maximum {}", k, grid.max_distance() - 1);
                }
            }
        }
        Ok(())
    }

    /// Get statistics about variable usage
    pub fn statistics(&self) -> VariableStatistics {
        let mut by_role: Vec<(&'static str, usize)> = Vec::new();
        for var_type in &self.variable_types {
            let role = var_type.role();
            match by_role.iter_mut().find(|(name, _)| *name == role) {
                Some((_, count)) => *count += 1,
                None => by_role.push((role, 1)),
            }
        }

        VariableStatistics {
            total_variables: self.variable_count(),
            gate_variables: self.next_gate,
            by_role,
        }
    }
}

/// Statistics about variable usage
#[derive(Debug, Clone)]
pub struct VariableStatistics {
    pub total_variables: usize,
    pub gate_variables: usize,
    /// Variable count per role, in first-allocation order
    pub by_role: Vec<(&'static str, usize)>,
}

impl fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        for (role, count) in &self.by_role {
            writeln!(f, "  {:<20} {}", role, count)?;
        }
        Ok(())
    }
}
