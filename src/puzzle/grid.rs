//! Grid geometry: tiles, the loop nodes on their corners, and the edges between nodes
//!
//! Coordinates are `(x, y)` with `x` growing to the right and `y` growing
//! upward. Node `(x, y)` is the lower-left corner of tile `(x, y)`.

use crate::error::PuzzleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tile or node position.
pub type Coord = (usize, usize);

/// The four axis-aligned steps between neighboring tiles or nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// `(dx, dy)` for one step in this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, 1),
            Direction::Right => (1, 0),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Edges are stored only for the forward directions (up, right).
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Up | Direction::Right)
    }

    /// Direction of a single unit step from `from` to `to`, if it is one.
    pub fn between(from: Coord, to: Coord) -> Option<Direction> {
        let (fx, fy) = from;
        let (tx, ty) = to;
        if fx == tx && ty == fy + 1 {
            Some(Direction::Up)
        } else if fy == ty && tx == fx + 1 {
            Some(Direction::Right)
        } else if fx == tx && fy == ty + 1 {
            Some(Direction::Down)
        } else if fy == ty && fx == tx + 1 {
            Some(Direction::Left)
        } else {
            None
        }
    }
}

/// An active-edge slot, normalized so that `direction` is always forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeSlot {
    pub node: Coord,
    pub direction: Direction,
}

/// Rectangular puzzle dimensions. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    pub cols: usize,
    pub rows: usize,
}

impl Grid {
    /// Create a grid of `cols x rows` tiles
    pub fn new(cols: usize, rows: usize) -> Result<Self, PuzzleError> {
        if cols == 0 || rows == 0 {
            return Err(PuzzleError::InvalidDimensions { cols, rows });
        }
        Ok(Self { cols, rows })
    }

    pub fn node_cols(&self) -> usize {
        self.cols + 1
    }

    pub fn node_rows(&self) -> usize {
        self.rows + 1
    }

    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    pub fn node_count(&self) -> usize {
        self.node_cols() * self.node_rows()
    }

    /// Number of distance labels per node. A simple path never visits more
    /// nodes than the grid has, so this never truncates a valid loop.
    pub fn max_distance(&self) -> usize {
        self.node_count()
    }

    pub fn contains_cell(&self, (x, y): Coord) -> bool {
        x < self.cols && y < self.rows
    }

    pub fn contains_node(&self, (x, y): Coord) -> bool {
        x < self.node_cols() && y < self.node_rows()
    }

    /// All tiles, column by column.
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        let rows = self.rows;
        (0..self.cols).flat_map(move |x| (0..rows).map(move |y| (x, y)))
    }

    /// All nodes, column by column.
    pub fn nodes(&self) -> impl Iterator<Item = Coord> {
        let rows = self.node_rows();
        (0..self.node_cols()).flat_map(move |x| (0..rows).map(move |y| (x, y)))
    }

    /// Row-major index of a tile, `y * cols + x`.
    pub fn cell_index(&self, (x, y): Coord) -> usize {
        y * self.cols + x
    }

    /// Row-major index of a node.
    pub fn node_index(&self, (x, y): Coord) -> usize {
        y * self.node_cols() + x
    }

    pub fn cell_neighbor(&self, cell: Coord, direction: Direction) -> Option<Coord> {
        Self::step(cell, direction).filter(|&next| self.contains_cell(next))
    }

    pub fn node_neighbor(&self, node: Coord, direction: Direction) -> Option<Coord> {
        Self::step(node, direction).filter(|&next| self.contains_node(next))
    }

    /// The edge slot joining `node` to its neighbor in `direction`, or `None`
    /// when that neighbor lies outside the grid.
    pub fn node_edge(&self, node: Coord, direction: Direction) -> Option<EdgeSlot> {
        let neighbor = self.node_neighbor(node, direction)?;
        Some(if direction.is_forward() {
            EdgeSlot { node, direction }
        } else {
            EdgeSlot {
                node: neighbor,
                direction: direction.opposite(),
            }
        })
    }

    /// The loop segment lying on the border between `cell` and its neighbor
    /// in `direction`. Always inside the node grid for an in-bounds cell.
    pub fn cell_border(&self, (x, y): Coord, direction: Direction) -> EdgeSlot {
        match direction {
            Direction::Up => EdgeSlot { node: (x, y + 1), direction: Direction::Right },
            Direction::Right => EdgeSlot { node: (x + 1, y), direction: Direction::Up },
            Direction::Down => EdgeSlot { node: (x, y), direction: Direction::Right },
            Direction::Left => EdgeSlot { node: (x, y), direction: Direction::Up },
        }
    }

    /// Whether a forward edge slot stays inside the node grid.
    pub fn contains_edge(&self, edge: EdgeSlot) -> bool {
        edge.direction.is_forward()
            && self.contains_node(edge.node)
            && self.node_neighbor(edge.node, edge.direction).is_some()
    }

    fn step((x, y): Coord, direction: Direction) -> Option<Coord> {
        let (dx, dy) = direction.offset();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        Some((nx, ny))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}
