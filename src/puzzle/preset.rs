//! Fixed boards and fixed lines supplied by the caller

use super::{Coord, Direction, Grid};
use crate::error::PuzzleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Color of a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileColor {
    Black,
    White,
    Empty,
}

impl TileColor {
    /// Parse a board literal: `"B"`, `"W"`, or empty (also `"."`).
    pub fn from_literal(literal: &str) -> Option<Self> {
        match literal.trim() {
            "B" | "b" => Some(TileColor::Black),
            "W" | "w" => Some(TileColor::White),
            "" | "." | "_" => Some(TileColor::Empty),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            TileColor::Black => 'B',
            TileColor::White => 'W',
            TileColor::Empty => '.',
        }
    }
}

impl fmt::Display for TileColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A fully colored board plus its fixed start and end nodes.
///
/// Tiles are stored row-major in grid coordinates (`y` up). Use
/// [`BoardPreset::from_text_rows`] to build one from rows written top-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPreset {
    pub cols: usize,
    pub rows: usize,
    pub start: Coord,
    pub end: Coord,
    tiles: Vec<TileColor>,
}

impl BoardPreset {
    /// Build a board from rows of literals, top row first.
    ///
    /// Text row `r`, column `c` becomes tile `(c, rows - 1 - r)`.
    pub fn from_literals<S: AsRef<str>>(
        start: Coord,
        end: Coord,
        rows: &[Vec<S>],
    ) -> Result<Self, PuzzleError> {
        let colors = rows
            .iter()
            .enumerate()
            .map(|(row, literals)| {
                literals
                    .iter()
                    .enumerate()
                    .map(|(col, literal)| {
                        TileColor::from_literal(literal.as_ref()).ok_or_else(|| {
                            PuzzleError::InvalidTile {
                                literal: literal.as_ref().to_string(),
                                row,
                                col,
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_colors(start, end, colors)
    }

    /// Build a board from compact text rows such as `"BWW"` or `"B.W"`, top row first.
    pub fn from_text_rows<S: AsRef<str>>(
        start: Coord,
        end: Coord,
        rows: &[S],
    ) -> Result<Self, PuzzleError> {
        let literals: Vec<Vec<String>> = rows
            .iter()
            .map(|row| row.as_ref().chars().map(|c| c.to_string()).collect())
            .collect();
        Self::from_literals(start, end, &literals)
    }

    fn from_colors(
        start: Coord,
        end: Coord,
        text_rows: Vec<Vec<TileColor>>,
    ) -> Result<Self, PuzzleError> {
        let rows = text_rows.len();
        let cols = text_rows.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(PuzzleError::InvalidDimensions { cols, rows });
        }
        if let Some(bad) = text_rows.iter().find(|row| row.len() != cols) {
            return Err(PuzzleError::BoardDimensionMismatch {
                cols,
                rows,
                found_cols: bad.len(),
                found_rows: rows,
            });
        }

        let mut tiles = vec![TileColor::Empty; cols * rows];
        for (r, row) in text_rows.into_iter().enumerate() {
            let y = rows - 1 - r;
            for (x, color) in row.into_iter().enumerate() {
                tiles[y * cols + x] = color;
            }
        }

        Ok(Self { cols, rows, start, end, tiles })
    }

    /// Color of tile `(x, y)` in grid coordinates.
    pub fn tile(&self, (x, y): Coord) -> TileColor {
        self.tiles[y * self.cols + x]
    }

    /// Rows as text, top row first (the inverse of [`BoardPreset::from_text_rows`]).
    pub fn text_rows(&self) -> Vec<String> {
        (0..self.rows)
            .rev()
            .map(|y| (0..self.cols).map(|x| self.tile((x, y)).symbol()).collect())
            .collect()
    }

    /// Check the board fits `grid` and that its endpoints are distinct nodes.
    pub fn check_against(&self, grid: &Grid) -> Result<(), PuzzleError> {
        if self.cols != grid.cols || self.rows != grid.rows {
            return Err(PuzzleError::BoardDimensionMismatch {
                cols: grid.cols,
                rows: grid.rows,
                found_cols: self.cols,
                found_rows: self.rows,
            });
        }
        for node in [self.start, self.end] {
            check_node(grid, node)?;
        }
        if self.start == self.end {
            return Err(PuzzleError::CoincidentEndpoints { node: self.start });
        }
        Ok(())
    }
}

/// An ordered, contiguous path of nodes from start to end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coord>", into = "Vec<Coord>")]
pub struct LinePreset {
    points: Vec<Coord>,
}

impl LinePreset {
    /// Validate and wrap a path. Every consecutive pair must be exactly one
    /// unit step apart along a single axis.
    pub fn new(points: Vec<Coord>) -> Result<Self, PuzzleError> {
        if points.len() < 2 {
            return Err(PuzzleError::PathTooShort { len: points.len() });
        }
        for (index, pair) in points.windows(2).enumerate() {
            if Direction::between(pair[0], pair[1]).is_none() {
                return Err(PuzzleError::NonContiguousPath {
                    index,
                    from: pair[0],
                    to: pair[1],
                });
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Coord] {
        &self.points
    }

    pub fn start(&self) -> Coord {
        self.points[0]
    }

    pub fn end(&self) -> Coord {
        self.points[self.points.len() - 1]
    }

    /// Consecutive steps as `(from, direction)`.
    pub fn steps(&self) -> impl Iterator<Item = (Coord, Direction)> + '_ {
        self.points.windows(2).filter_map(|pair| {
            Direction::between(pair[0], pair[1]).map(|direction| (pair[0], direction))
        })
    }

    /// Check every point lies on `grid`'s node lattice and the line is open.
    pub fn check_against(&self, grid: &Grid) -> Result<(), PuzzleError> {
        self.points.iter().try_for_each(|&node| check_node(grid, node))?;
        if self.start() == self.end() {
            return Err(PuzzleError::CoincidentEndpoints { node: self.start() });
        }
        Ok(())
    }
}

impl TryFrom<Vec<Coord>> for LinePreset {
    type Error = PuzzleError;

    fn try_from(points: Vec<Coord>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<LinePreset> for Vec<Coord> {
    fn from(line: LinePreset) -> Self {
        line.points
    }
}

/// Either preset. The two are never combined in one formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preset {
    Board(BoardPreset),
    Line(LinePreset),
}

impl Preset {
    pub fn check_against(&self, grid: &Grid) -> Result<(), PuzzleError> {
        match self {
            Preset::Board(board) => board.check_against(grid),
            Preset::Line(line) => line.check_against(grid),
        }
    }
}

fn check_node(grid: &Grid, node: Coord) -> Result<(), PuzzleError> {
    if grid.contains_node(node) {
        Ok(())
    } else {
        Err(PuzzleError::NodeOutOfBounds {
            node,
            node_cols: grid.node_cols(),
            node_rows: grid.node_rows(),
        })
    }
}
