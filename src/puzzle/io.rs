//! Text input for presets and the bundled example puzzles

use super::{BoardPreset, Coord, LinePreset};
use anyhow::{Context, Result};
use std::path::Path;

/// Parse a single `x,y` coordinate.
pub fn parse_coord(text: &str) -> Result<Coord> {
    let (x, y) = text
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split_once(',')
        .with_context(|| format!("Expected a coordinate like 3,3 but found '{}'", text))?;
    let x = x.trim().parse().with_context(|| format!("Invalid x coordinate in '{}'", text))?;
    let y = y.trim().parse().with_context(|| format!("Invalid y coordinate in '{}'", text))?;
    Ok((x, y))
}

/// Parse a line such as `"3,3 3,2 2,2"` or `"(3,3) -> (3,2)"`.
pub fn parse_line(text: &str) -> Result<LinePreset> {
    let points = text
        .split(|c: char| c.is_whitespace() || c == ';')
        .map(|token| token.trim_matches(|c| c == '-' || c == '>'))
        .filter(|token| !token.is_empty())
        .map(parse_coord)
        .collect::<Result<Vec<_>>>()?;
    Ok(LinePreset::new(points)?)
}

/// Load a board from a text file.
///
/// First non-empty line holds the start and end nodes (`"3,3 0,0"`), each
/// following line is one row of tiles, top row first, using `B`, `W` and `.`.
pub fn load_board_from_file<P: AsRef<Path>>(path: P) -> Result<BoardPreset> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read board file: {}", path.as_ref().display()))?;
    parse_board(&content)
        .with_context(|| format!("Failed to parse board from file: {}", path.as_ref().display()))
}

/// Parse a board in the file format of [`load_board_from_file`].
pub fn parse_board(content: &str) -> Result<BoardPreset> {
    let mut lines = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));

    let header = lines.next().context("Board file is empty")?;
    let mut endpoints = header.split_whitespace().map(parse_coord);
    let start = endpoints.next().context("Board header is missing the start node")??;
    let end = endpoints.next().context("Board header is missing the end node")??;

    let rows: Vec<&str> = lines.collect();
    Ok(BoardPreset::from_text_rows(start, end, &rows)?)
}

/// Render a board in the file format of [`load_board_from_file`].
pub fn board_to_string(board: &BoardPreset) -> String {
    let mut result = format!(
        "{},{} {},{}\n",
        board.start.0, board.start.1, board.end.0, board.end.1
    );
    for row in board.text_rows() {
        result.push_str(&row);
        result.push('\n');
    }
    result
}

/// The static board bundled with the solver (3x3, start top-right, end bottom-left).
pub fn example_board() -> BoardPreset {
    BoardPreset::from_text_rows((3, 3), (0, 0), &["BWW", "B.W", "BWW"])
        .unwrap_or_else(|e| unreachable!("bundled board is well formed: {e}"))
}

/// The static line bundled with the solver (3x3 grid).
pub fn example_line() -> LinePreset {
    LinePreset::new(vec![
        (3, 3),
        (3, 2),
        (2, 2),
        (2, 1),
        (2, 0),
        (1, 0),
        (1, 1),
        (0, 1),
        (0, 2),
        (1, 2),
        (1, 3),
    ])
    .unwrap_or_else(|e| unreachable!("bundled line is contiguous: {e}"))
}
