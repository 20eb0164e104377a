//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::puzzle::{Direction, TileColor};
use crate::solve::{Solution, SolutionSummary};
use anyhow::{Context, Result};
use std::path::Path;

/// ASCII drawing of a solution on a `(2·rows+1) × (2·cols+1)` canvas.
///
/// Nodes sit on even positions and tiles on odd ones; every slot is three
/// characters wide, so horizontal segments line up with the tiles.
pub struct GridRenderer;

impl GridRenderer {
    pub fn render(solution: &Solution) -> String {
        let grid = solution.grid;
        let width = 2 * grid.cols + 1;
        let height = 2 * grid.rows + 1;
        let mut canvas = vec![vec!["   "; width]; height];

        for cell in grid.cells() {
            let glyph = match solution.tile(cell) {
                TileColor::White => " W ",
                TileColor::Black => " B ",
                TileColor::Empty => "   ",
            };
            canvas[2 * cell.1 + 1][2 * cell.0 + 1] = glyph;
        }

        for node in grid.nodes() {
            let (x, y) = (2 * node.0, 2 * node.1);
            if node == solution.start {
                canvas[y][x] = " S ";
            } else if node == solution.end {
                canvas[y][x] = " E ";
            } else if solution.is_on_loop(node) {
                canvas[y][x] = " * ";
            }
            if solution.has_edge(node, Direction::Right) {
                canvas[y][x + 1] = "---";
            }
            if solution.has_edge(node, Direction::Up) {
                canvas[y + 1][x] = " | ";
            }
        }

        let mut output = String::with_capacity(height * (3 * width + 1));
        for row in canvas.iter().rev() {
            output.push_str(row.concat().trim_end());
            output.push('\n');
        }
        output
    }
}

/// Format solutions for display
pub struct SolutionFormatter;

impl SolutionFormatter {
    /// Format a single solution for console output
    pub fn format_solution(solution: &Solution, show_status: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!("=== Solution {} ===\n", solution.index + 1));
        if show_status {
            output.push_str(if solution.solved { "SOLVED\n" } else { "NOT SOLVED\n" });
        }
        output.push_str(&GridRenderer::render(solution));

        output
    }

    /// A solution as it arrives from enumeration: `Solution # i/N`, where the
    /// total reads `?` until it is known.
    pub fn format_numbered(
        solution: &Solution,
        number: usize,
        total: Option<usize>,
        show_status: bool,
    ) -> String {
        let total = total.map_or_else(|| "?".to_string(), |total| total.to_string());
        let mut output = format!("Solution # {}/{}\n", number, total);
        if show_status {
            output.push_str(if solution.solved { "SOLVED\n" } else { "NOT SOLVED\n" });
        }
        output.push_str(&GridRenderer::render(solution));
        output
    }

    /// Format solution summaries as a table
    pub fn format_solution_summary(summaries: &[SolutionSummary]) -> String {
        let mut output = String::new();

        output.push_str("Solutions Summary:\n");
        output.push_str("#     | Loop | W  | B  | E  | Solved\n");
        output.push_str("------|------|----|----|----|-------\n");

        for summary in summaries {
            output.push_str(&format!(
                "{:5} | {:4} | {:2} | {:2} | {:2} | {}\n",
                summary.index + 1,
                summary.loop_length,
                summary.white_tiles,
                summary.black_tiles,
                summary.empty_tiles,
                if summary.solved { "yes" } else { "no" }
            ));
        }

        output
    }

    /// Write one solution into `output_dir`, named after its index
    pub fn save_solution<P: AsRef<Path>>(
        solution: &Solution,
        output_dir: P,
        format: OutputFormat,
    ) -> Result<()> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        match format {
            OutputFormat::Text => {
                let filename = format!("solution_{:03}.txt", solution.index + 1);
                std::fs::write(output_dir.join(filename), Self::format_solution(solution, true))?;
            }
            OutputFormat::Json => {
                let filename = format!("solution_{:03}.json", solution.index + 1);
                solution.save_to_file(output_dir.join(filename))?;
            }
        }
        Ok(())
    }

    /// Write `solutions_summary.json`
    pub fn save_summaries<P: AsRef<Path>>(summaries: &[SolutionSummary], output_dir: P) -> Result<()> {
        let summary_path = output_dir.as_ref().join("solutions_summary.json");
        let summary_json = serde_json::to_string_pretty(summaries)?;
        std::fs::write(&summary_path, summary_json)
            .with_context(|| format!("Failed to write {}", summary_path.display()))?;
        Ok(())
    }

    /// Save solutions to files based on output format
    pub fn save_solutions<P: AsRef<Path>>(
        solutions: &[Solution],
        output_dir: P,
        format: OutputFormat,
    ) -> Result<()> {
        let output_dir = output_dir.as_ref();
        for solution in solutions {
            Self::save_solution(solution, output_dir, format)?;
        }
        if format == OutputFormat::Json {
            let summaries: Vec<_> = solutions.iter().map(|s| s.summary()).collect();
            Self::save_summaries(&summaries, output_dir)?;
        }
        Ok(())
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PuzzleMode, Settings};
    use crate::solve::PuzzleProblem;
    use tempfile::TempDir;

    fn solved_two_by_one() -> Solution {
        let mut settings = Settings::default();
        settings.puzzle.cols = 2;
        settings.puzzle.rows = 1;
        settings.puzzle.mode = PuzzleMode::Solved;
        PuzzleProblem::new(settings)
            .unwrap()
            .first_solution()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_render_dimensions() {
        let solution = solved_two_by_one();
        let drawing = GridRenderer::render(&solution);
        let lines: Vec<&str> = drawing.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.len() <= 3 * 5));
        // Rows are right-trimmed, so an endpoint in the last column loses its padding
        assert_eq!(drawing.matches('S').count(), 1);
        assert_eq!(drawing.matches('E').count(), 1);
        assert!(drawing.contains(" W "));
        assert!(drawing.contains(" B "));
    }

    #[test]
    fn test_render_places_tiles_top_row_first() {
        let solution = solved_two_by_one();
        let drawing = GridRenderer::render(&solution);
        let middle = drawing.lines().nth(1).unwrap();
        let left = solution.tile((0, 0)).symbol();
        assert_eq!(middle.chars().nth(4), Some(left));
    }

    #[test]
    fn test_format_solution() {
        let solution = solved_two_by_one();
        let text = SolutionFormatter::format_solution(&solution, true);
        assert!(text.starts_with("=== Solution 1 ==="));
        assert!(text.contains("SOLVED"));

        let table = SolutionFormatter::format_solution_summary(&[solution.summary()]);
        assert!(table.contains("yes"));
    }

    #[test]
    fn test_format_numbered() {
        let solution = solved_two_by_one();
        let known = SolutionFormatter::format_numbered(&solution, 1, Some(4), false);
        assert!(known.starts_with("Solution # 1/4\n"));
        assert!(!known.contains("SOLVED"));

        let unknown = SolutionFormatter::format_numbered(&solution, 3, None, true);
        assert!(unknown.starts_with("Solution # 3/?\nSOLVED\n"));
    }

    #[test]
    fn test_save_solutions() {
        let temp_dir = TempDir::new().unwrap();
        let solution = solved_two_by_one();

        SolutionFormatter::save_solutions(
            std::slice::from_ref(&solution),
            temp_dir.path(),
            OutputFormat::Json,
        )
        .unwrap();
        let loaded = Solution::load_from_file(temp_dir.path().join("solution_001.json")).unwrap();
        assert_eq!(loaded, solution);
        assert!(temp_dir.path().join("solutions_summary.json").exists());

        SolutionFormatter::save_solutions(&[solution], temp_dir.path(), OutputFormat::Text).unwrap();
        assert!(temp_dir.path().join("solution_001.txt").exists());
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));

        let success = ColorOutput::success("OK");
        assert!(success.contains("OK"));
    }
}
