//! Main CLI application for the Black and White Squares solver

use anyhow::{Context, Result};
use black_and_white_squares::{
    config::{CliOverrides, OutputFormat, PuzzleMode, Settings, SolverBackend},
    puzzle::{example_board, example_line, io::board_to_string, load_board_from_file, parse_line},
    solve::PuzzleProblem,
    utils::{ColorOutput, SolutionFormatter},
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "black_and_white_squares")]
#[command(about = "Black and White Squares SAT Solver")]
#[command(version)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the first solution, or all of them
    Solve {
        #[command(flatten)]
        puzzle: PuzzleArgs,

        /// List every solution
        #[arg(short, long)]
        all: bool,

        /// Also report the number of solutions
        #[arg(long)]
        count: bool,

        /// Largest solution count enumerated by sampling
        #[arg(short = 'b', long)]
        allowance: Option<usize>,

        /// Output format for saved solutions
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Directory to save solutions in
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print encoding statistics
        #[arg(long)]
        stats: bool,
    },

    /// Count solutions without printing them
    Count {
        #[command(flatten)]
        puzzle: PuzzleArgs,
    },

    /// Create default and example configuration files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args)]
struct PuzzleArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Puzzle mode (overrides config)
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Tile columns (overrides config)
    #[arg(long)]
    cols: Option<usize>,

    /// Tile rows (overrides config)
    #[arg(long)]
    rows: Option<usize>,

    /// Fixed line as node coordinates, e.g. "0,0 0,1 1,1"
    #[arg(short, long)]
    line: Option<String>,

    /// Fixed board file
    #[arg(long)]
    board: Option<PathBuf>,

    /// SAT backend (overrides config)
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Free,
    Solved,
    Board,
    Line,
}

impl From<ModeArg> for PuzzleMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Free => PuzzleMode::Free,
            ModeArg::Solved => PuzzleMode::Solved,
            ModeArg::Board => PuzzleMode::Board,
            ModeArg::Line => PuzzleMode::Line,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Cadical,
    Batsat,
}

impl From<BackendArg> for SolverBackend {
    fn from(backend: BackendArg) -> Self {
        match backend {
            BackendArg::Cadical => SolverBackend::Cadical,
            BackendArg::Batsat => SolverBackend::Batsat,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Solve {
            puzzle,
            all,
            count,
            allowance,
            format,
            output,
            stats,
        } => {
            let mut overrides = puzzle.overrides()?;
            overrides.enumerate = all;
            overrides.count = count;
            overrides.bruteforce_allowance = allowance;
            overrides.format = format.map(Into::into);
            overrides.output_dir = output;
            let settings = load_settings(&puzzle.config, &overrides)?;
            solve_command(settings, stats || cli.verbose > 0)
        }
        Commands::Count { puzzle } => {
            let overrides = puzzle.overrides()?;
            let settings = load_settings(&puzzle.config, &overrides)?;
            count_command(settings)
        }
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

impl PuzzleArgs {
    fn overrides(&self) -> Result<CliOverrides> {
        let line = self
            .line
            .as_deref()
            .map(parse_line)
            .transpose()
            .context("Invalid --line")?;
        let board = self
            .board
            .as_ref()
            .map(load_board_from_file)
            .transpose()?;

        // A preset on the command line implies its mode unless one is given
        let mode = self.mode.map(PuzzleMode::from).or(match (&line, &board) {
            (Some(_), None) => Some(PuzzleMode::Line),
            (None, Some(_)) => Some(PuzzleMode::Board),
            _ => None,
        });

        Ok(CliOverrides {
            mode,
            cols: self.cols,
            rows: self.rows,
            line,
            board,
            backend: self.backend.map(Into::into),
            ..Default::default()
        })
    }
}

fn load_settings(config_path: &Path, overrides: &CliOverrides) -> Result<Settings> {
    let mut settings = if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        tracing::info!("config file {} not found, using defaults", config_path.display());
        Settings::default()
    };

    settings.merge_with_cli(overrides);
    settings
        .validate()
        .context("Configuration validation failed")?;
    Ok(settings)
}

fn solve_command(settings: Settings, show_stats: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Starting Black and White Squares Solver"));
    println!(
        "Grid: {}x{}, mode: {}, backend: {}",
        settings.puzzle.cols, settings.puzzle.rows, settings.puzzle.mode, settings.solver.backend
    );

    let problem = PuzzleProblem::new(settings.clone()).context("Failed to create puzzle")?;
    if show_stats {
        println!("{}", problem.encoding_statistics()?);
    }

    let satisfiable = problem.is_satisfiable().context("Failed to solve puzzle")?;
    println!("Satisfiable: {}", satisfiable);
    if !satisfiable {
        println!("{}", ColorOutput::warning("No solution"));
        return Ok(());
    }

    if settings.solver.enumerate {
        enumerate_solutions(&problem, &settings)
    } else {
        first_solution(&problem, &settings)
    }
}

fn first_solution(problem: &PuzzleProblem, settings: &Settings) -> Result<()> {
    let report = problem.solve().context("Failed to solve puzzle")?;
    if report.validation.invalid_solutions > 0 {
        println!("{}", ColorOutput::error("The solution found failed validation"));
    }

    let show_status = !settings.puzzle.mode.requires_solved();
    for solution in &report.solutions {
        println!("\n{}", SolutionFormatter::format_numbered(solution, 1, report.total, show_status));
    }
    if let Some(total) = report.total {
        println!("# Solutions: {}", total);
    }
    println!("Solved in {:.3}s", report.elapsed.as_secs_f64());

    if let Some(output_dir) = &settings.output.output_directory {
        SolutionFormatter::save_solutions(&report.solutions, output_dir, settings.output.format)
            .context("Failed to save solutions")?;
        println!("{}", ColorOutput::success(&format!("Solutions saved to {}", output_dir.display())));
    }
    Ok(())
}

/// Print and save each solution as the solver produces it
fn enumerate_solutions(problem: &PuzzleProblem, settings: &Settings) -> Result<()> {
    let start_time = Instant::now();
    let (strategy, total, stream) = problem
        .validated_solutions()
        .context("Failed to enumerate solutions")?;
    println!("Enumeration strategy: {}", strategy);

    let output_dir = settings.output.output_directory.as_deref();
    // Summaries stay small; keep them when the count is bounded or files are written
    let keep_summaries = total.is_some() || output_dir.is_some();
    let show_status = !settings.puzzle.mode.requires_solved();
    let mut summaries = Vec::new();
    let mut found = 0usize;
    let mut invalid = 0usize;

    for item in stream {
        let (solution, validation) = item.context("Failed to enumerate solutions")?;
        if !validation.is_valid {
            invalid += 1;
            continue;
        }
        found += 1;
        println!("\n{}", SolutionFormatter::format_numbered(&solution, found, total, show_status));

        if let Some(dir) = output_dir {
            SolutionFormatter::save_solution(&solution, dir, settings.output.format)
                .context("Failed to save solution")?;
        }
        if keep_summaries {
            summaries.push(solution.summary());
        }
    }

    if total.is_some() && found > 1 {
        println!("\n{}", SolutionFormatter::format_solution_summary(&summaries));
    }
    if invalid > 0 {
        println!(
            "{}",
            ColorOutput::error(&format!("{} solution(s) failed validation and were dropped", invalid))
        );
    }
    println!(
        "{}",
        ColorOutput::success(&format!(
            "# Solutions: {} ({:.3}s)",
            found,
            start_time.elapsed().as_secs_f64()
        ))
    );

    if let Some(dir) = output_dir {
        if settings.output.format == OutputFormat::Json {
            SolutionFormatter::save_summaries(&summaries, dir).context("Failed to save summary")?;
        }
        println!("{}", ColorOutput::success(&format!("Solutions saved to {}", dir.display())));
    }
    Ok(())
}

fn count_command(settings: Settings) -> Result<()> {
    let problem = PuzzleProblem::new(settings).context("Failed to create puzzle")?;
    let count = problem.count_solutions().context("Failed to count solutions")?;
    println!("{}", count);
    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let examples_dir = config_dir.join("examples");
    let input_dir = directory.join("input/boards");
    for dir in [&config_dir, &examples_dir, &input_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let files: [(PathBuf, Settings); 3] = [
        (config_dir.join("default.yaml"), Settings::default()),
        (examples_dir.join("static_board.yaml"), Settings::with_board(&example_board())),
        (examples_dir.join("static_line.yaml"), Settings::with_line(3, 3, example_line())),
    ];
    for (path, settings) in &files {
        if path.exists() && !force {
            println!("Skipped: {} (already exists)", path.display());
            continue;
        }
        settings
            .to_file(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        println!("Created: {}", path.display());
    }

    let board_path = input_dir.join("example.txt");
    if !board_path.exists() || force {
        std::fs::write(&board_path, board_to_string(&example_board()))
            .with_context(|| format!("Failed to write {}", board_path.display()))?;
        println!("Created: {}", board_path.display());
    }

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: black_and_white_squares solve --config {}", examples_dir.join("static_line.yaml").display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "black_and_white_squares",
            "-vv",
            "solve",
            "--cols",
            "3",
            "--rows",
            "3",
            "--line",
            "0,0 0,1 1,1",
            "--all",
            "--backend",
            "batsat",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Solve { puzzle, all, .. } => {
                assert!(all);
                let overrides = puzzle.overrides().unwrap();
                assert_eq!(overrides.mode, Some(PuzzleMode::Line));
                assert_eq!(overrides.backend, Some(SolverBackend::Batsat));
                assert_eq!(overrides.line.unwrap().points().len(), 3);
            }
            _ => panic!("expected solve"),
        }
    }

    #[test]
    fn test_broken_line_rejected() {
        let cli = Cli::try_parse_from(["black_and_white_squares", "count", "--line", "0,0 1,1"]).unwrap();
        match cli.command {
            Commands::Count { puzzle } => assert!(puzzle.overrides().is_err()),
            _ => panic!("expected count"),
        }
    }

    #[test]
    fn test_setup_command() {
        let temp_dir = tempdir().unwrap();
        setup_command(temp_dir.path().to_path_buf(), false).unwrap();

        let default = temp_dir.path().join("config/default.yaml");
        let line = temp_dir.path().join("config/examples/static_line.yaml");
        let board = temp_dir.path().join("config/examples/static_board.yaml");
        assert!(default.exists());
        assert_eq!(Settings::from_file(&line).unwrap().puzzle.mode, PuzzleMode::Line);
        assert_eq!(Settings::from_file(&board).unwrap().puzzle.mode, PuzzleMode::Board);

        let board_file = temp_dir.path().join("input/boards/example.txt");
        assert_eq!(load_board_from_file(board_file).unwrap(), example_board());
    }

    #[test]
    fn test_load_settings_applies_overrides() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("missing.yaml");
        let overrides = CliOverrides {
            mode: Some(PuzzleMode::Free),
            cols: Some(2),
            rows: Some(2),
            ..Default::default()
        };
        let settings = load_settings(&missing, &overrides).unwrap();
        assert_eq!(settings.puzzle.mode, PuzzleMode::Free);
        assert_eq!(settings.puzzle.cols, 2);
    }

    #[test]
    fn test_load_settings_line_over_board_config() {
        let temp_dir = tempdir().unwrap();
        let config = temp_dir.path().join("board.yaml");
        Settings::with_board(&example_board()).to_file(&config).unwrap();

        let cli = Cli::try_parse_from([
            "black_and_white_squares",
            "solve",
            "--config",
            config.to_str().unwrap(),
            "--line",
            "0,0 0,1 1,1",
        ])
        .unwrap();
        let Commands::Solve { puzzle, .. } = cli.command else {
            panic!("expected solve");
        };
        let settings = load_settings(&puzzle.config, &puzzle.overrides().unwrap()).unwrap();
        assert_eq!(settings.puzzle.mode, PuzzleMode::Line);
        assert!(settings.preset.board.is_none());
    }

    #[test]
    fn test_enumerate_streams_to_output_directory() {
        let temp_dir = tempdir().unwrap();
        let mut settings = Settings::default();
        settings.puzzle.cols = 2;
        settings.puzzle.rows = 1;
        settings.solver.enumerate = true;
        settings.solver.bruteforce_allowance = Some(0);
        settings.output.format = OutputFormat::Json;
        settings.output.output_directory = Some(temp_dir.path().to_path_buf());

        let problem = PuzzleProblem::new(settings.clone()).unwrap();
        let count = problem.count_solutions().unwrap();
        enumerate_solutions(&problem, &settings).unwrap();

        let summary = std::fs::read_to_string(temp_dir.path().join("solutions_summary.json")).unwrap();
        let summaries: Vec<serde_json::Value> = serde_json::from_str(&summary).unwrap();
        assert_eq!(summaries.len(), count);
        assert!(temp_dir.path().join("solution_001.json").exists());
    }
}
