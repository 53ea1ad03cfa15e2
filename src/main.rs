//! Command line front end for the Game of Life simulator

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use game_of_life_sim::{
    config::{BoundaryCondition, CliOverrides, SaveFormat, Settings},
    game_of_life::{create_example_grids, load_grid, save_grid, StepEngine},
    session::{Command, CommandOutcome, Session},
    utils::{AsciiCanvas, ColorOutput, GridFormatter},
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "game_of_life_sim")]
#[command(about = "Conway's Game of Life simulator")]
#[command(version = "0.1.0")]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless session for a number of frames
    Run {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Number of frames to simulate
        #[arg(short, long, default_value_t = 600)]
        frames: u64,

        /// Wall time fed to the clock per frame, in milliseconds
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,

        /// Start from a saved grid instead of a fresh one
        #[arg(short, long)]
        load: Option<String>,

        /// Command script: one `FRAME COMMAND` per line
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Save the final grid under this name
        #[arg(long)]
        save: Option<String>,

        /// Start paused instead of running
        #[arg(long)]
        paused: bool,

        /// Print the final grid
        #[arg(long)]
        show: bool,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Create a default configuration and example saves
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Advance a saved grid by a number of generations
    Step {
        /// Saved grid to read
        #[arg(short, long)]
        input: PathBuf,

        /// Number of generations
        #[arg(short, long, default_value_t = 1)]
        generations: usize,

        /// Where to write the result; printed when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Edge policy for neighbor counting
        #[arg(short, long, value_enum, default_value_t = BoundaryArg::Wrap)]
        boundary: BoundaryArg,
    },

    /// Print a saved grid
    Show {
        /// Saved grid to read
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(clap::Args, Debug, Default)]
struct OverrideArgs {
    /// Surface width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Surface height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Square cell size in pixels
    #[arg(long)]
    cell_size: Option<u32>,

    /// Simulation step in seconds
    #[arg(long)]
    step: Option<f64>,

    /// Edge policy for neighbor counting
    #[arg(long, value_enum)]
    boundary: Option<BoundaryArg>,

    /// Seed for the random initial fill
    #[arg(long)]
    seed: Option<u64>,

    /// Directory that save names resolve against
    #[arg(long)]
    save_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BoundaryArg {
    Wrap,
    Dead,
}

impl From<BoundaryArg> for BoundaryCondition {
    fn from(value: BoundaryArg) -> Self {
        match value {
            BoundaryArg::Wrap => BoundaryCondition::Wrap,
            BoundaryArg::Dead => BoundaryCondition::Dead,
        }
    }
}

impl From<&OverrideArgs> for CliOverrides {
    fn from(args: &OverrideArgs) -> Self {
        Self {
            width: args.width,
            height: args.height,
            cell_size: args.cell_size,
            step_seconds: args.step,
            boundary_condition: args.boundary.map(Into::into),
            seed: args.seed,
            save_directory: args.save_dir.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            frames,
            frame_ms,
            load,
            script,
            save,
            paused,
            show,
            overrides,
        } => run_command(RunOptions {
            config,
            frames,
            frame: Duration::from_millis(frame_ms),
            load,
            script,
            save,
            paused,
            show,
            overrides: CliOverrides::from(&overrides),
        }),
        Commands::Setup { directory, force } => setup_command(directory, force),
        Commands::Step {
            input,
            generations,
            output,
            boundary,
        } => step_command(input, generations, output, boundary.into()),
        Commands::Show { input } => show_command(input),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct RunOptions {
    config: PathBuf,
    frames: u64,
    frame: Duration,
    load: Option<String>,
    script: Option<PathBuf>,
    save: Option<String>,
    paused: bool,
    show: bool,
    overrides: CliOverrides,
}

fn load_settings(config_path: &Path, overrides: &CliOverrides) -> Result<Settings> {
    let mut settings = if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!(
                "Config file {} not found, using defaults",
                config_path.display()
            ))
        );
        Settings::default()
    };

    settings.merge_with_cli(overrides);
    settings.validate().context("Configuration validation failed")?;
    Ok(settings)
}

fn run_command(options: RunOptions) -> Result<()> {
    let settings = load_settings(&options.config, &options.overrides)?;

    let mut session = Session::new(&settings).context("Failed to create session")?;
    if let Some(name) = &options.load {
        let path = session
            .load(name)
            .with_context(|| format!("Failed to load initial grid '{}'", name))?;
        println!("Loaded {}", path.display());
    }

    let mut script = match &options.script {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };
    script.sort_by_key(|(frame, _)| *frame);
    let mut pending = script.into_iter().peekable();

    if !options.paused {
        session.apply(Command::ToggleRun)?;
    }

    let start = Instant::now();
    let mut frames_run = 0;
    'frames: for frame in 0..options.frames {
        while let Some((_, command)) = pending.next_if(|(at, _)| *at <= frame) {
            match session.apply(command.clone()) {
                Ok(CommandOutcome::Quit) => break 'frames,
                Ok(CommandOutcome::Ignored) => println!(
                    "{}",
                    ColorOutput::warning(&format!("frame {}: ignored {:?}", frame, command))
                ),
                Ok(CommandOutcome::Applied) => {}
                Err(e) => println!(
                    "{}",
                    ColorOutput::error(&format!("frame {}: {:?} failed: {}", frame, command, e))
                ),
            }
        }
        session.advance_frame(options.frame);
        frames_run += 1;
    }

    println!(
        "{}",
        ColorOutput::success(&format!(
            "Ran {} frames in {:.3}s: {}",
            frames_run,
            start.elapsed().as_secs_f64(),
            session
        ))
    );

    if options.show {
        let mut canvas = AsciiCanvas::for_grid(session.grid());
        session.render(&mut canvas);
        print!("{}", canvas);
    }

    if let Some(name) = &options.save {
        let path = session
            .save(name)
            .with_context(|| format!("Failed to save grid as '{}'", name))?;
        println!("{}", ColorOutput::success(&format!("Saved {}", path.display())));
    }

    Ok(())
}

/// Parse a command script. Blank lines and lines starting with `#` are skipped.
fn load_script(path: &Path) -> Result<Vec<(u64, Command)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;

    let mut commands = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (frame, command) = line
            .split_once(char::is_whitespace)
            .with_context(|| format!("{}:{}: expected `FRAME COMMAND`", path.display(), idx + 1))?;
        let frame: u64 = frame
            .parse()
            .with_context(|| format!("{}:{}: invalid frame '{}'", path.display(), idx + 1, frame))?;
        let command: Command = command
            .parse()
            .with_context(|| format!("{}:{}", path.display(), idx + 1))?;
        commands.push((frame, command));
    }

    Ok(commands)
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let settings = Settings::default();
    let config_path = directory.join("config/default.yaml");
    if !config_path.exists() || force {
        settings
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    let save_dir = directory.join(&settings.persistence.save_directory);
    for format in [SaveFormat::Json, SaveFormat::Text] {
        create_example_grids(&save_dir, format).context("Failed to create example grids")?;
    }
    println!("Created example patterns in: {}", save_dir.display());

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit {}", config_path.display());
    println!("2. Run: game_of_life_sim run --load glider --show");

    Ok(())
}

fn format_for(path: &Path) -> SaveFormat {
    SaveFormat::from_path(path).unwrap_or_default()
}

fn step_command(
    input: PathBuf,
    generations: usize,
    output: Option<PathBuf>,
    boundary: BoundaryCondition,
) -> Result<()> {
    let grid = load_grid(&input, format_for(&input))
        .with_context(|| format!("Failed to load grid from {}", input.display()))?;

    let evolved = StepEngine::new(boundary).evolve_generations(grid, generations);

    match output {
        Some(path) => {
            save_grid(&evolved, &path, format_for(&path))
                .with_context(|| format!("Failed to save grid to {}", path.display()))?;
            println!(
                "{}",
                ColorOutput::success(&format!(
                    "Advanced {} generation(s), saved to {}",
                    generations,
                    path.display()
                ))
            );
        }
        None => {
            println!("After {} generation(s):", generations);
            print!("{}", GridFormatter::format_grid_compact(&evolved));
            println!("{}", GridFormatter::format_summary(&evolved));
        }
    }

    Ok(())
}

fn show_command(input: PathBuf) -> Result<()> {
    let grid = load_grid(&input, format_for(&input))
        .with_context(|| format!("Failed to load grid from {}", input.display()))?;

    println!("{}", GridFormatter::format_summary(&grid));
    print!("{}", GridFormatter::format_grid_with_coords(&grid));
    Ok(())
}
