//! Session controller: owns the grid and clock and applies input commands

use super::clock::{ClockState, FixedClock};
use super::render::{render_frame, Canvas};
use crate::config::{PersistenceConfig, SaveFormat, Settings};
use crate::error::{LifeError, LifeResult};
use crate::game_of_life::{load_grid, rescale, save_grid, GridState, StepEngine};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Edit and control operations issued by the input layer
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ToggleRun,
    /// Set one cell by grid coordinates; ignored while running
    SetCell { row: usize, col: usize, value: u8 },
    /// Set the cell under a pixel position; ignored while running
    Paint { x: f64, y: f64, value: u8 },
    Reset,
    Save(String),
    Load(String),
    Resize { width: u32, height: u32 },
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid command '{input}': {reason}")]
pub struct CommandParseError {
    pub input: String,
    pub reason: String,
}

impl FromStr for Command {
    type Err = CommandParseError;

    /// Parse the one-line text form, e.g. `set 3 4 1` or `save glider`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason: &str| CommandParseError {
            input: s.trim().to_string(),
            reason: reason.to_string(),
        };
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let (name, args) = tokens.split_first().ok_or_else(|| fail("empty command"))?;

        fn arg<T: FromStr>(args: &[&str], idx: usize) -> Option<T> {
            args.get(idx)?.parse().ok()
        }
        let expect_args = |count: usize| {
            if args.len() == count {
                Ok(())
            } else {
                Err(fail(&format!("expected {} argument(s), got {}", count, args.len())))
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "toggle" => expect_args(0).map(|_| Command::ToggleRun),
            "reset" => expect_args(0).map(|_| Command::Reset),
            "quit" => expect_args(0).map(|_| Command::Quit),
            "set" => {
                expect_args(3)?;
                match (arg(args, 0), arg(args, 1), arg(args, 2)) {
                    (Some(row), Some(col), Some(value)) => Ok(Command::SetCell { row, col, value }),
                    _ => Err(fail("usage: set ROW COL VALUE")),
                }
            }
            "paint" => {
                expect_args(3)?;
                match (arg(args, 0), arg(args, 1), arg(args, 2)) {
                    (Some(x), Some(y), Some(value)) => Ok(Command::Paint { x, y, value }),
                    _ => Err(fail("usage: paint X Y VALUE")),
                }
            }
            "resize" => {
                expect_args(2)?;
                match (arg(args, 0), arg(args, 1)) {
                    (Some(width), Some(height)) => Ok(Command::Resize { width, height }),
                    _ => Err(fail("usage: resize WIDTH HEIGHT")),
                }
            }
            "save" => {
                expect_args(1)?;
                Ok(Command::Save(args[0].to_string()))
            }
            "load" => {
                expect_args(1)?;
                Ok(Command::Load(args[0].to_string()))
            }
            _ => Err(fail("unknown command")),
        }
    }
}

/// What happened to a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// Valid command rejected by the current session state
    Ignored,
    Quit,
}

/// Result of feeding one frame's elapsed time to the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Whole steps drained from the clock
    pub drained: u32,
    /// Generations actually computed
    pub advanced: u32,
    pub generation: u64,
}

/// A running simulation: exactly one grid, its clock and the step rule.
///
/// Load, reset and resize replace the grid wholesale; a failed save or
/// load leaves it untouched.
#[derive(Debug, Clone)]
pub struct Session {
    grid: GridState,
    clock: FixedClock,
    engine: StepEngine,
    step: Duration,
    max_steps_per_frame: u32,
    persistence: PersistenceConfig,
    generation: u64,
}

impl Session {
    /// Start a session with a fresh grid built from `settings`
    pub fn new(settings: &Settings) -> LifeResult<Self> {
        let display = &settings.display;
        let mut rng = match settings.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let grid = GridState::create_with_rng(
            display.width,
            display.height,
            display.cell_width,
            display.cell_height,
            settings.simulation.initial_fill,
            &mut rng,
        )?;

        info!(
            rows = grid.rows(),
            cols = grid.cols(),
            fill = ?settings.simulation.initial_fill,
            "session started"
        );
        Ok(Self::with_grid(settings, grid))
    }

    /// Start a session around an existing grid
    pub fn with_grid(settings: &Settings, grid: GridState) -> Self {
        Self {
            grid,
            clock: FixedClock::new(),
            engine: StepEngine::new(settings.simulation.boundary_condition),
            step: settings.step_duration(),
            max_steps_per_frame: settings.simulation.max_steps_per_frame,
            persistence: settings.persistence.clone(),
            generation: 0,
        }
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn clock(&self) -> &FixedClock {
        &self.clock
    }

    pub fn engine(&self) -> StepEngine {
        self.engine
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Generations computed since the grid was created, loaded or reset
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply one input command
    pub fn apply(&mut self, command: Command) -> LifeResult<CommandOutcome> {
        debug!(?command, "applying command");
        match command {
            Command::ToggleRun => {
                let state = self.clock.toggle();
                info!(?state, generation = self.generation, "simulation toggled");
            }
            Command::SetCell { row, col, value } => return self.set_cell(row, col, value),
            Command::Paint { x, y, value } => {
                if self.is_running() {
                    warn!(x, y, "ignoring paint while running");
                    return Ok(CommandOutcome::Ignored);
                }
                let (row, col) = self.grid.pixel_to_cell(x, y)?;
                return self.set_cell(row, col, value);
            }
            Command::Reset => {
                self.grid = self.grid.cleared();
                self.generation = 0;
                info!("grid reset");
            }
            Command::Save(name) => {
                self.save(&name)?;
            }
            Command::Load(name) => {
                self.load(&name)?;
            }
            Command::Resize { width, height } => {
                self.grid = rescale(&self.grid, width, height)?;
                info!(width, height, "surface resized");
            }
            Command::Quit => {
                info!(generation = self.generation, "session ending");
                return Ok(CommandOutcome::Quit);
            }
        }
        Ok(CommandOutcome::Applied)
    }

    fn set_cell(&mut self, row: usize, col: usize, value: u8) -> LifeResult<CommandOutcome> {
        if self.is_running() {
            warn!(row, col, "ignoring cell edit while running");
            return Ok(CommandOutcome::Ignored);
        }
        self.grid.set(row, col, value)?;
        Ok(CommandOutcome::Applied)
    }

    /// Save the grid under `name`, resolved against the save directory
    pub fn save(&self, name: &str) -> LifeResult<PathBuf> {
        let path = self.resolve_save_path(name)?;
        let format = SaveFormat::from_path(&path).unwrap_or(self.persistence.format);
        save_grid(&self.grid, &path, format)?;
        Ok(path)
    }

    /// Replace the grid with the snapshot stored under `name`
    pub fn load(&mut self, name: &str) -> LifeResult<PathBuf> {
        let path = self.resolve_save_path(name)?;
        let format = SaveFormat::from_path(&path).unwrap_or(self.persistence.format);
        self.grid = load_grid(&path, format)?;
        self.generation = 0;
        Ok(path)
    }

    /// Map a save name to a file: bare names get the configured format's
    /// extension, relative names live in the save directory.
    pub fn resolve_save_path(&self, name: &str) -> LifeResult<PathBuf> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LifeError::io(
                &self.persistence.save_directory,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty save name"),
            ));
        }

        let mut path = PathBuf::from(name);
        if path.extension().is_none() {
            path.set_extension(self.persistence.format.extension());
        }
        if path.is_relative() {
            path = self.persistence.save_directory.join(path);
        }
        Ok(path)
    }

    /// Feed one frame's elapsed time and run every step it pays for
    pub fn advance_frame(&mut self, elapsed: Duration) -> FrameReport {
        self.clock.accumulate(elapsed);
        self.run_due_steps()
    }

    /// Like [`Session::advance_frame`], measuring elapsed time from `now`
    pub fn tick(&mut self, now: Instant) -> FrameReport {
        self.clock.tick(now);
        self.run_due_steps()
    }

    fn run_due_steps(&mut self) -> FrameReport {
        let drained = self.clock.drain(self.step);
        let mut advanced = 0;

        if self.clock.state() == ClockState::Running {
            advanced = match self.max_steps_per_frame {
                0 => drained,
                cap => drained.min(cap),
            };
            for _ in 0..advanced {
                self.grid = self.engine.evolve(&self.grid);
            }
            self.generation += u64::from(advanced);
        }

        if drained > 0 {
            debug!(drained, advanced, generation = self.generation, "frame drained");
        }
        FrameReport {
            drained,
            advanced,
            generation: self.generation,
        }
    }

    /// Draw the current generation
    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        render_frame(&self.grid, canvas);
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.clock.state() {
            ClockState::Paused => "paused",
            ClockState::Running => "running",
        };
        write!(
            f,
            "generation {} ({}), {}x{} cells, {} alive",
            self.generation,
            state,
            self.grid.cols(),
            self.grid.rows(),
            self.grid.living_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BoundaryCondition, CellFill};
    use crate::game_of_life::ALIVE;
    use tempfile::tempdir;

    fn test_settings(save_directory: PathBuf) -> Settings {
        let mut settings = Settings::default();
        settings.display.width = 50;
        settings.display.height = 50;
        settings.display.cell_width = 10;
        settings.display.cell_height = 10;
        settings.simulation.initial_fill = CellFill::Zero;
        settings.simulation.boundary_condition = BoundaryCondition::Wrap;
        settings.persistence.save_directory = save_directory;
        settings
    }

    fn blinker_session(save_directory: PathBuf) -> Session {
        let mut session = Session::new(&test_settings(save_directory)).unwrap();
        for col in 1..4 {
            session.apply(Command::SetCell { row: 2, col, value: 1 }).unwrap();
        }
        session
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("toggle".parse::<Command>().unwrap(), Command::ToggleRun);
        assert_eq!(
            "set 3 4 1".parse::<Command>().unwrap(),
            Command::SetCell { row: 3, col: 4, value: 1 }
        );
        assert_eq!(
            "paint 12.5 40 0".parse::<Command>().unwrap(),
            Command::Paint { x: 12.5, y: 40.0, value: 0 }
        );
        assert_eq!(
            "resize 1024 768".parse::<Command>().unwrap(),
            Command::Resize { width: 1024, height: 768 }
        );
        assert_eq!("  SAVE glider ".parse::<Command>().unwrap(), Command::Save("glider".into()));
        assert_eq!("load a.txt".parse::<Command>().unwrap(), Command::Load("a.txt".into()));
        assert_eq!("quit".parse::<Command>().unwrap(), Command::Quit);

        assert!("".parse::<Command>().is_err());
        assert!("jump".parse::<Command>().is_err());
        assert!("set 1 2".parse::<Command>().is_err());
        assert!("set 1 x 1".parse::<Command>().is_err());
        assert!("save".parse::<Command>().is_err());
    }

    #[test]
    fn test_paused_session_does_not_step() {
        let temp_dir = tempdir().unwrap();
        let mut session = blinker_session(temp_dir.path().to_path_buf());
        let before = session.grid().clone();

        let report = session.advance_frame(Duration::from_millis(200));
        assert_eq!(report.drained, 3);
        assert_eq!(report.advanced, 0);
        assert_eq!(session.grid(), &before);
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn test_running_session_steps_per_drained_tick() {
        let temp_dir = tempdir().unwrap();
        let mut session = blinker_session(temp_dir.path().to_path_buf());
        let horizontal = session.grid().clone();
        session.apply(Command::ToggleRun).unwrap();

        assert_eq!(session.advance_frame(Duration::from_millis(30)).advanced, 0);
        let report = session.advance_frame(Duration::from_millis(40));
        assert_eq!(report.advanced, 1);
        assert_eq!(session.grid().living_cells(), vec![(1, 2), (2, 2), (3, 2)]);

        let report = session.advance_frame(Duration::from_millis(110));
        assert_eq!(report.advanced, 2);
        assert_eq!(report.generation, 3);
        assert_eq!(session.grid().living_cells(), vec![(1, 2), (2, 2), (3, 2)]);

        session.advance_frame(Duration::from_millis(60));
        assert_eq!(session.grid(), &horizontal);
    }

    #[test]
    fn test_catch_up_cap() {
        let temp_dir = tempdir().unwrap();
        let mut settings = test_settings(temp_dir.path().to_path_buf());
        settings.simulation.max_steps_per_frame = 2;
        let mut session = Session::new(&settings).unwrap();
        session.apply(Command::ToggleRun).unwrap();

        let report = session.advance_frame(Duration::from_millis(600));
        assert_eq!(report.drained, 10);
        assert_eq!(report.advanced, 2);
    }

    #[test]
    fn test_edits_ignored_while_running() {
        let temp_dir = tempdir().unwrap();
        let mut session = Session::new(&test_settings(temp_dir.path().to_path_buf())).unwrap();
        session.apply(Command::ToggleRun).unwrap();

        let outcome = session.apply(Command::SetCell { row: 0, col: 0, value: 1 }).unwrap();
        assert_eq!(outcome, CommandOutcome::Ignored);
        let outcome = session.apply(Command::Paint { x: 1.0, y: 1.0, value: 1 }).unwrap();
        assert_eq!(outcome, CommandOutcome::Ignored);
        assert!(session.grid().is_all_dead());
    }

    #[test]
    fn test_paint_translates_pixels() {
        let temp_dir = tempdir().unwrap();
        let mut session = Session::new(&test_settings(temp_dir.path().to_path_buf())).unwrap();

        session.apply(Command::Paint { x: 23.0, y: 41.0, value: 1 }).unwrap();
        assert_eq!(session.grid().get(4, 2).unwrap(), ALIVE);

        let result = session.apply(Command::Paint { x: 50.0, y: 0.0, value: 1 });
        assert!(matches!(result, Err(LifeError::OutOfBounds { .. })));
        let result = session.apply(Command::SetCell { row: 0, col: 0, value: 4 });
        assert!(matches!(result, Err(LifeError::InvalidCellValue(4))));
    }

    #[test]
    fn test_save_and_load_through_session() {
        let temp_dir = tempdir().unwrap();
        let mut session = blinker_session(temp_dir.path().join("saves"));
        let saved = session.grid().clone();

        let path = session.save("blinker").unwrap();
        assert_eq!(path, temp_dir.path().join("saves/blinker.json"));
        session.save("blinker.txt").unwrap();

        session.apply(Command::Reset).unwrap();
        assert!(session.grid().is_all_dead());

        session.apply(Command::Load("blinker".into())).unwrap();
        assert_eq!(session.grid(), &saved);

        session.apply(Command::Reset).unwrap();
        session.apply(Command::Load("blinker.txt".into())).unwrap();
        assert_eq!(session.grid(), &saved);
    }

    #[test]
    fn test_save_and_load_commands() {
        let temp_dir = tempdir().unwrap();
        let mut session = blinker_session(temp_dir.path().to_path_buf());
        let saved = session.grid().clone();

        let outcome = session.apply("save pattern".parse().unwrap()).unwrap();
        assert_eq!(outcome, CommandOutcome::Applied);
        assert!(temp_dir.path().join("pattern.json").exists());

        session.apply(Command::Reset).unwrap();
        let outcome = session.apply("load pattern".parse().unwrap()).unwrap();
        assert_eq!(outcome, CommandOutcome::Applied);
        assert_eq!(session.grid(), &saved);
    }

    #[test]
    fn test_failed_load_keeps_grid() {
        let temp_dir = tempdir().unwrap();
        let mut session = blinker_session(temp_dir.path().to_path_buf());
        let before = session.grid().clone();

        let result = session.apply(Command::Load("missing".into()));
        assert!(matches!(result, Err(LifeError::IoFailure { .. })));

        std::fs::write(temp_dir.path().join("broken.json"), "{ nope").unwrap();
        let result = session.apply(Command::Load("broken".into()));
        assert!(matches!(result, Err(LifeError::ParseError { .. })));

        assert!(session.apply(Command::Save("  ".into())).is_err());
        assert_eq!(session.grid(), &before);
    }

    #[test]
    fn test_resize_keeps_cells() {
        let temp_dir = tempdir().unwrap();
        let mut session = blinker_session(temp_dir.path().to_path_buf());
        let cells = session.grid().cells().to_vec();

        session.apply(Command::Resize { width: 100, height: 75 }).unwrap();
        let dims = session.grid().dimensions();
        assert_eq!((dims.cell_width, dims.cell_height), (20.0, 15.0));
        assert_eq!((dims.rows, dims.cols), (5, 5));
        assert_eq!(session.grid().cells(), cells.as_slice());
    }

    #[test]
    fn test_quit_and_display() {
        let temp_dir = tempdir().unwrap();
        let mut session = blinker_session(temp_dir.path().to_path_buf());
        assert_eq!(session.apply(Command::Quit).unwrap(), CommandOutcome::Quit);
        assert_eq!(session.to_string(), "generation 0 (paused), 5x5 cells, 3 alive");
    }

    #[test]
    fn test_seeded_sessions_match() {
        let mut settings = Settings::default();
        settings.simulation.seed = Some(99);
        let a = Session::new(&settings).unwrap();
        let b = Session::new(&settings).unwrap();
        assert_eq!(a.grid(), b.grid());
    }
}
