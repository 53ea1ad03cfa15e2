//! Configuration settings for the Game of Life simulator

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub display: DisplayConfig,
    pub simulation: SimulationConfig,
    pub persistence: PersistenceConfig,
}

/// Surface and cell geometry, in pixels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Fixed simulation step, in seconds
    pub step_seconds: f64,
    pub boundary_condition: BoundaryCondition,
    pub initial_fill: CellFill,
    /// Seed for the random initial fill; `None` draws from the OS
    #[serde(default)]
    pub seed: Option<u64>,
    /// Cap on catch-up steps per frame, 0 for no cap
    #[serde(default)]
    pub max_steps_per_frame: u32,
}

/// How neighbor lookups past the grid edge are resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCondition {
    /// Out-of-range neighbors are dead
    Dead,
    /// Edges are joined: lookups wrap to the opposite side
    #[default]
    Wrap,
}

/// Initial contents of a freshly created grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellFill {
    Zero,
    #[default]
    Random,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub format: SaveFormat,
    pub save_directory: PathBuf,
}

/// On-disk representation of a grid snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveFormat {
    /// Tagged JSON record with all six dimension fields
    #[default]
    Json,
    /// `<width> <height>` header followed by rows of `0`/`1` tokens
    Text,
}

impl SaveFormat {
    /// File extension written for this format
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Json => "json",
            SaveFormat::Text => "txt",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(SaveFormat::Json),
            "txt" => Some(SaveFormat::Text),
            _ => None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display: DisplayConfig {
                width: 800,
                height: 600,
                cell_width: 10,
                cell_height: 10,
            },
            simulation: SimulationConfig {
                step_seconds: 0.06,
                boundary_condition: BoundaryCondition::Wrap,
                initial_fill: CellFill::Random,
                seed: None,
                max_steps_per_frame: 0,
            },
            persistence: PersistenceConfig {
                format: SaveFormat::Json,
                save_directory: PathBuf::from("saves"),
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        let display = &self.display;
        if display.cell_width == 0 || display.cell_height == 0 {
            anyhow::bail!("Cell dimensions must be positive");
        }
        if display.width % display.cell_width != 0 || display.height % display.cell_height != 0 {
            anyhow::bail!(
                "Cell size {}x{} does not evenly divide surface {}x{}",
                display.cell_width,
                display.cell_height,
                display.width,
                display.height
            );
        }

        let step = self.simulation.step_seconds;
        match Duration::try_from_secs_f64(step) {
            Ok(duration) if !duration.is_zero() => {}
            _ => anyhow::bail!("Step duration must be a positive number of seconds, got {}", step),
        }

        Ok(())
    }

    /// Fixed simulation step as a `Duration`; zero when the configured
    /// value is not representable, which stops the clock from stepping
    pub fn step_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.simulation.step_seconds).unwrap_or(Duration::ZERO)
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(width) = cli_overrides.width {
            self.display.width = width;
        }
        if let Some(height) = cli_overrides.height {
            self.display.height = height;
        }
        if let Some(cell_size) = cli_overrides.cell_size {
            self.display.cell_width = cell_size;
            self.display.cell_height = cell_size;
        }
        if let Some(step_seconds) = cli_overrides.step_seconds {
            self.simulation.step_seconds = step_seconds;
        }
        if let Some(boundary) = cli_overrides.boundary_condition {
            self.simulation.boundary_condition = boundary;
        }
        if let Some(seed) = cli_overrides.seed {
            self.simulation.seed = Some(seed);
        }
        if let Some(ref save_directory) = cli_overrides.save_directory {
            self.persistence.save_directory = save_directory.clone();
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub cell_size: Option<u32>,
    pub step_seconds: Option<f64>,
    pub boundary_condition: Option<BoundaryCondition>,
    pub seed: Option<u64>,
    pub save_directory: Option<PathBuf>,
}
