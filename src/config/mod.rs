//! Configuration management for the Game of Life simulator

pub mod settings;

pub use settings::{
    BoundaryCondition, CellFill, CliOverrides, DisplayConfig, PersistenceConfig, SaveFormat,
    Settings, SimulationConfig,
};
