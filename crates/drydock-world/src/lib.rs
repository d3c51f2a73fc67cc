//! Dry-dock sandbox world.
//!
//! An in-memory host engine for the dry-dock scheduler, built on `hecs`:
//! - **Entities**: structures (ships, stations, projections) and blocks
//! - **Components**: plain data ([`components::Block`], [`components::Inventory`], ...)
//! - **SandboxWorld**: implements [`drydock_logic::world::DockWorld`] over them
//! - **DockEngine**: owns the world and the scheduler and advances time
//!
//! # Example
//!
//! ```rust,no_run
//! use drydock_logic::prelude::*;
//! use drydock_world::prelude::*;
//! use drydock_world::generation::{build_station, StationConfig};
//!
//! let mut engine = DockEngine::new(DockConfig::default());
//! let station = build_station(&mut engine.world, Vec3::ZERO, &StationConfig::default()).unwrap();
//! let dock = engine
//!     .add_dock(station.anchor, station.bay, &station.tools, Platform::Station, AssemblySettings::default())
//!     .unwrap();
//!
//! engine.update(0.5); // first scan
//! engine.command(dock, DockCommand::Grind).unwrap();
//! loop {
//!     engine.update(1.0 / 60.0);
//! }
//! ```

pub mod catalog;
pub mod components;
pub mod conveyor;
pub mod engine;
pub mod generation;
pub mod sandbox;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::{Block, BlockSpec, Inventory, CELL_SIZE};
    pub use crate::engine::DockEngine;
    pub use crate::sandbox::SandboxWorld;
}
