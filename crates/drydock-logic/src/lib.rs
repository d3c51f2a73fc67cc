//! Pure dry-dock orchestration logic.
//!
//! This crate contains the scheduling core of an automated dry dock: for
//! each assembly (an oriented bounding volume anchored by a fixed set of
//! tool blocks) it tracks which containers sit inside the volume, picks the
//! blocks to weld or grind, hands them to a bounded number of beams per
//! tool, and applies the structural mutation with inventory-backed
//! component logistics. Everything the engine owns (geometry of the
//! containers, block state, inventories, projections) is reached through
//! the [`world::DockWorld`] trait, so this crate stays free of any ECS or
//! runtime.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`ids`] | Newtype ids for assemblies, containers, tools, targets, blocks |
//! | [`geometry`] | `Vec3` and the oriented bounding volume |
//! | [`config`] | Tunables (rates, power constants, intervals) and validation |
//! | [`error`] | `DockError` / `ConfigError` |
//! | [`events`] | Slot, state, power and settings broadcasts |
//! | [`world`] | Collaborator contracts implemented by the host engine |
//! | [`throttle`] | Throttled recurring tasks with execution affinity |
//! | [`target`] | One block queued for modification |
//! | [`assembly`] | The assembly aggregate and its lifecycle |
//! | [`orchestrator`] | The per-assembly tick: membership, grind, weld |
//! | [`power`] | Live and worst-case power draw |
//! | [`cargo`] | Round-robin reachable-cargo reconciliation |
//! | [`tool`] | Power-sink facing tool adapter contract |
//! | [`scheduler`] | Registry of assemblies and the session scheduler |

pub mod assembly;
pub mod cargo;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod ids;
pub mod orchestrator;
pub mod power;
pub mod scheduler;
pub mod target;
pub mod throttle;
pub mod tool;
pub mod world;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::assembly::{Assembly, AssemblySettings, DisableHandle, DockMode, Platform, WorkMode};
    pub use crate::config::DockConfig;
    pub use crate::error::{ConfigError, DockError};
    pub use crate::events::{DockEvent, EventSink};
    pub use crate::geometry::{OrientedBox, Vec3};
    pub use crate::ids::{AssemblyId, BlockKey, BlockPos, ContainerId, TargetId, ToolId};
    pub use crate::scheduler::{DockCommand, DockRegistry, Scheduler};
    pub use crate::throttle::{Affinity, ExecContext};
    pub use crate::world::{DockWorld, Stock, ToolControl};
}
