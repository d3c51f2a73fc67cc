//! Collaborator contracts.
//!
//! The host engine owns containers, blocks, inventories and projections.
//! The orchestrator only ever reaches them through [`DockWorld`]: read-only
//! queries during bookkeeping, `&mut self` primitives during the batched
//! mutation pass. Inventories are named by the block that carries them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::geometry::{OrientedBox, Vec3};
use crate::ids::{BlockKey, ContainerId};

/// Item name → count.
pub type Stock = BTreeMap<String, u32>;

/// Add every entry of `other` into `into`.
pub fn merge_stock(into: &mut Stock, other: &Stock) {
    for (item, count) in other {
        *into.entry(item.clone()).or_insert(0) += count;
    }
}

/// Broad classification of a block, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BlockCategory {
    Armor,
    Structural,
    Cargo,
    Connector,
    Conveyor,
    Reactor,
    GasTank,
    GasGenerator,
    Thruster,
    Projector,
    Tool,
    Functional,
}

/// What a block can do, resolved once from its category so hot loops
/// never re-classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capability {
    pub has_inventory: bool,
    pub is_tool: bool,
    pub is_projector: bool,
}

impl BlockCategory {
    pub fn capability(self) -> Capability {
        use BlockCategory::*;
        Capability {
            has_inventory: matches!(
                self,
                Cargo | Connector | Reactor | GasTank | GasGenerator | Tool
            ),
            is_tool: self == Tool,
            is_projector: self == Projector,
        }
    }
}

/// Snapshot of one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// World-space position. For projected blocks, where the block will appear.
    pub position: Vec3,
    pub integrity: f32,
    pub max_integrity: f32,
    pub deformed: bool,
    pub category: BlockCategory,
    /// Time a single welder needs to build the block from scratch.
    pub build_seconds: f32,
}

impl BlockInfo {
    pub fn integrity_ratio(&self) -> f32 {
        if self.max_integrity <= 0.0 {
            0.0
        } else {
            (self.integrity / self.max_integrity).clamp(0.0, 1.0)
        }
    }

    pub fn is_fully_repaired(&self) -> bool {
        self.integrity >= self.max_integrity && !self.deformed
    }
}

/// What kind of structure a container is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
    Physical {
        /// Load-bearing physics present (not a ghost or a static placeholder).
        has_physics: bool,
    },
    /// A blueprint cast by `projector`; built blocks materialize on `target`.
    Projection {
        projector: BlockKey,
        target: ContainerId,
    },
}

impl ContainerKind {
    pub fn is_projection(&self) -> bool {
        matches!(self, ContainerKind::Projection { .. })
    }

    pub fn has_physics(&self) -> bool {
        matches!(self, ContainerKind::Physical { has_physics: true })
    }
}

/// Result of asking a projector whether a projected block can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildCheck {
    Buildable,
    /// Somebody already built it; the live block is here.
    AlreadyBuilt(BlockKey),
    /// No adjacent built block to attach to.
    NotConnected,
    /// Something occupies the space.
    Obstructed,
    /// The projection target is gone.
    NoTarget,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrindOutcome {
    pub integrity: f32,
    pub dismantled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeldOutcome {
    pub integrity: f32,
    pub max_integrity: f32,
    pub deformed: bool,
}

/// Switching tool blocks on and off.
pub trait ToolControl {
    /// False when the tool is missing or switched off externally.
    fn tool_enabled(&self, tool: BlockKey) -> bool;
    fn set_tool_enabled(&mut self, tool: BlockKey, enabled: bool);
}

/// Everything the orchestrator needs from the host engine.
pub trait DockWorld: ToolControl {
    // ── Containers ─────────────────────────────────────────────────────

    /// False once the container is destroyed or merged away.
    fn container_alive(&self, id: ContainerId) -> bool;
    fn container_bounds(&self, id: ContainerId) -> Option<OrientedBox>;
    fn container_kind(&self, id: ContainerId) -> Option<ContainerKind>;
    /// Broad-phase query: containers whose bounds touch `volume`.
    fn containers_near(&self, volume: &OrientedBox) -> Vec<ContainerId>;
    /// Positions of the blocks in a container. For projections, the
    /// blocks not yet built.
    fn blocks(&self, id: ContainerId) -> Vec<crate::ids::BlockPos>;

    // ── Blocks ─────────────────────────────────────────────────────────

    fn block(&self, key: BlockKey) -> Option<BlockInfo>;
    /// Components still needed to reach full integrity.
    fn missing_components(&self, key: BlockKey) -> Stock;

    // ── Projections ────────────────────────────────────────────────────

    fn build_check(&self, key: BlockKey) -> BuildCheck;
    /// The component the build primitive consumes first.
    fn first_component(&self, key: BlockKey) -> Option<String>;
    /// Materialize a projected block, consuming its first component from
    /// `builder`. Returns the new physical block.
    fn build(&mut self, key: BlockKey, builder: BlockKey) -> Option<BlockKey>;

    // ── Structural mutation ────────────────────────────────────────────

    fn grind(&mut self, key: BlockKey, amount: f32) -> Option<GrindOutcome>;
    /// Move the block's in-progress salvage stockpile out.
    fn take_salvage(&mut self, key: BlockKey) -> Stock;
    /// Empty the block's own inventory (cargo held by a container block).
    fn take_fixed_inventory(&mut self, key: BlockKey) -> Stock;
    fn remove_block(&mut self, key: BlockKey) -> bool;
    /// Move whatever `from` holds of the missing components into the
    /// block's construction stockpile. Returns units moved.
    fn install_components(&mut self, key: BlockKey, from: BlockKey) -> u32;
    fn weld(&mut self, key: BlockKey, amount: f32, deform_repair: f32) -> Option<WeldOutcome>;

    // ── Inventories ────────────────────────────────────────────────────

    fn has_inventory(&self, inventory: BlockKey) -> bool;
    fn item_amount(&self, inventory: BlockKey, item: &str) -> u32;
    /// Returns how many were accepted.
    fn add_items(&mut self, inventory: BlockKey, item: &str, amount: u32) -> u32;
    /// Returns how many were removed.
    fn remove_items(&mut self, inventory: BlockKey, item: &str, amount: u32) -> u32;

    /// Pull up to `amount` of `item` from `sources` (in order) into `dest`.
    fn pull_items(&mut self, dest: BlockKey, sources: &[BlockKey], item: &str, amount: u32) -> u32 {
        let mut pulled = 0;
        for &source in sources {
            if pulled >= amount {
                break;
            }
            if source == dest {
                continue;
            }
            let available = self.item_amount(source, item).min(amount - pulled);
            if available == 0 {
                continue;
            }
            let taken = self.remove_items(source, item, available);
            let accepted = self.add_items(dest, item, taken);
            if accepted < taken {
                // Put back what the destination refused.
                self.add_items(source, item, taken - accepted);
            }
            pulled += accepted;
            if accepted < taken {
                break;
            }
        }
        pulled
    }

    // ── Logistics ──────────────────────────────────────────────────────

    /// True when items can travel between the two inventories.
    fn conveyor_connected(&self, from: BlockKey, to: BlockKey) -> bool;
}
