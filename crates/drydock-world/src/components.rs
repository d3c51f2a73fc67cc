//! Component definitions for the sandbox ECS.
//!
//! Containers and blocks are both entities. Components are plain data; the
//! behavior lives in [`crate::sandbox::SandboxWorld`].

use serde::{Deserialize, Serialize};

use drydock_logic::geometry::Vec3;
use drydock_logic::ids::{BlockKey, ContainerId};
use drydock_logic::world::{BlockCategory, ContainerKind, Stock};

/// Edge length of one grid cell in meters.
pub const CELL_SIZE: f32 = 2.5;

/// Integrity contributed by each installed component unit.
pub const INTEGRITY_PER_COMPONENT: f32 = 10.0;

/// A structure made of blocks.
#[derive(Debug, Clone)]
pub struct Structure {
    pub id: ContainerId,
    pub kind: ContainerKind,
    /// World position of grid cell (0, 0, 0).
    pub origin: Vec3,
}

impl Structure {
    pub fn cell_position(&self, pos: drydock_logic::ids::BlockPos) -> Vec3 {
        self.origin + Vec3::new(pos.x as f32, pos.y as f32, pos.z as f32) * CELL_SIZE
    }
}

/// What a block is made of and how long it takes to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub category: BlockCategory,
    /// Components in install order. The first one is consumed when a
    /// projected block is first placed.
    pub recipe: Vec<(String, u32)>,
    pub build_seconds: f32,
    /// Item capacity of the block's own inventory, if it has one.
    pub inventory_capacity: Option<u32>,
}

impl BlockSpec {
    pub fn component_total(&self) -> u32 {
        self.recipe.iter().map(|(_, n)| n).sum()
    }

    pub fn max_integrity(&self) -> f32 {
        self.component_total() as f32 * INTEGRITY_PER_COMPONENT
    }
}

/// A block on a structure.
#[derive(Debug, Clone)]
pub struct Block {
    pub key: BlockKey,
    pub spec: BlockSpec,
    pub integrity: f32,
    /// Remaining deformation; the block is deformed while this is positive.
    pub deformation: f32,
    /// Components currently built into the block.
    pub installed: Stock,
    /// Components knocked loose by grinding, waiting to be collected.
    pub salvage: Stock,
}

impl Block {
    pub fn installed_total(&self) -> u32 {
        self.installed.values().sum()
    }

    /// Highest integrity the installed components can carry.
    pub fn supported_integrity(&self) -> f32 {
        let total = self.spec.component_total();
        if total == 0 {
            return 0.0;
        }
        self.spec.max_integrity() * self.installed_total() as f32 / total as f32
    }

    pub fn missing(&self) -> Stock {
        let mut missing = Stock::new();
        for (item, need) in &self.spec.recipe {
            let have = self.installed.get(item).copied().unwrap_or(0);
            if have < *need {
                missing.insert(item.clone(), need - have);
            }
        }
        missing
    }
}

/// Item storage carried by a block.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub items: Stock,
    pub capacity: u32,
}

impl Inventory {
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            items: Stock::new(),
            capacity,
        }
    }

    pub fn used(&self) -> u32 {
        self.items.values().sum()
    }

    pub fn free(&self) -> u32 {
        self.capacity.saturating_sub(self.used())
    }
}

/// On/off switch of a tool block.
#[derive(Debug, Clone, Copy)]
pub struct ToolSwitch {
    pub enabled: bool,
}
