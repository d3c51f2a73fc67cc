//! Generation - procedural stations and hulks for the sandbox.

use rand::Rng;
use serde::{Deserialize, Serialize};

use drydock_logic::geometry::{OrientedBox, Vec3};
use drydock_logic::ids::{BlockKey, BlockPos, ContainerId};
use drydock_logic::world::DockWorld;

use crate::catalog;
use crate::components::CELL_SIZE;
use crate::sandbox::SandboxWorld;

/// Configuration for a dock station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Length of the tool rail in cells.
    pub rail_cells: i32,
    /// Number of tools, spread evenly along the rail.
    pub tools: usize,
    /// Half extents of the bay volume in meters.
    pub bay_half_extents: Vec3,
    /// Gap between the rail and the bottom of the bay in meters.
    pub bay_clearance: f32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            rail_cells: 9,
            tools: 2,
            bay_half_extents: Vec3::new(25.0, 15.0, 15.0),
            bay_clearance: 2.5,
        }
    }
}

/// What a station generator produced.
#[derive(Debug, Clone)]
pub struct StationLayout {
    pub anchor: ContainerId,
    pub tools: Vec<BlockKey>,
    pub cargo: BlockKey,
    pub connector: BlockKey,
    pub projector: BlockKey,
    pub bay: OrientedBox,
}

/// Build a station: a conveyor rail carrying the tools, a cargo container,
/// a connector and a projector, with the bay volume above the rail.
pub fn build_station(world: &mut SandboxWorld, origin: Vec3, config: &StationConfig) -> Option<StationLayout> {
    let anchor = world.spawn_structure(origin, true);
    let last = config.rail_cells.max(2) - 1;
    let tool_count = config.tools.max(2);

    let tool_cells: Vec<i32> = (0..tool_count)
        .map(|i| (i as i32 * last) / (tool_count as i32 - 1))
        .collect();

    let mut tools = Vec::with_capacity(tool_count);
    for x in 0..=last {
        let pos = BlockPos::new(x, 0, 0);
        if tool_cells.contains(&x) {
            tools.push(world.place_tool(anchor, pos)?);
        } else {
            world.place_block(anchor, pos, catalog::conveyor())?;
        }
    }

    let mid = last / 2;
    let cargo = world.place_block(anchor, BlockPos::new(mid, -1, 0), catalog::cargo_container())?;
    let connector = world.place_block(anchor, BlockPos::new(mid, 0, -1), catalog::connector())?;
    let projector = world.place_block(anchor, BlockPos::new(mid, -1, 1), catalog::projector())?;

    let rail_center = origin + Vec3::new(mid as f32 * CELL_SIZE, 0.0, 0.0);
    let lift = CELL_SIZE * 0.5 + config.bay_clearance + config.bay_half_extents.y;
    let bay = OrientedBox::axis_aligned(rail_center + Vec3::new(0.0, lift, 0.0), config.bay_half_extents);

    Some(StationLayout {
        anchor,
        tools,
        cargo,
        connector,
        projector,
        bay,
    })
}

/// Configuration for a derelict hull.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HulkConfig {
    pub min_cells: i32,
    pub max_cells: i32,
    /// Chance that an armor block is damaged.
    pub damage_chance: f64,
    /// Chance that a damaged block is also deformed.
    pub deform_chance: f64,
    /// Loot stowed in the hull's cargo container.
    pub loot: Vec<(String, u32)>,
}

impl Default for HulkConfig {
    fn default() -> Self {
        Self {
            min_cells: 2,
            max_cells: 4,
            damage_chance: 0.3,
            deform_chance: 0.2,
            loot: vec![("SteelPlate".into(), 40), ("Construction".into(), 20)],
        }
    }
}

#[derive(Debug, Clone)]
pub struct HulkLayout {
    pub container: ContainerId,
    pub cargo: BlockKey,
    pub connector: BlockKey,
    pub damaged: Vec<BlockKey>,
}

/// Generate a rectangular hulk with its lowest cell corner at `origin`.
/// The hull is a slab of armor with a cargo container and a connector on
/// its underside, some of it battered.
pub fn generate_hulk(
    world: &mut SandboxWorld,
    origin: Vec3,
    config: &HulkConfig,
    rng: &mut impl Rng,
) -> Option<HulkLayout> {
    let lo = config.min_cells.max(2);
    let hi = config.max_cells.max(lo);
    let (sx, sy, sz) = (
        rng.gen_range(lo..=hi),
        rng.gen_range(lo..=hi),
        rng.gen_range(lo..=hi),
    );
    let container = world.spawn_structure(origin, true);

    let cargo_pos = BlockPos::new(0, 0, 0);
    let connector_pos = BlockPos::new(1, 0, 0);
    let mut damaged = Vec::new();

    for x in 0..sx {
        for y in 0..sy {
            for z in 0..sz {
                let pos = BlockPos::new(x, y, z);
                if pos == cargo_pos || pos == connector_pos {
                    continue;
                }
                let spec = if rng.gen_bool(0.25) {
                    catalog::heavy_armor()
                } else {
                    catalog::light_armor()
                };
                let key = world.place_block(container, pos, spec)?;
                if rng.gen_bool(config.damage_chance) {
                    let max = world.block(key).map(|b| b.max_integrity).unwrap_or(0.0);
                    world.damage(key, max * rng.gen_range(0.2..0.8));
                    if rng.gen_bool(config.deform_chance) {
                        world.deform(key, rng.gen_range(0.5..3.0));
                    }
                    damaged.push(key);
                }
            }
        }
    }

    let cargo = world.place_block(container, cargo_pos, catalog::cargo_container())?;
    let connector = world.place_block(container, connector_pos, catalog::connector())?;
    for (item, count) in &config.loot {
        world.add_items(cargo, item, *count);
    }

    log::debug!(
        "generated hulk {} ({}x{}x{}, {} damaged)",
        container,
        sx,
        sy,
        sz,
        damaged.len()
    );
    Some(HulkLayout {
        container,
        cargo,
        connector,
        damaged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_station_tools_and_bay() {
        let mut world = SandboxWorld::new();
        let layout = build_station(&mut world, Vec3::ZERO, &StationConfig::default()).unwrap();
        assert_eq!(layout.tools.len(), 2);
        // Tools share a conveyor network with the station cargo.
        assert!(world.conveyor_connected(layout.tools[0], layout.cargo));
        assert!(world.conveyor_connected(layout.tools[1], layout.connector));
        // The rail stays out of its own bay.
        let rail = world.container_bounds(layout.anchor).unwrap();
        assert!(!layout.bay.contains_box(&rail));
    }

    #[test]
    fn test_hulk_is_deterministic_per_seed() {
        let build = |seed| {
            let mut world = SandboxWorld::new();
            let mut rng = StdRng::seed_from_u64(seed);
            let hulk = generate_hulk(&mut world, Vec3::ZERO, &HulkConfig::default(), &mut rng).unwrap();
            (world.block_count(hulk.container), hulk.damaged.len())
        };
        assert_eq!(build(7), build(7));
    }

    #[test]
    fn test_hulk_loot_stowed() {
        let mut world = SandboxWorld::new();
        let mut rng = StdRng::seed_from_u64(1);
        let hulk = generate_hulk(&mut world, Vec3::ZERO, &HulkConfig::default(), &mut rng).unwrap();
        assert_eq!(world.item_amount(hulk.cargo, "SteelPlate"), 40);
        assert!(world.conveyor_connected(hulk.cargo, hulk.connector));
    }
}
