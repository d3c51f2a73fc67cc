//! Block definitions used by the sandbox and the generators.

use drydock_logic::world::BlockCategory;

use crate::components::BlockSpec;

fn spec(category: BlockCategory, recipe: &[(&str, u32)], build_seconds: f32, inventory: Option<u32>) -> BlockSpec {
    BlockSpec {
        category,
        recipe: recipe.iter().map(|(n, c)| (n.to_string(), *c)).collect(),
        build_seconds,
        inventory_capacity: inventory,
    }
}

pub fn light_armor() -> BlockSpec {
    spec(BlockCategory::Armor, &[("SteelPlate", 5)], 4.0, None)
}

pub fn heavy_armor() -> BlockSpec {
    spec(
        BlockCategory::Armor,
        &[("SteelPlate", 10), ("MetalGrid", 3)],
        10.0,
        None,
    )
}

pub fn conveyor() -> BlockSpec {
    spec(
        BlockCategory::Conveyor,
        &[("InteriorPlate", 3), ("Construction", 2), ("SmallTube", 2), ("Motor", 1)],
        8.0,
        None,
    )
}

pub fn cargo_container() -> BlockSpec {
    spec(
        BlockCategory::Cargo,
        &[("InteriorPlate", 4), ("Construction", 4), ("MetalGrid", 2), ("Computer", 1)],
        12.0,
        Some(2000),
    )
}

pub fn connector() -> BlockSpec {
    spec(
        BlockCategory::Connector,
        &[("SteelPlate", 4), ("Construction", 4), ("SmallTube", 2), ("Motor", 2), ("Computer", 2)],
        12.0,
        Some(400),
    )
}

pub fn reactor() -> BlockSpec {
    spec(
        BlockCategory::Reactor,
        &[("SteelPlate", 8), ("Construction", 4), ("MetalGrid", 2), ("Computer", 3)],
        20.0,
        Some(100),
    )
}

pub fn gas_tank() -> BlockSpec {
    spec(
        BlockCategory::GasTank,
        &[("SteelPlate", 8), ("SmallTube", 6), ("Computer", 2)],
        16.0,
        Some(100),
    )
}

pub fn projector() -> BlockSpec {
    spec(
        BlockCategory::Projector,
        &[("SteelPlate", 6), ("Construction", 4), ("Computer", 4), ("Motor", 1)],
        14.0,
        None,
    )
}

/// A dry-dock tool: welder/grinder head with its own inventory.
pub fn dock_tool() -> BlockSpec {
    spec(
        BlockCategory::Tool,
        &[("SteelPlate", 8), ("Construction", 6), ("Motor", 4), ("Computer", 4)],
        18.0,
        Some(800),
    )
}
