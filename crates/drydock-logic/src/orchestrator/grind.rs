//! Grind mode: dismantle every block of the claimed physical containers,
//! nearest first per tool, and carry the salvage home.

use super::{assign, collect_batch, deliver, ensure_tool, populate, rebuild_proximity};
use crate::assembly::{Assembly, WorkMode};
use crate::config::DockConfig;
use crate::error::DockError;
use crate::events::EventSink;
use crate::ids::BlockKey;
use crate::world::DockWorld;

pub(super) fn step<W: DockWorld>(
    asm: &mut Assembly,
    world: &mut W,
    config: &DockConfig,
    events: &mut impl EventSink,
) -> Result<(), DockError> {
    if asm.pool.is_empty() {
        populate(asm, world, WorkMode::Grind);
    }
    // A tool that ran out of candidates starts over from what is left.
    for tool_index in 0..asm.tools.len() {
        if asm.tools[tool_index].proximity.is_empty() {
            rebuild_proximity(asm, tool_index);
        }
    }

    assign(asm, world, WorkMode::Grind, events);

    let amount = config.grind_rate * asm.settings().multiplier(WorkMode::Grind);
    let cargo: Vec<BlockKey> = asm.reachable_cargo.iter().copied().collect();

    for work in collect_batch(asm) {
        let tool_block = ensure_tool(asm, world, work.tool_index)?;
        let Some(target) = asm.pool.get(&work.target).cloned() else {
            asm.clear_slot(work.tool_index, work.slot, events);
            continue;
        };

        let Some(outcome) = world.grind(target.block, amount) else {
            // Already gone.
            asm.retire_target(target.id, events);
            continue;
        };

        // Never spill into the block being cut.
        let spill: Vec<BlockKey> = cargo.iter().copied().filter(|k| *k != target.block).collect();
        let distance_sq = target.tool_distance_sq(work.tool_index);
        let salvage = world.take_salvage(target.block);
        deliver(world, tool_block, &spill, &salvage, &config.efficiency, distance_sq);

        if outcome.dismantled {
            if target.capability.has_inventory {
                let held = world.take_fixed_inventory(target.block);
                deliver(world, tool_block, &spill, &held, &config.efficiency, distance_sq);
            }
            world.remove_block(target.block);
            log::trace!("{}: dismantled {}", asm.id(), target.block);
            asm.retire_target(target.id, events);
        }
    }
    Ok(())
}
