//! Weld mode: build projected blocks and repair damaged ones, pulling the
//! components from reachable cargo.

use super::{
    assign, collect_batch, ensure_tool, populate, rebuild_proximity, tool_positions, SlotWork,
};
use crate::assembly::{Assembly, SlotStatus, WorkMode};
use crate::config::DockConfig;
use crate::error::DockError;
use crate::events::{DockEvent, EventSink, NoticePriority};
use crate::ids::BlockKey;
use crate::target::{Target, Vantage};
use crate::world::{merge_stock, BuildCheck, DockWorld};

/// Returns `false` once there is nothing left to weld.
pub(super) fn step<W: DockWorld>(
    asm: &mut Assembly,
    world: &mut W,
    config: &DockConfig,
    events: &mut impl EventSink,
) -> Result<bool, DockError> {
    if asm.pool.is_empty() {
        populate(asm, world, WorkMode::Weld);
        if asm.pool.is_empty() {
            return Ok(false);
        }
        for tool_index in 0..asm.tools.len() {
            rebuild_proximity(asm, tool_index);
        }
    } else if asm.occupied_slots() == 0 && asm.tools.iter().all(|t| t.proximity.is_empty()) {
        // Targets left over that no list points at any more.
        for tool_index in 0..asm.tools.len() {
            rebuild_proximity(asm, tool_index);
        }
    }

    asm.missing.clear();
    assign(asm, world, WorkMode::Weld, events);

    let amount = config.weld_rate * asm.settings().multiplier(WorkMode::Weld);
    let deform_repair = amount * config.deform_repair_fraction;
    let cargo: Vec<BlockKey> = asm.reachable_cargo.iter().copied().collect();

    for work in collect_batch(asm) {
        let tool_block = ensure_tool(asm, world, work.tool_index)?;
        let Some(target) = asm.pool.get(&work.target).cloned() else {
            asm.clear_slot(work.tool_index, work.slot, events);
            continue;
        };

        if target.projected {
            materialize(asm, world, work, &target, tool_block, &cargo, events);
            continue;
        }

        let Some(info) = world.block(target.block) else {
            asm.retire_target(target.id, events);
            continue;
        };
        if info.is_fully_repaired() {
            asm.retire_target(target.id, events);
            continue;
        }

        let distance_sq = target.tool_distance_sq(work.tool_index);
        for (item, needed) in world.missing_components(target.block) {
            if item.is_empty() {
                continue;
            }
            let have = world.item_amount(tool_block, &item);
            if have >= needed {
                continue;
            }
            let pulled = world.pull_items(tool_block, &cargo, &item, needed - have);
            let kept = config.efficiency.scale(pulled, distance_sq);
            if pulled > kept {
                world.remove_items(tool_block, &item, pulled - kept);
            }
        }
        world.install_components(target.block, tool_block);

        let Some(outcome) = world.weld(target.block, amount, deform_repair) else {
            asm.retire_target(target.id, events);
            continue;
        };
        if outcome.integrity >= outcome.max_integrity && !outcome.deformed {
            log::trace!("{}: finished {}", asm.id(), target.block);
            asm.retire_target(target.id, events);
            continue;
        }

        let missing = world.missing_components(target.block);
        let stalled = !missing.is_empty() && !outcome.deformed;
        if stalled {
            merge_stock(&mut asm.missing, &missing);
        }
        asm.tools[work.tool_index].slot_status[work.slot] = Some(SlotStatus {
            target: target.id,
            block: target.block,
            stalled,
            missing,
        });
    }

    notify_missing(asm, events);
    Ok(true)
}

/// Turn a projected target into a physical block. On failure the slot is
/// freed and the target goes back to the end of the tool's list.
fn materialize<W: DockWorld>(
    asm: &mut Assembly,
    world: &mut W,
    work: SlotWork,
    target: &Target,
    tool_block: BlockKey,
    cargo: &[BlockKey],
    events: &mut impl EventSink,
) {
    let live = match world.build_check(target.block) {
        BuildCheck::AlreadyBuilt(live) => Some(live),
        BuildCheck::Buildable => {
            if let Some(component) = world.first_component(target.block) {
                if world.item_amount(tool_block, &component) == 0 {
                    world.pull_items(tool_block, cargo, &component, 1);
                }
            }
            world.build(target.block, tool_block)
        }
        _ => None,
    };

    let rebound = live.and_then(|live| world.block(live).map(|info| (live, info)));
    let Some((live, info)) = rebound else {
        log::debug!("{}: could not build {}", asm.id(), target.block);
        asm.clear_slot(work.tool_index, work.slot, events);
        asm.tools[work.tool_index].proximity.push_back(target.id);
        return;
    };

    let positions = tool_positions(asm);
    let vantage = Vantage {
        center: asm.volume().center,
        tools: &positions,
    };
    if let Some(t) = asm.pool.get_mut(&target.id) {
        t.rebind(live, &info, vantage, WorkMode::Weld);
    }
    // The beam now points at the live block.
    asm.bind_slot(work.tool_index, work.slot, target.id, WorkMode::Weld, events);
}

/// One low-priority notice per component type newly found missing.
fn notify_missing(asm: &mut Assembly, events: &mut impl EventSink) {
    let fresh: Vec<String> = asm
        .missing
        .keys()
        .filter(|item| !asm.notified_missing.contains(*item))
        .cloned()
        .collect();
    for item in fresh {
        events.emit(DockEvent::Notice {
            assembly: asm.id(),
            priority: NoticePriority::Low,
            message: format!("Missing component: {}", item),
        });
        asm.notified_missing.insert(item);
    }
}
