//! The per-assembly tick.
//!
//! Each call runs to completion for one assembly:
//!
//! 1. commit a disable requested on an earlier pass
//! 2. liveness: anchor destroyed or a tool switched off → request disable
//! 3. idle: rescan the volume for candidate containers
//! 4. active: re-test the claimed containers, release the ones that left
//! 5. run the mode's step (grind or weld)
//! 6. recompute power, commit any disable requested during this pass
//!
//! Steps 1–4 and the assignment part of step 5 are bookkeeping against a
//! shared view of the world. The mutation part of step 5 is one batched
//! pass over the occupied slots.

mod grind;
mod status;
mod weld;

pub use status::render_status;

use std::collections::BTreeSet;

use crate::assembly::{Assembly, WorkMode};
use crate::config::{DockConfig, EfficiencyPolicy};
use crate::error::DockError;
use crate::events::EventSink;
use crate::geometry::Vec3;
use crate::ids::{BlockKey, TargetId};
use crate::power;
use crate::target::{proximity_order, DistanceRef, Target, Vantage};
use crate::world::{BuildCheck, ContainerKind, DockWorld, Stock};

/// Run one tick for one assembly.
pub fn tick<W: DockWorld>(
    asm: &mut Assembly,
    world: &mut W,
    config: &DockConfig,
    events: &mut impl EventSink,
) {
    // 1. Commit a disable left over from an earlier pass.
    asm.commit_disable(events);

    // 2. Liveness.
    check_liveness(asm, world);
    refresh_tool_positions(asm, world);

    if !asm.is_disable_pending() {
        match asm.work_mode() {
            // 3. Idle: look for containers to work on.
            None => scan_candidates(asm, world),
            Some(mode) => {
                // 4. Keep the claimed set honest.
                maintain_claimed(asm, world, events);

                // 5. Work.
                if !asm.is_disable_pending() {
                    let outcome = match mode {
                        WorkMode::Grind => grind::step(asm, world, config, events).map(|()| true),
                        WorkMode::Weld => weld::step(asm, world, config, events),
                    };
                    match outcome {
                        Ok(true) => {}
                        Ok(false) => {
                            log::info!("{}: nothing left to weld", asm.id());
                            asm.request_disable(true);
                        }
                        Err(e) => {
                            log::warn!("{}: stopping: {}", asm.id(), e);
                            asm.request_disable(true);
                        }
                    }
                }
            }
        }
    }

    // 6. Power, then the single commit point for this pass.
    power::recompute(asm, &config.power, events);
    if asm.commit_disable(events) {
        power::recompute(asm, &config.power, events);
    }

    asm.status = render_status(asm);
}

fn check_liveness<W: DockWorld>(asm: &mut Assembly, world: &W) {
    if !world.container_alive(asm.anchor()) {
        if !asm.is_invalid() {
            log::warn!("{}: anchor {} destroyed", asm.id(), asm.anchor());
            asm.mark_invalid();
        }
        asm.request_disable(true);
        return;
    }
    if asm.work_mode().is_some() {
        let off = asm
            .tools()
            .iter()
            .find(|t| !world.tool_enabled(t.tool.block))
            .map(|t| t.tool.id);
        if let Some(tool) = off {
            log::info!("{}: {} switched off", asm.id(), tool);
            asm.request_disable(true);
        }
    }
}

fn refresh_tool_positions<W: DockWorld>(asm: &mut Assembly, world: &W) {
    for t in &mut asm.tools {
        if let Some(info) = world.block(t.tool.block) {
            t.position = info.position;
        }
    }
}

/// Idle membership scan: containers fully inside the volume become
/// candidates, candidates that left are dropped.
fn scan_candidates<W: DockWorld>(asm: &mut Assembly, world: &W) {
    let volume = *asm.volume();
    let reach_sq = volume.bounding_radius_squared();
    let mut inside = BTreeSet::new();

    for id in world.containers_near(&volume) {
        if id == asm.anchor() || asm.claimed.contains(&id) || !world.container_alive(id) {
            continue;
        }
        let Some(bounds) = world.container_bounds(id) else {
            continue;
        };
        // Cheap reject before the exact test.
        if bounds.center.distance_squared(&volume.center) > reach_sq {
            continue;
        }
        if volume.contains_box(&bounds) {
            inside.insert(id);
        }
    }

    if inside != asm.candidates {
        log::debug!(
            "{}: candidates {:?} -> {:?}",
            asm.id(),
            asm.candidates,
            inside
        );
    }
    asm.candidates = inside;
    asm.mark_scanned();
}

/// Release claimed containers that left the volume or died. Requests a
/// disable when nothing with physics is left to work on.
fn maintain_claimed<W: DockWorld>(asm: &mut Assembly, world: &W, events: &mut impl EventSink) {
    let volume = *asm.volume();
    let claimed: Vec<_> = asm.claimed.iter().copied().collect();
    for id in claimed {
        let inside = world.container_alive(id)
            && world
                .container_bounds(id)
                .is_some_and(|b| volume.contains_box(&b));
        if !inside {
            asm.unclaim(id, events);
        }
    }

    let any_physical = asm
        .claimed
        .iter()
        .any(|id| world.container_kind(*id).is_some_and(|k| k.has_physics()));
    if !any_physical {
        log::info!("{}: no claimed container left", asm.id());
        asm.request_disable(true);
    }
}

fn tool_positions(asm: &Assembly) -> Vec<Vec3> {
    asm.tools.iter().map(|t| t.position).collect()
}

/// Fill the target pool from the claimed containers.
///
/// Grind takes every block of every physical container. Weld takes every
/// projected block plus every physical block that is damaged or deformed.
fn populate<W: DockWorld>(asm: &mut Assembly, world: &W, mode: WorkMode) {
    let positions = tool_positions(asm);
    let vantage = Vantage {
        center: asm.volume().center,
        tools: &positions,
    };
    let claimed: Vec<_> = asm.claimed.iter().copied().collect();

    for container in claimed {
        let Some(kind) = world.container_kind(container) else {
            continue;
        };
        let staging = match kind {
            ContainerKind::Projection { .. } if mode == WorkMode::Grind => continue,
            ContainerKind::Projection { projector, .. } => world.block(projector).map(|b| b.position),
            ContainerKind::Physical { .. } => None,
        };
        let projected = kind.is_projection();

        for pos in world.blocks(container) {
            let key = BlockKey::new(container, pos);
            let Some(info) = world.block(key) else {
                continue;
            };
            if info.category.capability().is_tool {
                continue;
            }
            if mode == WorkMode::Weld && !projected && info.is_fully_repaired() {
                continue;
            }
            let reference = DistanceRef {
                point: staging.unwrap_or(info.position),
            };
            let id = asm.next_target_id();
            asm.pool.insert(
                id,
                Target::new(id, key, &info, projected, reference, vantage, mode),
            );
        }
    }

    log::debug!("{}: {:?} pool holds {} target(s)", asm.id(), mode, asm.pool.len());
}

fn rebuild_proximity(asm: &mut Assembly, tool_index: usize) {
    let order = proximity_order(&asm.pool, tool_index);
    asm.tools[tool_index].proximity = order.into();
}

/// Walk a tool's proximity list and return the first target that may take
/// a beam. Stale and already-busy entries are dropped from the list.
/// Projected targets that cannot be built right now stay in the list.
fn next_eligible<W: DockWorld>(asm: &mut Assembly, world: &W, tool_index: usize) -> Option<TargetId> {
    let mut i = 0;
    while i < asm.tools[tool_index].proximity.len() {
        let id = asm.tools[tool_index].proximity[i];
        let Some((block, projected)) = asm.pool.get(&id).map(|t| (t.block, t.projected)) else {
            asm.tools[tool_index].proximity.remove(i);
            continue;
        };
        if !world.container_alive(block.container) || asm.is_occupied(id) {
            asm.tools[tool_index].proximity.remove(i);
            continue;
        }
        if projected {
            let buildable = match world.build_check(block) {
                BuildCheck::AlreadyBuilt(_) => true,
                BuildCheck::Buildable => first_component_on_hand(asm, world, tool_index, block),
                _ => false,
            };
            if !buildable {
                i += 1;
                continue;
            }
        }
        asm.tools[tool_index].proximity.remove(i);
        return Some(id);
    }
    None
}

/// Whether the first component of a projected block sits in the tool or in
/// reachable cargo. A shortfall goes on the missing tally.
fn first_component_on_hand<W: DockWorld>(
    asm: &mut Assembly,
    world: &W,
    tool_index: usize,
    block: BlockKey,
) -> bool {
    let Some(component) = world.first_component(block) else {
        return true;
    };
    let tool = asm.tools[tool_index].tool.block;
    let on_hand = world.item_amount(tool, &component) > 0
        || asm
            .reachable_cargo
            .iter()
            .any(|inv| world.item_amount(*inv, &component) > 0);
    if !on_hand {
        asm.missing.entry(component).or_insert(1);
    }
    on_hand
}

/// Fill every empty slot of every tool, nearest eligible target first.
fn assign<W: DockWorld>(asm: &mut Assembly, world: &W, mode: WorkMode, events: &mut impl EventSink) {
    for tool_index in 0..asm.tools.len() {
        for slot in 0..asm.tools[tool_index].slots.len() {
            if asm.tools[tool_index].slots[slot].is_some() {
                continue;
            }
            let Some(id) = next_eligible(asm, world, tool_index) else {
                break;
            };
            log::trace!("{}: {} slot {} <- {}", asm.id(), asm.tools[tool_index].tool.id, slot, id);
            asm.bind_slot(tool_index, slot, id, mode, events);
        }
    }
}

/// One entry of the mutation batch.
#[derive(Debug, Clone, Copy)]
struct SlotWork {
    tool_index: usize,
    slot: usize,
    target: TargetId,
}

fn collect_batch(asm: &Assembly) -> Vec<SlotWork> {
    let mut batch = Vec::new();
    for (tool_index, t) in asm.tools.iter().enumerate() {
        for (slot, entry) in t.slots.iter().enumerate() {
            if let Some(target) = entry {
                batch.push(SlotWork {
                    tool_index,
                    slot,
                    target: *target,
                });
            }
        }
    }
    batch
}

/// The tool must still exist, be switched on, and carry an inventory.
fn ensure_tool<W: DockWorld>(asm: &Assembly, world: &W, tool_index: usize) -> Result<BlockKey, DockError> {
    let tool = asm.tools[tool_index].tool;
    if world.tool_enabled(tool.block) && world.has_inventory(tool.block) {
        Ok(tool.block)
    } else {
        Err(DockError::ToolUnavailable(tool.id))
    }
}

/// Move salvaged stock into the tool, spilling into reachable cargo.
/// Whatever still does not fit is lost.
fn deliver<W: DockWorld>(
    world: &mut W,
    tool_inventory: BlockKey,
    cargo: &[BlockKey],
    stock: &Stock,
    efficiency: &EfficiencyPolicy,
    distance_sq: f32,
) {
    for (item, count) in stock {
        if item.is_empty() {
            continue;
        }
        let scaled = efficiency.scale(*count, distance_sq);
        if scaled == 0 {
            continue;
        }
        let mut rest = scaled - world.add_items(tool_inventory, item, scaled);
        for &inv in cargo {
            if rest == 0 {
                break;
            }
            rest -= world.add_items(inv, item, rest);
        }
        if rest > 0 {
            log::warn!("{}: no room for {} x{}, dropped", tool_inventory, item, rest);
        }
    }
}
