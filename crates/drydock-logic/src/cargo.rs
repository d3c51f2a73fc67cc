//! Reachable-cargo reconciliation.
//!
//! Connectivity tests are expensive, so one assembly is refreshed per pass
//! in round-robin order. The reachable set is updated by diff: only
//! inventories that appeared or disappeared are touched.

use std::collections::BTreeSet;

use crate::assembly::Assembly;
use crate::config::DockConfig;
use crate::ids::{AssemblyId, BlockKey};
use crate::world::DockWorld;

/// What one reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CargoDiff {
    pub added: Vec<BlockKey>,
    pub removed: Vec<BlockKey>,
}

impl CargoDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Inventories on the claimed containers that the first tool can reach.
pub fn reachable_inventories<W: DockWorld>(
    asm: &Assembly,
    world: &W,
    config: &DockConfig,
) -> BTreeSet<BlockKey> {
    let mut reachable = BTreeSet::new();
    let Some(reference) = asm.tools().first().map(|t| t.tool.block) else {
        return reachable;
    };
    let tools: BTreeSet<BlockKey> = asm.tools().iter().map(|t| t.tool.block).collect();

    for &container in asm.claimed() {
        if world.container_kind(container).is_some_and(|k| k.is_projection()) {
            continue;
        }
        for pos in world.blocks(container) {
            let key = BlockKey::new(container, pos);
            if tools.contains(&key) {
                continue;
            }
            let Some(info) = world.block(key) else {
                continue;
            };
            if !info.category.capability().has_inventory
                || config.cargo_denylist.contains(&info.category)
            {
                continue;
            }
            if world.conveyor_connected(reference, key) {
                reachable.insert(key);
            }
        }
    }
    reachable
}

/// Recompute one assembly's reachable set and apply the difference.
pub fn reconcile<W: DockWorld>(asm: &mut Assembly, world: &W, config: &DockConfig) -> CargoDiff {
    let fresh = reachable_inventories(asm, world, config);
    let diff = CargoDiff {
        added: fresh.difference(&asm.reachable_cargo).copied().collect(),
        removed: asm.reachable_cargo.difference(&fresh).copied().collect(),
    };
    for key in &diff.removed {
        asm.reachable_cargo.remove(key);
    }
    for key in &diff.added {
        asm.reachable_cargo.insert(*key);
    }
    if !diff.is_empty() {
        log::debug!(
            "{}: cargo +{} -{} ({} reachable)",
            asm.id(),
            diff.added.len(),
            diff.removed.len(),
            asm.reachable_cargo.len()
        );
    }
    diff
}

/// Round-robin cursor over assembly ids.
#[derive(Debug, Clone, Default)]
pub struct RoundRobin {
    last: Option<AssemblyId>,
}

impl RoundRobin {
    /// The id after the last one served, wrapping around. Ids that
    /// disappeared since are simply skipped.
    pub fn next(&mut self, ids: &[AssemblyId]) -> Option<AssemblyId> {
        let pick = match self.last {
            Some(last) => ids
                .iter()
                .copied()
                .find(|id| *id > last)
                .or_else(|| ids.first().copied()),
            None => ids.first().copied(),
        };
        if pick.is_some() {
            self.last = pick;
        }
        pick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin_wraps() {
        let ids = [AssemblyId(1), AssemblyId(4), AssemblyId(7)];
        let mut rr = RoundRobin::default();
        let served: Vec<_> = (0..4).filter_map(|_| rr.next(&ids)).collect();
        assert_eq!(
            served,
            vec![AssemblyId(1), AssemblyId(4), AssemblyId(7), AssemblyId(1)]
        );
    }

    #[test]
    fn test_round_robin_skips_removed() {
        let mut rr = RoundRobin::default();
        assert_eq!(rr.next(&[AssemblyId(1), AssemblyId(2)]), Some(AssemblyId(1)));
        // 2 was removed, 3 added.
        assert_eq!(rr.next(&[AssemblyId(1), AssemblyId(3)]), Some(AssemblyId(3)));
        assert_eq!(rr.next(&[]), None);
    }
}
