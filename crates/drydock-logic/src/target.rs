//! One block queued for welding or grinding.

use std::collections::BTreeMap;

use crate::assembly::WorkMode;
use crate::geometry::Vec3;
use crate::ids::{BlockKey, TargetId};
use crate::world::{BlockInfo, Capability};

/// A block bound to its container, with distances cached at discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: TargetId,
    pub block: BlockKey,
    pub capability: Capability,
    /// Still a blueprint block on a projection.
    pub projected: bool,
    /// Squared distance from the assembly center to the reference point.
    pub center_distance_sq: f32,
    /// Squared distance from each tool (by tool index) to the reference point.
    tool_distance_sq: Vec<f32>,
    /// Seconds a single beam would need to finish this block.
    pub estimate_seconds: f32,
}

/// Where distances are measured from: the assembly center and each tool.
#[derive(Debug, Clone, Copy)]
pub struct Vantage<'a> {
    pub center: Vec3,
    pub tools: &'a [Vec3],
}

/// Where distances are measured to.
///
/// Physical blocks use their own position. Projected blocks are not in the
/// world yet, so the projector itself stands in as the staging anchor.
#[derive(Debug, Clone, Copy)]
pub struct DistanceRef {
    pub point: Vec3,
}

impl Target {
    pub fn new(
        id: TargetId,
        block: BlockKey,
        info: &BlockInfo,
        projected: bool,
        reference: DistanceRef,
        vantage: Vantage<'_>,
        mode: WorkMode,
    ) -> Self {
        let mut target = Self {
            id,
            block,
            capability: info.category.capability(),
            projected,
            center_distance_sq: 0.0,
            tool_distance_sq: Vec::new(),
            estimate_seconds: 0.0,
        };
        target.recompute(info, reference, vantage, mode);
        target
    }

    /// Point the target at its live block after materialization or a split.
    pub fn rebind(
        &mut self,
        block: BlockKey,
        info: &BlockInfo,
        vantage: Vantage<'_>,
        mode: WorkMode,
    ) {
        self.block = block;
        self.projected = false;
        self.capability = info.category.capability();
        let reference = DistanceRef { point: info.position };
        self.recompute(info, reference, vantage, mode);
    }

    fn recompute(
        &mut self,
        info: &BlockInfo,
        reference: DistanceRef,
        vantage: Vantage<'_>,
        mode: WorkMode,
    ) {
        self.center_distance_sq = reference.point.distance_squared(&vantage.center);
        self.tool_distance_sq = vantage
            .tools
            .iter()
            .map(|p| reference.point.distance_squared(p))
            .collect();
        self.estimate_seconds = estimate_seconds(info, mode);
    }

    pub fn tool_distance_sq(&self, tool_index: usize) -> f32 {
        self.tool_distance_sq
            .get(tool_index)
            .copied()
            .unwrap_or(f32::MAX)
    }
}

/// Remaining work for one beam, scaled by how far the block already is.
pub fn estimate_seconds(info: &BlockInfo, mode: WorkMode) -> f32 {
    let ratio = info.integrity_ratio();
    match mode {
        WorkMode::Weld => info.build_seconds * (1.0 - ratio),
        WorkMode::Grind => info.build_seconds * ratio,
    }
}

/// Order target ids by squared distance to one tool, nearest first.
/// Ties fall back to id so the order is deterministic.
pub fn proximity_order(pool: &BTreeMap<TargetId, Target>, tool_index: usize) -> Vec<TargetId> {
    let mut ids: Vec<TargetId> = pool.keys().copied().collect();
    ids.sort_by(|a, b| {
        let da = pool[a].tool_distance_sq(tool_index);
        let db = pool[b].tool_distance_sq(tool_index);
        da.total_cmp(&db).then(a.cmp(b))
    });
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{BlockPos, ContainerId};
    use crate::world::BlockCategory;

    fn info_at(position: Vec3, integrity: f32) -> BlockInfo {
        BlockInfo {
            position,
            integrity,
            max_integrity: 100.0,
            deformed: false,
            category: BlockCategory::Armor,
            build_seconds: 10.0,
        }
    }

    fn target(id: u64, position: Vec3, tools: &[Vec3]) -> Target {
        Target::new(
            TargetId(id),
            BlockKey::new(ContainerId(1), BlockPos::new(id as i32, 0, 0)),
            &info_at(position, 50.0),
            false,
            DistanceRef { point: position },
            Vantage {
                center: Vec3::ZERO,
                tools,
            },
            WorkMode::Grind,
        )
    }

    #[test]
    fn test_distances_cached() {
        let tools = [Vec3::new(10.0, 0.0, 0.0), Vec3::new(-10.0, 0.0, 0.0)];
        let t = target(1, Vec3::new(3.0, 4.0, 0.0), &tools);
        assert_eq!(t.center_distance_sq, 25.0);
        assert_eq!(t.tool_distance_sq(0), 49.0 + 16.0);
        assert_eq!(t.tool_distance_sq(1), 169.0 + 16.0);
        assert_eq!(t.tool_distance_sq(5), f32::MAX);
    }

    #[test]
    fn test_estimate_by_mode() {
        let info = info_at(Vec3::ZERO, 25.0);
        assert_eq!(estimate_seconds(&info, WorkMode::Weld), 7.5);
        assert_eq!(estimate_seconds(&info, WorkMode::Grind), 2.5);
    }

    #[test]
    fn test_proximity_order_per_tool() {
        let tools = [Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0)];
        let mut pool = BTreeMap::new();
        for (id, x) in [(1, 30.0), (2, 10.0), (3, 90.0)] {
            pool.insert(TargetId(id), target(id, Vec3::new(x, 0.0, 0.0), &tools));
        }
        assert_eq!(
            proximity_order(&pool, 0),
            vec![TargetId(2), TargetId(1), TargetId(3)]
        );
        assert_eq!(
            proximity_order(&pool, 1),
            vec![TargetId(3), TargetId(1), TargetId(2)]
        );
    }

    #[test]
    fn test_rebind_clears_projection() {
        let tools = [Vec3::ZERO];
        let mut t = Target::new(
            TargetId(9),
            BlockKey::new(ContainerId(5), BlockPos::new(0, 0, 0)),
            &info_at(Vec3::new(1.0, 0.0, 0.0), 0.0),
            true,
            DistanceRef {
                point: Vec3::new(20.0, 0.0, 0.0),
            },
            Vantage {
                center: Vec3::ZERO,
                tools: &tools,
            },
            WorkMode::Weld,
        );
        assert_eq!(t.tool_distance_sq(0), 400.0);

        let live = BlockKey::new(ContainerId(6), BlockPos::new(0, 0, 0));
        let vantage = Vantage {
            center: Vec3::ZERO,
            tools: &tools,
        };
        t.rebind(live, &info_at(Vec3::new(1.0, 0.0, 0.0), 1.0), vantage, WorkMode::Weld);
        assert!(!t.projected);
        assert_eq!(t.block, live);
        assert_eq!(t.tool_distance_sq(0), 1.0);
    }
}
