//! `SandboxWorld`: an in-memory host engine over `hecs`.
//!
//! Structures and blocks are entities. Block integrity follows a simple
//! component model: every installed component unit carries
//! [`INTEGRITY_PER_COMPONENT`] integrity. Welding can raise integrity only
//! up to what the installed components support; grinding lowers it and
//! sheds the components it can no longer carry into the block's salvage
//! stockpile.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use hecs::{Entity, World};

use drydock_logic::geometry::{OrientedBox, Vec3};
use drydock_logic::ids::{BlockKey, BlockPos, ContainerId};
use drydock_logic::world::{
    BlockInfo, BuildCheck, ContainerKind, DockWorld, GrindOutcome, Stock, ToolControl, WeldOutcome,
};

use crate::components::{Block, BlockSpec, Inventory, Structure, ToolSwitch, CELL_SIZE, INTEGRITY_PER_COMPONENT};
use crate::conveyor::{carries_conveyor, ConveyorGraph};

/// Occupied grid cells of a structure.
#[derive(Debug, Clone, Default)]
pub struct Cells(pub BTreeSet<BlockPos>);

/// Drop the components `block` can no longer carry at its current
/// integrity, last recipe entry first.
fn shed_components(block: &mut Block) -> Stock {
    let keep = (block.integrity / INTEGRITY_PER_COMPONENT).ceil().max(0.0) as u32;
    let mut shed = Stock::new();
    let mut total = block.installed_total();
    while total > keep {
        let Some((item, _)) = block
            .spec
            .recipe
            .iter()
            .rev()
            .find(|(item, _)| block.installed.get(item).copied().unwrap_or(0) > 0)
        else {
            break;
        };
        let item = item.clone();
        if let Some(n) = block.installed.get_mut(&item) {
            *n -= 1;
            if *n == 0 {
                block.installed.remove(&item);
            }
        }
        *shed.entry(item).or_insert(0) += 1;
        total -= 1;
    }
    shed
}

#[derive(Default)]
pub struct SandboxWorld {
    world: World,
    structures: BTreeMap<ContainerId, Entity>,
    blocks: HashMap<BlockKey, Entity>,
    next_container: u64,
    /// Docked connector pairs.
    docked: Vec<(BlockKey, BlockKey)>,
    obstructed: HashSet<BlockKey>,
    conveyor: ConveyorGraph,
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Building the scene ─────────────────────────────────────────────

    fn spawn(&mut self, kind: ContainerKind, origin: Vec3) -> ContainerId {
        self.next_container += 1;
        let id = ContainerId(self.next_container);
        let entity = self.world.spawn((Structure { id, kind, origin }, Cells::default()));
        self.structures.insert(id, entity);
        id
    }

    /// A new, empty physical structure.
    pub fn spawn_structure(&mut self, origin: Vec3, has_physics: bool) -> ContainerId {
        self.spawn(ContainerKind::Physical { has_physics }, origin)
    }

    /// A projection of a blueprint onto `target`, cast by `projector`.
    /// Projected cells share the target's grid.
    pub fn spawn_projection(&mut self, projector: BlockKey, target: ContainerId) -> Option<ContainerId> {
        let origin = self.structure(target)?.origin;
        self.blocks.get(&projector)?;
        Some(self.spawn(ContainerKind::Projection { projector, target }, origin))
    }

    fn insert_block(&mut self, block: Block) -> Option<BlockKey> {
        let key = block.key;
        let structure = *self.structures.get(&key.container)?;
        if self.blocks.contains_key(&key) {
            return None;
        }
        let inventory = block.spec.inventory_capacity.map(Inventory::with_capacity);
        let entity = self.world.spawn((block,));
        if let Some(inventory) = inventory {
            let _ = self.world.insert_one(entity, inventory);
        }
        if let Ok(mut cells) = self.world.get::<&mut Cells>(structure) {
            cells.0.insert(key.pos);
        }
        self.blocks.insert(key, entity);
        Some(key)
    }

    /// Place a fully built block.
    pub fn place_block(&mut self, container: ContainerId, pos: BlockPos, spec: BlockSpec) -> Option<BlockKey> {
        let installed: Stock = spec.recipe.iter().cloned().collect();
        let key = self.insert_block(Block {
            key: BlockKey::new(container, pos),
            integrity: spec.max_integrity(),
            spec,
            deformation: 0.0,
            installed,
            salvage: Stock::new(),
        })?;
        self.rebuild_conveyors();
        Some(key)
    }

    /// Place a tool block. Tools start switched off.
    pub fn place_tool(&mut self, container: ContainerId, pos: BlockPos) -> Option<BlockKey> {
        let key = self.place_block(container, pos, crate::catalog::dock_tool())?;
        let entity = self.blocks[&key];
        let _ = self.world.insert_one(entity, ToolSwitch { enabled: false });
        Some(key)
    }

    /// Add an unbuilt blueprint block to a projection.
    pub fn project_block(&mut self, projection: ContainerId, pos: BlockPos, spec: BlockSpec) -> Option<BlockKey> {
        if !self.structure(projection)?.kind.is_projection() {
            return None;
        }
        self.insert_block(Block {
            key: BlockKey::new(projection, pos),
            spec,
            integrity: 0.0,
            deformation: 0.0,
            installed: Stock::new(),
            salvage: Stock::new(),
        })
    }

    /// Dock two connectors so their conveyor networks join.
    pub fn dock(&mut self, a: BlockKey, b: BlockKey) -> bool {
        let is_connector = |key: BlockKey| {
            self.with_block(key, |b| b.spec.category == drydock_logic::world::BlockCategory::Connector)
                .unwrap_or(false)
        };
        if !is_connector(a) || !is_connector(b) {
            return false;
        }
        self.docked.push((a, b));
        self.rebuild_conveyors();
        true
    }

    pub fn undock(&mut self, a: BlockKey) {
        self.docked.retain(|(x, y)| *x != a && *y != a);
        self.rebuild_conveyors();
    }

    /// Mark the space of a projected block as blocked.
    pub fn obstruct(&mut self, key: BlockKey) {
        self.obstructed.insert(key);
    }

    pub fn clear_obstruction(&mut self, key: BlockKey) {
        self.obstructed.remove(&key);
    }

    /// Knock integrity off a block. Shed components are lost.
    pub fn damage(&mut self, key: BlockKey, amount: f32) -> bool {
        self.with_block_mut(key, |block| {
            block.integrity = (block.integrity - amount).max(0.0);
            shed_components(block);
        })
        .is_some()
    }

    pub fn deform(&mut self, key: BlockKey, amount: f32) -> bool {
        self.with_block_mut(key, |block| block.deformation += amount.max(0.0))
            .is_some()
    }

    /// Move a structure, and every projection onto it.
    pub fn translate(&mut self, container: ContainerId, offset: Vec3) {
        let mut moving = vec![container];
        for (_, s) in self.world.query::<&Structure>().iter() {
            if let ContainerKind::Projection { target, .. } = s.kind {
                if target == container {
                    moving.push(s.id);
                }
            }
        }
        for id in moving {
            if let Some(&entity) = self.structures.get(&id) {
                if let Ok(mut s) = self.world.get::<&mut Structure>(entity) {
                    s.origin = s.origin + offset;
                }
            }
        }
    }

    /// Remove a structure and everything on it.
    pub fn destroy(&mut self, container: ContainerId) -> bool {
        let Some(entity) = self.structures.remove(&container) else {
            return false;
        };
        let cells = self
            .world
            .get::<&Cells>(entity)
            .map(|c| c.0.clone())
            .unwrap_or_default();
        for pos in cells {
            if let Some(e) = self.blocks.remove(&BlockKey::new(container, pos)) {
                let _ = self.world.despawn(e);
            }
        }
        let _ = self.world.despawn(entity);
        self.docked
            .retain(|(a, b)| a.container != container && b.container != container);
        self.rebuild_conveyors();
        log::debug!("{} destroyed", container);
        true
    }

    /// Break `cells` off `container` into a new structure. Blocks keep
    /// their grid positions. Returns the new structure.
    pub fn split_off(&mut self, container: ContainerId, cells: &[BlockPos]) -> Option<ContainerId> {
        let source = self.structure(container)?;
        let has_physics = source.kind.has_physics();
        let new = self.spawn(ContainerKind::Physical { has_physics }, source.origin);
        let source_entity = self.structures[&container];
        let target_entity = self.structures[&new];

        for &pos in cells {
            let old_key = BlockKey::new(container, pos);
            let Some(entity) = self.blocks.remove(&old_key) else {
                continue;
            };
            let new_key = BlockKey::new(new, pos);
            if let Ok(mut block) = self.world.get::<&mut Block>(entity) {
                block.key = new_key;
            }
            if let Ok(mut c) = self.world.get::<&mut Cells>(source_entity) {
                c.0.remove(&pos);
            }
            if let Ok(mut c) = self.world.get::<&mut Cells>(target_entity) {
                c.0.insert(pos);
            }
            self.blocks.insert(new_key, entity);
            for pair in &mut self.docked {
                if pair.0 == old_key {
                    pair.0 = new_key;
                }
                if pair.1 == old_key {
                    pair.1 = new_key;
                }
            }
        }

        if self.block_count(container) == 0 {
            self.destroy(container);
        }
        self.rebuild_conveyors();
        log::debug!("{} split into {}", container, new);
        Some(new)
    }

    // ── Queries ────────────────────────────────────────────────────────

    fn structure(&self, id: ContainerId) -> Option<Structure> {
        let entity = *self.structures.get(&id)?;
        self.world.get::<&Structure>(entity).ok().map(|s| (*s).clone())
    }

    fn with_block<R>(&self, key: BlockKey, f: impl FnOnce(&Block) -> R) -> Option<R> {
        let entity = *self.blocks.get(&key)?;
        self.world.get::<&Block>(entity).ok().map(|b| f(&b))
    }

    fn with_block_mut<R>(&mut self, key: BlockKey, f: impl FnOnce(&mut Block) -> R) -> Option<R> {
        let entity = *self.blocks.get(&key)?;
        self.world.get::<&mut Block>(entity).ok().map(|mut b| f(&mut b))
    }

    fn with_inventory_mut<R>(&mut self, key: BlockKey, f: impl FnOnce(&mut Inventory) -> R) -> Option<R> {
        let entity = *self.blocks.get(&key)?;
        self.world.get::<&mut Inventory>(entity).ok().map(|mut i| f(&mut i))
    }

    fn is_physical(&self, container: ContainerId) -> bool {
        self.structure(container)
            .is_some_and(|s| !s.kind.is_projection())
    }

    pub fn block_count(&self, container: ContainerId) -> usize {
        self.structures
            .get(&container)
            .and_then(|e| self.world.get::<&Cells>(*e).ok().map(|c| c.0.len()))
            .unwrap_or(0)
    }

    /// Everything in a block's inventory.
    pub fn inventory(&self, key: BlockKey) -> Stock {
        self.blocks
            .get(&key)
            .and_then(|e| self.world.get::<&Inventory>(*e).ok().map(|i| i.items.clone()))
            .unwrap_or_default()
    }

    /// Items held across all inventories of a structure.
    pub fn container_stock(&self, container: ContainerId) -> Stock {
        let mut total = Stock::new();
        for (_, (block, inv)) in self.world.query::<(&Block, &Inventory)>().iter() {
            if block.key.container == container {
                drydock_logic::world::merge_stock(&mut total, &inv.items);
            }
        }
        total
    }

    /// Rebuild the conveyor adjacency from the current blocks and docks.
    fn rebuild_conveyors(&mut self) {
        let ported: HashSet<BlockKey> = self
            .world
            .query::<&Block>()
            .iter()
            .filter(|(_, b)| carries_conveyor(b.spec.category) && self.is_physical(b.key.container))
            .map(|(_, b)| b.key)
            .collect();

        let mut links = Vec::new();
        for key in &ported {
            for n in key.pos.neighbors() {
                let other = BlockKey::new(key.container, n);
                // Each face once.
                if ported.contains(&other) && (key.pos < n) {
                    links.push((*key, other));
                }
            }
        }
        for &(a, b) in &self.docked {
            if ported.contains(&a) && ported.contains(&b) {
                links.push((a, b));
            }
        }
        self.conveyor = ConveyorGraph::from_links(&links);
    }
}

impl ToolControl for SandboxWorld {
    fn tool_enabled(&self, tool: BlockKey) -> bool {
        self.blocks
            .get(&tool)
            .and_then(|e| self.world.get::<&ToolSwitch>(*e).ok().map(|s| s.enabled))
            .unwrap_or(false)
    }

    fn set_tool_enabled(&mut self, tool: BlockKey, enabled: bool) {
        if let Some(&entity) = self.blocks.get(&tool) {
            if let Ok(mut switch) = self.world.get::<&mut ToolSwitch>(entity) {
                switch.enabled = enabled;
            }
        }
    }
}

impl DockWorld for SandboxWorld {
    fn container_alive(&self, id: ContainerId) -> bool {
        self.structures.contains_key(&id)
    }

    fn container_bounds(&self, id: ContainerId) -> Option<OrientedBox> {
        let entity = *self.structures.get(&id)?;
        let structure = self.world.get::<&Structure>(entity).ok()?;
        let cells = self.world.get::<&Cells>(entity).ok()?;
        let mut points = cells.0.iter().map(|p| structure.cell_position(*p));
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(lo, hi), p| {
            (
                Vec3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Vec3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        });
        let half = Vec3::new(CELL_SIZE, CELL_SIZE, CELL_SIZE) * 0.5;
        Some(OrientedBox::from_corners(min - half, max + half))
    }

    fn container_kind(&self, id: ContainerId) -> Option<ContainerKind> {
        self.structure(id).map(|s| s.kind)
    }

    fn containers_near(&self, volume: &OrientedBox) -> Vec<ContainerId> {
        let reach = volume.bounding_radius_squared().sqrt();
        self.structures
            .keys()
            .copied()
            .filter(|id| {
                self.container_bounds(*id).is_some_and(|b| {
                    let r = reach + b.bounding_radius_squared().sqrt();
                    b.center.distance_squared(&volume.center) <= r * r
                })
            })
            .collect()
    }

    fn blocks(&self, id: ContainerId) -> Vec<BlockPos> {
        self.structures
            .get(&id)
            .and_then(|e| self.world.get::<&Cells>(*e).ok().map(|c| c.0.iter().copied().collect()))
            .unwrap_or_default()
    }

    fn block(&self, key: BlockKey) -> Option<BlockInfo> {
        let structure = self.structure(key.container)?;
        self.with_block(key, |b| BlockInfo {
            position: structure.cell_position(key.pos),
            integrity: b.integrity,
            max_integrity: b.spec.max_integrity(),
            deformed: b.deformation > 0.0,
            category: b.spec.category,
            build_seconds: b.spec.build_seconds,
        })
    }

    fn missing_components(&self, key: BlockKey) -> Stock {
        self.with_block(key, |b| b.missing()).unwrap_or_default()
    }

    fn build_check(&self, key: BlockKey) -> BuildCheck {
        let Some(ContainerKind::Projection { target, .. }) = self.container_kind(key.container) else {
            return BuildCheck::NoTarget;
        };
        if !self.blocks.contains_key(&key) || !self.container_alive(target) {
            return BuildCheck::NoTarget;
        }
        let live = BlockKey::new(target, key.pos);
        if self.blocks.contains_key(&live) {
            return BuildCheck::AlreadyBuilt(live);
        }
        if self.obstructed.contains(&key) {
            return BuildCheck::Obstructed;
        }
        let attached = key
            .pos
            .neighbors()
            .iter()
            .any(|n| self.blocks.contains_key(&BlockKey::new(target, *n)));
        if attached {
            BuildCheck::Buildable
        } else {
            BuildCheck::NotConnected
        }
    }

    fn first_component(&self, key: BlockKey) -> Option<String> {
        self.with_block(key, |b| b.spec.recipe.first().map(|(item, _)| item.clone()))
            .flatten()
    }

    fn build(&mut self, key: BlockKey, builder: BlockKey) -> Option<BlockKey> {
        if self.build_check(key) != BuildCheck::Buildable {
            return None;
        }
        let Some(ContainerKind::Projection { target, .. }) = self.container_kind(key.container) else {
            return None;
        };
        let spec = self.with_block(key, |b| b.spec.clone())?;
        let (item, _) = spec.recipe.first()?.clone();
        if self.remove_items(builder, &item, 1) == 0 {
            return None;
        }

        let live = self.insert_block(Block {
            key: BlockKey::new(target, key.pos),
            spec,
            integrity: 0.0,
            deformation: 0.0,
            installed: Stock::from([(item, 1)]),
            salvage: Stock::new(),
        })?;
        self.remove_block(key);
        self.rebuild_conveyors();
        Some(live)
    }

    fn grind(&mut self, key: BlockKey, amount: f32) -> Option<GrindOutcome> {
        if !self.is_physical(key.container) {
            return None;
        }
        self.with_block_mut(key, |block| {
            block.integrity = (block.integrity - amount.max(0.0)).max(0.0);
            let shed = shed_components(block);
            drydock_logic::world::merge_stock(&mut block.salvage, &shed);
            GrindOutcome {
                integrity: block.integrity,
                dismantled: block.integrity <= 0.0,
            }
        })
    }

    fn take_salvage(&mut self, key: BlockKey) -> Stock {
        self.with_block_mut(key, |b| std::mem::take(&mut b.salvage))
            .unwrap_or_default()
    }

    fn take_fixed_inventory(&mut self, key: BlockKey) -> Stock {
        self.with_inventory_mut(key, |inv| std::mem::take(&mut inv.items))
            .unwrap_or_default()
    }

    fn remove_block(&mut self, key: BlockKey) -> bool {
        let Some(entity) = self.blocks.remove(&key) else {
            return false;
        };
        let _ = self.world.despawn(entity);
        if let Some(&structure) = self.structures.get(&key.container) {
            if let Ok(mut cells) = self.world.get::<&mut Cells>(structure) {
                cells.0.remove(&key.pos);
            }
        }
        self.docked.retain(|(a, b)| *a != key && *b != key);
        if self.is_physical(key.container) && self.block_count(key.container) == 0 {
            self.destroy(key.container);
        } else {
            self.rebuild_conveyors();
        }
        true
    }

    fn install_components(&mut self, key: BlockKey, from: BlockKey) -> u32 {
        let missing = self.missing_components(key);
        let mut moved = Stock::new();
        for (item, need) in missing {
            let taken = self.remove_items(from, &item, need);
            if taken > 0 {
                moved.insert(item, taken);
            }
        }
        let total = moved.values().sum();
        self.with_block_mut(key, |b| drydock_logic::world::merge_stock(&mut b.installed, &moved));
        total
    }

    fn weld(&mut self, key: BlockKey, amount: f32, deform_repair: f32) -> Option<WeldOutcome> {
        if !self.is_physical(key.container) {
            return None;
        }
        self.with_block_mut(key, |block| {
            let supported = block.supported_integrity();
            if block.integrity < supported {
                block.integrity = (block.integrity + amount.max(0.0)).min(supported);
            }
            if block.deformation > 0.0 {
                block.deformation = (block.deformation - deform_repair.max(0.0)).max(0.0);
            }
            WeldOutcome {
                integrity: block.integrity,
                max_integrity: block.spec.max_integrity(),
                deformed: block.deformation > 0.0,
            }
        })
    }

    fn has_inventory(&self, inventory: BlockKey) -> bool {
        self.blocks
            .get(&inventory)
            .is_some_and(|e| self.world.get::<&Inventory>(*e).is_ok())
    }

    fn item_amount(&self, inventory: BlockKey, item: &str) -> u32 {
        self.blocks
            .get(&inventory)
            .and_then(|e| {
                self.world
                    .get::<&Inventory>(*e)
                    .ok()
                    .map(|i| i.items.get(item).copied().unwrap_or(0))
            })
            .unwrap_or(0)
    }

    fn add_items(&mut self, inventory: BlockKey, item: &str, amount: u32) -> u32 {
        self.with_inventory_mut(inventory, |inv| {
            let accepted = amount.min(inv.free());
            if accepted > 0 {
                *inv.items.entry(item.to_string()).or_insert(0) += accepted;
            }
            accepted
        })
        .unwrap_or(0)
    }

    fn remove_items(&mut self, inventory: BlockKey, item: &str, amount: u32) -> u32 {
        self.with_inventory_mut(inventory, |inv| {
            let Some(have) = inv.items.get_mut(item) else {
                return 0;
            };
            let taken = amount.min(*have);
            *have -= taken;
            if *have == 0 {
                inv.items.remove(item);
            }
            taken
        })
        .unwrap_or(0)
    }

    fn conveyor_connected(&self, from: BlockKey, to: BlockKey) -> bool {
        self.conveyor.connected(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    fn hull() -> (SandboxWorld, ContainerId) {
        let mut world = SandboxWorld::new();
        let ship = world.spawn_structure(Vec3::ZERO, true);
        for x in 0..3 {
            world.place_block(ship, BlockPos::new(x, 0, 0), catalog::light_armor());
        }
        (world, ship)
    }

    #[test]
    fn test_bounds_cover_cells() {
        let (world, ship) = hull();
        let bounds = world.container_bounds(ship).unwrap();
        assert!((bounds.center.x - 2.5).abs() < 1e-5);
        assert!((bounds.half_extents.x - 3.75).abs() < 1e-5);
        assert!((bounds.half_extents.y - 1.25).abs() < 1e-5);
    }

    #[test]
    fn test_grind_sheds_components() {
        let (mut world, ship) = hull();
        let key = BlockKey::new(ship, BlockPos::new(0, 0, 0));
        // Light armor: 5 plates, 50 integrity.
        let outcome = world.grind(key, 15.0).unwrap();
        assert_eq!(outcome.integrity, 35.0);
        assert!(!outcome.dismantled);
        assert_eq!(world.take_salvage(key)["SteelPlate"], 1);

        let outcome = world.grind(key, 100.0).unwrap();
        assert!(outcome.dismantled);
        assert_eq!(world.take_salvage(key)["SteelPlate"], 4);
    }

    #[test]
    fn test_weld_capped_by_installed_components() {
        let (mut world, ship) = hull();
        let key = BlockKey::new(ship, BlockPos::new(1, 0, 0));
        world.damage(key, 25.0);
        assert_eq!(world.missing_components(key)["SteelPlate"], 2);

        let outcome = world.weld(key, 100.0, 0.0).unwrap();
        assert_eq!(outcome.integrity, 30.0);

        let cargo = world.place_block(ship, BlockPos::new(0, 1, 0), catalog::cargo_container()).unwrap();
        world.add_items(cargo, "SteelPlate", 10);
        assert_eq!(world.install_components(key, cargo), 2);
        assert_eq!(world.item_amount(cargo, "SteelPlate"), 8);
        let outcome = world.weld(key, 100.0, 0.0).unwrap();
        assert_eq!(outcome.integrity, outcome.max_integrity);
    }

    #[test]
    fn test_removing_last_block_destroys_structure() {
        let (mut world, ship) = hull();
        for x in 0..3 {
            assert!(world.remove_block(BlockKey::new(ship, BlockPos::new(x, 0, 0))));
        }
        assert!(!world.container_alive(ship));
    }

    #[test]
    fn test_inventory_capacity() {
        let (mut world, ship) = hull();
        let port = world.place_block(ship, BlockPos::new(0, 0, 1), catalog::connector()).unwrap();
        assert_eq!(world.add_items(port, "Motor", 500), 400);
        assert_eq!(world.add_items(port, "Motor", 1), 0);
        assert_eq!(world.remove_items(port, "Motor", 50), 50);
    }

    #[test]
    fn test_conveyor_through_dock() {
        let mut world = SandboxWorld::new();
        let station = world.spawn_structure(Vec3::ZERO, true);
        let ship = world.spawn_structure(Vec3::new(0.0, 20.0, 0.0), true);
        let tool = world.place_tool(station, BlockPos::new(0, 0, 0)).unwrap();
        world.place_block(station, BlockPos::new(1, 0, 0), catalog::conveyor());
        let port_a = world.place_block(station, BlockPos::new(2, 0, 0), catalog::connector()).unwrap();
        let port_b = world.place_block(ship, BlockPos::new(0, 0, 0), catalog::connector()).unwrap();
        let cargo = world.place_block(ship, BlockPos::new(0, 1, 0), catalog::cargo_container()).unwrap();

        assert!(!world.conveyor_connected(tool, cargo));
        assert!(world.dock(port_a, port_b));
        assert!(world.conveyor_connected(tool, cargo));
        world.undock(port_a);
        assert!(!world.conveyor_connected(tool, cargo));
    }

    #[test]
    fn test_projection_build() {
        let (mut world, ship) = hull();
        let station = world.spawn_structure(Vec3::new(0.0, -20.0, 0.0), true);
        let projector = world.place_block(station, BlockPos::new(0, 0, 0), catalog::projector()).unwrap();
        let tool = world.place_tool(station, BlockPos::new(1, 0, 0)).unwrap();
        let projection = world.spawn_projection(projector, ship).unwrap();

        let attached = world.project_block(projection, BlockPos::new(3, 0, 0), catalog::light_armor()).unwrap();
        let floating = world.project_block(projection, BlockPos::new(9, 9, 9), catalog::light_armor()).unwrap();
        assert_eq!(world.build_check(attached), BuildCheck::Buildable);
        assert_eq!(world.build_check(floating), BuildCheck::NotConnected);

        // No plate in the builder yet.
        assert_eq!(world.build(attached, tool), None);
        world.add_items(tool, "SteelPlate", 1);
        let live = world.build(attached, tool).unwrap();
        assert_eq!(live, BlockKey::new(ship, BlockPos::new(3, 0, 0)));
        assert_eq!(world.block(live).unwrap().integrity, 0.0);
        assert!(world.block(attached).is_none());
        assert_eq!(world.missing_components(live)["SteelPlate"], 4);
    }

    #[test]
    fn test_split_moves_blocks() {
        let (mut world, ship) = hull();
        let new = world
            .split_off(ship, &[BlockPos::new(2, 0, 0)])
            .unwrap();
        assert_eq!(world.block_count(ship), 2);
        assert_eq!(world.block_count(new), 1);
        assert!(world.block(BlockKey::new(new, BlockPos::new(2, 0, 0))).is_some());
        assert!(world.block(BlockKey::new(ship, BlockPos::new(2, 0, 0))).is_none());
    }

    #[test]
    fn test_tool_switch() {
        let (mut world, ship) = hull();
        let tool = world.place_tool(ship, BlockPos::new(0, 2, 0)).unwrap();
        assert!(!world.tool_enabled(tool));
        world.set_tool_enabled(tool, true);
        assert!(world.tool_enabled(tool));
        assert!(world.has_inventory(tool));
    }
}
