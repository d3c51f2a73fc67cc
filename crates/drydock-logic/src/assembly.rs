//! The assembly aggregate: one dry dock, its volume, its tools and all the
//! bookkeeping the orchestrator keeps between ticks.
//!
//! # Lifecycle
//!
//! ```text
//!   Disabled ──activate(mode)──▶ Active(mode)
//!       ▲                            │ request_disable
//!       │                            ▼
//!       └──────commit_disable── PendingDisable
//! ```
//!
//! A disable never tears anything down immediately. Requests (from the
//! tick itself or from reactive callbacks through a [`DisableHandle`]) only
//! move the lifecycle to `PendingDisable`; the orchestrator commits at the
//! start and at the end of each tick, so teardown happens exactly once at a
//! known point.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

use crate::error::DockError;
use crate::events::{BeamColor, DockEvent, EventSink};
use crate::geometry::{OrientedBox, Vec3};
use crate::ids::{AssemblyId, BlockKey, ContainerId, TargetId, ToolId};
use crate::target::Target;
use crate::world::{DockWorld, Stock, ToolControl};

/// What an active assembly does to the blocks in its volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkMode {
    Weld,
    Grind,
}

/// Reported mode of an assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DockMode {
    Disabled,
    Weld,
    Grind,
    /// The anchor is gone; the assembly will be dropped from the registry.
    Invalid,
    /// Idle and waiting for its first membership scan.
    Scanning,
}

impl From<WorkMode> for DockMode {
    fn from(mode: WorkMode) -> Self {
        match mode {
            WorkMode::Weld => DockMode::Weld,
            WorkMode::Grind => DockMode::Grind,
        }
    }
}

/// Whether the tools sit on a station or on something that moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Station,
    Mobile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Disabled,
    Active(WorkMode),
    PendingDisable {
        from: Option<WorkMode>,
        notify: bool,
    },
}

/// Operator-facing settings of one assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblySettings {
    /// Beams per tool.
    pub beam_count: usize,
    pub weld_multiplier: f32,
    pub grind_multiplier: f32,
    pub weld_color: BeamColor,
    pub grind_color: BeamColor,
}

impl Default for AssemblySettings {
    fn default() -> Self {
        Self {
            beam_count: 3,
            weld_multiplier: 1.0,
            grind_multiplier: 1.0,
            weld_color: BeamColor(0, 200, 255),
            grind_color: BeamColor(255, 120, 0),
        }
    }
}

impl AssemblySettings {
    pub fn multiplier(&self, mode: WorkMode) -> f32 {
        match mode {
            WorkMode::Weld => self.weld_multiplier,
            WorkMode::Grind => self.grind_multiplier,
        }
    }

    pub fn color(&self, mode: WorkMode) -> BeamColor {
        match mode {
            WorkMode::Weld => self.weld_color,
            WorkMode::Grind => self.grind_color,
        }
    }

    pub fn validate(&self, max_beams: usize) -> Result<(), DockError> {
        if self.beam_count == 0 || self.beam_count > max_beams {
            return Err(DockError::BeamCountOutOfRange {
                requested: self.beam_count,
                max: max_beams,
            });
        }
        for m in [self.weld_multiplier, self.grind_multiplier] {
            if !(m > 0.0 && m.is_finite()) {
                return Err(DockError::InvalidMultiplier(m));
            }
        }
        Ok(())
    }
}

/// Cloneable, thread-safe way to ask an assembly to stop.
///
/// Reactive callbacks (container destroyed, tool switched off) may fire at
/// any time; they only set this latch. The tick drains it.
#[derive(Debug, Clone, Default)]
pub struct DisableHandle {
    pending: Arc<Mutex<Option<bool>>>,
}

impl DisableHandle {
    /// Ask for a disable. `notify` requests a state broadcast on commit.
    /// Repeated requests merge.
    pub fn request(&self, notify: bool) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        *pending = Some(pending.unwrap_or(false) || notify);
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn take(&self) -> Option<bool> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

/// A tool block of the assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    pub id: ToolId,
    /// The tool block; also its inventory.
    pub block: BlockKey,
}

/// Status of one occupied weld slot, for external reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotStatus {
    pub target: TargetId,
    pub block: BlockKey,
    pub stalled: bool,
    pub missing: Stock,
}

/// Per-tool scheduling state.
#[derive(Debug, Clone)]
pub struct ToolState {
    pub tool: Tool,
    /// Candidate targets, nearest first. Consumed as slots are filled.
    pub(crate) proximity: VecDeque<TargetId>,
    pub(crate) slots: Vec<Option<TargetId>>,
    pub(crate) slot_status: Vec<Option<SlotStatus>>,
    pub(crate) position: Vec3,
    pub(crate) power: f32,
    pub(crate) max_power: f32,
}

impl ToolState {
    fn new(tool: Tool, beams: usize) -> Self {
        Self {
            tool,
            proximity: VecDeque::new(),
            slots: vec![None; beams],
            slot_status: vec![None; beams],
            position: Vec3::ZERO,
            power: 0.0,
            max_power: 0.0,
        }
    }

    pub fn slots(&self) -> &[Option<TargetId>] {
        &self.slots
    }

    pub fn slot_status(&self) -> &[Option<SlotStatus>] {
        &self.slot_status
    }

    pub fn proximity(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.proximity.iter().copied()
    }

    pub fn busy_beams(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn power(&self) -> f32 {
        self.power
    }

    pub fn max_power(&self) -> f32 {
        self.max_power
    }
}

/// One dry dock.
#[derive(Debug)]
pub struct Assembly {
    id: AssemblyId,
    /// Container the tools are mounted on.
    anchor: ContainerId,
    volume: OrientedBox,
    platform: Platform,
    pub(crate) tools: Vec<ToolState>,
    lifecycle: Lifecycle,
    disable: DisableHandle,
    invalid: bool,
    scanned: bool,
    pub(crate) candidates: BTreeSet<ContainerId>,
    pub(crate) claimed: BTreeSet<ContainerId>,
    /// Containers whose split notifications we follow.
    pub(crate) split_watch: BTreeSet<ContainerId>,
    pub(crate) pool: BTreeMap<TargetId, Target>,
    next_target: u64,
    pub(crate) reachable_cargo: BTreeSet<BlockKey>,
    pub(crate) missing: Stock,
    pub(crate) notified_missing: BTreeSet<String>,
    settings: AssemblySettings,
    pub(crate) status: String,
}

impl Assembly {
    pub fn new(
        id: AssemblyId,
        anchor: ContainerId,
        volume: OrientedBox,
        tools: Vec<Tool>,
        platform: Platform,
        settings: AssemblySettings,
    ) -> Result<Self, DockError> {
        if tools.len() < 2 {
            return Err(DockError::TooFewTools(tools.len()));
        }
        if settings.beam_count == 0 {
            return Err(DockError::BeamCountOutOfRange {
                requested: 0,
                max: usize::MAX,
            });
        }
        let beams = settings.beam_count;
        Ok(Self {
            id,
            anchor,
            volume,
            platform,
            tools: tools.into_iter().map(|t| ToolState::new(t, beams)).collect(),
            lifecycle: Lifecycle::Disabled,
            disable: DisableHandle::default(),
            invalid: false,
            scanned: false,
            candidates: BTreeSet::new(),
            claimed: BTreeSet::new(),
            split_watch: BTreeSet::new(),
            pool: BTreeMap::new(),
            next_target: 0,
            reachable_cargo: BTreeSet::new(),
            missing: Stock::new(),
            notified_missing: BTreeSet::new(),
            settings,
            status: String::new(),
        })
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn id(&self) -> AssemblyId {
        self.id
    }

    pub fn anchor(&self) -> ContainerId {
        self.anchor
    }

    pub fn volume(&self) -> &OrientedBox {
        &self.volume
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn mode(&self) -> DockMode {
        if self.invalid {
            return DockMode::Invalid;
        }
        match self.lifecycle {
            Lifecycle::Active(mode) => mode.into(),
            Lifecycle::PendingDisable { from: Some(mode), .. } => mode.into(),
            _ if !self.scanned => DockMode::Scanning,
            _ => DockMode::Disabled,
        }
    }

    /// The mode being worked, if active and not about to stop.
    pub fn work_mode(&self) -> Option<WorkMode> {
        match self.lifecycle {
            Lifecycle::Active(mode) => Some(mode),
            _ => None,
        }
    }

    pub fn is_disable_pending(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::PendingDisable { .. }) || self.disable.is_pending()
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    pub fn disable_handle(&self) -> DisableHandle {
        self.disable.clone()
    }

    pub fn settings(&self) -> &AssemblySettings {
        &self.settings
    }

    pub fn tools(&self) -> &[ToolState] {
        &self.tools
    }

    pub fn tool_index(&self, id: ToolId) -> Option<usize> {
        self.tools.iter().position(|t| t.tool.id == id)
    }

    pub fn candidates(&self) -> &BTreeSet<ContainerId> {
        &self.candidates
    }

    pub fn claimed(&self) -> &BTreeSet<ContainerId> {
        &self.claimed
    }

    pub fn is_watching_splits(&self, container: ContainerId) -> bool {
        self.split_watch.contains(&container)
    }

    pub fn pool(&self) -> &BTreeMap<TargetId, Target> {
        &self.pool
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.pool.get(&id)
    }

    /// Target currently sitting on `block`, if any.
    pub fn target_for_block(&self, block: BlockKey) -> Option<&Target> {
        self.pool.values().find(|t| t.block == block)
    }

    pub fn reachable_cargo(&self) -> &BTreeSet<BlockKey> {
        &self.reachable_cargo
    }

    /// Components stalled weld targets are waiting for.
    pub fn missing_tally(&self) -> &Stock {
        &self.missing
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn occupied_slots(&self) -> usize {
        self.tools.iter().map(|t| t.busy_beams()).sum()
    }

    /// Whether `target` occupies a slot on any tool.
    pub fn is_occupied(&self, target: TargetId) -> bool {
        self.tools
            .iter()
            .any(|t| t.slots.iter().any(|s| *s == Some(target)))
    }

    pub fn total_power(&self) -> f32 {
        self.tools.iter().map(|t| t.power).sum()
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    /// Start working in `mode` on every container currently a candidate.
    pub fn activate(
        &mut self,
        mode: WorkMode,
        tools: &mut impl ToolControl,
        events: &mut impl EventSink,
    ) -> Result<(), DockError> {
        if self.invalid {
            return Err(DockError::InvalidAssembly(self.id));
        }
        if self.is_disable_pending() {
            return Err(DockError::DisablePending(self.id));
        }

        // Switching modes keeps what is already claimed; scans only run
        // while idle, so the candidate set is empty then.
        let mut claimed = if self.work_mode().is_some() {
            std::mem::take(&mut self.claimed)
        } else {
            BTreeSet::new()
        };
        claimed.append(&mut self.candidates);

        self.clear_work(events);
        self.claimed = claimed;
        self.split_watch = self.claimed.clone();
        self.apply_beam_count();

        for t in &self.tools {
            tools.set_tool_enabled(t.tool.block, true);
        }

        self.lifecycle = Lifecycle::Active(mode);
        log::info!(
            "{} activated in {:?} with {} container(s)",
            self.id,
            mode,
            self.claimed.len()
        );
        events.emit(DockEvent::StateChanged {
            assembly: self.id,
            mode: mode.into(),
        });
        Ok(())
    }

    /// Ask for a disable. Nothing is torn down until [`commit_disable`].
    ///
    /// [`commit_disable`]: Assembly::commit_disable
    pub fn request_disable(&mut self, notify: bool) {
        self.lifecycle = match self.lifecycle {
            Lifecycle::Active(mode) => Lifecycle::PendingDisable {
                from: Some(mode),
                notify,
            },
            Lifecycle::PendingDisable { from, notify: n } => Lifecycle::PendingDisable {
                from,
                notify: n || notify,
            },
            Lifecycle::Disabled => Lifecycle::PendingDisable { from: None, notify },
        };
    }

    /// Move requests made through the [`DisableHandle`] into the lifecycle.
    pub(crate) fn absorb_disable_requests(&mut self) {
        if let Some(notify) = self.disable.take() {
            self.request_disable(notify);
        }
    }

    /// Tear everything down if a disable is pending. Returns whether it did.
    pub fn commit_disable(&mut self, events: &mut impl EventSink) -> bool {
        self.absorb_disable_requests();
        let Lifecycle::PendingDisable { from, notify } = self.lifecycle else {
            return false;
        };

        self.clear_work(events);
        self.split_watch.clear();
        self.claimed.clear();
        self.candidates.clear();
        self.reachable_cargo.clear();
        self.notified_missing.clear();
        self.apply_beam_count();
        for t in &mut self.tools {
            t.power = 0.0;
        }
        self.lifecycle = Lifecycle::Disabled;

        log::info!("{} disabled (was {:?})", self.id, from);
        if notify {
            events.emit(DockEvent::StateChanged {
                assembly: self.id,
                mode: self.mode(),
            });
        }
        true
    }

    /// Follow a container split. If `old` is claimed, `new` joins the
    /// claimed set and its splits are followed too. Targets whose block
    /// moved are re-pointed at `new` and their slots re-announced.
    pub fn on_container_split(
        &mut self,
        old: ContainerId,
        new: ContainerId,
        world: &impl DockWorld,
        events: &mut impl EventSink,
    ) -> bool {
        if !self.claimed.contains(&old) {
            return false;
        }
        self.candidates.remove(&new);
        self.claimed.insert(new);
        self.split_watch.insert(new);

        let mut moved = BTreeSet::new();
        for target in self.pool.values_mut() {
            if target.block.container != old || world.block(target.block).is_some() {
                continue;
            }
            let relocated = BlockKey::new(new, target.block.pos);
            if world.block(relocated).is_some() {
                target.block = relocated;
                moved.insert(target.id);
            }
        }
        if let Some(mode) = self.work_mode() {
            for tool_index in 0..self.tools.len() {
                for slot in 0..self.tools[tool_index].slots.len() {
                    match self.tools[tool_index].slots[slot] {
                        Some(id) if moved.contains(&id) => {
                            self.bind_slot(tool_index, slot, id, mode, events);
                        }
                        _ => {}
                    }
                }
            }
        }
        log::debug!(
            "{}: {} split into {}, {} target(s) followed",
            self.id,
            old,
            new,
            moved.len()
        );
        true
    }

    /// Accept new settings. A beam count change reaches the slot tables
    /// once no slot is occupied.
    pub fn apply_settings(
        &mut self,
        settings: AssemblySettings,
        max_beams: usize,
        events: &mut impl EventSink,
    ) -> Result<(), DockError> {
        settings.validate(max_beams)?;
        self.settings = settings;
        self.apply_beam_count();
        events.emit(DockEvent::SettingsChanged {
            assembly: self.id,
            settings: self.settings.clone(),
        });
        Ok(())
    }

    pub(crate) fn mark_invalid(&mut self) {
        self.invalid = true;
    }

    pub(crate) fn mark_scanned(&mut self) {
        self.scanned = true;
    }

    // ── Pool and slot bookkeeping ──────────────────────────────────────

    pub(crate) fn next_target_id(&mut self) -> TargetId {
        self.next_target += 1;
        TargetId(self.next_target)
    }

    /// Drop everything in flight. Emits a clear for each occupied slot.
    fn clear_work(&mut self, events: &mut impl EventSink) {
        for t in &mut self.tools {
            for (slot, entry) in t.slots.iter_mut().enumerate() {
                if entry.take().is_some() {
                    events.emit(DockEvent::SlotCleared {
                        tool: t.tool.id,
                        slot,
                    });
                }
            }
            t.slot_status.iter_mut().for_each(|s| *s = None);
            t.proximity.clear();
        }
        self.pool.clear();
        self.missing.clear();
    }

    /// Resize slot tables to the configured beam count, only while empty.
    fn apply_beam_count(&mut self) {
        let beams = self.settings.beam_count;
        if self.occupied_slots() > 0 {
            return;
        }
        for t in &mut self.tools {
            if t.slots.len() != beams {
                t.slots = vec![None; beams];
                t.slot_status = vec![None; beams];
            }
        }
    }

    pub(crate) fn bind_slot(
        &mut self,
        tool_index: usize,
        slot: usize,
        target: TargetId,
        mode: WorkMode,
        events: &mut impl EventSink,
    ) {
        let Some(t) = self.pool.get(&target) else {
            return;
        };
        let (block, pulse) = (t.block, t.projected);
        let color = self.settings.color(mode);
        let tool = &mut self.tools[tool_index];
        tool.slots[slot] = Some(target);
        tool.slot_status[slot] = None;
        events.emit(DockEvent::SlotAssigned {
            tool: tool.tool.id,
            container: block.container,
            pos: block.pos,
            color,
            pulse,
            slot,
        });
    }

    pub(crate) fn clear_slot(&mut self, tool_index: usize, slot: usize, events: &mut impl EventSink) {
        let tool = &mut self.tools[tool_index];
        if tool.slots[slot].take().is_some() {
            tool.slot_status[slot] = None;
            events.emit(DockEvent::SlotCleared {
                tool: tool.tool.id,
                slot,
            });
        }
    }

    /// Remove a target from the pool, every proximity list and every slot.
    pub(crate) fn retire_target(&mut self, target: TargetId, events: &mut impl EventSink) {
        self.pool.remove(&target);
        for tool_index in 0..self.tools.len() {
            self.tools[tool_index].proximity.retain(|id| *id != target);
            for slot in 0..self.tools[tool_index].slots.len() {
                if self.tools[tool_index].slots[slot] == Some(target) {
                    self.clear_slot(tool_index, slot, events);
                }
            }
        }
    }

    /// Stop working on a container: drop it from the claimed set, stop
    /// following its splits and purge its targets.
    pub(crate) fn unclaim(&mut self, container: ContainerId, events: &mut impl EventSink) {
        self.claimed.remove(&container);
        self.split_watch.remove(&container);
        let doomed: Vec<TargetId> = self
            .pool
            .values()
            .filter(|t| t.block.container == container)
            .map(|t| t.id)
            .collect();
        for id in doomed {
            self.retire_target(id, events);
        }
        log::debug!("{}: released {}", self.id, container);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::BlockPos;

    #[derive(Default)]
    struct Switches {
        enabled: Vec<BlockKey>,
    }

    impl ToolControl for Switches {
        fn tool_enabled(&self, tool: BlockKey) -> bool {
            self.enabled.contains(&tool)
        }
        fn set_tool_enabled(&mut self, tool: BlockKey, enabled: bool) {
            self.enabled.retain(|t| *t != tool);
            if enabled {
                self.enabled.push(tool);
            }
        }
    }

    fn tool(id: u64) -> Tool {
        Tool {
            id: ToolId(id),
            block: BlockKey::new(ContainerId(1), BlockPos::new(id as i32, 0, 0)),
        }
    }

    fn assembly() -> Assembly {
        Assembly::new(
            AssemblyId(1),
            ContainerId(1),
            OrientedBox::axis_aligned(Vec3::ZERO, Vec3::new(50.0, 50.0, 50.0)),
            vec![tool(1), tool(2)],
            Platform::Station,
            AssemblySettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_needs_two_tools() {
        let err = Assembly::new(
            AssemblyId(1),
            ContainerId(1),
            OrientedBox::axis_aligned(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0)),
            vec![tool(1)],
            Platform::Station,
            AssemblySettings::default(),
        )
        .unwrap_err();
        assert_eq!(err, DockError::TooFewTools(1));
    }

    #[test]
    fn test_activate_promotes_candidates() {
        let mut asm = assembly();
        let mut switches = Switches::default();
        let mut events = Vec::new();
        asm.candidates.insert(ContainerId(10));
        asm.candidates.insert(ContainerId(11));

        asm.activate(WorkMode::Grind, &mut switches, &mut events).unwrap();

        assert_eq!(asm.mode(), DockMode::Grind);
        assert!(asm.candidates().is_empty());
        assert_eq!(asm.claimed().len(), 2);
        assert!(asm.is_watching_splits(ContainerId(10)));
        assert!(asm.candidates().is_disjoint(asm.claimed()));
        assert_eq!(switches.enabled.len(), 2);
        assert!(events.contains(&DockEvent::StateChanged {
            assembly: AssemblyId(1),
            mode: DockMode::Grind
        }));
    }

    #[test]
    fn test_mode_switch_keeps_claimed() {
        let mut asm = assembly();
        let mut events = Vec::new();
        asm.candidates.insert(ContainerId(10));
        asm.activate(WorkMode::Weld, &mut Switches::default(), &mut events)
            .unwrap();

        asm.activate(WorkMode::Grind, &mut Switches::default(), &mut events)
            .unwrap();

        assert_eq!(asm.mode(), DockMode::Grind);
        assert!(asm.claimed().contains(&ContainerId(10)));
        assert!(asm.is_watching_splits(ContainerId(10)));
    }

    #[test]
    fn test_request_disable_is_deferred() {
        let mut asm = assembly();
        let mut events = Vec::new();
        asm.candidates.insert(ContainerId(10));
        asm.activate(WorkMode::Weld, &mut Switches::default(), &mut events)
            .unwrap();

        asm.request_disable(true);
        // Still claimed until the commit.
        assert_eq!(asm.claimed().len(), 1);
        assert_eq!(asm.mode(), DockMode::Weld);
        assert!(asm.work_mode().is_none());

        assert!(asm.commit_disable(&mut events));
        assert!(asm.claimed().is_empty());
        assert!(!asm.is_watching_splits(ContainerId(10)));
        assert_eq!(asm.lifecycle(), Lifecycle::Disabled);
        assert!(!asm.commit_disable(&mut events));
    }

    #[test]
    fn test_request_disable_twice_same_as_once() {
        let mut once = assembly();
        let mut twice = assembly();
        let mut events = Vec::new();
        for asm in [&mut once, &mut twice] {
            asm.activate(WorkMode::Grind, &mut Switches::default(), &mut events)
                .unwrap();
        }
        once.request_disable(true);
        twice.request_disable(true);
        twice.request_disable(true);
        assert_eq!(once.lifecycle(), twice.lifecycle());

        let mut e1 = Vec::new();
        let mut e2 = Vec::new();
        once.commit_disable(&mut e1);
        twice.commit_disable(&mut e2);
        assert_eq!(e1, e2);
        assert_eq!(once.lifecycle(), twice.lifecycle());
    }

    #[test]
    fn test_activate_rejected_while_pending() {
        let mut asm = assembly();
        let mut events = Vec::new();
        asm.activate(WorkMode::Grind, &mut Switches::default(), &mut events)
            .unwrap();
        asm.disable_handle().request(false);
        let err = asm
            .activate(WorkMode::Weld, &mut Switches::default(), &mut events)
            .unwrap_err();
        assert_eq!(err, DockError::DisablePending(AssemblyId(1)));

        assert!(asm.commit_disable(&mut events));
        // Silent disable: no state broadcast for the commit.
        assert!(!events.iter().any(|e| matches!(
            e,
            DockEvent::StateChanged {
                mode: DockMode::Disabled | DockMode::Scanning,
                ..
            }
        )));
        assert!(asm
            .activate(WorkMode::Weld, &mut Switches::default(), &mut events)
            .is_ok());
    }

    #[test]
    fn test_handle_merges_notify() {
        let handle = DisableHandle::default();
        handle.request(false);
        handle.request(true);
        handle.request(false);
        assert_eq!(handle.take(), Some(true));
        assert!(!handle.is_pending());
    }

    #[test]
    fn test_beam_count_waits_for_empty_slots() {
        let mut asm = assembly();
        let mut events = Vec::new();
        let id = asm.next_target_id();
        asm.pool.insert(
            id,
            Target::new(
                id,
                BlockKey::new(ContainerId(9), BlockPos::new(0, 0, 0)),
                &crate::world::BlockInfo {
                    position: Vec3::ZERO,
                    integrity: 1.0,
                    max_integrity: 1.0,
                    deformed: false,
                    category: crate::world::BlockCategory::Armor,
                    build_seconds: 1.0,
                },
                false,
                crate::target::DistanceRef { point: Vec3::ZERO },
                crate::target::Vantage {
                    center: Vec3::ZERO,
                    tools: &[Vec3::ZERO, Vec3::ZERO],
                },
                WorkMode::Grind,
            ),
        );
        asm.bind_slot(0, 0, id, WorkMode::Grind, &mut events);

        let settings = AssemblySettings {
            beam_count: 5,
            ..AssemblySettings::default()
        };
        asm.apply_settings(settings, 8, &mut events).unwrap();
        assert_eq!(asm.tools()[0].slots().len(), 3);

        asm.retire_target(id, &mut events);
        asm.apply_settings(asm.settings().clone(), 8, &mut events).unwrap();
        assert_eq!(asm.tools()[0].slots().len(), 5);
        assert_eq!(asm.tools()[1].slots().len(), 5);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut asm = assembly();
        let settings = AssemblySettings {
            beam_count: 20,
            ..AssemblySettings::default()
        };
        let err = asm.apply_settings(settings, 8, &mut Vec::new()).unwrap_err();
        assert_eq!(
            err,
            DockError::BeamCountOutOfRange {
                requested: 20,
                max: 8
            }
        );
    }

    #[test]
    fn test_scanning_until_first_scan() {
        let mut asm = assembly();
        assert_eq!(asm.mode(), DockMode::Scanning);
        asm.mark_scanned();
        assert_eq!(asm.mode(), DockMode::Disabled);
        asm.mark_invalid();
        assert_eq!(asm.mode(), DockMode::Invalid);
    }
}
