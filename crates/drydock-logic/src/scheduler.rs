//! Session root: the assembly registry and the throttled tasks that drive it.
//!
//! | Task | Interval | Affinity | Work |
//! |------|----------|----------|------|
//! | [`OrchestratorTask`] | `tick_seconds` (0.5 s) | server | [`orchestrator::tick`] on every assembly |
//! | [`CargoReconciler`] | `cargo_seconds` (5 s) | server | [`cargo::reconcile`] on one assembly |
//!
//! Nothing here is global. A [`Scheduler`] is created per session, owns the
//! [`DockRegistry`], and is dropped when the session ends.

use std::collections::BTreeMap;

use crate::assembly::{Assembly, AssemblySettings, WorkMode};
use crate::cargo::{self, RoundRobin};
use crate::config::DockConfig;
use crate::error::DockError;
use crate::events::EventSink;
use crate::ids::{AssemblyId, ContainerId};
use crate::orchestrator;
use crate::throttle::{Affinity, ExecContext, Throttle, ThrottledTask};
use crate::world::DockWorld;

/// Operator command for one assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockCommand {
    Weld,
    Grind,
    Disable,
}

// ── Registry ───────────────────────────────────────────────────────────

/// All live assemblies, keyed by id.
#[derive(Debug, Default)]
pub struct DockRegistry {
    assemblies: BTreeMap<AssemblyId, Assembly>,
}

impl DockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asm: Assembly) -> Option<Assembly> {
        self.assemblies.insert(asm.id(), asm)
    }

    pub fn remove(&mut self, id: AssemblyId) -> Option<Assembly> {
        self.assemblies.remove(&id)
    }

    pub fn get(&self, id: AssemblyId) -> Option<&Assembly> {
        self.assemblies.get(&id)
    }

    pub fn get_mut(&mut self, id: AssemblyId) -> Option<&mut Assembly> {
        self.assemblies.get_mut(&id)
    }

    pub fn ids(&self) -> Vec<AssemblyId> {
        self.assemblies.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assembly> {
        self.assemblies.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Assembly> {
        self.assemblies.values_mut()
    }

    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    /// Route a container split to every assembly following `old`.
    /// Returns how many assemblies took it.
    pub fn route_split(
        &mut self,
        old: ContainerId,
        new: ContainerId,
        world: &impl DockWorld,
        events: &mut impl EventSink,
    ) -> usize {
        self.assemblies
            .values_mut()
            .filter(|asm| asm.is_watching_splits(old))
            .map(|asm| asm.on_container_split(old, new, world, events))
            .filter(|followed| *followed)
            .count()
    }

    /// Drop assemblies whose anchor is gone and whose disable has been
    /// committed.
    pub fn prune_invalid(&mut self) -> Vec<AssemblyId> {
        let doomed: Vec<AssemblyId> = self
            .assemblies
            .values()
            .filter(|asm| asm.is_invalid() && asm.work_mode().is_none() && !asm.is_disable_pending())
            .map(|asm| asm.id())
            .collect();
        for id in &doomed {
            self.assemblies.remove(id);
            log::info!("{} removed from registry", id);
        }
        doomed
    }

    fn clear(&mut self) {
        self.assemblies.clear();
    }
}

// ── Tasks ──────────────────────────────────────────────────────────────

/// Borrowed state a task runs against.
pub struct TaskContext<'a, W, E> {
    pub registry: &'a mut DockRegistry,
    pub world: &'a mut W,
    pub config: &'a DockConfig,
    pub events: &'a mut E,
}

/// Ticks every assembly, then drops the invalid ones.
#[derive(Debug, Clone)]
pub struct OrchestratorTask {
    throttle: Throttle,
}

impl OrchestratorTask {
    pub fn new(interval: f64) -> Self {
        Self {
            throttle: Throttle::new(interval, Affinity::ServerOnly),
        }
    }
}

impl<'a, W: DockWorld, E: EventSink> ThrottledTask<TaskContext<'a, W, E>> for OrchestratorTask {
    fn name(&self) -> &'static str {
        "orchestrator"
    }

    fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    fn throttle_mut(&mut self) -> &mut Throttle {
        &mut self.throttle
    }

    fn handle(&mut self, cx: &mut TaskContext<'a, W, E>) {
        // Each assembly's failures end inside its own tick.
        for asm in cx.registry.iter_mut() {
            orchestrator::tick(asm, cx.world, cx.config, cx.events);
        }
        cx.registry.prune_invalid();
    }
}

/// Refreshes the reachable cargo of one assembly per run.
#[derive(Debug, Clone)]
pub struct CargoReconciler {
    throttle: Throttle,
    cursor: RoundRobin,
}

impl CargoReconciler {
    pub fn new(interval: f64) -> Self {
        Self {
            throttle: Throttle::new(interval, Affinity::ServerOnly),
            cursor: RoundRobin::default(),
        }
    }
}

impl<'a, W: DockWorld, E: EventSink> ThrottledTask<TaskContext<'a, W, E>> for CargoReconciler {
    fn name(&self) -> &'static str {
        "cargo"
    }

    fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    fn throttle_mut(&mut self) -> &mut Throttle {
        &mut self.throttle
    }

    fn handle(&mut self, cx: &mut TaskContext<'a, W, E>) {
        let ids = cx.registry.ids();
        let Some(id) = self.cursor.next(&ids) else {
            return;
        };
        if let Some(asm) = cx.registry.get_mut(id) {
            cargo::reconcile(asm, cx.world, cx.config);
        }
    }
}

/// Poll one task; run it and reset its throttle when due.
fn run_if_due<C, T: ThrottledTask<C>>(task: &mut T, now: f64, exec: ExecContext, cx: &mut C) -> bool {
    if !task.can_run(now, exec) {
        return false;
    }
    log::trace!("running {} at {:.2}", task.name(), now);
    task.handle(cx);
    task.throttle_mut().reset(now);
    true
}

// ── Scheduler ──────────────────────────────────────────────────────────

/// Owns the registry and the tasks for one session.
#[derive(Debug)]
pub struct Scheduler {
    config: DockConfig,
    registry: DockRegistry,
    orchestrator: OrchestratorTask,
    cargo: CargoReconciler,
    running: bool,
}

impl Scheduler {
    pub fn new(config: DockConfig) -> Self {
        let orchestrator = OrchestratorTask::new(config.tick_seconds);
        let cargo = CargoReconciler::new(config.cargo_seconds);
        Self {
            config,
            registry: DockRegistry::new(),
            orchestrator,
            cargo,
            running: false,
        }
    }

    pub fn config(&self) -> &DockConfig {
        &self.config
    }

    pub fn registry(&self) -> &DockRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DockRegistry {
        &mut self.registry
    }

    pub fn assembly(&self, id: AssemblyId) -> Option<&Assembly> {
        self.registry.get(id)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Arm the tasks; both fire on the first update.
    pub fn start_session(&mut self) {
        self.orchestrator.throttle.rearm();
        self.cargo.throttle.rearm();
        self.running = true;
        log::info!("dry-dock session started");
    }

    /// Disable every assembly and forget them.
    pub fn stop_session(&mut self, events: &mut impl EventSink) {
        for asm in self.registry.iter_mut() {
            asm.request_disable(true);
            asm.commit_disable(events);
        }
        let count = self.registry.len();
        self.registry.clear();
        self.running = false;
        log::info!("dry-dock session stopped, {} assembly(ies) released", count);
    }

    /// Register an assembly after checking its settings against the
    /// session limits.
    pub fn add_assembly(&mut self, asm: Assembly) -> Result<AssemblyId, DockError> {
        asm.settings().validate(self.config.max_beams)?;
        let id = asm.id();
        if self.registry.insert(asm).is_some() {
            log::warn!("{} replaced an existing assembly", id);
        }
        Ok(id)
    }

    pub fn remove_assembly(&mut self, id: AssemblyId, events: &mut impl EventSink) -> Option<Assembly> {
        let mut asm = self.registry.remove(id)?;
        asm.request_disable(false);
        asm.commit_disable(events);
        Some(asm)
    }

    /// Drive the tasks. Call once per frame with the session clock.
    pub fn update<W: DockWorld, E: EventSink>(
        &mut self,
        now: f64,
        world: &mut W,
        exec: ExecContext,
        events: &mut E,
    ) {
        if !self.running {
            return;
        }
        let mut cx = TaskContext {
            registry: &mut self.registry,
            world,
            config: &self.config,
            events,
        };
        run_if_due(&mut self.orchestrator, now, exec, &mut cx);
        run_if_due(&mut self.cargo, now, exec, &mut cx);
    }

    /// Apply an operator command. A newly activated assembly gets its
    /// reachable cargo right away instead of waiting for its turn.
    pub fn command<W: DockWorld>(
        &mut self,
        id: AssemblyId,
        command: DockCommand,
        world: &mut W,
        events: &mut impl EventSink,
    ) -> Result<(), DockError> {
        let asm = self
            .registry
            .get_mut(id)
            .ok_or(DockError::UnknownAssembly(id))?;
        let mode = match command {
            DockCommand::Weld => WorkMode::Weld,
            DockCommand::Grind => WorkMode::Grind,
            DockCommand::Disable => {
                asm.request_disable(true);
                return Ok(());
            }
        };
        asm.activate(mode, world, events)?;
        cargo::reconcile(asm, world, &self.config);
        Ok(())
    }

    pub fn apply_settings(
        &mut self,
        id: AssemblyId,
        settings: AssemblySettings,
        events: &mut impl EventSink,
    ) -> Result<(), DockError> {
        let max_beams = self.config.max_beams;
        self.registry
            .get_mut(id)
            .ok_or(DockError::UnknownAssembly(id))?
            .apply_settings(settings, max_beams, events)
    }

    pub fn notify_split(
        &mut self,
        old: ContainerId,
        new: ContainerId,
        world: &impl DockWorld,
        events: &mut impl EventSink,
    ) -> usize {
        self.registry.route_split(old, new, world, events)
    }
}
