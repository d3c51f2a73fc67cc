//! Dock engine - drives the scheduler over the sandbox world.

use drydock_logic::assembly::{Assembly, AssemblySettings, DisableHandle, Platform};
use drydock_logic::config::DockConfig;
use drydock_logic::error::DockError;
use drydock_logic::events::DockEvent;
use drydock_logic::geometry::OrientedBox;
use drydock_logic::ids::{AssemblyId, BlockKey, BlockPos, ContainerId, ToolId};
use drydock_logic::scheduler::{DockCommand, Scheduler};
use drydock_logic::throttle::ExecContext;
use drydock_logic::world::ToolControl;

use crate::sandbox::SandboxWorld;

/// Main dock engine
pub struct DockEngine {
    /// Sandbox holding every structure, block and inventory
    pub world: SandboxWorld,
    /// Registry and throttled tasks
    pub scheduler: Scheduler,
    /// Simulation time in seconds since start
    sim_time: f64,
    /// Events produced since the last drain
    events: Vec<DockEvent>,
    /// Reactive disable latches: tool block → owning assembly
    tool_watch: Vec<(BlockKey, AssemblyId, DisableHandle)>,
    next_assembly: u64,
    next_tool: u64,
    exec: ExecContext,
    time_scale: f32,
}

impl DockEngine {
    /// Create an engine over an empty sandbox and start the session.
    pub fn new(config: DockConfig) -> Self {
        Self::with_world(SandboxWorld::new(), config)
    }

    pub fn with_world(world: SandboxWorld, config: DockConfig) -> Self {
        let mut scheduler = Scheduler::new(config);
        scheduler.start_session();
        Self {
            world,
            scheduler,
            sim_time: 0.0,
            events: Vec::new(),
            tool_watch: Vec::new(),
            next_assembly: 0,
            next_tool: 0,
            exec: ExecContext::Server,
            time_scale: 1.0,
        }
    }

    /// Register a dock made of `tools` on `anchor`, working inside `volume`.
    pub fn add_dock(
        &mut self,
        anchor: ContainerId,
        volume: OrientedBox,
        tools: &[BlockKey],
        platform: Platform,
        settings: AssemblySettings,
    ) -> Result<AssemblyId, DockError> {
        self.next_assembly += 1;
        let id = AssemblyId(self.next_assembly);
        let tools: Vec<_> = tools
            .iter()
            .map(|block| {
                self.next_tool += 1;
                drydock_logic::assembly::Tool {
                    id: ToolId(self.next_tool),
                    block: *block,
                }
            })
            .collect();

        let asm = Assembly::new(id, anchor, volume, tools.clone(), platform, settings)?;
        let handle = asm.disable_handle();
        self.scheduler.add_assembly(asm)?;
        for t in tools {
            self.tool_watch.push((t.block, id, handle.clone()));
        }
        log::info!("{} registered on {}", id, anchor);
        Ok(id)
    }

    pub fn assembly(&self, id: AssemblyId) -> Option<&Assembly> {
        self.scheduler.assembly(id)
    }

    pub fn command(&mut self, id: AssemblyId, command: DockCommand) -> Result<(), DockError> {
        self.scheduler
            .command(id, command, &mut self.world, &mut self.events)
    }

    pub fn apply_settings(&mut self, id: AssemblyId, settings: AssemblySettings) -> Result<(), DockError> {
        self.scheduler.apply_settings(id, settings, &mut self.events)
    }

    /// Flip a tool's switch. Switching a working tool off asks its
    /// assembly to stop.
    pub fn switch_tool(&mut self, tool: BlockKey, enabled: bool) {
        self.world.set_tool_enabled(tool, enabled);
        if enabled {
            return;
        }
        for (block, id, handle) in &self.tool_watch {
            if *block == tool {
                log::debug!("{} switched off, notifying {}", tool, id);
                handle.request(true);
            }
        }
    }

    /// Break `cells` off `container` and route the split to the docks.
    pub fn split(&mut self, container: ContainerId, cells: &[BlockPos]) -> Option<ContainerId> {
        let new = self.world.split_off(container, cells)?;
        self.scheduler
            .notify_split(container, new, &self.world, &mut self.events);
        Some(new)
    }

    /// Update the simulation by delta_seconds
    pub fn update(&mut self, delta_seconds: f32) {
        self.sim_time += (delta_seconds * self.time_scale) as f64;
        self.scheduler
            .update(self.sim_time, &mut self.world, self.exec, &mut self.events);
        let live = self.scheduler.registry();
        self.tool_watch.retain(|(_, id, _)| live.get(*id).is_some());
    }

    /// Advance in fixed steps until `seconds` of simulation time passed.
    pub fn run_for(&mut self, seconds: f32, step: f32) {
        let step = step.max(0.01);
        let mut elapsed = 0.0;
        while elapsed < seconds {
            self.update(step);
            elapsed += step;
        }
    }

    /// End the session: disable every dock and forget them.
    pub fn shutdown(&mut self) {
        self.scheduler.stop_session(&mut self.events);
        self.tool_watch.clear();
    }

    pub fn events(&self) -> &[DockEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<DockEvent> {
        std::mem::take(&mut self.events)
    }

    /// Run as a replicated client: server-affine tasks stop firing.
    pub fn set_exec_context(&mut self, exec: ExecContext) {
        self.exec = exec;
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Simulation time in seconds
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }
}
