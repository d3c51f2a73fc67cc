//! Outbound notifications for the visual/network layer.
//!
//! Slot events fire only when the target bound to a slot changes, never
//! every tick. State, power and settings broadcasts follow state-changing
//! operations.

use serde::{Deserialize, Serialize};

use crate::assembly::{AssemblySettings, DockMode};
use crate::ids::{AssemblyId, BlockPos, ContainerId, ToolId};

/// RGB beam color hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamColor(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticePriority {
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DockEvent {
    SlotAssigned {
        tool: ToolId,
        container: ContainerId,
        pos: BlockPos,
        color: BeamColor,
        pulse: bool,
        slot: usize,
    },
    SlotCleared {
        tool: ToolId,
        slot: usize,
    },
    StateChanged {
        assembly: AssemblyId,
        mode: DockMode,
    },
    ToolPower {
        tool: ToolId,
        power: f32,
    },
    SettingsChanged {
        assembly: AssemblyId,
        settings: AssemblySettings,
    },
    Notice {
        assembly: AssemblyId,
        priority: NoticePriority,
        message: String,
    },
}

impl DockEvent {
    pub fn is_slot_event(&self) -> bool {
        matches!(self, DockEvent::SlotAssigned { .. } | DockEvent::SlotCleared { .. })
    }
}

/// Receiver of [`DockEvent`]s.
pub trait EventSink {
    fn emit(&mut self, event: DockEvent);
}

impl EventSink for Vec<DockEvent> {
    fn emit(&mut self, event: DockEvent) {
        self.push(event);
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: DockEvent) {}
}
