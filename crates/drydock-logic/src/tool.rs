//! Tool adapter contract.
//!
//! The host's power grid and UI see a tool block through [`ToolAdapter`]:
//! the mode of its assembly, the shared settings, and the current and
//! worst-case power draw. [`ToolView`] is the implementation backed by an
//! [`Assembly`].

use crate::assembly::{Assembly, AssemblySettings, DockMode, ToolState};
use crate::ids::ToolId;

pub trait ToolAdapter {
    fn tool_id(&self) -> ToolId;
    fn mode(&self) -> DockMode;
    fn settings(&self) -> &AssemblySettings;
    /// Power the grid must supply right now.
    fn current_power(&self) -> f32;
    /// Draw with every beam busy at full reach.
    fn max_power(&self) -> f32;
    fn active_beams(&self) -> usize;

    fn is_working(&self) -> bool {
        self.active_beams() > 0
    }
}

/// Read-only view of one tool of an assembly.
#[derive(Debug, Clone, Copy)]
pub struct ToolView<'a> {
    assembly: &'a Assembly,
    state: &'a ToolState,
}

impl<'a> ToolView<'a> {
    pub fn new(assembly: &'a Assembly, tool: ToolId) -> Option<Self> {
        let index = assembly.tool_index(tool)?;
        Some(Self {
            assembly,
            state: &assembly.tools()[index],
        })
    }

    /// Views of every tool of the assembly, in tool order.
    pub fn all(assembly: &'a Assembly) -> impl Iterator<Item = ToolView<'a>> + 'a {
        assembly
            .tools()
            .iter()
            .map(move |state| ToolView { assembly, state })
    }
}

impl ToolAdapter for ToolView<'_> {
    fn tool_id(&self) -> ToolId {
        self.state.tool.id
    }

    fn mode(&self) -> DockMode {
        self.assembly.mode()
    }

    fn settings(&self) -> &AssemblySettings {
        self.assembly.settings()
    }

    fn current_power(&self) -> f32 {
        self.state.power()
    }

    fn max_power(&self) -> f32 {
        self.state.max_power()
    }

    fn active_beams(&self) -> usize {
        self.state.busy_beams()
    }
}
