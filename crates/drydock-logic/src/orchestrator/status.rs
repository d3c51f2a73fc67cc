//! Human-readable status block, refreshed at the end of every tick.

use crate::assembly::Assembly;

pub fn render_status(asm: &Assembly) -> String {
    let slots: usize = asm.tools().iter().map(|t| t.slots().len()).sum();
    let mut lines = vec![
        format!("Mode: {:?}", asm.mode()),
        format!(
            "Containers: {} claimed, {} waiting",
            asm.claimed().len(),
            asm.candidates().len()
        ),
        format!("Targets: {}", asm.pool().len()),
        format!("Beams: {}/{}", asm.occupied_slots(), slots),
    ];

    let work: f32 = asm.pool().values().map(|t| t.estimate_seconds).sum();
    if work > 0.0 {
        let eta = work / slots.max(1) as f32;
        lines.push(format!("Estimated: {:.0}s", eta));
    }
    lines.push(format!("Power: {:.3} MW", asm.total_power()));

    if !asm.missing_tally().is_empty() {
        lines.push("Missing:".to_string());
        for (item, count) in asm.missing_tally() {
            lines.push(format!("  {} x{}", item, count));
        }
    }
    lines.join("\n")
}
