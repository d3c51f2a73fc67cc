//! Tool power model.
//!
//! | Term | Draw |
//! |------|------|
//! | idle | `idle` per tool |
//! | beam | `beam_base + scaling · multiplier · d² / normalization` per active beam |
//! | platform | everything × `mobile_factor` on a mobile platform |
//!
//! The worst case assumes every beam is busy at the full volume diagonal.

use crate::assembly::{Assembly, Platform, WorkMode};
use crate::config::PowerConstants;
use crate::events::{DockEvent, EventSink};
use crate::geometry::OrientedBox;

/// Draw of one active beam of squared length `distance_sq`.
pub fn beam_draw(constants: &PowerConstants, multiplier: f32, distance_sq: f32) -> f32 {
    constants.beam_base + constants.scaling * multiplier * distance_sq / constants.normalization
}

fn platform_factor(constants: &PowerConstants, platform: Platform) -> f32 {
    match platform {
        Platform::Station => 1.0,
        Platform::Mobile => constants.mobile_factor,
    }
}

/// Live draw of one tool from the squared lengths of its active beams.
pub fn tool_draw(
    constants: &PowerConstants,
    multiplier: f32,
    beams: impl IntoIterator<Item = f32>,
    platform: Platform,
) -> f32 {
    let beams: f32 = beams
        .into_iter()
        .map(|d| beam_draw(constants, multiplier, d))
        .sum();
    (constants.idle + beams) * platform_factor(constants, platform)
}

/// Draw with `beam_count` beams busy at the volume diagonal.
pub fn worst_case_draw(
    constants: &PowerConstants,
    multiplier: f32,
    beam_count: usize,
    volume: &OrientedBox,
    platform: Platform,
) -> f32 {
    let diagonal = volume.diagonal();
    let reach_sq = diagonal * diagonal;
    tool_draw(
        constants,
        multiplier,
        std::iter::repeat(reach_sq).take(beam_count),
        platform,
    )
}

/// Refresh every tool's live and worst-case draw. Emits a power event for
/// each tool whose live draw changed.
pub(crate) fn recompute(asm: &mut Assembly, constants: &PowerConstants, events: &mut impl EventSink) {
    let mode = asm.work_mode();
    let settings = asm.settings();
    let multiplier = match mode {
        Some(m) => settings.multiplier(m),
        None => settings
            .multiplier(WorkMode::Weld)
            .max(settings.multiplier(WorkMode::Grind)),
    };
    let worst = worst_case_draw(
        constants,
        multiplier,
        settings.beam_count,
        asm.volume(),
        asm.platform(),
    );
    let platform = asm.platform();

    let mut draws = Vec::with_capacity(asm.tools.len());
    for (tool_index, t) in asm.tools.iter().enumerate() {
        let beams = t
            .slots
            .iter()
            .flatten()
            .filter_map(|id| asm.pool.get(id))
            .map(|target| target.tool_distance_sq(tool_index));
        let live = if mode.is_some() {
            tool_draw(constants, multiplier, beams, platform)
        } else {
            tool_draw(constants, multiplier, std::iter::empty(), platform)
        };
        draws.push(live);
    }

    for (t, live) in asm.tools.iter_mut().zip(draws) {
        t.max_power = worst;
        if (t.power - live).abs() > f32::EPSILON {
            t.power = live;
            events.emit(DockEvent::ToolPower {
                tool: t.tool.id,
                power: live,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;

    #[test]
    fn test_idle_draw() {
        let c = PowerConstants::default();
        assert_eq!(tool_draw(&c, 1.0, std::iter::empty(), Platform::Station), c.idle);
    }

    #[test]
    fn test_doubling_beams_doubles_increment() {
        let c = PowerConstants::default();
        let three = tool_draw(&c, 1.0, [100.0, 400.0, 900.0], Platform::Station);
        let six = tool_draw(
            &c,
            1.0,
            [100.0, 400.0, 900.0, 100.0, 400.0, 900.0],
            Platform::Station,
        );
        let inc3 = three - c.idle;
        let inc6 = six - c.idle;
        assert!((inc6 - 2.0 * inc3).abs() < 1e-6);
    }

    #[test]
    fn test_mobile_platform_doubles() {
        let c = PowerConstants::default();
        let station = tool_draw(&c, 1.0, [2500.0], Platform::Station);
        let mobile = tool_draw(&c, 1.0, [2500.0], Platform::Mobile);
        assert!((mobile - 2.0 * station).abs() < 1e-6);
    }

    #[test]
    fn test_worst_case_uses_diagonal() {
        let c = PowerConstants::default();
        let volume = OrientedBox::axis_aligned(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0));
        // Full diagonal 10 → d² = 100.
        let worst = worst_case_draw(&c, 1.0, 2, &volume, Platform::Station);
        let expected = c.idle + 2.0 * beam_draw(&c, 1.0, 100.0);
        assert!((worst - expected).abs() < 1e-6);
    }

    #[test]
    fn test_multiplier_scales_distance_term_only() {
        let c = PowerConstants::default();
        let slow = beam_draw(&c, 1.0, 2500.0);
        let fast = beam_draw(&c, 2.0, 2500.0);
        assert!((fast - slow - c.scaling).abs() < 1e-6);
    }
}
