//! Global tunables for the dry dock.
//!
//! Loaded once per session (from JSON or defaults) and passed by reference
//! into the scheduler. Per-assembly settings that an operator can change
//! live in [`crate::assembly::AssemblySettings`] instead.
//!
//! ```
//! use drydock_logic::config::DockConfig;
//!
//! let config = DockConfig::from_json_str(r#"{ "weld_rate": 3.0 }"#).unwrap();
//! assert_eq!(config.weld_rate, 3.0);
//! assert!(config.validate().is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::world::BlockCategory;

/// Lowest salvage/weld efficiency any policy can produce.
pub const EFFICIENCY_FLOOR: f32 = 0.1;

/// How much of the stock moved by a beam survives the trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EfficiencyPolicy {
    /// Constant ratio regardless of distance.
    Fixed { ratio: f32 },
    /// Linear decay with beam length.
    DistanceDecay { falloff_per_meter: f32 },
}

impl Default for EfficiencyPolicy {
    fn default() -> Self {
        EfficiencyPolicy::Fixed { ratio: 1.0 }
    }
}

impl EfficiencyPolicy {
    /// Efficiency for a beam of the given squared length, clamped to
    /// `[EFFICIENCY_FLOOR, 1.0]`.
    pub fn efficiency(&self, distance_squared: f32) -> f32 {
        let raw = match *self {
            EfficiencyPolicy::Fixed { ratio } => ratio,
            EfficiencyPolicy::DistanceDecay { falloff_per_meter } => {
                1.0 - falloff_per_meter * distance_squared.max(0.0).sqrt()
            }
        };
        raw.clamp(EFFICIENCY_FLOOR, 1.0)
    }

    /// Scale an item count, rounding down. Full efficiency keeps the count
    /// exact.
    pub fn scale(&self, amount: u32, distance_squared: f32) -> u32 {
        let efficiency = self.efficiency(distance_squared);
        if efficiency >= 1.0 {
            return amount;
        }
        (f64::from(amount) * f64::from(efficiency)).floor() as u32
    }
}

/// Constants of the tool power model. Figures are in megawatts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConstants {
    /// Draw of a tool with no active beam.
    pub idle: f32,
    /// Fixed draw per active beam.
    pub beam_base: f32,
    /// Distance-scaled draw per active beam, before normalization.
    pub scaling: f32,
    /// Squared distance that maps to one unit of `scaling`.
    pub normalization: f32,
    /// Multiplier for assemblies mounted on a mobile platform.
    pub mobile_factor: f32,
}

impl Default for PowerConstants {
    fn default() -> Self {
        Self {
            idle: 0.002,
            beam_base: 0.01,
            scaling: 0.05,
            normalization: 2500.0, // 50 m beam
            mobile_factor: 2.0,
        }
    }
}

/// Session-wide dry-dock configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// Integrity added per beam per tick before the mode multiplier.
    pub weld_rate: f32,
    /// Integrity removed per beam per tick before the mode multiplier.
    pub grind_rate: f32,
    /// Share of the weld amount spent repairing deformation.
    pub deform_repair_fraction: f32,
    /// Salvage/weld efficiency hook.
    pub efficiency: EfficiencyPolicy,
    pub power: PowerConstants,
    /// Seconds between orchestrator ticks.
    pub tick_seconds: f64,
    /// Seconds between cargo reconciliation passes (one assembly per pass).
    pub cargo_seconds: f64,
    /// Upper bound for the per-tool beam count setting.
    pub max_beams: usize,
    /// Block categories never used as component sources.
    pub cargo_denylist: Vec<BlockCategory>,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            weld_rate: 2.0,
            grind_rate: 4.0,
            deform_repair_fraction: 0.1,
            efficiency: EfficiencyPolicy::default(),
            power: PowerConstants::default(),
            tick_seconds: 0.5,
            cargo_seconds: 5.0,
            max_beams: 8,
            cargo_denylist: vec![
                BlockCategory::Reactor,
                BlockCategory::GasTank,
                BlockCategory::GasGenerator,
            ],
        }
    }
}

/// Validation problem in a [`DockConfig`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssue {
    NonPositiveRate { field: &'static str, value: f32 },
    DeformFractionOutOfRange(f32),
    NonPositiveInterval { field: &'static str, value: f64 },
    ZeroMaxBeams,
    NonPositiveNormalization(f32),
    NegativePower { field: &'static str, value: f32 },
}

impl DockConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: DockConfig = serde_json::from_str(json)?;
        let issues = config.validate();
        if issues.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }

    /// Validate the configuration, returning all issues found.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (field, value) in [("weld_rate", self.weld_rate), ("grind_rate", self.grind_rate)] {
            if !(value > 0.0 && value.is_finite()) {
                issues.push(ConfigIssue::NonPositiveRate { field, value });
            }
        }
        if !(0.0..=1.0).contains(&self.deform_repair_fraction) {
            issues.push(ConfigIssue::DeformFractionOutOfRange(self.deform_repair_fraction));
        }
        for (field, value) in [
            ("tick_seconds", self.tick_seconds),
            ("cargo_seconds", self.cargo_seconds),
        ] {
            if !(value > 0.0) {
                issues.push(ConfigIssue::NonPositiveInterval { field, value });
            }
        }
        if self.max_beams == 0 {
            issues.push(ConfigIssue::ZeroMaxBeams);
        }
        if !(self.power.normalization > 0.0) {
            issues.push(ConfigIssue::NonPositiveNormalization(self.power.normalization));
        }
        for (field, value) in [
            ("power.idle", self.power.idle),
            ("power.beam_base", self.power.beam_base),
            ("power.scaling", self.power.scaling),
            ("power.mobile_factor", self.power.mobile_factor),
        ] {
            if value < 0.0 {
                issues.push(ConfigIssue::NegativePower { field, value });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DockConfig::default().validate().is_empty());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = DockConfig::from_json_str(r#"{ "grind_rate": 10.0 }"#).unwrap();
        assert_eq!(config.grind_rate, 10.0);
        assert_eq!(config.weld_rate, DockConfig::default().weld_rate);
        assert_eq!(config.cargo_denylist.len(), 3);
    }

    #[test]
    fn test_efficiency_policy_from_json() {
        let config = DockConfig::from_json_str(
            r#"{ "efficiency": { "kind": "distance_decay", "falloff_per_meter": 0.01 } }"#,
        )
        .unwrap();
        assert_eq!(
            config.efficiency,
            EfficiencyPolicy::DistanceDecay {
                falloff_per_meter: 0.01
            }
        );
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let config = DockConfig {
            weld_rate: 0.0,
            deform_repair_fraction: 1.5,
            max_beams: 0,
            ..DockConfig::default()
        };
        let issues = config.validate();
        assert!(issues.contains(&ConfigIssue::NonPositiveRate {
            field: "weld_rate",
            value: 0.0
        }));
        assert!(issues.contains(&ConfigIssue::DeformFractionOutOfRange(1.5)));
        assert!(issues.contains(&ConfigIssue::ZeroMaxBeams));
    }

    #[test]
    fn test_invalid_json_config_is_rejected() {
        let err = DockConfig::from_json_str(r#"{ "tick_seconds": -1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = DockConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_efficiency_floor_applies() {
        let decay = EfficiencyPolicy::DistanceDecay {
            falloff_per_meter: 0.1,
        };
        // 100 m beam would go negative without the floor.
        assert_eq!(decay.efficiency(10_000.0), EFFICIENCY_FLOOR);
        assert_eq!(EfficiencyPolicy::default().scale(7, 10_000.0), 7);
        assert_eq!(decay.scale(10, 25.0), 5);
    }

    #[test]
    fn test_scale_keeps_large_counts_exact() {
        let huge = (1u32 << 24) + 1;
        assert_eq!(EfficiencyPolicy::default().scale(huge, 0.0), huge);
        assert_eq!(EfficiencyPolicy::Fixed { ratio: 1.0 }.scale(u32::MAX, 0.0), u32::MAX);
        let half = EfficiencyPolicy::Fixed { ratio: 0.5 };
        assert_eq!(half.scale(huge, 0.0), 1 << 23);
    }
}
