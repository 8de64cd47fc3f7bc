//! Outcome estimator for simulated organ implantation.
//!
//! Three bio-ink sliders (collagen %, scaffold density, growth factors),
//! each 0–100, adjust an organ's baseline values. The result is four
//! percentages clamped to 1–100 and a five-stage recovery timeline.
//!
//! ```
//! use bioprint_logic::organs::Organ;
//! use bioprint_logic::simulation::estimate;
//!
//! let out = estimate(Organ::HeartValve, 0, 0, 0).unwrap();
//! assert_eq!(out.rejection_probability, 15);
//! assert_eq!(out.integration_success, 80);
//! assert!(out.timeline.day14 && !out.timeline.day30);
//! ```
//!
//! # Scaffold density
//!
//! Scaffold density above [`SCAFFOLD_IMPEDANCE_THRESHOLD`] impedes
//! integration instead of helping it, so the integration modifier flips
//! sign between 80 and 81. The jump is intentional.

use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;
use crate::organs::Organ;

/// Module id used when recording simulation runs as progress.
pub const SIMULATE_MODULE: &str = "simulate";

/// Upper bound of every slider.
pub const SLIDER_MAX: i64 = 100;

/// Scaffold densities strictly above this value reduce integration.
pub const SCAFFOLD_IMPEDANCE_THRESHOLD: u8 = 80;

/// Overall-score thresholds (strict) for the day 14, 30 and 90 stages.
pub const DAY14_THRESHOLD: f64 = 60.0;
pub const DAY30_THRESHOLD: f64 = 75.0;
pub const DAY90_THRESHOLD: f64 = 85.0;

/// Validated estimator input. Construct with [`SimulationInput::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    organ: Organ,
    collagen_pct: u8,
    scaffold_density: u8,
    growth_factor_level: u8,
}

impl SimulationInput {
    /// Range-check the sliders. Values outside 0–100 are rejected, not clamped.
    pub fn new(
        organ: Organ,
        collagen_pct: i64,
        scaffold_density: i64,
        growth_factor_level: i64,
    ) -> Result<Self, InvalidInput> {
        Ok(Self {
            organ,
            collagen_pct: slider("collagenPct", collagen_pct)?,
            scaffold_density: slider("scaffoldDensity", scaffold_density)?,
            growth_factor_level: slider("growthFactorLevel", growth_factor_level)?,
        })
    }

    pub fn organ(&self) -> Organ {
        self.organ
    }

    pub fn collagen_pct(&self) -> u8 {
        self.collagen_pct
    }

    pub fn scaffold_density(&self) -> u8 {
        self.scaffold_density
    }

    pub fn growth_factor_level(&self) -> u8 {
        self.growth_factor_level
    }

    /// Run the estimator on this input.
    pub fn run(&self) -> SimulationOutput {
        let base = self.organ.baseline();
        let collagen = f64::from(self.collagen_pct);
        let scaffold = f64::from(self.scaffold_density);
        let growth = f64::from(self.growth_factor_level);

        // Collagen lowers rejection and improves integration.
        let rejection_mod = -0.1 * collagen;
        let integration_mod = 0.12 * collagen;
        // Scaffold density improves stability.
        let stability_mod = 0.15 * scaffold;
        let integration_scaffold_mod = scaffold_integration_modifier(self.scaffold_density);
        // Growth factors improve functional recovery and integration.
        let functional_mod = 0.2 * growth;
        let integration_growth_mod = 0.1 * growth;

        let rejection = clamp_round(base.rejection + rejection_mod);
        let integration = clamp_round(
            base.integration + integration_mod + integration_scaffold_mod + integration_growth_mod,
        );
        let functional = clamp_round(base.functional + functional_mod);
        let stability = clamp_round(base.stability + stability_mod);

        let overall =
            (f64::from(integration) + f64::from(functional) + f64::from(stability)) / 3.0;

        SimulationOutput {
            rejection_probability: rejection,
            integration_success: integration,
            functional_recovery: functional,
            long_term_stability: stability,
            timeline: Timeline::from_score(overall),
        }
    }
}

impl Default for SimulationInput {
    /// Starting slider positions of the simulate screen.
    fn default() -> Self {
        Self {
            organ: Organ::HeartValve,
            collagen_pct: 68,
            scaffold_density: 50,
            growth_factor_level: 75,
        }
    }
}

fn slider(field: &'static str, value: i64) -> Result<u8, InvalidInput> {
    if (0..=SLIDER_MAX).contains(&value) {
        Ok(value as u8)
    } else {
        Err(InvalidInput::SliderOutOfRange { field, value })
    }
}

fn clamp_round(value: f64) -> u8 {
    value.clamp(1.0, 100.0).round() as u8
}

/// Integration contribution of scaffold density.
///
/// Positive up to [`SCAFFOLD_IMPEDANCE_THRESHOLD`], negative above it.
pub fn scaffold_integration_modifier(scaffold_density: u8) -> f64 {
    let scaffold = f64::from(scaffold_density);
    if scaffold_density > SCAFFOLD_IMPEDANCE_THRESHOLD {
        -0.05 * scaffold
    } else {
        0.05 * scaffold
    }
}

/// Post-procedure checkpoints. Day 1 and day 7 always complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub day1: bool,
    pub day7: bool,
    pub day14: bool,
    pub day30: bool,
    pub day90: bool,
}

impl Timeline {
    /// Gate the later stages on the overall score (strict comparisons).
    pub fn from_score(overall: f64) -> Self {
        Self {
            day1: true,
            day7: true,
            day14: overall > DAY14_THRESHOLD,
            day30: overall > DAY30_THRESHOLD,
            day90: overall > DAY90_THRESHOLD,
        }
    }

    /// `(day, completed)` pairs in chronological order.
    fn stages(&self) -> [(u16, bool); 5] {
        [
            (1, self.day1),
            (7, self.day7),
            (14, self.day14),
            (30, self.day30),
            (90, self.day90),
        ]
    }

    pub fn completed_stages(&self) -> usize {
        self.stages().iter().filter(|(_, done)| *done).count()
    }
}

/// Estimated outcome percentages, each in 1–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutput {
    pub rejection_probability: u8,
    pub integration_success: u8,
    pub functional_recovery: u8,
    pub long_term_stability: u8,
    pub timeline: Timeline,
}

impl SimulationOutput {
    /// Mean of integration, functional recovery and stability.
    pub fn overall_score(&self) -> f64 {
        (f64::from(self.integration_success)
            + f64::from(self.functional_recovery)
            + f64::from(self.long_term_stability))
            / 3.0
    }
}

/// Estimate implantation outcomes for an organ and three slider values.
///
/// Fails with [`InvalidInput::SliderOutOfRange`] when any slider is
/// outside 0–100.
pub fn estimate(
    organ: Organ,
    collagen_pct: i64,
    scaffold_density: i64,
    growth_factor_level: i64,
) -> Result<SimulationOutput, InvalidInput> {
    SimulationInput::new(organ, collagen_pct, scaffold_density, growth_factor_level)
        .map(|input| input.run())
}

/// Qualitative slider label shown next to scaffold and growth-factor values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DensityLabel {
    Low,
    Medium,
    High,
}

pub fn density_label(value: u8) -> DensityLabel {
    if value < 33 {
        DensityLabel::Low
    } else if value < 66 {
        DensityLabel::Medium
    } else {
        DensityLabel::High
    }
}

/// Progress item id recorded after simulating `organ`, e.g. `simulation_heart_valve`.
pub fn completion_item_id(organ: Organ) -> String {
    format!("simulation_{}", organ.key())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heart_valve_baseline_at_zero_sliders() {
        let out = estimate(Organ::HeartValve, 0, 0, 0).unwrap();
        assert_eq!(out.rejection_probability, 15);
        assert_eq!(out.integration_success, 80);
        assert_eq!(out.functional_recovery, 70);
        assert_eq!(out.long_term_stability, 75);
        // overall = 75, which is not strictly above the day 30 threshold
        assert_eq!(
            out.timeline,
            Timeline {
                day1: true,
                day7: true,
                day14: true,
                day30: false,
                day90: false,
            }
        );
    }

    #[test]
    fn skin_patch_maxed_clamps_to_100() {
        let out = estimate(Organ::SkinPatch, 100, 100, 100).unwrap();
        // 90 + 12 - 5 + 10 = 107
        assert_eq!(out.integration_success, 100);
        assert_eq!(out.functional_recovery, 100);
        assert_eq!(out.long_term_stability, 100);
        // 8 - 10 = -2
        assert_eq!(out.rejection_probability, 1);
        assert_eq!(out.timeline.completed_stages(), 5);
    }

    #[test]
    fn early_stages_always_complete() {
        let timeline = Timeline::from_score(0.0);
        assert_eq!(timeline.completed_stages(), 2);
        let days: Vec<u16> = timeline.stages().iter().map(|(day, _)| *day).collect();
        assert_eq!(days, [1, 7, 14, 30, 90]);
        assert_eq!(Timeline::from_score(DAY90_THRESHOLD).completed_stages(), 4);
    }

    #[test]
    fn default_row_organs_share_results() {
        let liver = estimate(Organ::LiverSegment, 40, 60, 20).unwrap();
        let cartilage = estimate(Organ::Cartilage, 40, 60, 20).unwrap();
        assert_eq!(liver, cartilage);
        // 10 - 4 = 6
        assert_eq!(liver.rejection_probability, 6);
        // 85 + 4.8 + 3 + 2 = 94.8
        assert_eq!(liver.integration_success, 95);
        // 80 + 4
        assert_eq!(liver.functional_recovery, 84);
        // 85 + 9
        assert_eq!(liver.long_term_stability, 94);
    }

    #[test]
    fn scaffold_modifier_flips_sign_above_80() {
        assert!((scaffold_integration_modifier(80) - 4.0).abs() < 1e-9);
        assert!((scaffold_integration_modifier(81) + 4.05).abs() < 1e-9);
        assert_eq!(scaffold_integration_modifier(0), 0.0);

        let at = estimate(Organ::HeartValve, 0, 80, 0).unwrap();
        let above = estimate(Organ::HeartValve, 0, 81, 0).unwrap();
        assert_eq!(at.integration_success, 84);
        assert_eq!(above.integration_success, 76);
        // stability keeps rising across the boundary
        assert_eq!(at.long_term_stability, 87);
        assert_eq!(above.long_term_stability, 87);
    }

    #[test]
    fn out_of_range_sliders_rejected() {
        assert_eq!(
            estimate(Organ::Cornea, 101, 0, 0),
            Err(InvalidInput::SliderOutOfRange {
                field: "collagenPct",
                value: 101
            })
        );
        assert_eq!(
            estimate(Organ::Cornea, 0, -1, 0),
            Err(InvalidInput::SliderOutOfRange {
                field: "scaffoldDensity",
                value: -1
            })
        );
        assert!(estimate(Organ::Cornea, 0, 0, 1000).is_err());
        assert!(estimate(Organ::Cornea, 100, 100, 100).is_ok());
    }

    #[test]
    fn default_input_matches_screen_defaults() {
        let input = SimulationInput::default();
        assert_eq!(input.organ(), Organ::HeartValve);
        assert_eq!(
            (
                input.collagen_pct(),
                input.scaffold_density(),
                input.growth_factor_level()
            ),
            (68, 50, 75)
        );
        let out = input.run();
        // 15 - 6.8
        assert_eq!(out.rejection_probability, 8);
        // 80 + 8.16 + 2.5 + 7.5 = 98.16
        assert_eq!(out.integration_success, 98);
        // 70 + 15
        assert_eq!(out.functional_recovery, 85);
        // 75 + 7.5
        assert_eq!(out.long_term_stability, 83);
    }

    #[test]
    fn timeline_thresholds_are_strict() {
        let t = Timeline::from_score(60.0);
        assert!(t.day1 && t.day7 && !t.day14);
        assert!(Timeline::from_score(60.01).day14);
        assert!(!Timeline::from_score(85.0).day90);
        assert!(Timeline::from_score(85.5).day90);
    }

    #[test]
    fn density_labels() {
        assert_eq!(density_label(0), DensityLabel::Low);
        assert_eq!(density_label(32), DensityLabel::Low);
        assert_eq!(density_label(33), DensityLabel::Medium);
        assert_eq!(density_label(65), DensityLabel::Medium);
        assert_eq!(density_label(66), DensityLabel::High);
    }

    #[test]
    fn completion_item_ids() {
        assert_eq!(completion_item_id(Organ::HeartValve), "simulation_heart_valve");
        assert_eq!(completion_item_id(Organ::Cornea), "simulation_cornea");
    }
}
