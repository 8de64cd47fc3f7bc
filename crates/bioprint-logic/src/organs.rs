//! Organ targets for the outcome estimator and their baseline values.
//!
//! Each organ maps to a fixed row of baseline percentages. Organs without
//! a dedicated row fall back to [`DEFAULT_BASELINE`].
//!
//! ```
//! use bioprint_logic::organs::{Organ, DEFAULT_BASELINE};
//!
//! assert_eq!(Organ::HeartValve.baseline().rejection, 15.0);
//! assert_eq!(Organ::Cartilage.baseline(), DEFAULT_BASELINE);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;

/// Tissue or organ targeted by a simulated implantation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Organ {
    HeartValve = 0,
    SkinPatch = 1,
    Cornea = 2,
    LiverSegment = 3,
    Cartilage = 4,
}

impl Organ {
    /// All organs in display order.
    pub const ALL: [Organ; 5] = [
        Organ::HeartValve,
        Organ::SkinPatch,
        Organ::Cornea,
        Organ::LiverSegment,
        Organ::Cartilage,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Organ::HeartValve => "Heart Valve",
            Organ::SkinPatch => "Skin Patch",
            Organ::Cornea => "Cornea",
            Organ::LiverSegment => "Liver Segment",
            Organ::Cartilage => "Cartilage",
        }
    }

    /// Snake-case key, e.g. `heart_valve`.
    pub fn key(self) -> &'static str {
        match self {
            Organ::HeartValve => "heart_valve",
            Organ::SkinPatch => "skin_patch",
            Organ::Cornea => "cornea",
            Organ::LiverSegment => "liver_segment",
            Organ::Cartilage => "cartilage",
        }
    }

    /// Parse an organ from its display name or key.
    ///
    /// Case, spaces, dashes and underscores are ignored, so `"Heart Valve"`,
    /// `"heart_valve"` and `"heart-valve"` all resolve to [`Organ::HeartValve`].
    pub fn from_name(name: &str) -> Result<Organ, InvalidInput> {
        let wanted = normalize(name);
        Organ::ALL
            .into_iter()
            .find(|o| normalize(o.key()) == wanted)
            .ok_or_else(|| InvalidInput::UnknownOrgan {
                name: name.to_string(),
            })
    }

    /// Decode the `u8` representation used in database rows.
    pub fn from_u8(value: u8) -> Option<Organ> {
        Organ::ALL.get(value as usize).copied()
    }

    /// Baseline outcome values for this organ.
    pub fn baseline(self) -> Baseline {
        BASELINES
            .iter()
            .find(|(organ, _)| *organ == self)
            .map(|(_, row)| *row)
            .unwrap_or(DEFAULT_BASELINE)
    }
}

impl std::fmt::Display for Organ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Baseline percentages before any bio-ink modifiers are applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub rejection: f64,
    pub integration: f64,
    pub functional: f64,
    pub stability: f64,
}

/// Row used for organs without a dedicated entry in the table.
pub const DEFAULT_BASELINE: Baseline = Baseline {
    rejection: 10.0,
    integration: 85.0,
    functional: 80.0,
    stability: 85.0,
};

const BASELINES: [(Organ, Baseline); 3] = [
    (
        Organ::HeartValve,
        Baseline {
            rejection: 15.0,
            integration: 80.0,
            functional: 70.0,
            stability: 75.0,
        },
    ),
    (
        Organ::SkinPatch,
        Baseline {
            rejection: 8.0,
            integration: 90.0,
            functional: 85.0,
            stability: 88.0,
        },
    ),
    (
        Organ::Cornea,
        Baseline {
            rejection: 12.0,
            integration: 85.0,
            functional: 78.0,
            stability: 82.0,
        },
    ),
];

/// Baseline for a free-form organ name, using the default row when the
/// name is not recognized.
pub fn baseline_for_name(name: &str) -> Baseline {
    Organ::from_name(name)
        .map(Organ::baseline)
        .unwrap_or(DEFAULT_BASELINE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_names_and_keys() {
        for organ in Organ::ALL {
            assert_eq!(Organ::from_name(organ.display_name()), Ok(organ));
            assert_eq!(Organ::from_name(organ.key()), Ok(organ));
        }
        assert_eq!(Organ::from_name("heart-valve"), Ok(Organ::HeartValve));
        assert_eq!(Organ::from_name("  LIVER segment "), Ok(Organ::LiverSegment));
    }

    #[test]
    fn unknown_organ_is_invalid() {
        assert_eq!(
            Organ::from_name("Kidney"),
            Err(InvalidInput::UnknownOrgan {
                name: "Kidney".into()
            })
        );
    }

    #[test]
    fn organs_without_row_use_default() {
        assert_eq!(Organ::LiverSegment.baseline(), DEFAULT_BASELINE);
        assert_eq!(Organ::Cartilage.baseline(), DEFAULT_BASELINE);
        assert_eq!(baseline_for_name("Kidney"), DEFAULT_BASELINE);
        assert_eq!(baseline_for_name("Skin Patch").integration, 90.0);
    }

    #[test]
    fn lenient_lookup_parses_like_from_name() {
        assert_eq!(baseline_for_name("heart_valve"), Organ::HeartValve.baseline());
        assert_eq!(baseline_for_name(""), DEFAULT_BASELINE);
    }

    #[test]
    fn u8_roundtrip() {
        for organ in Organ::ALL {
            assert_eq!(Organ::from_u8(organ as u8), Some(organ));
        }
        assert_eq!(Organ::from_u8(5), None);
    }
}
