//! Experience points, levels and the per-learner progress ledger.
//!
//! Levels are a pure function of the cumulative experience-point total:
//!
//! | Level | Name | XP range |
//! |-------|------|----------|
//! | 1 | Novice | 0–999 |
//! | 2 | BioScientist | 1000–2499 |
//! | 3 | BioEngineer | 2500–4999 |
//! | 4 | BioMaster | 5000–9999 |
//! | 5 | BioVisionary | 10000+ |
//!
//! ```
//! use bioprint_logic::progression::level_for;
//!
//! let state = level_for(1750);
//! assert_eq!(state.level, 2);
//! assert_eq!(state.level_name, "BioScientist");
//! assert_eq!(state.percent_to_next_level, 50);
//! ```
//!
//! # Awards
//!
//! Completing a tracked item grants [`XpAwards::item_completion`] and
//! earning a badge grants [`XpAwards::badge`]. A badge is earned at most
//! once. Level fields are recomputed from the total after every award.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::badges::BadgeType;

/// One row of the level table. `max_xp == None` marks the open-ended top tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTier {
    pub level: u8,
    pub name: &'static str,
    pub min_xp: u64,
    pub max_xp: Option<u64>,
}

impl LevelTier {
    pub fn contains(&self, xp: u64) -> bool {
        xp >= self.min_xp && self.max_xp.map_or(true, |max| xp <= max)
    }
}

pub const LEVELS: [LevelTier; 5] = [
    LevelTier {
        level: 1,
        name: "Novice",
        min_xp: 0,
        max_xp: Some(999),
    },
    LevelTier {
        level: 2,
        name: "BioScientist",
        min_xp: 1000,
        max_xp: Some(2499),
    },
    LevelTier {
        level: 3,
        name: "BioEngineer",
        min_xp: 2500,
        max_xp: Some(4999),
    },
    LevelTier {
        level: 4,
        name: "BioMaster",
        min_xp: 5000,
        max_xp: Some(9999),
    },
    LevelTier {
        level: 5,
        name: "BioVisionary",
        min_xp: 10000,
        max_xp: None,
    },
];

/// Derived level view of an experience-point total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionState {
    pub experience_points: u64,
    pub level: u8,
    pub level_name: String,
    pub percent_to_next_level: u8,
}

/// First tier whose range contains `xp`.
pub fn tier_for(xp: u64) -> &'static LevelTier {
    LEVELS
        .iter()
        .find(|tier| tier.contains(xp))
        .unwrap_or(&LEVELS[0])
}

/// Level, level name and percent-to-next-level for an xp total.
pub fn level_for(xp: u64) -> ProgressionState {
    let tier = tier_for(xp);
    let percent = match tier.max_xp {
        None => 100,
        Some(max) => {
            let span = (max - tier.min_xp) as f64;
            let into = (xp - tier.min_xp) as f64;
            (100.0 * into / span).round().clamp(0.0, 100.0) as u8
        }
    };
    ProgressionState {
        experience_points: xp,
        level: tier.level,
        level_name: tier.name.to_string(),
        percent_to_next_level: percent,
    }
}

/// Fixed xp amounts granted per tracked action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct XpAwards {
    pub item_completion: u64,
    pub badge: u64,
}

impl Default for XpAwards {
    fn default() -> Self {
        Self {
            item_completion: 100,
            badge: 250,
        }
    }
}

/// A learner's xp total and earned badges.
///
/// Only the total is stored; level fields come from [`level_for`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressLedger {
    experience_points: u64,
    badges: BTreeSet<BadgeType>,
}

impl ProgressLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a persisted total and badge set.
    pub fn from_parts(experience_points: u64, badges: impl IntoIterator<Item = BadgeType>) -> Self {
        Self {
            experience_points,
            badges: badges.into_iter().collect(),
        }
    }

    pub fn experience_points(&self) -> u64 {
        self.experience_points
    }

    pub fn badges(&self) -> impl Iterator<Item = BadgeType> + '_ {
        self.badges.iter().copied()
    }

    pub fn has_badge(&self, badge: BadgeType) -> bool {
        self.badges.contains(&badge)
    }

    pub fn state(&self) -> ProgressionState {
        level_for(self.experience_points)
    }

    /// Grant the item-completion award.
    pub fn complete_item(&mut self, awards: &XpAwards) -> ProgressionState {
        self.experience_points = self
            .experience_points
            .saturating_add(awards.item_completion);
        self.state()
    }

    /// Grant a badge and its award. Returns `false` if it was already earned,
    /// in which case nothing changes.
    pub fn award_badge(&mut self, badge: BadgeType, awards: &XpAwards) -> bool {
        if !self.badges.insert(badge) {
            return false;
        }
        self.experience_points = self.experience_points.saturating_add(awards.badge);
        true
    }

    /// Apply everything one action earns: the completion award when
    /// `item_completed`, then each badge. Returns the newly earned badges.
    pub fn reward(
        &mut self,
        item_completed: bool,
        badges: impl IntoIterator<Item = BadgeType>,
        awards: &XpAwards,
    ) -> Vec<BadgeType> {
        if item_completed {
            self.complete_item(awards);
        }
        badges
            .into_iter()
            .filter(|badge| self.award_badge(*badge, awards))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_boundaries() {
        let s = level_for(0);
        assert_eq!((s.level, s.level_name.as_str(), s.percent_to_next_level), (1, "Novice", 0));

        let s = level_for(999);
        assert_eq!((s.level, s.percent_to_next_level), (1, 100));

        let s = level_for(1000);
        assert_eq!((s.level, s.level_name.as_str(), s.percent_to_next_level), (2, "BioScientist", 0));

        let s = level_for(2500);
        assert_eq!((s.level, s.level_name.as_str()), (3, "BioEngineer"));

        let s = level_for(9999);
        assert_eq!((s.level, s.level_name.as_str(), s.percent_to_next_level), (4, "BioMaster", 100));

        let s = level_for(10000);
        assert_eq!((s.level, s.level_name.as_str(), s.percent_to_next_level), (5, "BioVisionary", 100));

        let s = level_for(15000);
        assert_eq!((s.level, s.percent_to_next_level), (5, 100));
    }

    #[test]
    fn percent_interpolates_within_tier() {
        // 1450 xp: 450 of 1499 into tier 2
        assert_eq!(level_for(1450).percent_to_next_level, 30);
        // 3750: 1250 of 2499 -> 50.02
        assert_eq!(level_for(3750).percent_to_next_level, 50);
        assert_eq!(level_for(500).percent_to_next_level, 50);
    }

    #[test]
    fn level_for_is_pure() {
        assert_eq!(level_for(4321), level_for(4321));
    }

    #[test]
    fn tiers_cover_every_total_in_order() {
        for pair in LEVELS.windows(2) {
            assert_eq!(pair[0].max_xp.map(|m| m + 1), Some(pair[1].min_xp));
        }
        assert_eq!(tier_for(u64::MAX).level, 5);
    }

    #[test]
    fn item_completion_adds_fixed_award() {
        let awards = XpAwards::default();
        let mut ledger = ProgressLedger::new();
        for _ in 0..9 {
            ledger.complete_item(&awards);
        }
        assert_eq!(ledger.state().level, 1);
        let state = ledger.complete_item(&awards);
        assert_eq!(state.experience_points, 1000);
        assert_eq!(state.level, 2);
    }

    #[test]
    fn badge_award_is_idempotent() {
        let awards = XpAwards::default();
        let mut ledger = ProgressLedger::new();
        assert!(ledger.award_badge(BadgeType::HeartHero, &awards));
        assert!(!ledger.award_badge(BadgeType::HeartHero, &awards));
        assert_eq!(ledger.experience_points(), 250);
        assert!(ledger.has_badge(BadgeType::HeartHero));

        assert!(ledger.award_badge(BadgeType::QuizMaster, &awards));
        assert_eq!(ledger.experience_points(), 500);
        assert_eq!(ledger.badges().count(), 2);
    }

    #[test]
    fn reward_applies_completion_and_badges_together() {
        let awards = XpAwards::default();
        let mut ledger = ProgressLedger::from_parts(0, [BadgeType::HeartHero]);
        let earned = ledger.reward(
            true,
            [BadgeType::HeartHero, BadgeType::SimulationExpert],
            &awards,
        );
        assert_eq!(earned, vec![BadgeType::SimulationExpert]);
        assert_eq!(ledger.experience_points(), 350);

        let earned = ledger.reward(true, [BadgeType::SimulationExpert], &awards);
        assert!(earned.is_empty());
        assert_eq!(ledger.experience_points(), 450);

        assert!(ledger.reward(false, Vec::new(), &awards).is_empty());
        assert_eq!(ledger.experience_points(), 450);
    }

    #[test]
    fn ledger_resumes_from_parts() {
        let awards = XpAwards::default();
        let mut ledger =
            ProgressLedger::from_parts(1450, [BadgeType::HeartHero, BadgeType::QuizMaster]);
        assert_eq!(ledger.state().level_name, "BioScientist");
        assert!(!ledger.award_badge(BadgeType::QuizMaster, &awards));
        assert_eq!(ledger.complete_item(&awards).experience_points, 1550);
    }
}
