//! Badge catalog and the rules that hand badges out.
//!
//! Badges are one-time achievements. The rules here only decide *which*
//! badges an event qualifies for; deduplication and xp awards happen in
//! [`crate::progression::ProgressLedger`] or the store.

use serde::{Deserialize, Serialize};

use crate::catalog::{Challenge, ChallengeKind};
use crate::organs::Organ;
use crate::simulation::SimulationOutput;

/// Module id for challenge progress items.
pub const CHALLENGES_MODULE: &str = "challenges";

/// Integration, functional and stability floors (strict) for [`BadgeType::SimulationExpert`].
pub const EXPERT_INTEGRATION: u8 = 90;
pub const EXPERT_FUNCTIONAL: u8 = 85;
pub const EXPERT_STABILITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeType {
    SkinSavior,
    HeartHero,
    CorneaCreator,
    QuizMaster,
    SimulationExpert,
}

/// Display metadata for a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

impl BadgeType {
    pub const ALL: [BadgeType; 5] = [
        BadgeType::SkinSavior,
        BadgeType::HeartHero,
        BadgeType::CorneaCreator,
        BadgeType::QuizMaster,
        BadgeType::SimulationExpert,
    ];

    pub fn info(self) -> BadgeInfo {
        match self {
            BadgeType::SkinSavior => BadgeInfo {
                key: "skin_savior",
                name: "Skin Savior",
                description: "Successfully simulated a skin graft implantation",
                icon: "🧪",
            },
            BadgeType::HeartHero => BadgeInfo {
                key: "heart_hero",
                name: "Heart Hero",
                description: "Completed all heart valve learning modules",
                icon: "❤️",
            },
            BadgeType::CorneaCreator => BadgeInfo {
                key: "cornea_creator",
                name: "Cornea Creator",
                description: "Achieved 90% success rate in cornea bioprinting",
                icon: "👁️",
            },
            BadgeType::QuizMaster => BadgeInfo {
                key: "quiz_master",
                name: "Quiz Master",
                description: "Earned 100% on the bioprinting materials quiz",
                icon: "🧠",
            },
            BadgeType::SimulationExpert => BadgeInfo {
                key: "simulation_expert",
                name: "Simulation Expert",
                description: "Completed 10 successful organ implant simulations",
                icon: "🧬",
            },
        }
    }

    pub fn key(self) -> &'static str {
        self.info().key
    }

    pub fn from_key(key: &str) -> Option<BadgeType> {
        BadgeType::ALL.into_iter().find(|b| b.key() == key)
    }
}

impl std::fmt::Display for BadgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Badge tied to simulating a specific organ, if any.
pub fn organ_badge(organ: Organ) -> Option<BadgeType> {
    match organ {
        Organ::HeartValve => Some(BadgeType::HeartHero),
        Organ::SkinPatch => Some(BadgeType::SkinSavior),
        Organ::Cornea => Some(BadgeType::CorneaCreator),
        Organ::LiverSegment | Organ::Cartilage => None,
    }
}

/// Whether a simulation result is good enough for [`BadgeType::SimulationExpert`].
pub fn is_expert_result(output: &SimulationOutput) -> bool {
    output.integration_success > EXPERT_INTEGRATION
        && output.functional_recovery > EXPERT_FUNCTIONAL
        && output.long_term_stability > EXPERT_STABILITY
}

/// Badges a simulation run qualifies for, organ badge first.
pub fn badges_for_simulation(organ: Organ, output: &SimulationOutput) -> Vec<BadgeType> {
    let mut earned: Vec<BadgeType> = organ_badge(organ).into_iter().collect();
    if is_expert_result(output) {
        earned.push(BadgeType::SimulationExpert);
    }
    earned
}

/// Badge granted for starting a challenge, if any.
pub fn badge_for_challenge(challenge: &Challenge) -> Option<BadgeType> {
    match challenge.kind {
        ChallengeKind::Quiz if challenge.title.contains("Time Attack") => {
            Some(BadgeType::QuizMaster)
        }
        ChallengeKind::Simulation if challenge.title.contains("Simulation Challenge") => {
            Some(BadgeType::SimulationExpert)
        }
        _ => None,
    }
}

/// Progress item id recorded when a challenge is started.
pub fn challenge_item_id(challenge_id: u64) -> String {
    format!("start_challenge_{challenge_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Difficulty;
    use crate::simulation::estimate;

    fn challenge(kind: ChallengeKind, title: &str) -> Challenge {
        Challenge {
            id: 7,
            title: title.into(),
            description: String::new(),
            kind,
            points: 100,
            difficulty: Difficulty::Easy,
        }
    }

    #[test]
    fn keys_roundtrip() {
        for badge in BadgeType::ALL {
            assert_eq!(BadgeType::from_key(badge.key()), Some(badge));
        }
        assert_eq!(BadgeType::from_key("gold_star"), None);
    }

    #[test]
    fn serde_uses_keys() {
        let json = serde_json::to_string(&BadgeType::SimulationExpert).unwrap();
        assert_eq!(json, "\"simulation_expert\"");
    }

    #[test]
    fn organ_badges() {
        let out = estimate(Organ::HeartValve, 0, 0, 0).unwrap();
        assert_eq!(badges_for_simulation(Organ::HeartValve, &out), vec![BadgeType::HeartHero]);
        let out = estimate(Organ::Cartilage, 0, 0, 0).unwrap();
        assert!(badges_for_simulation(Organ::Cartilage, &out).is_empty());
    }

    #[test]
    fn expert_badge_needs_all_three_strictly_above() {
        let out = estimate(Organ::SkinPatch, 100, 70, 100).unwrap();
        assert!(is_expert_result(&out));
        assert_eq!(
            badges_for_simulation(Organ::SkinPatch, &out),
            vec![BadgeType::SkinSavior, BadgeType::SimulationExpert]
        );

        // Heart valve at zero sliders: integration 80
        let out = estimate(Organ::HeartValve, 0, 0, 0).unwrap();
        assert!(!is_expert_result(&out));
    }

    #[test]
    fn challenge_badges() {
        assert_eq!(
            badge_for_challenge(&challenge(ChallengeKind::Quiz, "Time Attack Quiz")),
            Some(BadgeType::QuizMaster)
        );
        assert_eq!(
            badge_for_challenge(&challenge(ChallengeKind::Simulation, "Simulation Challenge")),
            Some(BadgeType::SimulationExpert)
        );
        assert_eq!(
            badge_for_challenge(&challenge(ChallengeKind::Game, "Time Attack Quiz")),
            None
        );
        assert_eq!(challenge_item_id(3), "start_challenge_3");
    }
}
