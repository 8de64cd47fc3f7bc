//! Learner records: users, progress entries and earned badges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::badges::{BadgeInfo, BadgeType};
use crate::progression::{level_for, ProgressionState};

/// Stored learner. `password` is kept verbatim and never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub experience_points: u64,
    pub last_active_at: DateTime<Utc>,
}

impl User {
    pub fn progression(&self) -> ProgressionState {
        level_for(self.experience_points)
    }
}

/// Registration / login payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    /// Field problems, empty when the payload is usable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.username.trim().is_empty() {
            problems.push("username is required".to_string());
        }
        if self.password.is_empty() {
            problems.push("password is required".to_string());
        }
        problems
    }
}

/// Public user view with derived level fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: u64,
    pub username: String,
    pub experience_points: u64,
    pub level: u8,
    pub level_name: String,
    pub last_active_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        let progression = user.progression();
        Self {
            id: user.id,
            username: user.username.clone(),
            experience_points: user.experience_points,
            level: progression.level,
            level_name: progression.level_name,
            last_active_at: user.last_active_at,
        }
    }
}

/// A tracked item a learner touched in one of the content modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub user_id: u64,
    pub module_id: String,
    pub item_id: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressEntry {
    /// A completed entry stamped `now`.
    pub fn completed(user_id: u64, module_id: &str, item_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            user_id,
            module_id: module_id.to_string(),
            item_id,
            completed: true,
            completed_at: Some(now),
        }
    }

    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.module_id.trim().is_empty() {
            problems.push("moduleId is required".to_string());
        }
        if self.item_id.trim().is_empty() {
            problems.push("itemId is required".to_string());
        }
        problems
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadge {
    pub id: u64,
    pub user_id: u64,
    #[serde(rename = "badgeType")]
    pub badge: BadgeType,
    pub earned_at: DateTime<Utc>,
}

/// Everything the profile screen shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user: UserView,
    pub progression: ProgressionState,
    pub badges: Vec<BadgeInfo>,
    pub completed_items: usize,
}

impl Profile {
    pub fn build(user: &User, badges: &[EarnedBadge], progress: &[ProgressEntry]) -> Self {
        Self {
            user: UserView::from(user),
            progression: user.progression(),
            badges: badges.iter().map(|b| b.badge.info()).collect(),
            completed_items: progress.iter().filter(|p| p.completed).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(xp: u64) -> User {
        User {
            id: 1,
            username: "ada".into(),
            password: "secret".into(),
            experience_points: xp,
            last_active_at: Utc::now(),
        }
    }

    #[test]
    fn password_never_serialized() {
        let json = serde_json::to_value(user(0)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "ada");
    }

    #[test]
    fn view_carries_derived_level() {
        let view = UserView::from(&user(2600));
        assert_eq!(view.level, 3);
        assert_eq!(view.level_name, "BioEngineer");
    }

    #[test]
    fn credential_problems() {
        assert!(Credentials {
            username: "ada".into(),
            password: "pw".into()
        }
        .problems()
        .is_empty());
        assert_eq!(Credentials::default().problems().len(), 2);
        let blank = Credentials {
            username: "   ".into(),
            password: "pw".into(),
        };
        assert_eq!(blank.problems(), vec!["username is required".to_string()]);
    }

    #[test]
    fn profile_counts_completed_items() {
        let u = user(1450);
        let now = Utc::now();
        let progress = vec![
            ProgressEntry::completed(1, "learn", "quiz_intro".into(), now),
            ProgressEntry {
                id: 2,
                user_id: 1,
                module_id: "explore".into(),
                item_id: "tissue_1".into(),
                completed: false,
                completed_at: None,
            },
        ];
        let badges = vec![EarnedBadge {
            id: 1,
            user_id: 1,
            badge: BadgeType::HeartHero,
            earned_at: now,
        }];
        let profile = Profile::build(&u, &badges, &progress);
        assert_eq!(profile.completed_items, 1);
        assert_eq!(profile.progression.level_name, "BioScientist");
        assert_eq!(profile.badges[0].name, "Heart Hero");
    }
}
