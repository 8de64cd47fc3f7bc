//! Read-mostly content records: learning topics, tissue items, case
//! studies, challenges and quiz questions, plus the bundled sample catalog.
//!
//! Records carry an `id` assigned by the store. Records built by hand or
//! loaded from JSON leave it at `0` until inserted.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::quiz::Question;

/// Sample content loaded into a fresh store.
const SAMPLE_CATALOG_JSON: &str = include_str!("../../../data/sample_catalog.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnTopic {
    #[serde(default)]
    pub id: u64,
    pub title: String,
    pub content: String,
    pub bullet_points: Vec<String>,
    pub read_time_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TissueItem {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub cell_type: String,
    pub print_time_hours: f32,
    pub bio_ink: String,
    pub lab_name: String,
    /// Percentage, 0–100.
    pub success_rate: u8,
    #[serde(default)]
    pub model_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudy {
    #[serde(default)]
    pub id: u64,
    pub title: String,
    pub location: String,
    pub date: String,
    pub patient_profile: String,
    pub organ: String,
    pub materials: String,
    pub technique: String,
    pub outcome: String,
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Quiz,
    Game,
    Simulation,
}

impl ChallengeKind {
    pub fn from_name(name: &str) -> Option<ChallengeKind> {
        match name.to_ascii_lowercase().as_str() {
            "quiz" => Some(ChallengeKind::Quiz),
            "game" => Some(ChallengeKind::Game),
            "simulation" => Some(ChallengeKind::Simulation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    #[serde(default)]
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
    pub points: u32,
    pub difficulty: Difficulty,
}

/// Tissue catalog filter. Unset fields match everything.
///
/// `category`, `cell_type`, `bio_ink` and `lab_name` must match exactly.
/// `search` is a case-insensitive substring of the name or description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TissueFilter {
    pub category: Option<String>,
    pub cell_type: Option<String>,
    pub bio_ink: Option<String>,
    pub lab_name: Option<String>,
    pub search: Option<String>,
}

impl TissueFilter {
    pub fn matches(&self, item: &TissueItem) -> bool {
        let exact = |wanted: &Option<String>, actual: &str| {
            wanted.as_deref().map_or(true, |w| w == actual)
        };
        if !exact(&self.category, &item.category)
            || !exact(&self.cell_type, &item.cell_type)
            || !exact(&self.bio_ink, &item.bio_ink)
            || !exact(&self.lab_name, &item.lab_name)
        {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                item.name.to_lowercase().contains(&term)
                    || item.description.to_lowercase().contains(&term)
            }
        }
    }
}

/// Keep challenges of `kind`, or all of them when `kind` is `None`.
pub fn challenges_of_kind(challenges: &[Challenge], kind: Option<ChallengeKind>) -> Vec<Challenge> {
    challenges
        .iter()
        .filter(|c| kind.map_or(true, |k| c.kind == k))
        .cloned()
        .collect()
}

/// A full set of content records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Catalog {
    pub learn_topics: Vec<LearnTopic>,
    pub tissue_items: Vec<TissueItem>,
    pub case_studies: Vec<CaseStudy>,
    pub challenges: Vec<Challenge>,
    /// Questions of the learn-module quiz, in the order they are asked.
    pub quiz_questions: Vec<Question>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Catalog, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn record_count(&self) -> usize {
        self.learn_topics.len()
            + self.tissue_items.len()
            + self.case_studies.len()
            + self.challenges.len()
            + self.quiz_questions.len()
    }
}

/// The bundled sample catalog.
pub fn sample_catalog() -> Result<Catalog, CatalogError> {
    Catalog::from_json(SAMPLE_CATALOG_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_catalog_loads() {
        let catalog = sample_catalog().unwrap();
        assert_eq!(catalog.learn_topics.len(), 5);
        assert_eq!(catalog.tissue_items.len(), 3);
        assert_eq!(catalog.case_studies.len(), 4);
        assert_eq!(catalog.challenges.len(), 3);
        assert_eq!(catalog.quiz_questions.len(), 5);
        assert_eq!(catalog.record_count(), 20);
        assert!(catalog
            .quiz_questions
            .iter()
            .all(|q| q.correct_answer < q.options.len()));
        assert!(catalog.tissue_items.iter().all(|t| t.success_rate <= 100));
        assert!(catalog.learn_topics.iter().all(|t| !t.bullet_points.is_empty()));
    }

    #[test]
    fn filter_exact_fields_and_search() {
        let catalog = sample_catalog().unwrap();
        let by = |filter: TissueFilter| -> Vec<String> {
            catalog
                .tissue_items
                .iter()
                .filter(|t| filter.matches(t))
                .map(|t| t.name.clone())
                .collect()
        };

        assert_eq!(by(TissueFilter::default()).len(), 3);
        assert_eq!(
            by(TissueFilter {
                category: Some("Dermatology".into()),
                ..Default::default()
            }),
            vec!["Skin Patch"]
        );
        // exact match, not substring
        assert!(by(TissueFilter {
            lab_name: Some("Boston".into()),
            ..Default::default()
        })
        .is_empty());
        assert_eq!(
            by(TissueFilter {
                search: Some("CORNEAL".into()),
                ..Default::default()
            }),
            vec!["Cornea"]
        );
        assert!(by(TissueFilter {
            search: Some("valve".into()),
            bio_ink: Some("Collagen-HA".into()),
            ..Default::default()
        })
        .is_empty());
    }

    #[test]
    fn default_filter_matches_every_item() {
        let catalog = sample_catalog().unwrap();
        let filter = TissueFilter::default();
        assert!(catalog.tissue_items.iter().all(|t| filter.matches(t)));
    }

    #[test]
    fn challenge_kind_filter() {
        let catalog = sample_catalog().unwrap();
        assert_eq!(challenges_of_kind(&catalog.challenges, None).len(), 3);
        let quizzes = challenges_of_kind(&catalog.challenges, Some(ChallengeKind::Quiz));
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].title, "Time Attack Quiz");
        assert_eq!(ChallengeKind::from_name("Simulation"), Some(ChallengeKind::Simulation));
        assert_eq!(ChallengeKind::from_name("all"), None);
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        assert!(matches!(
            Catalog::from_json("{\"challenges\": [{\"title\": 3}]}"),
            Err(CatalogError::Malformed(_))
        ));
    }
}
