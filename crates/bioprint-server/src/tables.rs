//! SpacetimeDB table definitions for BioPrint Academy.
//!
//! Each table mirrors a record type from bioprint-logic. Enumerations
//! (organs, challenge kinds, difficulty) are stored as `u8` codes; badge
//! types are stored by their string key so clients can read them directly.

use bioprint_logic::catalog::{CaseStudy, Challenge, ChallengeKind, Difficulty, LearnTopic, TissueItem};
use bioprint_logic::quiz::Question;
use spacetimedb::{table, Identity, Timestamp};

// ============================================================================
// SETTINGS
// ============================================================================

/// Award settings singleton (id always 0)
#[table(name = app_settings, public)]
#[derive(Clone)]
pub struct AppSettings {
    #[primary_key]
    pub id: u32,
    pub item_completion_xp: u64,
    pub badge_xp: u64,
    pub quiz_pass_percent: u8,
}

// ============================================================================
// LEARNERS
// ============================================================================

/// Registered learner, one per client identity
#[table(name = learner, public)]
#[derive(Clone)]
pub struct Learner {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    #[unique]
    pub owner: Identity,
    #[unique]
    pub username: String,
    pub experience_points: u64,
    pub last_active_at: Timestamp,
}

/// A tracked item a learner touched in one of the content modules
#[table(name = user_progress, public)]
pub struct UserProgress {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    #[index(btree)]
    pub user_id: u64,
    pub module_id: String,
    pub item_id: String,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
}

/// Badge earned by a learner. At most one row per (user, badge).
#[table(name = user_badge, public)]
pub struct UserBadge {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    #[index(btree)]
    pub user_id: u64,
    /// Badge key, e.g. `heart_hero`
    pub badge_type: String,
    pub earned_at: Timestamp,
}

/// One outcome estimate requested by a learner
#[table(name = simulation_run, public)]
pub struct SimulationRun {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    #[index(btree)]
    pub user_id: u64,
    pub organ: u8,
    pub collagen_pct: u8,
    pub scaffold_density: u8,
    pub growth_factor_level: u8,
    pub rejection_probability: u8,
    pub integration_success: u8,
    pub functional_recovery: u8,
    pub long_term_stability: u8,
    pub day14: bool,
    pub day30: bool,
    pub day90: bool,
    pub ran_at: Timestamp,
}

/// Connected client session
#[table(name = connected_client, public)]
pub struct ConnectedClient {
    #[primary_key]
    pub identity: Identity,
    pub learner_id: Option<u64>,
    pub connected_at: Timestamp,
}

// ============================================================================
// CATALOG
// ============================================================================

#[table(name = learn_topic, public)]
pub struct LearnTopicRow {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub title: String,
    pub content: String,
    pub bullet_points: Vec<String>,
    pub read_time_minutes: u32,
}

#[table(name = tissue_item, public)]
pub struct TissueItemRow {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: Option<String>,
    pub cell_type: String,
    pub print_time_hours: f32,
    pub bio_ink: String,
    pub lab_name: String,
    pub success_rate: u8,
    pub model_url: Option<String>,
}

#[table(name = case_study, public)]
pub struct CaseStudyRow {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub title: String,
    pub location: String,
    pub date: String,
    pub patient_profile: String,
    pub organ: String,
    pub materials: String,
    pub technique: String,
    pub outcome: String,
    pub video_url: Option<String>,
}

#[table(name = challenge, public)]
#[derive(Clone)]
pub struct ChallengeRow {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub title: String,
    pub description: String,
    pub challenge_type: u8,
    pub points: u32,
    pub difficulty: u8,
}

/// Learn-module quiz question. Questions are asked in `id` order.
#[table(name = quiz_question, public)]
pub struct QuizQuestionRow {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    #[unique]
    pub question_key: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: u32,
    pub explanation: String,
}

// ============================================================================
// ROW CONVERSIONS
// ============================================================================

impl From<LearnTopic> for LearnTopicRow {
    fn from(t: LearnTopic) -> Self {
        Self {
            id: 0,
            title: t.title,
            content: t.content,
            bullet_points: t.bullet_points,
            read_time_minutes: t.read_time_minutes,
        }
    }
}

impl From<TissueItem> for TissueItemRow {
    fn from(t: TissueItem) -> Self {
        Self {
            id: 0,
            name: t.name,
            description: t.description,
            category: t.category,
            image_url: t.image_url,
            cell_type: t.cell_type,
            print_time_hours: t.print_time_hours,
            bio_ink: t.bio_ink,
            lab_name: t.lab_name,
            success_rate: t.success_rate,
            model_url: t.model_url,
        }
    }
}

impl From<CaseStudy> for CaseStudyRow {
    fn from(c: CaseStudy) -> Self {
        Self {
            id: 0,
            title: c.title,
            location: c.location,
            date: c.date,
            patient_profile: c.patient_profile,
            organ: c.organ,
            materials: c.materials,
            technique: c.technique,
            outcome: c.outcome,
            video_url: c.video_url,
        }
    }
}

impl From<Challenge> for ChallengeRow {
    fn from(c: Challenge) -> Self {
        Self {
            id: 0,
            title: c.title,
            description: c.description,
            challenge_type: challenge_types::encode(c.kind),
            points: c.points,
            difficulty: difficulty::encode(c.difficulty),
        }
    }
}

impl From<Question> for QuizQuestionRow {
    fn from(q: Question) -> Self {
        Self {
            id: 0,
            question_key: q.id,
            question: q.question,
            options: q.options,
            correct_answer: q.correct_answer as u32,
            explanation: q.explanation,
        }
    }
}

impl QuizQuestionRow {
    pub fn to_question(&self) -> Question {
        Question {
            id: self.question_key.clone(),
            question: self.question.clone(),
            options: self.options.clone(),
            correct_answer: self.correct_answer as usize,
            explanation: self.explanation.clone(),
        }
    }
}

impl ChallengeRow {
    /// Back to the logic record. `None` if a code is unknown.
    pub fn to_challenge(&self) -> Option<Challenge> {
        Some(Challenge {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            kind: challenge_types::decode(self.challenge_type)?,
            points: self.points,
            difficulty: difficulty::decode(self.difficulty)?,
        })
    }
}

// ============================================================================
// ENUM CONSTANTS
// ============================================================================

pub mod challenge_types {
    use super::ChallengeKind;

    pub const QUIZ: u8 = 0;
    pub const GAME: u8 = 1;
    pub const SIMULATION: u8 = 2;

    pub fn encode(kind: ChallengeKind) -> u8 {
        match kind {
            ChallengeKind::Quiz => QUIZ,
            ChallengeKind::Game => GAME,
            ChallengeKind::Simulation => SIMULATION,
        }
    }

    pub fn decode(code: u8) -> Option<ChallengeKind> {
        match code {
            QUIZ => Some(ChallengeKind::Quiz),
            GAME => Some(ChallengeKind::Game),
            SIMULATION => Some(ChallengeKind::Simulation),
            _ => None,
        }
    }
}

pub mod difficulty {
    use super::Difficulty;

    pub const EASY: u8 = 0;
    pub const MEDIUM: u8 = 1;
    pub const HARD: u8 = 2;

    pub fn encode(d: Difficulty) -> u8 {
        match d {
            Difficulty::Easy => EASY,
            Difficulty::Medium => MEDIUM,
            Difficulty::Hard => HARD,
        }
    }

    pub fn decode(code: u8) -> Option<Difficulty> {
        match code {
            EASY => Some(Difficulty::Easy),
            MEDIUM => Some(Difficulty::Medium),
            HARD => Some(Difficulty::Hard),
            _ => None,
        }
    }
}
