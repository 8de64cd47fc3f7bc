//! Record store behind the API.
//!
//! [`Store`] is the seam request handlers depend on. [`MemStore`] keeps
//! every table in process memory behind one mutex and hands out
//! auto-incrementing ids per table, starting at 1. Nothing survives the
//! process.
//!
//! Experience-point increments happen under the lock, so concurrent
//! awards never lose updates.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::accounts::{Credentials, EarnedBadge, ProgressEntry, User};
use crate::badges::BadgeType;
use crate::catalog::{CaseStudy, Catalog, Challenge, LearnTopic, TissueFilter, TissueItem};
use crate::error::{StoreError, StoreResult};
use crate::quiz::Question;

/// CRUD access to learner and catalog records.
///
/// `create_*` methods ignore the `id` of the record passed in and return
/// the stored record with its assigned id.
pub trait Store: Send + Sync {
    // --- Users ---
    fn user(&self, id: u64) -> StoreResult<Option<User>>;
    fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    fn create_user(&self, credentials: Credentials) -> StoreResult<User>;
    /// Atomically add `xp` to a user's total and touch `last_active_at`.
    fn add_experience(&self, user_id: u64, xp: u64) -> StoreResult<User>;

    // --- Progress ---
    fn progress_for(&self, user_id: u64) -> StoreResult<Vec<ProgressEntry>>;
    fn create_progress(&self, entry: ProgressEntry) -> StoreResult<ProgressEntry>;

    // --- Badges ---
    fn badges_for(&self, user_id: u64) -> StoreResult<Vec<EarnedBadge>>;
    /// Fails with [`StoreError::BadgeAlreadyEarned`] on a duplicate.
    fn create_badge(&self, user_id: u64, badge: BadgeType) -> StoreResult<EarnedBadge>;

    // --- Catalog ---
    fn learn_topics(&self) -> StoreResult<Vec<LearnTopic>>;
    fn learn_topic(&self, id: u64) -> StoreResult<Option<LearnTopic>>;
    fn create_learn_topic(&self, topic: LearnTopic) -> StoreResult<LearnTopic>;

    fn tissue_items(&self, filter: &TissueFilter) -> StoreResult<Vec<TissueItem>>;
    fn tissue_item(&self, id: u64) -> StoreResult<Option<TissueItem>>;
    fn create_tissue_item(&self, item: TissueItem) -> StoreResult<TissueItem>;

    fn case_studies(&self) -> StoreResult<Vec<CaseStudy>>;
    fn case_study(&self, id: u64) -> StoreResult<Option<CaseStudy>>;
    fn create_case_study(&self, study: CaseStudy) -> StoreResult<CaseStudy>;

    fn challenges(&self) -> StoreResult<Vec<Challenge>>;
    fn challenge(&self, id: u64) -> StoreResult<Option<Challenge>>;
    fn create_challenge(&self, challenge: Challenge) -> StoreResult<Challenge>;

    /// Quiz questions in insertion order.
    fn quiz_questions(&self) -> StoreResult<Vec<Question>>;
    /// Fails with [`StoreError::DuplicateQuestion`] if the question id is taken.
    fn create_quiz_question(&self, question: Question) -> StoreResult<Question>;

    /// Insert every record of `catalog`, returning how many were added.
    fn load_catalog(&self, catalog: Catalog) -> StoreResult<usize> {
        let count = catalog.record_count();
        for topic in catalog.learn_topics {
            self.create_learn_topic(topic)?;
        }
        for item in catalog.tissue_items {
            self.create_tissue_item(item)?;
        }
        for study in catalog.case_studies {
            self.create_case_study(study)?;
        }
        for challenge in catalog.challenges {
            self.create_challenge(challenge)?;
        }
        for question in catalog.quiz_questions {
            self.create_quiz_question(question)?;
        }
        Ok(count)
    }
}

/// Id-keyed table with its own counter.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<u64, T>,
    next_id: u64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(u64) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn get(&self, id: u64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn scan(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|r| keep(r)).cloned().collect()
    }
}

#[derive(Debug)]
struct Tables {
    users: Table<User>,
    progress: Table<ProgressEntry>,
    badges: Table<EarnedBadge>,
    learn_topics: Table<LearnTopic>,
    tissue_items: Table<TissueItem>,
    case_studies: Table<CaseStudy>,
    challenges: Table<Challenge>,
    quiz_questions: Vec<Question>,
}

/// In-memory [`Store`].
#[derive(Debug)]
pub struct MemStore {
    tables: Mutex<Tables>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                users: Table::new(),
                progress: Table::new(),
                badges: Table::new(),
                learn_topics: Table::new(),
                tissue_items: Table::new(),
                case_studies: Table::new(),
                challenges: Table::new(),
                quiz_questions: Vec::new(),
            }),
        }
    }

    /// A store pre-loaded with `catalog`.
    pub fn with_catalog(catalog: Catalog) -> StoreResult<Self> {
        let store = Self::new();
        let count = store.load_catalog(catalog)?;
        log::info!("Seeded store with {} catalog records", count);
        Ok(store)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Store for MemStore {
    fn user(&self, id: u64) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.get(id))
    }

    fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn create_user(&self, credentials: Credentials) -> StoreResult<User> {
        let mut tables = self.lock()?;
        if tables
            .users
            .rows
            .values()
            .any(|u| u.username == credentials.username)
        {
            return Err(StoreError::DuplicateUsername {
                username: credentials.username,
            });
        }
        let user = tables.users.insert_with(|id| User {
            id,
            username: credentials.username,
            password: credentials.password,
            experience_points: 0,
            last_active_at: Utc::now(),
        });
        log::info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    fn add_experience(&self, user_id: u64, xp: u64) -> StoreResult<User> {
        let mut tables = self.lock()?;
        let user = tables
            .users
            .rows
            .get_mut(&user_id)
            .ok_or(StoreError::UserNotFound { user_id })?;
        user.experience_points = user.experience_points.saturating_add(xp);
        user.last_active_at = Utc::now();
        log::debug!(
            "User {} gained {} xp (total {})",
            user_id,
            xp,
            user.experience_points
        );
        Ok(user.clone())
    }

    fn progress_for(&self, user_id: u64) -> StoreResult<Vec<ProgressEntry>> {
        Ok(self.lock()?.progress.scan(|p| p.user_id == user_id))
    }

    fn create_progress(&self, entry: ProgressEntry) -> StoreResult<ProgressEntry> {
        let mut tables = self.lock()?;
        if !tables.users.rows.contains_key(&entry.user_id) {
            return Err(StoreError::UserNotFound {
                user_id: entry.user_id,
            });
        }
        Ok(tables.progress.insert_with(|id| ProgressEntry { id, ..entry }))
    }

    fn badges_for(&self, user_id: u64) -> StoreResult<Vec<EarnedBadge>> {
        Ok(self.lock()?.badges.scan(|b| b.user_id == user_id))
    }

    fn create_badge(&self, user_id: u64, badge: BadgeType) -> StoreResult<EarnedBadge> {
        let mut tables = self.lock()?;
        if !tables.users.rows.contains_key(&user_id) {
            return Err(StoreError::UserNotFound { user_id });
        }
        if tables
            .badges
            .rows
            .values()
            .any(|b| b.user_id == user_id && b.badge == badge)
        {
            return Err(StoreError::BadgeAlreadyEarned {
                user_id,
                badge: badge.key().to_string(),
            });
        }
        Ok(tables.badges.insert_with(|id| EarnedBadge {
            id,
            user_id,
            badge,
            earned_at: Utc::now(),
        }))
    }

    fn learn_topics(&self) -> StoreResult<Vec<LearnTopic>> {
        Ok(self.lock()?.learn_topics.scan(|_| true))
    }

    fn learn_topic(&self, id: u64) -> StoreResult<Option<LearnTopic>> {
        Ok(self.lock()?.learn_topics.get(id))
    }

    fn create_learn_topic(&self, topic: LearnTopic) -> StoreResult<LearnTopic> {
        Ok(self
            .lock()?
            .learn_topics
            .insert_with(|id| LearnTopic { id, ..topic }))
    }

    fn tissue_items(&self, filter: &TissueFilter) -> StoreResult<Vec<TissueItem>> {
        Ok(self.lock()?.tissue_items.scan(|t| filter.matches(t)))
    }

    fn tissue_item(&self, id: u64) -> StoreResult<Option<TissueItem>> {
        Ok(self.lock()?.tissue_items.get(id))
    }

    fn create_tissue_item(&self, item: TissueItem) -> StoreResult<TissueItem> {
        Ok(self
            .lock()?
            .tissue_items
            .insert_with(|id| TissueItem { id, ..item }))
    }

    fn case_studies(&self) -> StoreResult<Vec<CaseStudy>> {
        Ok(self.lock()?.case_studies.scan(|_| true))
    }

    fn case_study(&self, id: u64) -> StoreResult<Option<CaseStudy>> {
        Ok(self.lock()?.case_studies.get(id))
    }

    fn create_case_study(&self, study: CaseStudy) -> StoreResult<CaseStudy> {
        Ok(self
            .lock()?
            .case_studies
            .insert_with(|id| CaseStudy { id, ..study }))
    }

    fn challenges(&self) -> StoreResult<Vec<Challenge>> {
        Ok(self.lock()?.challenges.scan(|_| true))
    }

    fn challenge(&self, id: u64) -> StoreResult<Option<Challenge>> {
        Ok(self.lock()?.challenges.get(id))
    }

    fn create_challenge(&self, challenge: Challenge) -> StoreResult<Challenge> {
        Ok(self
            .lock()?
            .challenges
            .insert_with(|id| Challenge { id, ..challenge }))
    }

    fn quiz_questions(&self) -> StoreResult<Vec<Question>> {
        Ok(self.lock()?.quiz_questions.clone())
    }

    fn create_quiz_question(&self, question: Question) -> StoreResult<Question> {
        let mut tables = self.lock()?;
        if tables.quiz_questions.iter().any(|q| q.id == question.id) {
            return Err(StoreError::DuplicateQuestion { id: question.id });
        }
        tables.quiz_questions.push(question.clone());
        Ok(question)
    }
}
