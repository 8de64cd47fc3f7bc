//! Transport-agnostic REST routing.
//!
//! [`Api::handle`] maps an [`ApiRequest`] (method, path, query, JSON body)
//! to an [`ApiResponse`] (status, JSON body). Any transport (stdin JSON
//! lines, an HTTP listener, tests) can drive it.
//!
//! Error bodies are `{ "message": ... }`; body validation failures add an
//! `"errors"` list.
//!
//! ```
//! use bioprint_logic::api::{Api, ApiRequest};
//! use bioprint_logic::config::AppConfig;
//!
//! let api = Api::in_memory(AppConfig::default()).unwrap();
//! let resp = api.handle(&ApiRequest::get("/api/learn/topics"));
//! assert_eq!(resp.status, 200);
//! assert_eq!(resp.body.as_array().unwrap().len(), 5);
//! ```

use std::collections::BTreeMap;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::accounts::{Credentials, EarnedBadge, ProgressEntry, Profile, User, UserView};
use crate::badges::{
    badge_for_challenge, badges_for_simulation, challenge_item_id, BadgeType, CHALLENGES_MODULE,
};
use crate::catalog::{challenges_of_kind, sample_catalog, Challenge, ChallengeKind, TissueFilter};
use crate::config::AppConfig;
use crate::error::{InvalidInput, SetupError, StoreError};
use crate::organs::Organ;
use crate::progression::ProgressionState;
use crate::quiz::{self, AnswerFeedback, QuestionPrompt, QuizResult, QuizSession, LEARN_MODULE};
use crate::simulation::{self, SimulationInput, SimulationOutput, SIMULATE_MODULE};
use crate::store::{MemStore, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Value,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: BTreeMap::new(),
            body: Value::Null,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: BTreeMap::new(),
            body,
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `message` field of an error body.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{message}")]
    BadRequest {
        message: String,
        errors: Vec<String>,
    },

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest { .. } | ApiError::InvalidInput(_) => 400,
            ApiError::Unauthorized => 401,
            ApiError::MethodNotAllowed => 405,
            ApiError::Store(StoreError::UserNotFound { .. }) => 404,
            ApiError::Store(StoreError::DuplicateUsername { .. }) => 409,
            ApiError::Store(StoreError::BadgeAlreadyEarned { .. }) => 409,
            ApiError::Store(StoreError::DuplicateQuestion { .. }) => 409,
            ApiError::Store(StoreError::LockPoisoned) | ApiError::Encode(_) => 500,
        }
    }

    fn bad_request(message: &str, errors: Vec<String>) -> Self {
        ApiError::BadRequest {
            message: message.to_string(),
            errors,
        }
    }

    pub fn into_response(self) -> ApiResponse {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest { message, errors } if !errors.is_empty() => {
                json!({ "message": message, "errors": errors })
            }
            ApiError::InvalidInput(err) => {
                json!({ "message": "Invalid simulation input", "errors": [err.to_string()] })
            }
            ApiError::Store(StoreError::UserNotFound { .. }) => json!({ "message": "User not found" }),
            ApiError::Store(StoreError::DuplicateUsername { .. }) => {
                json!({ "message": "Username already exists" })
            }
            ApiError::Store(StoreError::LockPoisoned) | ApiError::Encode(_) => {
                json!({ "message": "Internal server error" })
            }
            other => json!({ "message": other.to_string() }),
        };
        ApiResponse { status, body }
    }
}

type ApiResult = Result<ApiResponse, ApiError>;

/// Body of `POST /api/simulate` and `POST /api/users/:id/simulate`.
///
/// Sliders are read as signed integers so out-of-range values reach the
/// estimator's range check instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub organ: String,
    pub collagen_pct: i64,
    pub scaffold_density: i64,
    pub growth_factor_level: i64,
}

impl SimulationRequest {
    pub fn to_input(&self) -> Result<SimulationInput, InvalidInput> {
        SimulationInput::new(
            Organ::from_name(&self.organ)?,
            self.collagen_pct,
            self.scaffold_density,
            self.growth_factor_level,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub output: SimulationOutput,
    pub awarded_badges: Vec<BadgeType>,
    pub progression: ProgressionState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeReport {
    pub challenge: Challenge,
    pub awarded_badges: Vec<BadgeType>,
    pub progression: ProgressionState,
}

/// Body of `POST /api/users/:id/quiz-results`.
///
/// With `answers` (one option index per quiz question) the server grades
/// the quiz and `correct`/`total` are ignored. Without it the client
/// reports its own score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub topic_id: String,
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizReport {
    pub result: QuizResult,
    pub passed: bool,
    pub awarded_badges: Vec<BadgeType>,
    pub progression: ProgressionState,
    /// Per-question outcome, present when the server graded the answers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feedback: Vec<AnswerFeedback>,
}

#[derive(Debug, Deserialize)]
struct BadgeRequest {
    #[serde(rename = "badgeType")]
    badge_type: String,
}

/// Request router over a [`Store`].
pub struct Api<S> {
    store: S,
    config: AppConfig,
}

impl Api<MemStore> {
    /// In-memory API, seeded with the sample catalog when the config asks for it.
    pub fn in_memory(config: AppConfig) -> Result<Self, SetupError> {
        let problems = config.validate();
        if !problems.is_empty() {
            let problems = problems
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(SetupError::InvalidConfig { problems });
        }
        let store = if config.seed_sample_data {
            MemStore::with_catalog(sample_catalog()?)?
        } else {
            MemStore::new()
        };
        Ok(Self::new(store, config))
    }
}

impl<S: Store> Api<S> {
    pub fn new(store: S, config: AppConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Route one request. Never panics; failures become error responses.
    pub fn handle(&self, req: &ApiRequest) -> ApiResponse {
        log::debug!("{:?} {}", req.method, req.path);
        match self.route(req) {
            Ok(resp) => resp,
            Err(err) => {
                let status = err.status();
                if status >= 500 {
                    log::error!("{:?} {} failed: {}", req.method, req.path, err);
                } else {
                    log::warn!("{:?} {} -> {}: {}", req.method, req.path, status, err);
                }
                err.into_response()
            }
        }
    }

    fn route(&self, req: &ApiRequest) -> ApiResult {
        let path = req.path.split('?').next().unwrap_or_default();
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match segments.as_slice() {
            // --- Learn ---
            ["api", "learn", "topics"] => {
                allow(req, Method::Get)?;
                respond(200, &self.store.learn_topics()?)
            }
            ["api", "learn", "topics", id] => {
                allow(req, Method::Get)?;
                found(self.store.learn_topic(parse_id(id)?)?, "Topic not found")
            }
            ["api", "learn", "quiz"] => {
                allow(req, Method::Get)?;
                let prompts: Vec<QuestionPrompt> =
                    self.store.quiz_questions()?.iter().map(QuestionPrompt::from).collect();
                respond(200, &prompts)
            }

            // --- Explore ---
            ["api", "explore", "tissues"] => {
                allow(req, Method::Get)?;
                let filter = tissue_filter(&req.query);
                respond(200, &self.store.tissue_items(&filter)?)
            }
            ["api", "explore", "tissues", id] => {
                allow(req, Method::Get)?;
                found(self.store.tissue_item(parse_id(id)?)?, "Tissue not found")
            }

            // --- BioCase ---
            ["api", "biocase", "studies"] => {
                allow(req, Method::Get)?;
                respond(200, &self.store.case_studies()?)
            }
            ["api", "biocase", "studies", id] => {
                allow(req, Method::Get)?;
                found(self.store.case_study(parse_id(id)?)?, "Case study not found")
            }

            // --- Challenges ---
            ["api", "challenges"] => {
                allow(req, Method::Get)?;
                let kind = challenge_kind(&req.query)?;
                respond(200, &challenges_of_kind(&self.store.challenges()?, kind))
            }
            ["api", "challenges", id] => {
                allow(req, Method::Get)?;
                found(self.store.challenge(parse_id(id)?)?, "Challenge not found")
            }

            // --- Simulate ---
            ["api", "simulate"] => {
                allow(req, Method::Post)?;
                let request: SimulationRequest = parse_body(&req.body, "Invalid simulation data")?;
                let output = request.to_input()?.run();
                respond(200, &output)
            }

            // --- Users ---
            ["api", "users", "register"] => {
                allow(req, Method::Post)?;
                self.register(&req.body)
            }
            ["api", "users", "login"] => {
                allow(req, Method::Post)?;
                self.login(&req.body)
            }
            ["api", "users", id, "progress"] => match req.method {
                Method::Get => {
                    let user = self.require_user(parse_id(id)?)?;
                    respond(200, &self.store.progress_for(user.id)?)
                }
                Method::Post => self.record_progress(parse_id(id)?, &req.body),
                _ => Err(ApiError::MethodNotAllowed),
            },
            ["api", "users", id, "badges"] => match req.method {
                Method::Get => {
                    let user = self.require_user(parse_id(id)?)?;
                    respond(200, &self.store.badges_for(user.id)?)
                }
                Method::Post => self.post_badge(parse_id(id)?, &req.body),
                _ => Err(ApiError::MethodNotAllowed),
            },
            ["api", "users", id, "profile"] => {
                allow(req, Method::Get)?;
                let user = self.require_user(parse_id(id)?)?;
                let badges = self.store.badges_for(user.id)?;
                let progress = self.store.progress_for(user.id)?;
                respond(200, &Profile::build(&user, &badges, &progress))
            }
            ["api", "users", id, "simulate"] => {
                allow(req, Method::Post)?;
                self.simulate_for(parse_id(id)?, &req.body)
            }
            ["api", "users", id, "challenges", challenge_id, "start"] => {
                allow(req, Method::Post)?;
                self.start_challenge(parse_id(id)?, parse_id(challenge_id)?)
            }
            ["api", "users", id, "quiz-results"] => {
                allow(req, Method::Post)?;
                self.submit_quiz(parse_id(id)?, &req.body)
            }

            _ => Err(ApiError::NotFound("Not found")),
        }
    }

    fn register(&self, body: &Value) -> ApiResult {
        let credentials: Credentials = parse_body(body, "Invalid user data")?;
        let problems = credentials.problems();
        if !problems.is_empty() {
            return Err(ApiError::bad_request("Invalid user data", problems));
        }
        let user = self.store.create_user(credentials)?;
        respond(201, &UserView::from(&user))
    }

    fn login(&self, body: &Value) -> ApiResult {
        let credentials: Credentials = parse_body(body, "Username and password are required")?;
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(ApiError::bad_request(
                "Username and password are required",
                Vec::new(),
            ));
        }
        match self.store.user_by_username(&credentials.username)? {
            Some(user) if user.password == credentials.password => {
                log::info!("User {} logged in", user.id);
                respond(200, &UserView::from(&user))
            }
            _ => Err(ApiError::Unauthorized),
        }
    }

    fn record_progress(&self, user_id: u64, body: &Value) -> ApiResult {
        let user = self.require_user(user_id)?;
        let mut entry: ProgressEntry = parse_body(body, "Invalid progress data")?;
        let problems = entry.problems();
        if !problems.is_empty() {
            return Err(ApiError::bad_request("Invalid progress data", problems));
        }
        entry.user_id = user.id;
        if entry.completed && entry.completed_at.is_none() {
            entry.completed_at = Some(Utc::now());
        }
        let completed = entry.completed;
        let stored = self.store.create_progress(entry)?;
        if completed {
            self.store
                .add_experience(user.id, self.config.awards.item_completion)?;
        }
        respond(201, &stored)
    }

    fn post_badge(&self, user_id: u64, body: &Value) -> ApiResult {
        let user = self.require_user(user_id)?;
        let request: BadgeRequest = parse_body(body, "Invalid badge data")?;
        let badge = BadgeType::from_key(&request.badge_type).ok_or_else(|| {
            ApiError::bad_request(
                "Invalid badge data",
                vec![format!("unknown badge type: {}", request.badge_type)],
            )
        })?;
        match self.grant_badge(user.id, badge)? {
            Some(earned) => respond(201, &earned),
            None => {
                let existing = self
                    .store
                    .badges_for(user.id)?
                    .into_iter()
                    .find(|b| b.badge == badge);
                respond(200, &existing)
            }
        }
    }

    fn simulate_for(&self, user_id: u64, body: &Value) -> ApiResult {
        let user = self.require_user(user_id)?;
        let request: SimulationRequest = parse_body(body, "Invalid simulation data")?;
        let input = request.to_input()?;
        let output = input.run();
        log::info!(
            "User {} simulated {} (collagen {}, scaffold {}, growth {})",
            user.id,
            input.organ(),
            input.collagen_pct(),
            input.scaffold_density(),
            input.growth_factor_level()
        );

        self.complete_item(
            user.id,
            SIMULATE_MODULE,
            simulation::completion_item_id(input.organ()),
        )?;
        let awarded_badges = self.grant_all(user.id, badges_for_simulation(input.organ(), &output))?;
        let progression = self.require_user(user.id)?.progression();
        respond(
            200,
            &SimulationReport {
                output,
                awarded_badges,
                progression,
            },
        )
    }

    fn start_challenge(&self, user_id: u64, challenge_id: u64) -> ApiResult {
        let user = self.require_user(user_id)?;
        let challenge = self
            .store
            .challenge(challenge_id)?
            .ok_or(ApiError::NotFound("Challenge not found"))?;
        self.complete_item(user.id, CHALLENGES_MODULE, challenge_item_id(challenge.id))?;
        let awarded_badges = self.grant_all(user.id, badge_for_challenge(&challenge))?;
        let progression = self.require_user(user.id)?.progression();
        respond(
            200,
            &ChallengeReport {
                challenge,
                awarded_badges,
                progression,
            },
        )
    }

    fn submit_quiz(&self, user_id: u64, body: &Value) -> ApiResult {
        let user = self.require_user(user_id)?;
        let submission: QuizSubmission = parse_body(body, "Invalid quiz result")?;
        let (result, feedback) = match &submission.answers {
            Some(answers) => self.grade_answers(&submission.topic_id, answers)?,
            None => (reported_result(&submission)?, Vec::new()),
        };
        let pass_percent = self.config.quiz_pass_percent;
        self.complete_item(
            user.id,
            LEARN_MODULE,
            quiz::completion_item_id(&submission.topic_id),
        )?;
        let awarded_badges = self.grant_all(user.id, result.badge(pass_percent))?;
        let progression = self.require_user(user.id)?.progression();
        respond(
            200,
            &QuizReport {
                result,
                passed: result.passed(pass_percent),
                awarded_badges,
                progression,
                feedback,
            },
        )
    }

    /// Score submitted answers against the stored quiz questions.
    fn grade_answers(
        &self,
        topic_id: &str,
        answers: &[usize],
    ) -> Result<(QuizResult, Vec<AnswerFeedback>), ApiError> {
        if topic_id.trim().is_empty() {
            return Err(ApiError::bad_request(
                "Invalid quiz result",
                vec!["topicId is required".to_string()],
            ));
        }
        let questions = self.store.quiz_questions()?;
        if questions.is_empty() {
            return Err(ApiError::NotFound("Quiz not found"));
        }
        QuizSession::new(topic_id, questions)
            .answer_all(answers)
            .map_err(|err| ApiError::bad_request("Invalid quiz answers", vec![err.to_string()]))
    }

    fn require_user(&self, user_id: u64) -> Result<User, ApiError> {
        self.store
            .user(user_id)?
            .ok_or(ApiError::NotFound("User not found"))
    }

    /// Record a completed item and grant the completion award.
    fn complete_item(&self, user_id: u64, module_id: &str, item_id: String) -> Result<User, ApiError> {
        let entry = ProgressEntry::completed(user_id, module_id, item_id, Utc::now());
        self.store.create_progress(entry)?;
        Ok(self
            .store
            .add_experience(user_id, self.config.awards.item_completion)?)
    }

    /// Earn a badge once. `None` when the user already had it.
    fn grant_badge(&self, user_id: u64, badge: BadgeType) -> Result<Option<EarnedBadge>, ApiError> {
        match self.store.create_badge(user_id, badge) {
            Ok(earned) => {
                self.store.add_experience(user_id, self.config.awards.badge)?;
                log::info!("User {} earned badge {}", user_id, badge);
                Ok(Some(earned))
            }
            Err(StoreError::BadgeAlreadyEarned { .. }) => {
                log::debug!("User {} already has badge {}", user_id, badge);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Grant each badge, returning the ones that were newly earned.
    fn grant_all(
        &self,
        user_id: u64,
        badges: impl IntoIterator<Item = BadgeType>,
    ) -> Result<Vec<BadgeType>, ApiError> {
        let mut awarded = Vec::new();
        for badge in badges {
            if self.grant_badge(user_id, badge)?.is_some() {
                awarded.push(badge);
            }
        }
        Ok(awarded)
    }
}

fn allow(req: &ApiRequest, method: Method) -> Result<(), ApiError> {
    if req.method == method {
        Ok(())
    } else {
        Err(ApiError::MethodNotAllowed)
    }
}

fn respond<T: Serialize>(status: u16, body: &T) -> ApiResult {
    Ok(ApiResponse {
        status,
        body: serde_json::to_value(body)?,
    })
}

fn found<T: Serialize>(record: Option<T>, missing: &'static str) -> ApiResult {
    match record {
        Some(record) => respond(200, &record),
        None => Err(ApiError::NotFound(missing)),
    }
}

fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(&format!("Invalid id: {raw}"), Vec::new()))
}

fn parse_body<T: DeserializeOwned>(body: &Value, message: &str) -> Result<T, ApiError> {
    serde_json::from_value(body.clone())
        .map_err(|err| ApiError::bad_request(message, vec![err.to_string()]))
}

/// A client-reported score, checked for consistency.
fn reported_result(submission: &QuizSubmission) -> Result<QuizResult, ApiError> {
    let mut problems = Vec::new();
    if submission.topic_id.trim().is_empty() {
        problems.push("topicId is required".to_string());
    }
    if submission.total == 0 {
        problems.push("total must be positive".to_string());
    }
    if submission.correct > submission.total {
        problems.push("correct cannot exceed total".to_string());
    }
    if !problems.is_empty() {
        return Err(ApiError::bad_request("Invalid quiz result", problems));
    }
    Ok(QuizResult::new(submission.correct, submission.total))
}

fn tissue_filter(query: &BTreeMap<String, String>) -> TissueFilter {
    let field = |key: &str| query.get(key).filter(|v| !v.is_empty()).cloned();
    TissueFilter {
        category: field("category"),
        cell_type: field("cellType"),
        bio_ink: field("bioInk"),
        lab_name: field("labName"),
        search: field("search"),
    }
}

fn challenge_kind(query: &BTreeMap<String, String>) -> Result<Option<ChallengeKind>, ApiError> {
    match query.get("type").or_else(|| query.get("kind")).map(String::as_str) {
        None | Some("") | Some("all") => Ok(None),
        Some(name) => ChallengeKind::from_name(name).map(Some).ok_or_else(|| {
            ApiError::bad_request(
                "Invalid challenge filter",
                vec![format!("unknown challenge type: {name}")],
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> Api<MemStore> {
        Api::in_memory(AppConfig::default()).unwrap()
    }

    #[test]
    fn unknown_path_is_404() {
        let resp = api().handle(&ApiRequest::get("/api/nowhere"));
        assert_eq!(resp.status, 404);
        assert_eq!(resp.message(), Some("Not found"));
    }

    #[test]
    fn wrong_method_is_405() {
        let resp = api().handle(&ApiRequest::post("/api/learn/topics", Value::Null));
        assert_eq!(resp.status, 405);
    }

    #[test]
    fn non_numeric_id_is_400() {
        let resp = api().handle(&ApiRequest::get("/api/learn/topics/abc"));
        assert_eq!(resp.status, 400);
    }

    #[test]
    fn missing_records_use_route_messages() {
        let api = api();
        let cases = [
            ("/api/learn/topics/99", "Topic not found"),
            ("/api/explore/tissues/99", "Tissue not found"),
            ("/api/biocase/studies/99", "Case study not found"),
            ("/api/challenges/99", "Challenge not found"),
            ("/api/users/99/progress", "User not found"),
        ];
        for (path, message) in cases {
            let resp = api.handle(&ApiRequest::get(path));
            assert_eq!(resp.status, 404, "{path}");
            assert_eq!(resp.message(), Some(message), "{path}");
        }
    }

    #[test]
    fn query_string_in_path_is_ignored_for_routing() {
        let resp = api().handle(&ApiRequest::get("/api/challenges?x=1"));
        assert_eq!(resp.status, 200);
    }

    #[test]
    fn anonymous_simulation() {
        let resp = api().handle(&ApiRequest::post(
            "/api/simulate",
            json!({ "organ": "Heart Valve", "collagenPct": 0, "scaffoldDensity": 0, "growthFactorLevel": 0 }),
        ));
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["rejectionProbability"], 15);
        assert_eq!(resp.body["timeline"]["day30"], false);
    }

    #[test]
    fn simulation_input_errors_are_400() {
        let api = api();
        let resp = api.handle(&ApiRequest::post(
            "/api/simulate",
            json!({ "organ": "Heart Valve", "collagenPct": 120, "scaffoldDensity": 0, "growthFactorLevel": 0 }),
        ));
        assert_eq!(resp.status, 400);
        assert_eq!(resp.message(), Some("Invalid simulation input"));

        let resp = api.handle(&ApiRequest::post(
            "/api/simulate",
            json!({ "organ": "Kidney", "collagenPct": 1, "scaffoldDensity": 1, "growthFactorLevel": 1 }),
        ));
        assert_eq!(resp.status, 400);

        let resp = api.handle(&ApiRequest::post("/api/simulate", json!({ "organ": "Cornea" })));
        assert_eq!(resp.status, 400);
        assert_eq!(resp.message(), Some("Invalid simulation data"));
    }

    #[test]
    fn invalid_config_rejected() {
        let config = AppConfig {
            quiz_pass_percent: 101,
            ..AppConfig::default()
        };
        assert!(matches!(
            Api::in_memory(config),
            Err(SetupError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn quiz_listing_hides_answers() {
        let resp = api().handle(&ApiRequest::get("/api/learn/quiz"));
        assert_eq!(resp.status, 200);
        let questions = resp.body.as_array().unwrap();
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0]["question"], "What is bioprinting?");
        assert!(questions.iter().all(|q| q.get("correctAnswer").is_none()));
    }

    #[test]
    fn unseeded_store_is_empty() {
        let api = Api::in_memory(AppConfig {
            seed_sample_data: false,
            ..AppConfig::default()
        })
        .unwrap();
        let resp = api.handle(&ApiRequest::get("/api/learn/topics"));
        assert_eq!(resp.body, json!([]));

        api.store()
            .create_user(Credentials {
                username: "ada".into(),
                password: "pw".into(),
            })
            .unwrap();
        let resp = api.handle(&ApiRequest::post(
            "/api/users/1/quiz-results",
            json!({ "topicId": "1", "answers": [0] }),
        ));
        assert_eq!(resp.status, 404);
        assert_eq!(resp.message(), Some("Quiz not found"));
    }
}
