//! Client-facing reducers. All scoring, badge and level rules come from
//! bioprint-logic; this module only reads and writes rows.

use crate::tables::*;
use bioprint_logic::badges::{
    badge_for_challenge, badges_for_simulation, challenge_item_id, BadgeType, CHALLENGES_MODULE,
};
use bioprint_logic::catalog::sample_catalog;
use bioprint_logic::config::AppConfig;
use bioprint_logic::organs::Organ;
use bioprint_logic::progression::{ProgressLedger, XpAwards};
use bioprint_logic::quiz::{self, QuizResult, QuizSession, LEARN_MODULE};
use bioprint_logic::simulation::{self, estimate, SIMULATE_MODULE};
use spacetimedb::{reducer, ReducerContext, Table};

// ============================================================================
// LIFECYCLE
// ============================================================================

/// Seed settings and the sample catalog on first publish
#[reducer(init)]
pub fn init(ctx: &ReducerContext) -> Result<(), String> {
    let config = AppConfig::default();
    ctx.db.app_settings().insert(AppSettings {
        id: 0,
        item_completion_xp: config.awards.item_completion,
        badge_xp: config.awards.badge,
        quiz_pass_percent: config.quiz_pass_percent,
    });

    if !config.seed_sample_data {
        return Ok(());
    }
    let catalog = sample_catalog().map_err(|e| e.to_string())?;
    let count = catalog.record_count();
    for topic in catalog.learn_topics {
        ctx.db.learn_topic().insert(topic.into());
    }
    for item in catalog.tissue_items {
        ctx.db.tissue_item().insert(item.into());
    }
    for study in catalog.case_studies {
        ctx.db.case_study().insert(study.into());
    }
    for challenge in catalog.challenges {
        ctx.db.challenge().insert(challenge.into());
    }
    for question in catalog.quiz_questions {
        ctx.db.quiz_question().insert(question.into());
    }
    log::info!("Seeded {} catalog records", count);
    Ok(())
}

#[reducer(client_connected)]
pub fn client_connected(ctx: &ReducerContext) {
    log::info!("Client connected: {:?}", ctx.sender);
    let learner_id = ctx.db.learner().owner().find(ctx.sender).map(|l| l.id);
    ctx.db.connected_client().insert(ConnectedClient {
        identity: ctx.sender,
        learner_id,
        connected_at: ctx.timestamp,
    });
}

#[reducer(client_disconnected)]
pub fn client_disconnected(ctx: &ReducerContext) {
    log::info!("Client disconnected: {:?}", ctx.sender);
    ctx.db.connected_client().identity().delete(ctx.sender);
}

// ============================================================================
// LEARNER REDUCERS
// ============================================================================

/// Create the learner for the calling identity
#[reducer]
pub fn register_user(ctx: &ReducerContext, username: String) -> Result<(), String> {
    let username = username.trim().to_string();
    if username.is_empty() {
        return Err("username is required".into());
    }
    if ctx.db.learner().owner().find(ctx.sender).is_some() {
        return Err("Already registered".into());
    }
    if ctx.db.learner().username().find(&username).is_some() {
        return Err("Username already exists".into());
    }

    let learner = ctx.db.learner().insert(Learner {
        id: 0,
        owner: ctx.sender,
        username,
        experience_points: 0,
        last_active_at: ctx.timestamp,
    });
    if let Some(mut client) = ctx.db.connected_client().identity().find(ctx.sender) {
        client.learner_id = Some(learner.id);
        ctx.db.connected_client().identity().update(client);
    }
    log::info!("Registered learner {} ({})", learner.id, learner.username);
    Ok(())
}

/// Record progress on an item; completed items earn the completion award
#[reducer]
pub fn record_progress(
    ctx: &ReducerContext,
    module_id: String,
    item_id: String,
    completed: bool,
) -> Result<(), String> {
    if module_id.trim().is_empty() || item_id.trim().is_empty() {
        return Err("Invalid progress data".into());
    }
    let learner = current_learner(ctx)?;
    if completed {
        reward(ctx, learner, Some((module_id.as_str(), item_id)), None);
    } else {
        ctx.db.user_progress().insert(UserProgress {
            id: 0,
            user_id: learner.id,
            module_id,
            item_id,
            completed: false,
            completed_at: None,
        });
        touch(ctx, learner);
    }
    Ok(())
}

/// Earn a badge by key. Earning one already held is a no-op.
#[reducer]
pub fn award_badge(ctx: &ReducerContext, badge_type: String) -> Result<(), String> {
    let badge = BadgeType::from_key(&badge_type)
        .ok_or_else(|| format!("unknown badge type: {badge_type}"))?;
    let learner = current_learner(ctx)?;
    reward(ctx, learner, None, [badge]);
    Ok(())
}

/// Run the outcome estimator and store the result
#[reducer]
pub fn run_simulation(
    ctx: &ReducerContext,
    organ: String,
    collagen_pct: i64,
    scaffold_density: i64,
    growth_factor_level: i64,
) -> Result<(), String> {
    let organ = Organ::from_name(&organ).map_err(|e| e.to_string())?;
    let output = estimate(organ, collagen_pct, scaffold_density, growth_factor_level)
        .map_err(|e| e.to_string())?;
    let learner = current_learner(ctx)?;

    // Range-checked by `estimate`
    ctx.db.simulation_run().insert(SimulationRun {
        id: 0,
        user_id: learner.id,
        organ: organ as u8,
        collagen_pct: collagen_pct as u8,
        scaffold_density: scaffold_density as u8,
        growth_factor_level: growth_factor_level as u8,
        rejection_probability: output.rejection_probability,
        integration_success: output.integration_success,
        functional_recovery: output.functional_recovery,
        long_term_stability: output.long_term_stability,
        day14: output.timeline.day14,
        day30: output.timeline.day30,
        day90: output.timeline.day90,
        ran_at: ctx.timestamp,
    });
    log::info!(
        "Learner {} simulated {}: integration {}, functional {}, stability {}",
        learner.id,
        organ,
        output.integration_success,
        output.functional_recovery,
        output.long_term_stability
    );

    reward(
        ctx,
        learner,
        Some((SIMULATE_MODULE, simulation::completion_item_id(organ))),
        badges_for_simulation(organ, &output),
    );
    Ok(())
}

#[reducer]
pub fn start_challenge(ctx: &ReducerContext, challenge_id: u64) -> Result<(), String> {
    let row = ctx
        .db
        .challenge()
        .id()
        .find(challenge_id)
        .ok_or("Challenge not found")?;
    let challenge = row
        .to_challenge()
        .ok_or_else(|| format!("Challenge {challenge_id} has an invalid type code"))?;
    let learner = current_learner(ctx)?;
    reward(
        ctx,
        learner,
        Some((CHALLENGES_MODULE, challenge_item_id(challenge.id))),
        badge_for_challenge(&challenge),
    );
    Ok(())
}

/// Record a finished quiz. Passing earns the quiz badge.
#[reducer]
pub fn submit_quiz_result(
    ctx: &ReducerContext,
    topic_id: String,
    correct: u32,
    total: u32,
) -> Result<(), String> {
    if topic_id.trim().is_empty() || total == 0 || correct > total {
        return Err("Invalid quiz result".into());
    }
    let learner = current_learner(ctx)?;
    finish_quiz(ctx, learner, &topic_id, QuizResult::new(correct, total));
    Ok(())
}

/// Grade one option index per quiz question against the stored questions.
#[reducer]
pub fn submit_quiz_answers(
    ctx: &ReducerContext,
    topic_id: String,
    answers: Vec<u32>,
) -> Result<(), String> {
    if topic_id.trim().is_empty() {
        return Err("Invalid quiz result".into());
    }
    let mut rows: Vec<QuizQuestionRow> = ctx.db.quiz_question().iter().collect();
    if rows.is_empty() {
        return Err("Quiz not found".into());
    }
    rows.sort_by_key(|row| row.id);
    let questions = rows.iter().map(QuizQuestionRow::to_question).collect();
    let answers: Vec<usize> = answers.into_iter().map(|a| a as usize).collect();

    let learner = current_learner(ctx)?;
    let (result, _) = QuizSession::new(topic_id.as_str(), questions)
        .answer_all(&answers)
        .map_err(|e| e.to_string())?;
    finish_quiz(ctx, learner, &topic_id, result);
    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

fn current_learner(ctx: &ReducerContext) -> Result<Learner, String> {
    ctx.db
        .learner()
        .owner()
        .find(ctx.sender)
        .ok_or_else(|| "User not found".to_string())
}

fn settings(ctx: &ReducerContext) -> AppSettings {
    ctx.db.app_settings().id().find(0).unwrap_or_else(|| {
        let config = AppConfig::default();
        AppSettings {
            id: 0,
            item_completion_xp: config.awards.item_completion,
            badge_xp: config.awards.badge,
            quiz_pass_percent: config.quiz_pass_percent,
        }
    })
}

fn awards(ctx: &ReducerContext) -> XpAwards {
    let s = settings(ctx);
    XpAwards {
        item_completion: s.item_completion_xp,
        badge: s.badge_xp,
    }
}

fn ledger(ctx: &ReducerContext, learner: &Learner) -> ProgressLedger {
    let badges = ctx
        .db
        .user_badge()
        .user_id()
        .filter(learner.id)
        .filter_map(|b| BadgeType::from_key(&b.badge_type));
    ProgressLedger::from_parts(learner.experience_points, badges)
}

fn touch(ctx: &ReducerContext, mut learner: Learner) -> Learner {
    learner.last_active_at = ctx.timestamp;
    ctx.db.learner().id().update(learner)
}

fn finish_quiz(ctx: &ReducerContext, learner: Learner, topic_id: &str, result: QuizResult) {
    let pass_percent = settings(ctx).quiz_pass_percent;
    log::info!(
        "Learner {} scored {}% on topic {}",
        learner.id,
        result.score_percent,
        topic_id
    );
    reward(
        ctx,
        learner,
        Some((LEARN_MODULE, quiz::completion_item_id(topic_id))),
        result.badge(pass_percent),
    );
}

/// Apply one action's rewards with a single ledger pass: record the
/// completed item (if any), earn each badge not already held, then write
/// the learner row once.
fn reward(
    ctx: &ReducerContext,
    mut learner: Learner,
    completed: Option<(&str, String)>,
    badges: impl IntoIterator<Item = BadgeType>,
) {
    let mut ledger = ledger(ctx, &learner);
    let item_completed = completed.is_some();
    if let Some((module_id, item_id)) = completed {
        ctx.db.user_progress().insert(UserProgress {
            id: 0,
            user_id: learner.id,
            module_id: module_id.to_string(),
            item_id,
            completed: true,
            completed_at: Some(ctx.timestamp),
        });
    }

    for badge in ledger.reward(item_completed, badges, &awards(ctx)) {
        ctx.db.user_badge().insert(UserBadge {
            id: 0,
            user_id: learner.id,
            badge_type: badge.key().to_string(),
            earned_at: ctx.timestamp,
        });
        log::info!("Learner {} earned badge {}", learner.id, badge);
    }

    learner.experience_points = ledger.experience_points();
    let learner = touch(ctx, learner);
    let state = ledger.state();
    log::debug!(
        "Learner {} at {} xp (level {})",
        learner.id,
        state.experience_points,
        state.level
    );
}
