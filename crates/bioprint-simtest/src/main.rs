//! BioPrint Academy Headless Harness
//!
//! Validates the pure logic and the request router without SpacetimeDB,
//! or serves the router over stdin/stdout as JSON lines.
//!
//! Usage:
//!   cargo run -p bioprint-simtest
//!   cargo run -p bioprint-simtest -- --verbose
//!   cargo run -p bioprint-simtest -- --config settings.json
//!   cargo run -p bioprint-simtest -- --serve < requests.jsonl
//!
//! In serve mode each input line is an `ApiRequest`
//! (`{"method":"GET","path":"/api/learn/topics"}`) and each output line is
//! the matching `ApiResponse`. Set `RUST_LOG=debug` to log every request.

use std::io::{self, BufRead, Write};

use bioprint_logic::api::{Api, ApiRequest, ApiResponse};
use bioprint_logic::badges::{badge_for_challenge, badges_for_simulation, BadgeType};
use bioprint_logic::catalog::{sample_catalog, ChallengeKind, TissueFilter};
use bioprint_logic::config::AppConfig;
use bioprint_logic::organs::Organ;
use bioprint_logic::progression::{level_for, ProgressLedger, XpAwards, LEVELS};
use bioprint_logic::quiz::{QuizResult, QuizSession};
use bioprint_logic::simulation::{density_label, estimate, DensityLabel, SimulationInput};
use bioprint_logic::store::MemStore;
use serde_json::json;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let serve = args.iter().any(|a| a == "--serve");
    let config = match config_from_args(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };

    if serve {
        if let Err(e) = serve_stdin(config) {
            eprintln!("serve failed: {e}");
            std::process::exit(1);
        }
        return;
    }

    println!("=== BioPrint Academy Harness ===\n");

    let mut results = Vec::new();

    // 1. Sample catalog
    results.extend(validate_catalog(verbose));

    // 2. Outcome estimator sweep
    results.extend(validate_estimator(verbose));

    // 3. Level table
    results.extend(validate_progression(verbose));

    // 4. Badges & quizzes
    results.extend(validate_badges_and_quiz(verbose));

    // 5. Scripted API session
    results.extend(validate_api_session(&config, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn config_from_args(args: &[String]) -> Result<AppConfig, String> {
    let Some(pos) = args.iter().position(|a| a == "--config") else {
        return Ok(AppConfig::default());
    };
    let path = args
        .get(pos + 1)
        .ok_or_else(|| "--config needs a path".to_string())?;
    let text =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read config {path}: {e}"))?;
    let config =
        AppConfig::from_json(&text).map_err(|e| format!("invalid config {path}: {e}"))?;
    log::info!("Loaded config from {}", path);
    Ok(config)
}

// ── Serve mode ──────────────────────────────────────────────────────────

fn serve_stdin(config: AppConfig) -> io::Result<()> {
    let api = Api::in_memory(config).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    log::info!("Serving JSON-lines requests on stdin");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<ApiRequest>(&line) {
            Ok(request) => api.handle(&request),
            Err(e) => {
                log::warn!("Malformed request line: {}", e);
                ApiResponse {
                    status: 400,
                    body: json!({ "message": "Malformed request", "errors": [e.to_string()] }),
                }
            }
        };
        serde_json::to_writer(&mut stdout, &response)?;
        writeln!(stdout)?;
        stdout.flush()?;
    }
    Ok(())
}

// ── 1. Sample Catalog ───────────────────────────────────────────────────

fn validate_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Sample Catalog ---");
    let mut results = Vec::new();

    let catalog = match sample_catalog() {
        Ok(c) => c,
        Err(e) => {
            results.push(check("catalog_parse", false, format!("JSON parse error: {}", e)));
            return results;
        }
    };

    results.push(check(
        "catalog_counts",
        catalog.learn_topics.len() == 5
            && catalog.tissue_items.len() == 3
            && catalog.case_studies.len() == 4
            && catalog.challenges.len() == 3
            && catalog.quiz_questions.len() == 5,
        format!(
            "{} topics, {} tissues, {} case studies, {} challenges, {} quiz questions",
            catalog.learn_topics.len(),
            catalog.tissue_items.len(),
            catalog.case_studies.len(),
            catalog.challenges.len(),
            catalog.quiz_questions.len()
        ),
    ));

    let bad_rates: Vec<_> = catalog
        .tissue_items
        .iter()
        .filter(|t| t.success_rate > 100 || t.print_time_hours <= 0.0)
        .map(|t| t.name.as_str())
        .collect();
    results.push(check(
        "catalog_tissue_values",
        bad_rates.is_empty(),
        if bad_rates.is_empty() {
            "all tissues have valid success rate and print time".to_string()
        } else {
            format!("invalid tissues: {}", bad_rates.join(", "))
        },
    ));

    let kinds_covered = [ChallengeKind::Quiz, ChallengeKind::Game, ChallengeKind::Simulation]
        .iter()
        .all(|k| catalog.challenges.iter().any(|c| c.kind == *k));
    results.push(check(
        "catalog_challenge_kinds",
        kinds_covered,
        "quiz, game and simulation challenges present",
    ));

    let filter = TissueFilter {
        search: Some("valve".into()),
        ..TissueFilter::default()
    };
    let hits = catalog.tissue_items.iter().filter(|t| filter.matches(t)).count();
    results.push(check("catalog_search", hits == 1, format!("'valve' matched {} tissue(s)", hits)));

    if verbose {
        for topic in &catalog.learn_topics {
            println!("  {:32} {} min", topic.title, topic.read_time_minutes);
        }
    }

    results
}

// ── 2. Outcome Estimator ────────────────────────────────────────────────

fn validate_estimator(verbose: bool) -> Vec<TestResult> {
    println!("--- Outcome Estimator ---");
    let mut results = Vec::new();

    // Every output in 1..=100 across a coarse slider grid
    let mut runs = 0;
    let mut out_of_range = 0;
    for organ in Organ::ALL {
        for c in (0..=100).step_by(5) {
            for s in (0..=100).step_by(5) {
                for g in (0..=100).step_by(5) {
                    runs += 1;
                    match estimate(organ, c, s, g) {
                        Ok(out) => {
                            let values = [
                                out.rejection_probability,
                                out.integration_success,
                                out.functional_recovery,
                                out.long_term_stability,
                            ];
                            if values.iter().any(|v| !(1..=100).contains(v)) {
                                out_of_range += 1;
                            }
                        }
                        Err(_) => out_of_range += 1,
                    }
                }
            }
        }
    }
    results.push(check(
        "estimator_range",
        out_of_range == 0,
        format!("{} runs, {} outside 1-100", runs, out_of_range),
    ));

    let expect = |name: &str, organ: Organ, sliders: (i64, i64, i64), want: [u8; 4]| {
        let got = estimate(organ, sliders.0, sliders.1, sliders.2).map(|o| {
            [
                o.rejection_probability,
                o.integration_success,
                o.functional_recovery,
                o.long_term_stability,
            ]
        });
        check(name, got == Ok(want), format!("{:?} -> {:?}", sliders, got))
    };
    results.push(expect("estimator_heart_baseline", Organ::HeartValve, (0, 0, 0), [15, 80, 70, 75]));
    results.push(expect("estimator_skin_maxed", Organ::SkinPatch, (100, 70, 100), [1, 100, 100, 99]));
    results.push(expect("estimator_default_row", Organ::Cartilage, (40, 0, 50), [6, 95, 90, 85]));

    let default = SimulationInput::default().run();
    results.push(check(
        "estimator_screen_defaults",
        default.integration_success == 98 && default.functional_recovery == 85,
        format!("{:?}", default),
    ));

    // Scaffold flips from helping to hurting integration above 80
    let at = estimate(Organ::HeartValve, 0, 80, 0);
    let above = estimate(Organ::HeartValve, 0, 81, 0);
    let flip = matches!((&at, &above), (Ok(a), Ok(b)) if a.integration_success > b.integration_success);
    results.push(check("estimator_scaffold_flip", flip, format!("80: {:?}, 81: {:?}", at, above)));

    // Collagen never raises rejection
    let mut regressions = 0;
    for organ in Organ::ALL {
        let mut prev = u8::MAX;
        for c in 0..=100 {
            if let Ok(out) = estimate(organ, c, 50, 50) {
                if out.rejection_probability > prev {
                    regressions += 1;
                }
                prev = out.rejection_probability;
            }
        }
    }
    results.push(check(
        "estimator_collagen_monotonic",
        regressions == 0,
        format!("{} increases in rejection as collagen rose", regressions),
    ));

    let rejected = [-1, 101]
        .iter()
        .all(|&bad| estimate(Organ::Cornea, bad, 50, 50).is_err());
    results.push(check("estimator_rejects_out_of_range", rejected, "-1 and 101 rejected"));

    results.push(check(
        "estimator_density_labels",
        density_label(32) == DensityLabel::Low
            && density_label(33) == DensityLabel::Medium
            && density_label(66) == DensityLabel::High,
        "32 Low, 33 Medium, 66 High",
    ));

    if verbose {
        for organ in Organ::ALL {
            if let Ok(out) = estimate(organ, 68, 50, 75) {
                println!(
                    "  {:14} rej {:3} int {:3} fun {:3} stab {:3} stages {}",
                    organ.display_name(),
                    out.rejection_probability,
                    out.integration_success,
                    out.functional_recovery,
                    out.long_term_stability,
                    out.timeline.completed_stages()
                );
            }
        }
    }

    results
}

// ── 3. Level Table ──────────────────────────────────────────────────────

fn validate_progression(verbose: bool) -> Vec<TestResult> {
    println!("--- Level Table ---");
    let mut results = Vec::new();

    let contiguous = LEVELS
        .windows(2)
        .all(|w| w[0].max_xp.map(|max| max + 1) == Some(w[1].min_xp));
    results.push(check(
        "levels_contiguous",
        contiguous && LEVELS[0].min_xp == 0 && LEVELS[LEVELS.len() - 1].max_xp.is_none(),
        "tiers cover 0.. without gaps",
    ));

    let cases: [(u64, u8, u8); 6] = [
        (0, 1, 0),
        (999, 1, 100),
        (1000, 2, 0),
        (1450, 2, 30),
        (9999, 4, 100),
        (10000, 5, 100),
    ];
    for (xp, level, percent) in cases {
        let s = level_for(xp);
        results.push(check(
            &format!("level_for_{}", xp),
            s.level == level && s.percent_to_next_level == percent,
            format!("level {} ({}), {}%", s.level, s.level_name, s.percent_to_next_level),
        ));
    }

    let awards = XpAwards::default();
    let mut ledger = ProgressLedger::new();
    for _ in 0..4 {
        ledger.complete_item(&awards);
    }
    let first = ledger.award_badge(BadgeType::HeartHero, &awards);
    let second = ledger.award_badge(BadgeType::HeartHero, &awards);
    results.push(check(
        "ledger_badge_once",
        first && !second && ledger.experience_points() == 650,
        format!("{} xp after 4 items and one badge", ledger.experience_points()),
    ));

    if verbose {
        for tier in &LEVELS {
            println!("  {} {:13} from {} xp", tier.level, tier.name, tier.min_xp);
        }
    }

    results
}

// ── 4. Badges & Quizzes ─────────────────────────────────────────────────

fn validate_badges_and_quiz(verbose: bool) -> Vec<TestResult> {
    println!("--- Badges & Quizzes ---");
    let mut results = Vec::new();

    let keys_round_trip = BadgeType::ALL
        .iter()
        .all(|b| BadgeType::from_key(b.key()) == Some(*b));
    results.push(check("badge_keys", keys_round_trip, "every badge key parses back"));

    match estimate(Organ::SkinPatch, 100, 70, 100) {
        Ok(out) => {
            let earned = badges_for_simulation(Organ::SkinPatch, &out);
            results.push(check(
                "badge_simulation_expert",
                earned == vec![BadgeType::SkinSavior, BadgeType::SimulationExpert],
                format!("{:?}", earned),
            ));
        }
        Err(e) => results.push(check("badge_simulation_expert", false, e.to_string())),
    }

    let catalog = match sample_catalog() {
        Ok(c) => c,
        Err(e) => {
            results.push(check("quiz_catalog", false, e.to_string()));
            return results;
        }
    };
    let granted: Vec<_> = catalog.challenges.iter().filter_map(badge_for_challenge).collect();
    results.push(check(
        "badge_challenges",
        granted == vec![BadgeType::QuizMaster, BadgeType::SimulationExpert],
        format!("{:?}", granted),
    ));

    // Last answer wrong: 4 of 5
    let mut session = QuizSession::new("materials", catalog.quiz_questions);
    let answers = [1, 2, 0, 2, 0];
    let mut answer_errors = 0;
    for a in answers {
        match session.answer(a) {
            Ok(correct) if verbose => println!("    answer {} -> {}", a, correct),
            Ok(_) => {}
            Err(_) => answer_errors += 1,
        }
    }
    let result = session.result();
    results.push(check(
        "quiz_score",
        answer_errors == 0 && result.map(|r| r.score_percent) == Some(80),
        format!("{:?}", result),
    ));
    results.push(check(
        "quiz_pass_mark",
        result.and_then(|r| r.badge(80)) == Some(BadgeType::QuizMaster)
            && result.and_then(|r| r.badge(81)).is_none(),
        "80% passes at 80, fails at 81",
    ));
    let near = QuizResult::new(159, 200);
    results.push(check(
        "quiz_exact_fraction",
        near.score_percent == 80 && !near.passed(80),
        "159/200 shows 80% but does not pass",
    ));
    results.push(check(
        "quiz_finished",
        session.answer(0).is_err(),
        "answering past the end is rejected",
    ));

    results
}

// ── 5. Scripted API Session ─────────────────────────────────────────────

fn validate_api_session(config: &AppConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- API Session ---");
    let mut results = Vec::new();

    let api: Api<MemStore> = match Api::in_memory(config.clone()) {
        Ok(api) => api,
        Err(e) => {
            results.push(check("api_setup", false, e.to_string()));
            return results;
        }
    };
    let awards = config.awards;

    let call = |req: ApiRequest| {
        let resp = api.handle(&req);
        if verbose {
            println!("  {:?} {} -> {}", req.method, req.path, resp.status);
        }
        resp
    };

    let resp = call(ApiRequest::post(
        "/api/users/register",
        json!({ "username": "harness", "password": "pipette" }),
    ));
    let user_id = resp.body["id"].as_u64().unwrap_or_default();
    results.push(check(
        "api_register",
        resp.status == 201 && resp.body.get("password").is_none(),
        format!("status {}, id {}", resp.status, user_id),
    ));

    let resp = call(ApiRequest::post(
        "/api/users/register",
        json!({ "username": "harness", "password": "other" }),
    ));
    results.push(check("api_duplicate_username", resp.status == 409, format!("status {}", resp.status)));

    let resp = call(ApiRequest::post(
        "/api/users/login",
        json!({ "username": "harness", "password": "wrong" }),
    ));
    results.push(check("api_login_rejected", resp.status == 401, format!("status {}", resp.status)));

    let resp = call(ApiRequest::post(
        format!("/api/users/{user_id}/simulate"),
        json!({ "organ": "Heart Valve", "collagenPct": 68, "scaffoldDensity": 50, "growthFactorLevel": 75 }),
    ));
    let xp = resp.body["progression"]["experiencePoints"].as_u64();
    results.push(check(
        "api_simulate_awards",
        resp.status == 200 && xp == Some(awards.item_completion + awards.badge),
        format!("status {}, xp {:?}", resp.status, xp),
    ));

    let resp = call(ApiRequest::post(
        format!("/api/users/{user_id}/badges"),
        json!({ "badgeType": "heart_hero" }),
    ));
    results.push(check(
        "api_badge_idempotent",
        resp.status == 200,
        format!("status {}", resp.status),
    ));

    let resp = call(ApiRequest::get(format!("/api/users/{user_id}/profile")));
    let xp = resp.body["user"]["experiencePoints"].as_u64();
    results.push(check(
        "api_profile",
        resp.status == 200 && xp == Some(awards.item_completion + awards.badge),
        format!("xp {:?}, badges {}", xp, resp.body["badges"]),
    ));

    let resp = call(ApiRequest::get("/api/challenges").with_query("type", "simulation"));
    let count = resp.body.as_array().map_or(0, Vec::len);
    results.push(check("api_challenge_filter", count == 1, format!("{} simulation challenge(s)", count)));

    let resp = call(ApiRequest::get("/api/learn/quiz"));
    let prompts = resp.body.as_array().map_or(0, Vec::len);
    let hidden = resp
        .body
        .as_array()
        .is_some_and(|qs| qs.iter().all(|q| q.get("correctAnswer").is_none()));
    results.push(check(
        "api_quiz_listing",
        resp.status == 200 && prompts == 5 && hidden,
        format!("{} questions, answer key hidden: {}", prompts, hidden),
    ));

    let resp = call(ApiRequest::post(
        format!("/api/users/{user_id}/quiz-results"),
        json!({ "topicId": "1", "answers": [1, 2, 0, 2, 1] }),
    ));
    results.push(check(
        "api_quiz_graded",
        resp.status == 200 && resp.body["passed"] == json!(true),
        format!("status {}, score {}", resp.status, resp.body["result"]["scorePercent"]),
    ));

    let resp = call(ApiRequest::get("/api/users/9999/profile"));
    results.push(check("api_unknown_user", resp.status == 404, format!("status {}", resp.status)));

    results
}
