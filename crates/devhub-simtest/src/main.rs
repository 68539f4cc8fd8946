//! Dev Resources Hub Headless Progress Harness
//!
//! Validates catalog data and progress rules without the hosted backend.
//! Runs entirely in-process: no DB, no networking, no UI.
//!
//! Usage:
//!   cargo run -p devhub-simtest
//!   cargo run -p devhub-simtest -- --verbose
//!   cargo run -p devhub-simtest -- --seed 7

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use devhub_logic::activity::{ActivityEvent, ActivityKind};
use devhub_logic::catalog::{Catalog, RequirementKind};
use devhub_logic::level::{self, level_for_xp, progress_fraction, xp_threshold_for_level};
use devhub_logic::progress::ProgressEngine;
use devhub_logic::snapshot::ProgressSnapshot;
use devhub_tracker::memory::{CollectingSink, MemoryLedger, MemoryStore};
use devhub_tracker::{ProgressTracker, TrackOutcome};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Achievement catalog (same JSON the web app seeds) ───────────────────
const CATALOG_JSON: &str = include_str!("../../../data/achievements.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn timestamp(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .unwrap_or_default()
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let seed = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    println!("=== Dev Resources Hub Progress Harness ===\n");

    let mut results = Vec::new();

    // 1. Catalog data validation
    results.extend(validate_catalog(verbose));

    // 2. Level arithmetic sweep
    results.extend(validate_levels(verbose));

    // 3. Scripted activity scenarios
    results.extend(validate_scenarios(verbose));

    // 4. Streak calendar sweep
    results.extend(validate_streaks(verbose));

    // 5. Randomized multi-user journeys
    results.extend(validate_random_journeys(seed, verbose));

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

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Achievement Catalog ---");
    let mut results = Vec::new();

    let seeded = match Catalog::from_json(CATALOG_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult::new("catalog_parse", false, e.to_string()));
            return results;
        }
    };
    let builtin = Catalog::builtin();

    results.push(TestResult::new(
        "catalog_matches_builtin",
        seeded == builtin,
        format!("{} seeded entries, {} built-in", seeded.len(), builtin.len()),
    ));

    // Every dimension has at least one tier, thresholds strictly increasing
    let mut bad_tiers = Vec::new();
    for kind in RequirementKind::ALL {
        let counts: Vec<u32> = builtin.tiers(kind).map(|d| d.requirement.count).collect();
        if counts.is_empty() || !counts.windows(2).all(|w| w[0] < w[1]) {
            bad_tiers.push(format!("{:?}: {:?}", kind, counts));
        }
    }
    results.push(TestResult::new(
        "catalog_tiers_increase",
        bad_tiers.is_empty(),
        if bad_tiers.is_empty() {
            "all six dimensions tiered".to_string()
        } else {
            bad_tiers.join(", ")
        },
    ));

    // Higher tiers never pay less than lower ones
    let mut inverted = Vec::new();
    for kind in RequirementKind::ALL {
        let tiers: Vec<_> = builtin.tiers(kind).collect();
        for w in tiers.windows(2) {
            if w[1].xp_reward < w[0].xp_reward {
                inverted.push(format!("{} < {}", w[1].id, w[0].id));
            }
        }
    }
    results.push(TestResult::new(
        "catalog_rewards_scale",
        inverted.is_empty(),
        if inverted.is_empty() {
            format!("{} XP across all entries", builtin.total_reward())
        } else {
            inverted.join(", ")
        },
    ));

    if verbose {
        for def in &builtin {
            println!(
                "    {} {:<14} {:<20} {:>5} XP  {:?} ≥ {}",
                def.icon, def.id, def.name, def.xp_reward, def.requirement.kind, def.requirement.count
            );
        }
    }

    results
}

// ── 2. Levels ───────────────────────────────────────────────────────────

fn validate_levels(verbose: bool) -> Vec<TestResult> {
    println!("--- Level Arithmetic ---");
    let mut results = Vec::new();

    let table = [(0u64, 1u32), (99, 1), (100, 2), (399, 2), (400, 3), (900, 4)];
    let wrong: Vec<_> = table
        .iter()
        .filter(|(xp, lvl)| level_for_xp(*xp) != *lvl)
        .collect();
    results.push(TestResult::new(
        "level_boundaries",
        wrong.is_empty(),
        format!("{} boundary values checked, {} wrong", table.len(), wrong.len()),
    ));

    let mut prev = level_for_xp(0);
    let mut monotonic = true;
    let mut fraction_ok = true;
    for xp in 0..=250_000u64 {
        let lvl = level_for_xp(xp);
        if lvl < prev {
            monotonic = false;
        }
        let f = progress_fraction(xp, lvl);
        if !(0.0..=100.0).contains(&f) {
            fraction_ok = false;
        }
        prev = lvl;
    }
    results.push(TestResult::new(
        "level_monotonic",
        monotonic,
        format!("0..=250000 XP reaches level {}", prev),
    ));
    results.push(TestResult::new(
        "progress_fraction_bounded",
        fraction_ok,
        "progress stays within 0–100%",
    ));

    // The bar floor (level²×100) sits above where a level actually begins
    // ((level−1)²×100); count how much of each level reads as 0%.
    let flat: Vec<u64> = (1..=5u32)
        .map(|l| level::level_start_xp(l) - level_entry_xp(l))
        .collect();
    results.push(TestResult::new(
        "progress_floor_offset",
        flat.iter().all(|d| *d > 0),
        format!("XP shown as 0% at levels 1–5: {:?}", flat),
    ));

    if verbose {
        for l in 1..=6u32 {
            println!(
                "    level {:>2}: enters at {:>5} XP, bar {:>5}..{:>5}",
                l,
                level_entry_xp(l),
                level::level_start_xp(l),
                xp_threshold_for_level(l)
            );
        }
    }

    results
}

/// Smallest XP at which `level_for_xp` returns `level`.
fn level_entry_xp(lvl: u32) -> u64 {
    let l = u64::from(lvl.max(1)) - 1;
    l * l * level::XP_PER_LEVEL_UNIT
}

// ── 3. Scenarios ────────────────────────────────────────────────────────

fn validate_scenarios(_verbose: bool) -> Vec<TestResult> {
    println!("--- Activity Scenarios ---");
    let mut results = Vec::new();
    let engine = ProgressEngine::default();
    let at = timestamp(2025, 1, 1, 12);

    // Fresh user completes one resource
    let out = engine.report_activity(
        &ActivityEvent::new(ActivityKind::Completed, "r1", at),
        &ProgressSnapshot::new("scenario"),
    );
    results.push(TestResult::new(
        "first_completion",
        out.snapshot.xp == 25 && out.snapshot.level == 1 && out.newly_unlocked.is_empty(),
        format!("xp={} level={}", out.snapshot.xp, out.snapshot.level),
    ));

    // Fresh user submits one resource
    let out = engine.report_activity(
        &ActivityEvent::new(ActivityKind::Submitted, "r1", at),
        &ProgressSnapshot::new("scenario"),
    );
    let ids: Vec<_> = out.newly_unlocked.iter().map(|d| d.id.as_str()).collect();
    results.push(TestResult::new(
        "first_submission",
        out.xp_awarded == 150 && out.snapshot.level == 2 && ids == ["submit_1"],
        format!("awarded={} level={} unlocked={:?}", out.xp_awarded, out.snapshot.level, ids),
    ));

    // Counter jumps across two tiers
    let mut s = ProgressSnapshot::new("scenario");
    s.total_resources_viewed = 60;
    let found: Vec<_> = engine
        .evaluate(&s, &s.achievements)
        .iter()
        .map(|d| d.id.clone())
        .collect();
    results.push(TestResult::new(
        "tier_skip",
        found == ["views_10", "views_50"],
        format!("{:?}", found),
    ));

    results
}

// ── 4. Streaks ──────────────────────────────────────────────────────────

fn validate_streaks(verbose: bool) -> Vec<TestResult> {
    println!("--- Streak Calendar ---");
    let mut results = Vec::new();
    let engine = ProgressEngine::default();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();

    // A full (leap) year of daily visits
    let mut s = ProgressSnapshot::new("streaker");
    let mut milestones = 0;
    for offset in 0..366 {
        let out = engine.check_in(&s, start + Duration::days(offset));
        if out.milestone().is_some() {
            milestones += 1;
        }
        s = out.snapshot;
    }
    let unlocked_all = Catalog::builtin()
        .tiers(RequirementKind::Streak)
        .all(|d| s.is_unlocked(&d.id));
    results.push(TestResult::new(
        "year_of_visits",
        s.current_streak == 366 && unlocked_all,
        format!(
            "streak={} milestones={} xp={}",
            s.current_streak, milestones, s.xp
        ),
    ));

    // Same-day repeat is a no-op
    let today = start + Duration::days(365);
    let repeat = engine.check_in(&s, today);
    results.push(TestResult::new(
        "same_day_noop",
        !repeat.counted && repeat.snapshot == s,
        "second check-in on the same day changes nothing",
    ));

    // Two-day gap resets
    let out = engine.check_in(&s, today + Duration::days(2));
    results.push(TestResult::new(
        "gap_resets",
        out.streak_broken && out.snapshot.current_streak == 1 && out.snapshot.longest_streak == 366,
        format!(
            "current={} longest={}",
            out.snapshot.current_streak, out.snapshot.longest_streak
        ),
    ));

    if verbose {
        println!("    badges after a year: {}", s.badges.len());
    }

    results
}

// ── 5. Random journeys ──────────────────────────────────────────────────

fn validate_random_journeys(seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Random Journeys (seed {}) ---", seed);
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tracker = ProgressTracker::new(
        ProgressEngine::default(),
        MemoryStore::new(),
        MemoryLedger::new(),
        CollectingSink::new(),
    );

    let users: Vec<String> = (0..8).map(|i| format!("user-{}", i)).collect();
    let start = timestamp(2025, 3, 1, 8);

    let mut last_xp = vec![0u64; users.len()];
    let mut xp_monotonic = true;
    let mut level_consistent = true;
    let mut double_credit = 0usize;
    let mut repeats_refused = 0usize;
    let mut errors = 0usize;
    let mut credited_once: HashSet<(usize, u32, ActivityKind)> = HashSet::new();

    for step in 0..4_000i64 {
        let u = rng.gen_range(0..users.len());
        let at = start + Duration::minutes(step * 17);

        if rng.gen_bool(0.05) {
            if tracker.visit(&users[u], at.date_naive()).is_err() {
                errors += 1;
            }
        } else {
            let kind = ActivityKind::ALL[rng.gen_range(0..ActivityKind::ALL.len())];
            let resource: u32 = rng.gen_range(0..120);
            match tracker.track_activity(&users[u], &format!("res-{}", resource), kind, at) {
                Ok(TrackOutcome::Credited(_)) => {
                    if kind.is_first_time_only() && !credited_once.insert((u, resource, kind)) {
                        double_credit += 1;
                    }
                }
                Ok(TrackOutcome::AlreadyCredited) => repeats_refused += 1,
                Err(_) => errors += 1,
            }
        }

        let snapshot = match tracker.snapshot(&users[u]) {
            Ok(s) => s,
            Err(_) => {
                errors += 1;
                continue;
            }
        };
        if snapshot.xp < last_xp[u] {
            xp_monotonic = false;
        }
        if snapshot.level != level_for_xp(snapshot.xp) {
            level_consistent = false;
        }
        last_xp[u] = snapshot.xp;
    }

    let catalog = Catalog::builtin();
    let mut bad_unlocks = 0usize;
    for user in &users {
        let s = tracker.snapshot(user).unwrap_or_else(|_| ProgressSnapshot::new(user.as_str()));
        let badge_ids: HashSet<&str> = s.badges.iter().map(|b| b.id.as_str()).collect();
        if badge_ids.len() != s.badges.len() || badge_ids.len() != s.achievements.len() {
            bad_unlocks += 1;
        }
        if s.achievements.iter().any(|id| catalog.get(id).is_none()) {
            bad_unlocks += 1;
        }
        if verbose {
            println!(
                "    {}: level {} xp {} badges {} streak {}",
                user,
                s.level,
                s.xp,
                s.badges.len(),
                s.longest_streak
            );
        }
    }

    results.push(TestResult::new("journey_no_errors", errors == 0, format!("{} errors", errors)));
    results.push(TestResult::new("journey_xp_monotonic", xp_monotonic, "XP never decreased"));
    results.push(TestResult::new(
        "journey_level_consistent",
        level_consistent,
        "level always equals level_for_xp(xp)",
    ));
    results.push(TestResult::new(
        "journey_no_double_credit",
        double_credit == 0,
        format!("{} repeats refused, {} double credits", repeats_refused, double_credit),
    ));
    results.push(TestResult::new(
        "journey_unique_badges",
        bad_unlocks == 0,
        format!(
            "{} notices delivered across {} users",
            tracker.sink().delivered().len(),
            users.len()
        ),
    ));

    results
}
