//! Farmstead Headless Simulation Harness
//!
//! Runs scripted farm sessions against the core and checks the economy,
//! scheduling and persistence rules end to end. No rendering, no input.
//!
//! Usage:
//!   cargo run -p farmstead-simtest
//!   cargo run -p farmstead-simtest -- --verbose
//!   cargo run -p farmstead-simtest -- --config path/to/game_config.json
//!
//! Set `RUST_LOG=debug` to watch worker transitions.

use farmstead_core::persistence::SaveFormat;
use farmstead_core::prelude::*;
use farmstead_logic::rarity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

const DEFAULT_CONFIG_PATH: &str = "data/game_config.json";

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

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_PATH);

    println!("=== Farmstead Simulation Harness ===\n");

    let config = GameConfig::load(config_path);
    if verbose {
        config.log_summary();
    }

    let mut results = Vec::new();

    // 1. Config tables
    results.extend(validate_config(&config));

    // 2. Rarity distribution
    results.extend(validate_rarity_draws(&config));

    // 3. Economy rules
    results.extend(validate_economy(&config));

    // 4. Self-running farm
    results.extend(validate_worker_session(&config));

    // 5. Save / load / offline progress
    results.extend(validate_persistence(&config));

    // 6. Night shift
    results.extend(validate_night(&config));

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

// ── 1. Config ───────────────────────────────────────────────────────────

fn validate_config(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Config Tables ---");
    let mut results = Vec::new();

    let rate_total: f32 = Rarity::ALL
        .iter()
        .map(|r| config.rarity_stats(*r).rate_percent)
        .sum();
    results.push(TestResult::new(
        "rarity_rates_sum_to_100",
        (rate_total - 100.0).abs() < 0.01,
        format!("rates sum to {:.2}", rate_total),
    ));

    let bad_growth: Vec<_> = PlantableKind::ALL
        .iter()
        .filter(|k| {
            let spec = config.growth_spec(**k);
            spec.harvest_minutes == 0 || spec.max_harvests == 0
        })
        .collect();
    results.push(TestResult::new(
        "growth_table_positive",
        bad_growth.is_empty(),
        if bad_growth.is_empty() {
            "every plantable grows and yields".to_string()
        } else {
            format!("zero growth or yield for {:?}", bad_growth)
        },
    ));

    let bad_ranges: Vec<_> = Rarity::ALL
        .iter()
        .filter(|r| {
            let s = config.rarity_stats(**r);
            s.speed_min > s.speed_max || s.duration_min > s.duration_max || s.speed_min <= 0.0
        })
        .collect();
    results.push(TestResult::new(
        "rarity_ranges_ordered",
        bad_ranges.is_empty(),
        format!("{} tier(s) with inverted ranges", bad_ranges.len()),
    ));

    let affordable = config.starting_gold >= config.plot_cost.min(config.worker_cost);
    results.push(TestResult::new(
        "starting_gold_buys_something",
        affordable,
        format!(
            "{} gold vs plot {} / worker {}",
            config.starting_gold, config.plot_cost, config.worker_cost
        ),
    ));

    results
}

// ── 2. Rarity ───────────────────────────────────────────────────────────

fn validate_rarity_draws(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Rarity Draws ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(2024);
    let draws = 20_000;

    let mut counts: BTreeMap<Rarity, u32> = BTreeMap::new();
    let mut out_of_range = 0;
    for _ in 0..draws {
        let stats =
            rarity::draw_worker_stats(config, rng.gen_range(0.0..100.0), rng.gen(), rng.gen());
        *counts.entry(stats.rarity).or_insert(0) += 1;
        let tier = config.rarity_stats(stats.rarity);
        if stats.move_speed < tier.speed_min
            || stats.move_speed > tier.speed_max
            || stats.work_duration < tier.duration_min
            || stats.work_duration > tier.duration_max
        {
            out_of_range += 1;
        }
    }

    for tier in Rarity::ALL {
        let expected = config.rarity_stats(tier).rate_percent;
        let observed = *counts.get(&tier).unwrap_or(&0) as f32 * 100.0 / draws as f32;
        results.push(TestResult::new(
            &format!("rarity_rate_{:?}", tier).to_lowercase(),
            (observed - expected).abs() < 1.5,
            format!("expected {:.1}%, observed {:.2}%", expected, observed),
        ));
    }

    results.push(TestResult::new(
        "rarity_stats_in_range",
        out_of_range == 0,
        format!("{} draw(s) outside their tier's ranges", out_of_range),
    ));

    results
}

// ── 3. Economy ──────────────────────────────────────────────────────────

fn validate_economy(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Economy ---");
    let mut results = Vec::new();
    let mut engine = FarmEngine::new_game_seeded(config.clone(), Timestamp::EPOCH, 1);

    // Spend down to zero, then every purchase must fail without side effects
    let start_gold = engine.farm.gold();
    let mut purchases = 0;
    while engine.buy_plot().is_ok() {
        purchases += 1;
    }
    let plots_after = engine.farm.plot_count();
    let gold_after = engine.farm.gold();
    let blocked = engine.buy_plot().is_err() && engine.hire_worker().is_err();
    results.push(TestResult::new(
        "purchases_stop_at_zero",
        blocked
            && gold_after < config.plot_cost
            && engine.farm.plot_count() == plots_after
            && engine.worker_count() == 1,
        format!(
            "{} plot(s) bought from {} gold, {} left",
            purchases, start_gold, gold_after
        ),
    ));

    // Zones stay balanced as the farm grows
    engine.farm.add_gold(config.plot_cost * 40);
    for _ in 0..40 {
        if engine.buy_plot().is_err() {
            break;
        }
    }
    let per_zone: Vec<usize> = PlotZone::ALL
        .iter()
        .map(|z| engine.farm.plots_in_zone(*z))
        .collect();
    let spread = per_zone.iter().max().unwrap_or(&0) - per_zone.iter().min().unwrap_or(&0);
    results.push(TestResult::new(
        "zones_balanced",
        spread <= 1,
        format!("plots per zone {:?}", per_zone),
    ));

    // Selling credits value × amount
    engine.farm.inventory.add_product(ProductType::Milk, 4);
    let before = engine.farm.gold();
    let earned = engine.sell_product(ProductType::Milk, 4).unwrap_or(0);
    results.push(TestResult::new(
        "sale_credits_gold",
        earned == config.product_value(ProductType::Milk) * 4
            && engine.farm.gold() == before + earned,
        format!("sold 4 milk for {}", earned),
    ));

    // Equipment bonus kicks in every ten levels
    engine.farm.add_gold(config.equipment_upgrade_cost * 10);
    let mut upgrades = 0;
    for _ in 0..10 {
        if engine.upgrade_equipment(ProductType::Tomato).is_ok() {
            upgrades += 1;
        }
    }
    results.push(TestResult::new(
        "equipment_bonus",
        upgrades == 10 && engine.farm.production_bonus(ProductType::Tomato) == 2,
        format!(
            "level {}, bonus {}",
            engine.farm.equipment_level(ProductType::Tomato),
            engine.farm.production_bonus(ProductType::Tomato)
        ),
    ));

    results
}

// ── 4. Worker session ───────────────────────────────────────────────────

fn validate_worker_session(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Worker Session ---");
    let mut results = Vec::new();
    let mut engine = FarmEngine::new_game_seeded(config.clone(), Timestamp::EPOCH, 7);
    engine.farm.add_gold(config.worker_cost * 3 + config.plot_cost * 4);
    for _ in 0..3 {
        let _ = engine.hire_worker();
    }
    for _ in 0..4 {
        let _ = engine.buy_plot();
    }

    let completed = Rc::new(RefCell::new(0u32));
    let sink = Rc::clone(&completed);
    engine.subscribe(move |e| {
        if let FarmEvent::WorkerTaskCompleted(_) = e {
            *sink.borrow_mut() += 1;
        }
    });

    // Two simulated hours at 10 Hz, checking the reservation table as we go
    let mut leaks = 0;
    for step in 0..72_000 {
        engine.update(0.1);
        if step % 600 == 0 {
            for plot in engine.farm.plots() {
                if let Some(holder) = engine.farm.reservation(plot.id) {
                    let holds = engine
                        .worker(holder)
                        .map(|(_, brain)| brain.target_plot() == Some(plot.id))
                        .unwrap_or(false);
                    if !holds {
                        leaks += 1;
                    }
                }
            }
        }
    }

    results.push(TestResult::new(
        "reservations_match_tasks",
        leaks == 0,
        format!("{} stale reservation(s) seen", leaks),
    ));

    let completed = *completed.borrow();
    results.push(TestResult::new(
        "workers_complete_tasks",
        completed >= 16,
        format!("{} task(s) completed", completed),
    ));

    let produced: u32 = ProductType::ALL
        .iter()
        .map(|p| engine.farm.inventory.product_count(*p))
        .sum();
    results.push(TestResult::new(
        "farm_produces",
        produced > 0,
        format!("{} product(s) in stock", produced),
    ));

    let planted = engine.farm.plots().iter().filter(|p| p.content.is_some()).count();
    results.push(TestResult::new(
        "plots_planted",
        planted == engine.farm.plot_count(),
        format!("{}/{} plots occupied", planted, engine.farm.plot_count()),
    ));

    results
}

// ── 5. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let mut engine = FarmEngine::new_game_seeded(config.clone(), Timestamp::EPOCH, 9);
    let planted = engine.plant_crop(PlotId(0), CropType::Strawberry).is_ok()
        && engine.place_animal(PlotId(3), AnimalType::Cow).is_ok();

    for format in [SaveFormat::Json, SaveFormat::Binary] {
        let mut buffer = Vec::new();
        let saved = engine.save(&mut buffer, format).is_ok();
        let loaded = FarmEngine::load(config.clone(), &buffer[..], format, engine.now());
        let same = match &loaded {
            Ok((other, report)) => {
                report.is_none()
                    && other.farm.plots() == engine.farm.plots()
                    && other.farm.inventory == engine.farm.inventory
                    && other.farm.gold() == engine.farm.gold()
            }
            Err(_) => false,
        };
        results.push(TestResult::new(
            &format!("round_trip_{:?}", format).to_lowercase(),
            planted && saved && same,
            format!("{} bytes", buffer.len()),
        ));
    }

    // Come back after the cow and the strawberry are both ready
    let mut buffer = Vec::new();
    let _ = engine.save(&mut buffer, SaveFormat::Binary);
    let cow_minutes = i64::from(config.growth_spec(PlantableKind::Cow).harvest_minutes);
    let berry_minutes = i64::from(config.growth_spec(PlantableKind::Strawberry).harvest_minutes);
    let away = Timestamp::from_minutes(cow_minutes.max(berry_minutes) + 5);
    let outcome = FarmEngine::load(config.clone(), &buffer[..], SaveFormat::Binary, away);
    let (passed, detail) = match outcome {
        Ok((other, Some(report))) => (
            report.harvested == 2
                && other.farm.inventory.product_count(ProductType::Milk) == 1
                && other.farm.inventory.product_count(ProductType::Strawberry) == 1,
            format!(
                "{} minute(s) away, {} harvested",
                report.offline_minutes, report.harvested
            ),
        ),
        Ok((_, None)) => (false, "no offline report".to_string()),
        Err(e) => (false, format!("load failed: {}", e)),
    };
    results.push(TestResult::new("offline_progress", passed, detail));

    // A corrupt save never takes the game down
    let garbage = [0xFFu8; 16];
    let corrupt = FarmEngine::load(config.clone(), &garbage[..], SaveFormat::Binary, away);
    results.push(TestResult::new(
        "corrupt_save_rejected",
        corrupt.is_err(),
        "garbage input is reported as an error",
    ));

    results
}

// ── 6. Night ────────────────────────────────────────────────────────────

fn validate_night(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Night Shift ---");
    let mut results = Vec::new();

    let mut night_config = config.clone();
    night_config.night = Some(farmstead_logic::config::NightWindow {
        start_hour: 22,
        end_hour: 5,
    });
    // 21:59 UTC, one minute before nightfall
    let evening = Timestamp::from_minutes(21 * 60 + 59);
    let mut engine = FarmEngine::new_game_seeded(night_config, evening, 5);

    engine.update(1.0);
    let busy_before = engine.working_worker_count();

    for _ in 0..120 {
        engine.update(1.0);
    }
    let asleep = engine.sleeping_worker_count();
    let reservations = engine.farm.reservation_count();
    results.push(TestResult::new(
        "workers_sleep_at_night",
        busy_before == 1 && asleep == 1 && reservations == 0,
        format!(
            "{} busy before dusk, {} asleep after, {} reservation(s)",
            busy_before, asleep, reservations
        ),
    ));

    // Eight hours on, past the end of the window
    engine.set_time_scale(60.0);
    for _ in 0..(8 * 60) {
        engine.update(1.0);
    }
    results.push(TestResult::new(
        "workers_wake_in_the_morning",
        engine.sleeping_worker_count() == 0,
        format!(
            "{} still asleep at hour {}",
            engine.sleeping_worker_count(),
            engine.now().hour_of_day()
        ),
    ));

    results
}
