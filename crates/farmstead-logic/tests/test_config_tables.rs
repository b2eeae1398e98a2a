//! Integration tests for the shipped config document.
//!
//! Exercises: data/game_config.json → GameConfig → rarity draws
//!
//! All tests are pure logic, with no clock, no workers.

use farmstead_logic::config::GameConfig;
use farmstead_logic::constants::{AnimalType, CropType, PlantableKind, ProductType, Rarity};
use farmstead_logic::rarity::{draw_rarity, draw_worker_stats};

const CONFIG_JSON: &str = include_str!("../../../data/game_config.json");

fn shipped() -> GameConfig {
    GameConfig::from_json_str(CONFIG_JSON).expect("shipped config must parse")
}

// ── Shipped tables match the fallback defaults ─────────────────────────

#[test]
fn shipped_costs_match_defaults() {
    let shipped = shipped();
    let defaults = GameConfig::default();
    assert_eq!(shipped.worker_cost, defaults.worker_cost);
    assert_eq!(shipped.plot_cost, defaults.plot_cost);
    assert_eq!(shipped.equipment_upgrade_cost, defaults.equipment_upgrade_cost);
    for crop in CropType::ALL {
        assert_eq!(shipped.seed_cost(crop), defaults.seed_cost(crop), "{:?}", crop);
    }
    for animal in AnimalType::ALL {
        assert_eq!(shipped.animal_cost(animal), defaults.animal_cost(animal));
    }
    for product in ProductType::ALL {
        assert_eq!(shipped.product_value(product), defaults.product_value(product));
    }
}

#[test]
fn shipped_growth_covers_every_plantable() {
    let shipped = shipped();
    for kind in PlantableKind::ALL {
        let spec = shipped.growth_spec(kind);
        assert!(spec.max_harvests >= 1, "{:?}", kind);
        assert!(spec.harvest_minutes > 0, "{:?}", kind);
    }
}

#[test]
fn shipped_rarity_table_is_complete() {
    let shipped = shipped();
    assert_eq!(shipped.rarities.len(), Rarity::ALL.len());
    let total: f32 = shipped.rarities.values().map(|r| r.rate_percent).sum();
    assert!((total - 100.0).abs() < 0.001);
}

// ── Rarity distribution sweep ──────────────────────────────────────────

#[test]
fn rarity_sweep_matches_rates() {
    let shipped = shipped();
    let mut counts = std::collections::BTreeMap::new();
    // Roll 0.0, 0.1, ... 99.9
    for i in 0..1000 {
        let roll = i as f32 / 10.0;
        *counts.entry(draw_rarity(&shipped, roll)).or_insert(0u32) += 1;
    }
    assert_eq!(counts[&Rarity::Common], 500);
    assert_eq!(counts[&Rarity::Legendary], 20);
}

#[test]
fn higher_tiers_work_faster() {
    let shipped = shipped();
    let common = draw_worker_stats(&shipped, 0.0, 0.5, 0.5);
    let legendary = draw_worker_stats(&shipped, 99.9, 0.5, 0.5);
    assert!(legendary.move_speed > common.move_speed);
    assert!(legendary.work_duration < common.work_duration);
}
