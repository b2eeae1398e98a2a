//! Worker rarity draws.
//!
//! Rarity is picked by walking the tiers in ascending order and accumulating
//! their `rate_percent`; the first tier whose cumulative bucket contains the
//! roll wins. A roll past the last bucket (rates summing below 100) lands on
//! `Common`. The caller supplies the random numbers so the draw itself stays
//! deterministic and testable.
//!
//! ```
//! use farmstead_logic::config::GameConfig;
//! use farmstead_logic::constants::Rarity;
//! use farmstead_logic::rarity::draw_rarity;
//!
//! let config = GameConfig::default();
//! assert_eq!(draw_rarity(&config, 10.0), Rarity::Common);
//! assert_eq!(draw_rarity(&config, 99.5), Rarity::Legendary);
//! ```

use crate::config::{GameConfig, RarityStats};
use crate::constants::Rarity;

/// Stats rolled for a freshly hired worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkerStats {
    pub rarity: Rarity,
    pub move_speed: f32,
    /// Seconds of work per task.
    pub work_duration: f32,
}

/// Pick a rarity for `roll_percent` in `[0, 100)`.
pub fn draw_rarity(config: &GameConfig, roll_percent: f32) -> Rarity {
    let mut cumulative = 0.0;
    for rarity in Rarity::ALL {
        cumulative += config.rarity_stats(rarity).rate_percent;
        if roll_percent < cumulative {
            return rarity;
        }
    }
    Rarity::Common
}

/// Interpolate speed and duration inside the tier's ranges.
///
/// `speed_t` and `duration_t` are unit samples; values outside `[0, 1]` are
/// clamped.
pub fn roll_stats(stats: &RarityStats, speed_t: f32, duration_t: f32) -> (f32, f32) {
    let speed = lerp(stats.speed_min, stats.speed_max, speed_t.clamp(0.0, 1.0));
    let duration = lerp(stats.duration_min, stats.duration_max, duration_t.clamp(0.0, 1.0));
    (speed, duration)
}

/// Full draw: tier from `roll_percent`, then stats from the two unit samples.
pub fn draw_worker_stats(
    config: &GameConfig,
    roll_percent: f32,
    speed_t: f32,
    duration_t: f32,
) -> WorkerStats {
    let rarity = draw_rarity(config, roll_percent);
    let (move_speed, work_duration) = roll_stats(&config.rarity_stats(rarity), speed_t, duration_t);
    WorkerStats {
        rarity,
        move_speed,
        work_duration,
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_edges() {
        let config = GameConfig::default();
        // 50 / 25 / 15 / 8 / 2
        assert_eq!(draw_rarity(&config, 0.0), Rarity::Common);
        assert_eq!(draw_rarity(&config, 49.99), Rarity::Common);
        assert_eq!(draw_rarity(&config, 50.0), Rarity::Uncommon);
        assert_eq!(draw_rarity(&config, 74.99), Rarity::Uncommon);
        assert_eq!(draw_rarity(&config, 75.0), Rarity::Rare);
        assert_eq!(draw_rarity(&config, 90.0), Rarity::Epic);
        assert_eq!(draw_rarity(&config, 98.0), Rarity::Legendary);
    }

    #[test]
    fn test_fallthrough_is_common() {
        let mut config = GameConfig::default();
        for stats in config.rarities.values_mut() {
            stats.rate_percent = 1.0;
        }
        assert_eq!(draw_rarity(&config, 80.0), Rarity::Common);
        assert_eq!(draw_rarity(&config, 3.5), Rarity::Epic);
    }

    #[test]
    fn test_roll_stats_inside_range() {
        let stats = RarityStats::new(10.0, 2.0, 4.0, 60.0, 80.0);
        assert_eq!(roll_stats(&stats, 0.0, 0.0), (2.0, 60.0));
        assert_eq!(roll_stats(&stats, 1.0, 1.0), (4.0, 80.0));
        assert_eq!(roll_stats(&stats, 0.5, 0.25), (3.0, 65.0));
        assert_eq!(roll_stats(&stats, 7.0, -1.0), (4.0, 60.0));
    }

    #[test]
    fn test_draw_worker_stats() {
        let config = GameConfig::default();
        let stats = draw_worker_stats(&config, 99.0, 0.0, 1.0);
        assert_eq!(stats.rarity, Rarity::Legendary);
        assert_eq!(stats.move_speed, 3.5);
        assert_eq!(stats.work_duration, 45.0);
    }
}
