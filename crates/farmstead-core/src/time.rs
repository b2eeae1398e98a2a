//! Wall-clock timestamps for growth timers and save files.
//!
//! A `Timestamp` is milliseconds since the Unix epoch. It is what gets
//! written to disk, so it must stay a plain sortable integer. Nothing in the
//! simulation reads the system clock on its own; `now` is always passed in.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const EPOCH: Self = Timestamp(0);

    /// Current wall-clock time. Hosts call this; the simulation never does.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Timestamp(millis)
    }

    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    pub fn from_minutes(minutes: i64) -> Self {
        Timestamp(minutes * 60_000)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Time from `earlier` to `self`, zero if `earlier` is later.
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0).max(0) as u64)
    }

    /// Advance by fractional seconds (negative values are ignored).
    pub fn plus_seconds(self, seconds: f64) -> Self {
        let millis = (seconds.max(0.0) * 1000.0).round() as i64;
        Timestamp(self.0.saturating_add(millis))
    }

    /// Hour of the day in UTC, 0-23.
    pub fn hour_of_day(self) -> u8 {
        (self.0.rem_euclid(86_400_000) / 3_600_000) as u8
    }
}

fn millis_of(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

impl std::ops::Add<Duration> for Timestamp {
    type Output = Timestamp;
    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(millis_of(rhs)))
    }
}

impl std::ops::Sub<Duration> for Timestamp {
    type Output = Timestamp;
    fn sub(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0.saturating_sub(millis_of(rhs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_since() {
        let a = Timestamp::from_minutes(10);
        let b = Timestamp::from_minutes(4);
        assert_eq!(a.saturating_since(b), Duration::from_secs(360));
        assert_eq!(b.saturating_since(a), Duration::ZERO);
    }

    #[test]
    fn test_add_duration() {
        let t = Timestamp::EPOCH + Duration::from_secs(90);
        assert_eq!(t.as_millis(), 90_000);
        assert_eq!(t - Duration::from_secs(30), Timestamp::from_millis(60_000));
    }

    #[test]
    fn test_huge_duration_saturates() {
        let far = Duration::from_secs(u64::MAX);
        assert_eq!(Timestamp::from_minutes(1) + far, Timestamp(i64::MAX));
        assert_eq!(Timestamp::EPOCH - far, Timestamp(-i64::MAX));
    }

    #[test]
    fn test_plus_seconds() {
        let t = Timestamp::EPOCH.plus_seconds(1.5);
        assert_eq!(t.as_millis(), 1500);
        assert_eq!(t.plus_seconds(-3.0), t);
    }

    #[test]
    fn test_hour_of_day() {
        assert_eq!(Timestamp::EPOCH.hour_of_day(), 0);
        assert_eq!(Timestamp::from_minutes(23 * 60 + 59).hour_of_day(), 23);
        assert_eq!(Timestamp::from_minutes(25 * 60).hour_of_day(), 1);
    }
}
