//! Usage snapshot types.
//!
//! A [`UsageSnapshot`] holds the four figures scraped from the portal's
//! usage summary page. Totals, the remaining allowance and the usage
//! percentage are always derived from those four figures on demand.

use chrono::{DateTime, Local, Timelike, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Clamps a raw figure to a finite, non-negative value.
fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Drops seconds and sub-second precision from a timestamp.
fn truncate_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}

// ============================================================================
// Usage Snapshot
// ============================================================================

/// Data allowance figures for the current billing period, in gigabytes.
///
/// Deserialization goes through [`UsageSnapshot::new`], so stored snapshots
/// get the same clamping and truncation as scraped ones.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct UsageSnapshot {
    /// Allowance carried over from the previous billing period.
    carry_over_gb: f64,
    /// The plan's standard monthly allowance.
    base_allowance_gb: f64,
    /// Paid add-on allowance.
    purchased_extra_gb: f64,
    /// Data consumed in the current period.
    used_gb: f64,
    /// Capture time, minute precision.
    observed_at: DateTime<Utc>,
}

impl UsageSnapshot {
    /// Creates a snapshot from the four raw figures.
    ///
    /// Negative or non-finite figures are stored as `0.0`, and the capture
    /// time is truncated to the minute.
    pub fn new(
        carry_over_gb: f64,
        base_allowance_gb: f64,
        purchased_extra_gb: f64,
        used_gb: f64,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            carry_over_gb: non_negative(carry_over_gb),
            base_allowance_gb: non_negative(base_allowance_gb),
            purchased_extra_gb: non_negative(purchased_extra_gb),
            used_gb: non_negative(used_gb),
            observed_at: truncate_to_minute(observed_at),
        }
    }

    /// Allowance carried over from the previous billing period ("繰越").
    pub fn carry_over_gb(&self) -> f64 {
        self.carry_over_gb
    }

    /// Base plan allowance ("基本").
    pub fn base_allowance_gb(&self) -> f64 {
        self.base_allowance_gb
    }

    /// Paid add-on allowance ("有料").
    pub fn purchased_extra_gb(&self) -> f64 {
        self.purchased_extra_gb
    }

    /// Data consumed in the current period.
    pub fn used_gb(&self) -> f64 {
        self.used_gb
    }

    /// When the figures were captured.
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Total allowance: base plus carry-over.
    ///
    /// Purchased extra allowance is reported separately and is not part of
    /// the total the portal shows.
    pub fn total_gb(&self) -> f64 {
        self.base_allowance_gb + self.carry_over_gb
    }

    /// Remaining allowance, rounded to two decimals.
    pub fn remaining_gb(&self) -> f64 {
        round2(self.total_gb() - self.used_gb)
    }

    /// Percentage of the total allowance consumed. Zero when the total is zero.
    pub fn used_percentage(&self) -> f64 {
        let total = self.total_gb();
        if total > 0.0 {
            self.used_gb / total * 100.0
        } else {
            0.0
        }
    }

    /// Fraction of the total still available, clamped to `[0, 1]`.
    pub fn remaining_ratio(&self) -> f64 {
        let total = self.total_gb();
        if total > 0.0 {
            (self.remaining_gb() / total).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Returns true once usage has reached the total allowance.
    pub fn is_exhausted(&self) -> bool {
        self.total_gb() > 0.0 && self.remaining_gb() <= 0.0
    }

    /// Capture time as `YYYY-MM-DD HH:MM` in local time.
    pub fn observed_at_display(&self) -> String {
        self.observed_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

/// The four raw figures and capture time as they appear in JSON. Derived
/// fields in the input are ignored.
#[derive(Deserialize)]
struct RawSnapshot {
    carry_over_gb: f64,
    base_allowance_gb: f64,
    purchased_extra_gb: f64,
    used_gb: f64,
    observed_at: DateTime<Utc>,
}

impl From<RawSnapshot> for UsageSnapshot {
    fn from(raw: RawSnapshot) -> Self {
        Self::new(
            raw.carry_over_gb,
            raw.base_allowance_gb,
            raw.purchased_extra_gb,
            raw.used_gb,
            raw.observed_at,
        )
    }
}

impl Serialize for UsageSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("UsageSnapshot", 8)?;
        state.serialize_field("carry_over_gb", &self.carry_over_gb)?;
        state.serialize_field("base_allowance_gb", &self.base_allowance_gb)?;
        state.serialize_field("purchased_extra_gb", &self.purchased_extra_gb)?;
        state.serialize_field("used_gb", &self.used_gb)?;
        state.serialize_field("total_gb", &self.total_gb())?;
        state.serialize_field("remaining_gb", &self.remaining_gb())?;
        state.serialize_field("used_percentage", &self.used_percentage())?;
        state.serialize_field("observed_at", &self.observed_at)?;
        state.end()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn test_derived_fields() {
        let snapshot = UsageSnapshot::new(1.23, 1.5, 0.0, 2.73, at());

        assert_eq!(snapshot.total_gb(), 1.5 + 1.23);
        assert_eq!(snapshot.remaining_gb(), 0.0);
        assert!((snapshot.used_percentage() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_remaining_is_rounded() {
        let snapshot = UsageSnapshot::new(0.0, 3.0, 0.0, 1.004, at());
        assert_eq!(snapshot.remaining_gb(), 2.0);
    }

    #[test]
    fn test_zero_total_percentage() {
        let snapshot = UsageSnapshot::new(0.0, 0.0, 1.0, 0.5, at());
        assert_eq!(snapshot.used_percentage(), 0.0);
        assert_eq!(snapshot.remaining_ratio(), 0.0);
        assert!(!snapshot.is_exhausted());
    }

    #[test]
    fn test_negative_and_nan_clamped() {
        let snapshot = UsageSnapshot::new(-1.0, f64::NAN, f64::INFINITY, -0.5, at());
        assert_eq!(snapshot.carry_over_gb(), 0.0);
        assert_eq!(snapshot.base_allowance_gb(), 0.0);
        assert_eq!(snapshot.purchased_extra_gb(), 0.0);
        assert_eq!(snapshot.used_gb(), 0.0);
    }

    #[test]
    fn test_observed_at_minute_precision() {
        let snapshot = UsageSnapshot::new(0.0, 1.0, 0.0, 0.0, at());
        assert_eq!(
            snapshot.observed_at(),
            Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 0).unwrap()
        );
    }

    #[test]
    fn test_remaining_ratio_over_limit() {
        let snapshot = UsageSnapshot::new(0.0, 2.0, 0.0, 3.0, at());
        assert_eq!(snapshot.remaining_gb(), -1.0);
        assert_eq!(snapshot.remaining_ratio(), 0.0);
        assert!(snapshot.is_exhausted());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(round2(-0.004), -0.0);
    }
}
