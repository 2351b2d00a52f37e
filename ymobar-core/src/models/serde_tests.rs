//! Serde serialization/deserialization tests for core types.

use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::UsageSnapshot;

fn sample() -> UsageSnapshot {
    UsageSnapshot::new(
        1.23,
        3.0,
        1.0,
        2.5,
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap(),
    )
}

#[test]
fn test_snapshot_serializes_derived_fields() {
    let json: Value = serde_json::to_value(sample()).unwrap();

    assert_eq!(json["carry_over_gb"], 1.23);
    assert_eq!(json["base_allowance_gb"], 3.0);
    assert_eq!(json["purchased_extra_gb"], 1.0);
    assert_eq!(json["used_gb"], 2.5);
    assert_eq!(json["total_gb"], 3.0 + 1.23);
    assert_eq!(json["remaining_gb"], 1.73);
    assert!(json["used_percentage"].is_f64());
    assert_eq!(json["observed_at"], "2025-06-01T12:30:00Z");
}

#[test]
fn test_snapshot_deserialize_ignores_derived_fields() {
    // Derived values in the input are ignored and recomputed.
    let json = r#"{
        "carry_over_gb": 1.0,
        "base_allowance_gb": 2.0,
        "purchased_extra_gb": 0.0,
        "used_gb": 0.5,
        "total_gb": 99.0,
        "remaining_gb": 99.0,
        "observed_at": "2025-06-01T12:30:00Z"
    }"#;
    let snapshot: UsageSnapshot = serde_json::from_str(json).unwrap();

    assert_eq!(snapshot.total_gb(), 3.0);
    assert_eq!(snapshot.remaining_gb(), 2.5);
}

#[test]
fn test_snapshot_deserialize_goes_through_constructor() {
    let json = r#"{
        "carry_over_gb": -1.0,
        "base_allowance_gb": 2.0,
        "purchased_extra_gb": 0.0,
        "used_gb": 0.5,
        "observed_at": "2025-06-01T12:30:45.250Z"
    }"#;
    let snapshot: UsageSnapshot = serde_json::from_str(json).unwrap();

    assert_eq!(snapshot.carry_over_gb(), 0.0);
    assert_eq!(snapshot.total_gb(), 2.0);
    assert_eq!(
        snapshot.observed_at(),
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap()
    );
}
