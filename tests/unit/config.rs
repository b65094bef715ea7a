//! Unit tests for configuration parsing

use chrono::NaiveDate;
use levercast::config::{parse_flag, parse_projection_target};

#[test]
fn test_projection_target_values() {
    let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
    assert_eq!(parse_projection_target(None, today), Some(today));
    assert_eq!(parse_projection_target(Some("today"), today), Some(today));
    assert_eq!(parse_projection_target(Some("off"), today), None);
    assert_eq!(parse_projection_target(Some("NONE"), today), None);
    assert_eq!(parse_projection_target(Some(""), today), None);
    assert_eq!(
        parse_projection_target(Some("2026-01-01"), today),
        NaiveDate::from_ymd_opt(2026, 1, 1)
    );
    assert_eq!(parse_projection_target(Some("soon"), today), None);
}

#[test]
fn test_fetch_flags() {
    assert!(parse_flag(Some("1")));
    assert!(parse_flag(Some("TRUE")));
    assert!(parse_flag(Some(" yes ")));
    assert!(!parse_flag(Some("0")));
    assert!(!parse_flag(Some("off")));
    assert!(!parse_flag(None));
}
