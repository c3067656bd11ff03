//! Frequent-small-transaction detection.

use aml_core::config::FrequentSmallParams;
use aml_core::error::AmlError;
use aml_core::frequent_small_detector::FrequentSmallDetector;
use aml_core::ledger::{sort_events, LedgerEvent, Role, Transaction};
use aml_core::pattern::PatternDetails;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap()
}

fn ev(id: &str, hours: i64, amount: f64) -> LedgerEvent {
    LedgerEvent {
        transaction_id: id.to_string(),
        customer_id: "c-0001".to_string(),
        role: Role::Sender,
        location: "Toronto".to_string(),
        time: base() + Duration::hours(hours),
        amount,
    }
}

fn detector(amount: f64, count: usize, hours: i64) -> FrequentSmallDetector {
    FrequentSmallDetector::new(FrequentSmallParams {
        amount_threshold: amount,
        count_threshold: count,
        time_window_hours: hours,
    })
    .unwrap()
}

/// Three 100-unit payments two hours apart inside a 24h window: exactly
/// one pattern covering all three, totaling 300.
#[test]
fn three_small_payments_form_one_pattern() {
    let events = vec![ev("t-001", 0, 100.0), ev("t-002", 2, 100.0), ev("t-003", 4, 100.0)];
    let patterns = detector(200.0, 3, 24).detect("c-0001", &events);

    assert_eq!(patterns.len(), 1);
    let p = &patterns[0];
    assert_eq!(p.transaction_ids, vec!["t-001", "t-002", "t-003"]);
    assert_eq!(p.window_start, base());
    assert_eq!(p.window_end, base() + Duration::hours(4));
    match &p.details {
        PatternDetails::FrequentSmall {
            transaction_count,
            total_amount,
        } => {
            assert_eq!(*transaction_count, 3);
            assert!((total_amount - 300.0).abs() < 1e-9);
        }
        other => panic!("wrong details: {other:?}"),
    }
}

/// Payments above the amount threshold never enter the windows.
#[test]
fn large_payments_are_filtered_out() {
    let events = vec![
        ev("t-001", 0, 100.0),
        ev("t-002", 1, 5_000.0),
        ev("t-003", 2, 100.0),
    ];
    assert!(detector(200.0, 3, 24).detect("c-0001", &events).is_empty());
}

/// The amount filter is inclusive: a payment exactly at the threshold
/// still counts as small.
#[test]
fn amount_threshold_is_inclusive() {
    let events = vec![ev("t-001", 0, 200.0), ev("t-002", 1, 200.0), ev("t-003", 2, 200.0)];
    assert_eq!(detector(200.0, 3, 24).detect("c-0001", &events).len(), 1);
}

/// A self-transfer shows up once per role, so it counts twice toward the
/// count threshold while naming the transaction once.
#[test]
fn self_transfer_counts_once_per_role() {
    let loop_txn = Transaction {
        transaction_id: "t-loop".to_string(),
        sender_customer_id: "c-0001".to_string(),
        receiver_customer_id: "c-0001".to_string(),
        sender_account: "ACC-01".to_string(),
        receiver_account: "ACC-02".to_string(),
        sender_location: "Toronto".to_string(),
        receiver_location: "Toronto".to_string(),
        time: base(),
        payment_type: "wire".to_string(),
        amount: 150.0,
    };
    let mut events = loop_txn.events_for("c-0001");
    events.push(ev("t-002", 1, 150.0));
    sort_events(&mut events);

    let patterns = detector(200.0, 3, 24).detect("c-0001", &events);
    assert_eq!(patterns.len(), 1);
    match &patterns[0].details {
        PatternDetails::FrequentSmall {
            transaction_count, ..
        } => assert_eq!(*transaction_count, 3),
        other => panic!("wrong details: {other:?}"),
    }
    assert_eq!(patterns[0].transaction_ids, vec!["t-loop", "t-002"]);
}

/// Two separated bursts become two patterns with no shared members.
#[test]
fn separated_bursts_form_separate_patterns() {
    let events = vec![
        ev("t-001", 0, 90.0),
        ev("t-002", 1, 90.0),
        ev("t-003", 2, 90.0),
        ev("t-004", 40, 90.0),
        ev("t-005", 41, 90.0),
        ev("t-006", 42, 90.0),
    ];
    let patterns = detector(200.0, 3, 24).detect("c-0001", &events);

    assert_eq!(patterns.len(), 2);
    assert_eq!(patterns[0].transaction_ids, vec!["t-001", "t-002", "t-003"]);
    assert_eq!(patterns[1].transaction_ids, vec!["t-004", "t-005", "t-006"]);
}

#[test]
fn zero_time_window_is_rejected() {
    let result = FrequentSmallDetector::new(FrequentSmallParams {
        amount_threshold: 200.0,
        count_threshold: 3,
        time_window_hours: 0,
    });
    assert!(matches!(
        result,
        Err(AmlError::InvalidParameter { name, .. }) if name == "frequent_small.time_window_hours"
    ));
}

#[test]
fn negative_amount_threshold_is_rejected() {
    let result = FrequentSmallDetector::new(FrequentSmallParams {
        amount_threshold: -5.0,
        count_threshold: 3,
        time_window_hours: 24,
    });
    assert!(matches!(result, Err(AmlError::InvalidParameter { .. })));
}
