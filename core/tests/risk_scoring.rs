//! Risk-score accumulation, persistence, and the alert threshold.

use aml_core::error::AmlError;
use aml_core::pattern::{PatternDetails, SuspiciousPattern};
use aml_core::risk_scorer::RiskScorer;
use aml_core::store::{AmlStore, CustomerRecord};
use chrono::{TimeZone, Utc};

fn store_with_customer(customer_id: &str) -> AmlStore {
    let store = AmlStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
        .upsert_customer(&CustomerRecord {
            customer_id: customer_id.to_string(),
            name: "Ada Alvarez".to_string(),
            email: "ada.alvarez@example.com".to_string(),
            phone: "+1-555-0042".to_string(),
            account_no: "ACC-000042".to_string(),
            location: "Zurich".to_string(),
        })
        .unwrap();
    store
}

fn pattern(customer_id: &str, details: PatternDetails) -> SuspiciousPattern {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    SuspiciousPattern {
        customer_id: customer_id.to_string(),
        window_start: at,
        window_end: at,
        transaction_ids: vec!["t-001".to_string()],
        details,
    }
}

fn large(customer_id: &str) -> SuspiciousPattern {
    pattern(
        customer_id,
        PatternDetails::LargeAmount {
            role: aml_core::ledger::Role::Sender,
            location: "Zurich".to_string(),
            amount: 9_000.0,
        },
    )
}

fn frequent(customer_id: &str) -> SuspiciousPattern {
    pattern(
        customer_id,
        PatternDetails::FrequentSmall {
            transaction_count: 4,
            total_amount: 700.0,
        },
    )
}

fn multi(customer_id: &str) -> SuspiciousPattern {
    pattern(
        customer_id,
        PatternDetails::MultiLocation {
            transaction_count: 3,
            location_count: 2,
            locations: vec!["Dubai".to_string(), "Zurich".to_string()],
        },
    )
}

/// Previous 40, one large-amount (15) plus one multi-location (20):
/// delta 35, new score 75, alerted.
#[test]
fn weighted_delta_merges_with_previous_score() {
    let store = store_with_customer("c-0001");
    store.ensure_risk_profile("c-0001").unwrap();
    assert!(store
        .compare_and_set_risk_score("c-0001", 0.0, 40.0, 0)
        .unwrap());

    let scorer = RiskScorer::new(&store, 50.0).unwrap();
    let update = scorer
        .score("c-0001", &[large("c-0001"), multi("c-0001")])
        .unwrap();

    assert_eq!(update.previous_score, 40.0);
    assert_eq!(update.delta, 35.0);
    assert_eq!(update.new_score, 75.0);
    assert!(update.alert_triggered);

    let profile = store.risk_profile("c-0001").unwrap().unwrap();
    assert_eq!(profile.risk_score, 75.0);
    assert_eq!(profile.previous_risk_score, 40.0);
}

/// Landing exactly on the threshold alerts: the comparison is >=.
#[test]
fn exact_threshold_triggers_alert() {
    let store = store_with_customer("c-0001");
    let scorer = RiskScorer::new(&store, 50.0).unwrap();

    let patterns = vec![
        large("c-0001"),
        large("c-0001"),
        frequent("c-0001"),
        frequent("c-0001"),
    ];
    let update = scorer.score("c-0001", &patterns).unwrap();

    assert_eq!(update.new_score, 50.0);
    assert!(update.alert_triggered);
}

/// One step below the threshold stays clear.
#[test]
fn below_threshold_stays_clear() {
    let store = store_with_customer("c-0001");
    let scorer = RiskScorer::new(&store, 50.0).unwrap();

    let update = scorer
        .score("c-0001", &[large("c-0001"), large("c-0001"), frequent("c-0001")])
        .unwrap();
    assert_eq!(update.new_score, 40.0);
    assert!(!update.alert_triggered);
}

/// Scores never go down across successive runs.
#[test]
fn score_is_monotonically_non_decreasing() {
    let store = store_with_customer("c-0001");
    let scorer = RiskScorer::new(&store, 50.0).unwrap();

    let mut last = 0.0;
    for _ in 0..5 {
        let update = scorer.score("c-0001", &[frequent("c-0001")]).unwrap();
        assert!(update.new_score >= last);
        assert_eq!(update.new_score, update.previous_score + 10.0);
        last = update.new_score;
    }
    assert_eq!(last, 50.0);
}

/// The first scoring run creates the profile lazily, starting from zero.
#[test]
fn first_run_starts_from_zero() {
    let store = store_with_customer("c-0001");
    assert!(store.risk_profile("c-0001").unwrap().is_none());

    let scorer = RiskScorer::new(&store, 50.0).unwrap();
    let update = scorer.score("c-0001", &[frequent("c-0001")]).unwrap();

    assert_eq!(update.previous_score, 0.0);
    assert_eq!(update.new_score, 10.0);
    assert!(store.risk_profile("c-0001").unwrap().is_some());
}

/// Unknown customers fail loudly and leave no orphan profile behind.
#[test]
fn unknown_customer_is_rejected() {
    let store = store_with_customer("c-0001");
    let scorer = RiskScorer::new(&store, 50.0).unwrap();

    let result = scorer.score("c-ghost", &[frequent("c-ghost")]);
    assert!(matches!(
        result,
        Err(AmlError::CustomerNotFound { customer_id }) if customer_id == "c-ghost"
    ));
    assert!(store.risk_profile("c-ghost").unwrap().is_none());
}

/// No patterns means a read-only evaluation: no profile row, no write.
#[test]
fn empty_patterns_take_the_read_only_path() {
    let store = store_with_customer("c-0001");
    let scorer = RiskScorer::new(&store, 50.0).unwrap();

    let update = scorer.score("c-0001", &[]).unwrap();
    assert_eq!(update.delta, 0.0);
    assert_eq!(update.previous_score, update.new_score);
    assert!(!update.alert_triggered);
    assert!(
        store.risk_profile("c-0001").unwrap().is_none(),
        "a quiet run must not create profile rows"
    );
}

/// A quiet run still reports a standing alert for an already-hot score.
#[test]
fn quiet_run_reports_standing_alert() {
    let store = store_with_customer("c-0001");
    store.ensure_risk_profile("c-0001").unwrap();
    assert!(store
        .compare_and_set_risk_score("c-0001", 0.0, 60.0, 0)
        .unwrap());

    let scorer = RiskScorer::new(&store, 50.0).unwrap();
    let update = scorer.score("c-0001", &[]).unwrap();

    assert_eq!(update.new_score, 60.0);
    assert!(update.alert_triggered);
}

/// The guarded update refuses a stale expectation, so concurrent writers
/// cannot silently lose an update.
#[test]
fn stale_compare_and_set_is_rejected() {
    let store = store_with_customer("c-0001");
    store.ensure_risk_profile("c-0001").unwrap();

    assert!(store
        .compare_and_set_risk_score("c-0001", 0.0, 10.0, 0)
        .unwrap());
    assert!(
        !store
            .compare_and_set_risk_score("c-0001", 0.0, 20.0, 0)
            .unwrap(),
        "an update against a stale score must be refused"
    );

    let profile = store.risk_profile("c-0001").unwrap().unwrap();
    assert_eq!(profile.risk_score, 10.0);
}
