//! Gap-based session windows must partition the event stream exactly.

use aml_core::ledger::{sort_events, LedgerEvent, Role};
use aml_core::rng::DetRng;
use aml_core::window::session_windows;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

fn ev(id: &str, hours: i64, location: &str) -> LedgerEvent {
    LedgerEvent {
        transaction_id: id.to_string(),
        customer_id: "c-0001".to_string(),
        role: Role::Sender,
        location: location.to_string(),
        time: base() + Duration::hours(hours),
        amount: 250.0,
    }
}

/// Union of session members equals the input, in order, with no overlap.
#[test]
fn sessions_partition_the_stream_exactly() {
    let mut rng = DetRng::new(99);
    let mut events: Vec<LedgerEvent> = (0..300)
        .map(|i| ev(&format!("t-{i:03}"), rng.next_u64_below(60 * 24) as i64, "Dubai"))
        .collect();
    sort_events(&mut events);

    let sessions = session_windows(&events, Duration::hours(48));
    let rejoined: Vec<LedgerEvent> = sessions
        .iter()
        .flat_map(|s| s.events.iter().cloned())
        .collect();

    assert_eq!(rejoined, events, "sessions must cover every event once, in order");
}

/// Session boundaries fall only between consecutive events whose gap
/// strictly exceeds the configured window.
#[test]
fn boundaries_follow_the_gap_rule() {
    let mut events: Vec<LedgerEvent> = (0..80)
        .map(|i| {
            let mut rng = DetRng::new(1000 + i);
            ev(
                &format!("t-{i:03}"),
                (i as i64) * (10 + rng.next_u64_below(80) as i64),
                "Zurich",
            )
        })
        .collect();
    sort_events(&mut events);

    let gap = Duration::hours(48);
    let sessions = session_windows(&events, gap);

    for s in &sessions {
        for pair in s.events.windows(2) {
            assert!(
                pair[1].time - pair[0].time <= gap,
                "gap inside a session exceeded the window"
            );
        }
    }
    for pair in sessions.windows(2) {
        let last = &pair[0].events[pair[0].events.len() - 1];
        let first = &pair[1].events[0];
        assert!(
            first.time - last.time > gap,
            "adjacent sessions must be separated by more than the window"
        );
    }
}

/// A gap exactly equal to the window keeps the session open; one second
/// more closes it.
#[test]
fn gap_equal_to_window_stays_in_session() {
    let events = vec![ev("t-001", 0, "London"), ev("t-002", 48, "London")];
    assert_eq!(session_windows(&events, Duration::hours(48)).len(), 1);

    let events = vec![
        ev("t-001", 0, "London"),
        LedgerEvent {
            time: base() + Duration::hours(48) + Duration::seconds(1),
            ..ev("t-002", 0, "London")
        },
    ];
    assert_eq!(session_windows(&events, Duration::hours(48)).len(), 2);
}

/// Three close events, a three-day silence, then a lone event: two
/// sessions, the trailing one alone.
#[test]
fn long_silence_starts_a_new_session() {
    let events = vec![
        ev("t-001", 0, "Paris"),
        ev("t-002", 1, "Paris"),
        ev("t-003", 2, "Madrid"),
        ev("t-004", 2 + 72, "Cairo"),
    ];
    let sessions = session_windows(&events, Duration::hours(48));

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].event_count(), 3);
    assert_eq!(sessions[0].distinct_locations(), vec!["Madrid", "Paris"]);
    assert_eq!(sessions[1].event_count(), 1);
    assert_eq!(sessions[1].distinct_locations(), vec!["Cairo"]);
}

#[test]
fn empty_stream_yields_no_sessions() {
    assert!(session_windows(&[], Duration::hours(48)).is_empty());
}
