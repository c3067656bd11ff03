//! Window aggregation over one customer's event stream.
//!
//! Two strategies:
//!   - Anchored candidate windows with first-claim dedup
//!     (frequent-small detection).
//!   - Gap-based session windows (multi-location detection).
//!
//! Both require the input slice to be one customer's events in canonical
//! order (time, transaction id, role). Ties on timestamp are therefore
//! resolved by transaction id ascending everywhere.

use crate::ledger::{LedgerEvent, Role};
use crate::types::TransactionId;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};

/// A group of events claimed by one window.
///
/// INVARIANT: `events` is non-empty and in canonical order. Both
/// constructors below uphold this; windows are never built empty.
#[derive(Debug, Clone, PartialEq)]
pub struct EventWindow {
    pub events: Vec<LedgerEvent>,
}

impl EventWindow {
    /// Timestamp of the earliest member.
    pub fn start(&self) -> DateTime<Utc> {
        self.events[0].time
    }

    /// Timestamp of the latest member.
    pub fn end(&self) -> DateTime<Utc> {
        self.events[self.events.len() - 1].time
    }

    /// Number of member events. A self-transfer contributes one event per
    /// role, so it counts twice here.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Member transaction ids in event order, deduplicated.
    pub fn transaction_ids(&self) -> Vec<TransactionId> {
        let mut ids: Vec<TransactionId> = Vec::with_capacity(self.events.len());
        for e in &self.events {
            if !ids.contains(&e.transaction_id) {
                ids.push(e.transaction_id.clone());
            }
        }
        ids
    }

    /// Sum of member event amounts.
    pub fn total_amount(&self) -> f64 {
        self.events.iter().map(|e| e.amount).sum()
    }

    /// Sorted distinct member locations.
    pub fn distinct_locations(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| e.location.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Anchored candidate windows with first-claim dedup.
///
/// Every event anchors a candidate covering `[anchor.time, anchor.time +
/// window]` inclusive; a candidate keeps all events in that range and is
/// discarded when it holds fewer than `min_count`. Because every event is
/// an anchor, candidates overlap heavily; overlap is resolved by walking
/// qualifying candidates in anchor order with an ownership map:
///
///   - each event is claimed by the first candidate that contains it,
///     whether or not that candidate ends up emitted;
///   - a candidate is emitted only when it is the first claimant of every
///     one of its members.
///
/// Emitted windows are time-ordered and pairwise disjoint in membership
/// even when their nominal time ranges overlap. Ownership is keyed by
/// (transaction id, role): the two events of a self-transfer are claimed
/// independently.
pub fn anchored_windows(
    events: &[LedgerEvent],
    window: Duration,
    min_count: usize,
) -> Vec<EventWindow> {
    let mut candidates: Vec<(usize, usize)> = Vec::new();
    for anchor in events {
        let open = anchor.time;
        let close = open + window;
        let lo = events.partition_point(|e| e.time < open);
        let hi = events.partition_point(|e| e.time <= close);
        if hi - lo >= min_count {
            candidates.push((lo, hi));
        }
    }

    let mut claimed: HashMap<(TransactionId, Role), usize> = HashMap::new();
    let mut windows = Vec::new();
    for (idx, &(lo, hi)) in candidates.iter().enumerate() {
        let members = &events[lo..hi];
        let all_first = members
            .iter()
            .all(|e| !claimed.contains_key(&(e.transaction_id.clone(), e.role)));
        for e in members {
            claimed
                .entry((e.transaction_id.clone(), e.role))
                .or_insert(idx);
        }
        if all_first {
            windows.push(EventWindow {
                events: members.to_vec(),
            });
        }
    }
    windows
}

/// Gap-based session windows.
///
/// A new session starts at the first event, or whenever the gap from the
/// previous event strictly exceeds `max_gap`. Sessions partition the
/// stream exactly: every event lands in exactly one session and boundaries
/// fall only between consecutive events.
pub fn session_windows(events: &[LedgerEvent], max_gap: Duration) -> Vec<EventWindow> {
    let mut windows: Vec<EventWindow> = Vec::new();
    let mut current: Vec<LedgerEvent> = Vec::new();
    let mut prev_time: Option<DateTime<Utc>> = None;

    for event in events {
        let starts_new = match prev_time {
            None => true,
            Some(prev) => event.time - prev > max_gap,
        };
        if starts_new && !current.is_empty() {
            windows.push(EventWindow {
                events: std::mem::take(&mut current),
            });
        }
        current.push(event.clone());
        prev_time = Some(event.time);
    }
    if !current.is_empty() {
        windows.push(EventWindow { events: current });
    }
    windows
}
