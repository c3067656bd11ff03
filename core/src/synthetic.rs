//! Deterministic synthetic ledger generation.
//!
//! Used by the runner for local demos and by the determinism test. The
//! generated world mixes a quiet baseline with injected structuring
//! bursts, location-hop clusters, and oversized transfers so every
//! detector has material to find. Same seed, same ledger, byte for byte.

use crate::error::AmlResult;
use crate::ledger::Transaction;
use crate::rng::DetRng;
use crate::store::{AmlStore, CustomerRecord};
use chrono::{DateTime, Duration, TimeZone, Utc};

const CITIES: &[&str] = &[
    "New York",
    "London",
    "Singapore",
    "Dubai",
    "Zurich",
    "Hong Kong",
    "Toronto",
    "Frankfurt",
    "Mumbai",
    "Lagos",
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bruno", "Carla", "Dmitri", "Elena", "Farid", "Grace", "Hiro", "Ines", "Jonas",
    "Kira", "Luis", "Mona", "Noel", "Priya", "Ravi", "Sofia", "Tomas", "Uma", "Viktor",
];

const LAST_NAMES: &[&str] = &[
    "Alvarez", "Becker", "Chen", "Dias", "Eriksen", "Fontaine", "Gupta", "Haddad", "Ivanov",
    "Juma", "Kowalski", "Lindqvist", "Mensah", "Novak", "Okafor", "Petrov", "Quinn", "Rossi",
    "Silva", "Tanaka",
];

const PAYMENT_TYPES: &[&str] = &["wire", "ach", "card", "cash_deposit"];

#[derive(Debug, Clone)]
pub struct LedgerSpec {
    pub seed: u64,
    pub customers: usize,
    pub days: u32,
    /// Baseline transactions per customer over the whole horizon.
    pub baseline_txns: usize,
}

impl Default for LedgerSpec {
    fn default() -> Self {
        Self {
            seed: 42,
            customers: 50,
            days: 30,
            baseline_txns: 12,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SyntheticSummary {
    pub customers: usize,
    pub transactions: usize,
}

/// The fixed opening timestamp of every synthetic ledger.
pub fn ledger_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default()
}

/// Fill a migrated store with a reproducible ledger.
pub fn populate(store: &AmlStore, spec: &LedgerSpec) -> AmlResult<SyntheticSummary> {
    let mut people_rng = DetRng::stream(spec.seed, 0);
    let mut base_rng = DetRng::stream(spec.seed, 1);
    let mut burst_rng = DetRng::stream(spec.seed, 2);

    let start = ledger_epoch();
    let horizon_secs = i64::from(spec.days) * 86_400;

    let mut customers = Vec::with_capacity(spec.customers);
    for i in 0..spec.customers {
        let first = pick(&mut people_rng, FIRST_NAMES);
        let last = pick(&mut people_rng, LAST_NAMES);
        let home = pick(&mut people_rng, CITIES);
        let record = CustomerRecord {
            customer_id: format!("cust-{i:04}"),
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}@example.com",
                first.to_lowercase(),
                last.to_lowercase()
            ),
            phone: format!("+1-555-{:04}", people_rng.next_u64_below(10_000)),
            account_no: format!("ACC-{i:06}"),
            location: home.to_string(),
        };
        store.upsert_customer(&record)?;
        customers.push(record);
    }

    let mut seq = 0usize;
    let mut write = |store: &AmlStore,
                     sender: &CustomerRecord,
                     receiver: &CustomerRecord,
                     time: DateTime<Utc>,
                     amount: f64,
                     payment_type: &str,
                     sender_location: &str|
     -> AmlResult<()> {
        seq += 1;
        store.insert_transaction(&Transaction {
            transaction_id: format!("txn-{seq:06}"),
            sender_customer_id: sender.customer_id.clone(),
            receiver_customer_id: receiver.customer_id.clone(),
            sender_account: sender.account_no.clone(),
            receiver_account: receiver.account_no.clone(),
            sender_location: sender_location.to_string(),
            receiver_location: receiver.location.clone(),
            time,
            payment_type: payment_type.to_string(),
            amount: round_cents(amount),
        })
    };

    // Quiet baseline: mid-sized transfers from the customer's home city.
    for (i, sender) in customers.iter().enumerate() {
        for _ in 0..spec.baseline_txns {
            let receiver = &customers[pick_other(&mut base_rng, spec.customers, i)];
            let at = start + Duration::seconds(base_rng.next_u64_below(horizon_secs as u64) as i64);
            let amount = (1200.0 + base_rng.pareto(300.0, 1.6)).min(4500.0);
            let payment_type = pick(&mut base_rng, PAYMENT_TYPES);
            write(store, sender, receiver, at, amount, payment_type, &sender.location)?;
        }
    }

    // Injected suspicious behavior.
    for (i, sender) in customers.iter().enumerate() {
        // Structuring burst: several sub-threshold payments inside a day.
        if burst_rng.chance(0.18) {
            let n = 3 + burst_rng.next_u64_below(3);
            let t0 = start
                + Duration::seconds(
                    burst_rng.next_u64_below((horizon_secs - 86_400).max(1) as u64) as i64,
                );
            let receiver = &customers[pick_other(&mut burst_rng, spec.customers, i)];
            for k in 0..n {
                let at = t0 + Duration::minutes((k * (45 + burst_rng.next_u64_below(60))) as i64);
                let amount = 150.0 + burst_rng.next_u64_below(750) as f64;
                write(store, sender, receiver, at, amount, "cash_deposit", &sender.location)?;
            }
        }

        // Location hop: a tight cluster spread across cities.
        if burst_rng.chance(0.15) {
            let n = 3 + burst_rng.next_u64_below(3);
            let t0 = start
                + Duration::seconds(
                    burst_rng.next_u64_below((horizon_secs - 172_800).max(1) as u64) as i64,
                );
            for k in 0..n {
                let receiver = &customers[pick_other(&mut burst_rng, spec.customers, i)];
                let at = t0 + Duration::hours(k as i64 * 6);
                let city = CITIES[((i as u64 + k) % CITIES.len() as u64) as usize];
                let amount = 400.0 + burst_rng.next_u64_below(2_000) as f64;
                write(store, sender, receiver, at, amount, "card", city)?;
            }
        }

        // One oversized transfer.
        if burst_rng.chance(0.12) {
            let receiver = &customers[pick_other(&mut burst_rng, spec.customers, i)];
            let at = start + Duration::seconds(burst_rng.next_u64_below(horizon_secs as u64) as i64);
            let amount = 6_000.0 + burst_rng.pareto(2_000.0, 1.2).min(90_000.0);
            write(store, sender, receiver, at, amount, "wire", &sender.location)?;
        }
    }

    log::info!(
        "synthetic ledger: seed {}, {} customers, {} transactions",
        spec.seed,
        customers.len(),
        seq
    );
    Ok(SyntheticSummary {
        customers: customers.len(),
        transactions: seq,
    })
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn pick<'a>(rng: &mut DetRng, options: &'a [&'a str]) -> &'a str {
    options[rng.next_u64_below(options.len() as u64) as usize]
}

/// Any customer index other than `own` (the world always has at least two).
fn pick_other(rng: &mut DetRng, total: usize, own: usize) -> usize {
    let other = rng.next_u64_below(total.saturating_sub(1).max(1) as u64) as usize;
    if other >= own {
        (other + 1) % total
    } else {
        other
    }
}
