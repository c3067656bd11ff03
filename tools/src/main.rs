//! aml-runner: headless batch detection runner.
//!
//! Usage:
//!   aml-runner --db ledger.db --config detection.json
//!   aml-runner --seed 12345 --customers 80 --days 45 --workers 4
//!
//! With no --db (or an empty database) a synthetic ledger is generated
//! from --seed so the whole pipeline can be exercised locally. Alerted
//! cases are printed as JSON lines; a human summary follows.

use aml_core::{
    batch::DetectionBatch,
    config::DetectionConfig,
    store::AmlStore,
    synthetic::{populate, LedgerSpec},
};
use anyhow::Result;
use chrono::Utc;
use std::env;
use std::path::Path;

/// Machine-readable end-of-run summary, printed with --json.
#[derive(serde::Serialize)]
struct RunSummary {
    batch_id: String,
    finished_at: chrono::DateTime<Utc>,
    transactions: i64,
    evaluated: usize,
    failed: usize,
    patterns: usize,
    alerts: usize,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let customers = parse_arg(&args, "--customers", 50usize);
    let days = parse_arg(&args, "--days", 30u32);
    let workers = parse_arg(&args, "--workers", 0usize);
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());
    let single_customer = args
        .windows(2)
        .find(|w| w[0] == "--customer")
        .map(|w| w[1].as_str());
    let json_summary = args.iter().any(|a| a == "--json");

    // For :memory: use SQLite shared-memory URI so a reopened connection
    // would still see the same database.
    let db_effective: String = if db == ":memory:" {
        format!("file:amlrun_{}?mode=memory&cache=shared", now_secs())
    } else {
        db.to_string()
    };
    let store = AmlStore::open(&db_effective)?;
    store.migrate()?;

    let mut config = match config_path {
        Some(p) => DetectionConfig::load(Path::new(p))?,
        None => DetectionConfig::default(),
    };
    if workers > 0 {
        config.workers = workers;
    }

    if store.transaction_count()? == 0 {
        let spec = LedgerSpec {
            seed,
            customers,
            days,
            ..LedgerSpec::default()
        };
        let summary = populate(&store, &spec)?;
        println!(
            "seeded synthetic ledger: seed={} customers={} transactions={}",
            seed, summary.customers, summary.transactions
        );
    }

    let batch = DetectionBatch::new(&store, config)?;

    if let Some(customer_id) = single_customer {
        let case = batch.run_for_customer(customer_id)?;
        println!("{}", serde_json::to_string_pretty(&case)?);
        return Ok(());
    }

    let report = batch.run()?;

    // One JSON line per alerted case: the feed for the report assembler.
    for case in report.alerted_cases() {
        println!("{}", serde_json::to_string(case)?);
    }

    if json_summary {
        let summary = RunSummary {
            batch_id: report.batch_id.clone(),
            finished_at: Utc::now(),
            transactions: store.transaction_count()?,
            evaluated: report.cases.len(),
            failed: report.failures.len(),
            patterns: report.pattern_count(),
            alerts: report.alerted_cases().count(),
        };
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        print_summary(&store, &report)?;
    }
    Ok(())
}

fn print_summary(store: &AmlStore, report: &aml_core::batch::BatchReport) -> Result<()> {
    use aml_core::pattern::PatternType;

    let count_of = |kind: PatternType| {
        report
            .cases
            .iter()
            .flat_map(|c| &c.patterns)
            .filter(|p| p.pattern_type() == kind)
            .count()
    };

    println!();
    println!("=== BATCH SUMMARY ===");
    println!("  batch_id:        {}", report.batch_id);
    println!("  transactions:    {}", store.transaction_count()?);
    println!("  customers:       {}", report.cases.len() + report.failures.len());
    println!("  evaluated:       {}", report.cases.len());
    println!("  failed:          {}", report.failures.len());
    println!("  patterns:        {}", report.pattern_count());
    println!("    large_amount:  {}", count_of(PatternType::LargeAmount));
    println!("    frequent_small: {}", count_of(PatternType::FrequentSmall));
    println!("    multi_location: {}", count_of(PatternType::MultiLocation));
    println!("  alerts:          {}", report.alerted_cases().count());

    for failure in &report.failures {
        log::warn!(
            "could not evaluate {}: {}{}",
            failure.customer_id,
            failure.error,
            if failure.transient { " (retryable)" } else { "" }
        );
    }

    let top = store.top_risk_profiles(5)?;
    if !top.is_empty() {
        println!();
        println!("=== TOP RISK PROFILES ===");
        for profile in top {
            println!(
                "  {} | score {:>7.1} | previous {:>7.1}",
                profile.customer_id, profile.risk_score, profile.previous_risk_score
            );
        }
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
