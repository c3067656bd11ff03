//! The detection batch pipeline: detect → score → report.
//!
//! Customers are independent units of work. Event streams are loaded one
//! customer at a time, detection fans out across a bounded worker pool
//! (pure compute, no shared mutable state), and scoring serializes on the
//! store connection. A failure for one customer is recorded and never
//! aborts the rest of the batch.

use crate::config::DetectionConfig;
use crate::error::AmlResult;
use crate::frequent_small_detector::FrequentSmallDetector;
use crate::large_amount_detector::LargeAmountDetector;
use crate::ledger::LedgerEvent;
use crate::multi_location_detector::MultiLocationDetector;
use crate::pattern::SuspiciousPattern;
use crate::report::CaseReport;
use crate::risk_scorer::RiskScorer;
use crate::store::{AmlStore, LedgerFilter};
use crate::types::{BatchId, CustomerId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer the batch could not evaluate. Distinct from an evaluated
/// customer with zero patterns, which produces a normal CaseReport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerFailure {
    pub customer_id: CustomerId,
    pub error: String,
    /// Whether a retry of just this customer can reasonably succeed.
    pub transient: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: BatchId,
    pub cases: Vec<CaseReport>,
    pub failures: Vec<CustomerFailure>,
}

impl BatchReport {
    pub fn alerted_cases(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| c.risk.alert_triggered)
    }

    pub fn pattern_count(&self) -> usize {
        self.cases.iter().map(|c| c.patterns.len()).sum()
    }
}

/// The three detectors, bundled. Holds parameters only — detection is
/// pure compute, so the suite can be shared across worker threads.
struct DetectorSuite {
    large_amount: LargeAmountDetector,
    frequent_small: FrequentSmallDetector,
    multi_location: MultiLocationDetector,
}

impl DetectorSuite {
    fn new(config: &DetectionConfig) -> AmlResult<Self> {
        Ok(Self {
            large_amount: LargeAmountDetector::new(config.large_amount.clone())?,
            frequent_small: FrequentSmallDetector::new(config.frequent_small.clone())?,
            multi_location: MultiLocationDetector::new(config.multi_location.clone())?,
        })
    }

    /// Run all three detectors over one customer's ordered event stream.
    fn detect(&self, customer_id: &str, events: &[LedgerEvent]) -> Vec<SuspiciousPattern> {
        let mut patterns = self.large_amount.detect(events);
        patterns.extend(self.frequent_small.detect(customer_id, events));
        patterns.extend(self.multi_location.detect(customer_id, events));
        patterns
    }
}

pub struct DetectionBatch<'a> {
    store: &'a AmlStore,
    config: DetectionConfig,
    detectors: DetectorSuite,
}

impl<'a> DetectionBatch<'a> {
    pub fn new(store: &'a AmlStore, config: DetectionConfig) -> AmlResult<Self> {
        config.validate()?;
        Ok(Self {
            detectors: DetectorSuite::new(&config)?,
            store,
            config,
        })
    }

    /// Evaluate every customer seen in the ledger.
    pub fn run(&self) -> AmlResult<BatchReport> {
        let batch_id = Uuid::new_v4().to_string();
        let customer_ids = self.store.ledger_customer_ids()?;
        log::info!(
            "batch {}: {} customer(s), {} worker(s)",
            batch_id,
            customer_ids.len(),
            self.config.workers
        );

        let mut streams: Vec<(CustomerId, Vec<LedgerEvent>)> = Vec::new();
        let mut failures: Vec<CustomerFailure> = Vec::new();
        for customer_id in customer_ids {
            match self
                .store
                .events_for_customer(&customer_id, &LedgerFilter::default())
            {
                Ok(events) => streams.push((customer_id, events)),
                Err(e) => failures.push(CustomerFailure {
                    transient: e.is_transient(),
                    customer_id,
                    error: e.to_string(),
                }),
            }
        }

        let detected = self.detect_all(streams)?;

        let scorer = RiskScorer::new(self.store, self.config.scoring.alert_threshold)?;
        let mut cases = Vec::with_capacity(detected.len());
        for (customer_id, patterns) in detected {
            match scorer.score(&customer_id, &patterns) {
                Ok(update) => {
                    let mut case = CaseReport::new(&customer_id, patterns, &update);
                    if update.alert_triggered {
                        // The case stands even when the contact lookup fails;
                        // the alert feed just goes out without the contact block.
                        match self.store.customer_info(&customer_id) {
                            Ok(info) => case.customer = info,
                            Err(e) => log::warn!(
                                "contact lookup for alerted customer {} failed: {}",
                                customer_id,
                                e
                            ),
                        }
                    }
                    cases.push(case);
                }
                Err(e) => {
                    log::warn!("skipping customer {}: {}", customer_id, e);
                    failures.push(CustomerFailure {
                        transient: e.is_transient(),
                        customer_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "batch {}: {} case(s), {} pattern(s), {} failure(s)",
            batch_id,
            cases.len(),
            cases.iter().map(|c| c.patterns.len()).sum::<usize>(),
            failures.len()
        );
        Ok(BatchReport {
            batch_id,
            cases,
            failures,
        })
    }

    /// Evaluate a single customer.
    pub fn run_for_customer(&self, customer_id: &str) -> AmlResult<CaseReport> {
        let events = self
            .store
            .events_for_customer(customer_id, &LedgerFilter::default())?;
        let patterns = self.detectors.detect(customer_id, &events);
        let scorer = RiskScorer::new(self.store, self.config.scoring.alert_threshold)?;
        let update = scorer.score(customer_id, &patterns)?;
        let mut case = CaseReport::new(customer_id, patterns, &update);
        if update.alert_triggered {
            case.customer = self.store.customer_info(customer_id)?;
        }
        Ok(case)
    }

    /// Detection fan-out. The worker pool is bounded by `config.workers`;
    /// with one worker everything stays on the calling thread. Only the
    /// detector suite crosses thread boundaries — the store never does.
    fn detect_all(
        &self,
        streams: Vec<(CustomerId, Vec<LedgerEvent>)>,
    ) -> AmlResult<Vec<(CustomerId, Vec<SuspiciousPattern>)>> {
        let detectors = &self.detectors;

        if self.config.workers <= 1 {
            return Ok(streams
                .into_iter()
                .map(|(id, events)| {
                    let patterns = detectors.detect(&id, &events);
                    (id, patterns)
                })
                .collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| anyhow::anyhow!("building detection pool: {e}"))?;
        let detected = pool.install(|| {
            streams
                .into_par_iter()
                .map(|(id, events)| {
                    let patterns = detectors.detect(&id, &events);
                    (id, patterns)
                })
                .collect()
        });
        Ok(detected)
    }
}
