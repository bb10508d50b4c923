//! # Scan orchestration
//!
//! One scan is a full sampling pass: connectivity check, direct detection,
//! triangular detection in its own failure boundary, persistence, summary.
//! At most one scan runs at a time per [`Scanner`]; a call made while a scan
//! is running returns [`ScanOutcome::Skipped`] straight away.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::time::{Instant, MissedTickBehavior};

use crate::arb::{
    DirectDetector, GasModel, ProfitPolicy, RateSource, TradeSimulation, TriangularDetector,
};
use crate::config::Config;
use crate::db_service::OpportunityStore;
use crate::models::{DirectOpportunity, Network, TokenPair, TriangularOpportunity, Venue};
use crate::utils::shutdown::Shutdown;
use crate::venue::VenueReader;

/// Result of one [`Scanner::start_scan`] call
#[derive(Debug)]
pub enum ScanOutcome {
    /// Another scan was running, nothing was done
    Skipped,
    /// The connectivity check failed, no detector ran
    Failed,
    /// Shutdown was requested before the connectivity check answered
    Cancelled,
    /// Detection ran to the end
    Completed(ScanSummary),
}

/// What a completed scan found
#[derive(Debug, Clone)]
pub struct ScanSummary {
    /// Sequence number of the scan, starting at 1
    pub scan: u64,
    /// Block reported by the connectivity check
    pub block_number: u64,
    /// Every direct comparison made
    pub direct: Vec<DirectOpportunity>,
    /// Every complete cycle evaluated
    pub triangular: Vec<TriangularOpportunity>,
    /// Whether the triangular phase failed and contributed nothing
    pub triangular_failed: bool,
    /// Wall time of the scan
    pub elapsed: Duration,
}

impl ScanSummary {
    /// Records from both detectors
    #[must_use]
    pub fn total(&self) -> usize {
        self.direct.len() + self.triangular.len()
    }

    /// Profitable records from both detectors
    #[must_use]
    pub fn profitable(&self) -> usize {
        self.direct.iter().filter(|o| o.is_profitable).count()
            + self.triangular.iter().filter(|o| o.is_profitable).count()
    }
}

/// Clears the busy flag when the scan ends, however it ends
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives scans over the configured pairs and venues
pub struct Scanner {
    /// Connectivity check
    reader: Arc<dyn VenueReader>,
    /// Direct detection
    direct: DirectDetector,
    /// Triangular detection, shared with the task it runs in
    triangular: Arc<TriangularDetector>,
    /// Where records go
    store: Arc<dyn OpportunityStore>,
    /// Venues searched by both detectors
    venues: Arc<Vec<Venue>>,
    /// Pairs compared across venues
    pairs: Vec<TokenPair>,
    /// Network checked before each scan
    primary: Network,
    /// Gas units reported by trade simulations
    gas_limit: u64,
    /// Upper bound on the connectivity check
    check_timeout: Duration,
    /// Interrupts the connectivity check
    shutdown: Shutdown,
    /// Set while a scan runs
    busy: AtomicBool,
    /// Scans started so far
    scan_count: AtomicU64,
}

impl Scanner {
    /// Wire a scanner from configuration.
    ///
    /// Both detectors share one rate source, so a rate read by one is a
    /// cache hit for the other within the TTL.
    #[must_use]
    pub fn new(
        config: &Config,
        reader: Arc<dyn VenueReader>,
        store: Arc<dyn OpportunityStore>,
        shutdown: Shutdown,
    ) -> Self {
        let rates = Arc::new(RateSource::new(
            Arc::clone(&reader),
            config.cache_ttl,
            config.read_timeout,
            shutdown.clone(),
        ));
        let gas = GasModel::from_config(config);
        let policy = ProfitPolicy::new(config.trade_amount, config.min_profit_threshold);

        let direct = DirectDetector::new(
            Arc::clone(&rates),
            config.tokens.clone(),
            gas,
            policy,
            config.read_concurrency,
        );
        let triangular = TriangularDetector::new(
            rates,
            config.tokens_on(config.primary_network),
            config.primary_network,
            config.triangular_token_limit,
            gas,
            policy,
            config.read_concurrency,
        );

        Self {
            reader,
            direct,
            triangular: Arc::new(triangular),
            store,
            venues: Arc::new(config.venues.clone()),
            pairs: config.pairs.clone(),
            primary: config.primary_network,
            gas_limit: gas.gas_limit(),
            check_timeout: config.read_timeout,
            shutdown,
            busy: AtomicBool::new(false),
            scan_count: AtomicU64::new(0),
        }
    }

    /// Scans started so far, skipped calls excluded
    #[must_use]
    pub fn scan_count(&self) -> u64 {
        self.scan_count.load(Ordering::SeqCst)
    }

    /// Whether a scan is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run one scan unless one is already running.
    ///
    /// A failed check ends the scan, as does a shutdown requested while the
    /// check is pending. Otherwise direct detection runs, then
    /// triangular detection in a separate task so that neither an error nor a
    /// panic there loses the direct results. Store failures are logged and
    /// do not affect the outcome.
    pub async fn start_scan(&self) -> ScanOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("scanner: scan already in progress, skipping");
            return ScanOutcome::Skipped;
        }
        let _busy = BusyGuard(&self.busy);

        let scan = self.scan_count.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();
        info!("scanner: starting scan #{scan}");

        let mut shutdown = self.shutdown.clone();
        let check = tokio::time::timeout(self.check_timeout, self.reader.block_number(self.primary));

        let outcome = tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                info!("scanner: scan #{scan} cancelled by shutdown");
                return ScanOutcome::Cancelled;
            }
            outcome = check => outcome,
        };

        let block_number = match outcome {
            Ok(Ok(block_number)) => block_number,
            Ok(Err(e)) => {
                error!("scanner: scan #{scan} aborted, {} unreachable: {e}", self.primary);
                return ScanOutcome::Failed;
            }
            Err(_) => {
                error!(
                    "scanner: scan #{scan} aborted, {} did not answer within {:?}",
                    self.primary, self.check_timeout
                );
                return ScanOutcome::Failed;
            }
        };
        info!("scanner: connected to {} at block {block_number}", self.primary);

        let direct = self.direct.detect(&self.pairs, &self.venues).await;
        info!("scanner: found {} direct opportunities", direct.len());

        let (triangular, triangular_failed) = match self.detect_triangular().await {
            Some(found) => {
                info!("scanner: found {} triangular opportunities", found.len());
                (found, false)
            }
            None => (Vec::new(), true),
        };

        self.persist(&direct, &triangular).await;

        let summary = ScanSummary {
            scan,
            block_number,
            direct,
            triangular,
            triangular_failed,
            elapsed: started.elapsed(),
        };
        info!(
            "scanner: scan #{scan} completed in {}ms: {} opportunities, {} profitable",
            summary.elapsed.as_millis(),
            summary.total(),
            summary.profitable()
        );

        ScanOutcome::Completed(summary)
    }

    /// Triangular detection in its own task. `None` if it errored or panicked.
    async fn detect_triangular(&self) -> Option<Vec<TriangularOpportunity>> {
        let detector = Arc::clone(&self.triangular);
        let venues = Arc::clone(&self.venues);

        match tokio::spawn(async move { detector.detect(&venues).await }).await {
            Ok(Ok(found)) => Some(found),
            Ok(Err(e)) => {
                warn!("scanner: triangular detection failed: {e}");
                None
            }
            Err(e) => {
                warn!("scanner: triangular detection aborted: {e}");
                None
            }
        }
    }

    /// Hand every record to the store and simulate the profitable ones
    async fn persist(&self, direct: &[DirectOpportunity], triangular: &[TriangularOpportunity]) {
        for opportunity in direct {
            if let Err(e) = self.store.record_direct(opportunity).await {
                error!(
                    "store: failed to record {} {}/{}: {e:#}",
                    opportunity.token_pair, opportunity.venue_a, opportunity.venue_b
                );
            }
            if opportunity.is_profitable {
                self.log_simulation(
                    &opportunity.token_pair,
                    opportunity.trade_amount,
                    opportunity.net_profit,
                );
            }
        }

        for opportunity in triangular {
            if let Err(e) = self.store.record_triangular(opportunity).await {
                error!(
                    "store: failed to record {}/{}/{} on {}: {e:#}",
                    opportunity.token_a, opportunity.token_b, opportunity.token_c, opportunity.venue
                );
            }
            if opportunity.is_profitable {
                let cycle = format!(
                    "{} -> {} -> {}",
                    opportunity.token_a, opportunity.token_b, opportunity.token_c
                );
                self.log_simulation(&cycle, opportunity.trade_amount, opportunity.net_profit);
            }
        }
    }

    /// Log a dry run of executing an opportunity
    fn log_simulation(&self, label: &str, trade_amount: f64, net_profit: f64) {
        let simulation = TradeSimulation::simulate(trade_amount, net_profit, self.gas_limit);
        info!(
            "scanner: simulated {label}: expected output {:.2}, gas {}, slippage {:.1}%",
            simulation.expected_output,
            simulation.estimated_gas,
            simulation.estimated_slippage * 100.0
        );
    }

    /// Trigger a scan every `interval`, the first one immediately, until shutdown.
    ///
    /// Each scan runs as its own task, so a scan outlasting the interval makes
    /// the next trigger a skipped call rather than a queued one.
    pub async fn run(self: Arc<Self>, interval: Duration, mut shutdown: Shutdown) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("scanner: scanning every {}s", interval.as_secs());

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => {
                    info!("scanner: shutdown requested, no further scans");
                    break;
                }
                _ = ticker.tick() => {
                    let scanner = Arc::clone(&self);
                    tokio::spawn(async move {
                        scanner.start_scan().await;
                    });
                }
            }
        }
    }
}
