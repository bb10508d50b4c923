use chrono::{DateTime, Utc};
use eyre::Result;
use serde::Serialize;

use super::OpportunityStore;

/// Summary of recently recorded direct opportunities
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityStats {
    /// Records in the window
    pub total_opportunities: usize,
    /// Profitable records in the window
    pub profitable_opportunities: usize,
    /// `profitable / total * 100`, 0 when there are no records
    pub profitability_rate: f64,
    /// Mean net profit of the profitable records, 0 when there are none
    pub average_profit: f64,
    /// Timestamp of the most recent record
    pub last_scan: Option<DateTime<Utc>>,
}

impl OpportunityStats {
    /// Window used by the CLI
    pub const DEFAULT_WINDOW: i64 = 1000;

    /// Compute stats over the most recent `window` direct records, and the most
    /// recent `window` profitable ones.
    ///
    /// # Errors
    /// * If either store read fails
    pub async fn collect(store: &dyn OpportunityStore, window: i64) -> Result<Self> {
        let total = store.recent_direct(window, false).await?;
        let profitable = store.recent_direct(window, true).await?;

        #[allow(clippy::cast_precision_loss)]
        let profitability_rate = if total.is_empty() {
            0.0
        } else {
            profitable.len() as f64 / total.len() as f64 * 100.0
        };

        #[allow(clippy::cast_precision_loss)]
        let average_profit = if profitable.is_empty() {
            0.0
        } else {
            profitable.iter().map(|o| o.net_profit).sum::<f64>() / profitable.len() as f64
        };

        Ok(Self {
            total_opportunities: total.len(),
            profitable_opportunities: profitable.len(),
            profitability_rate,
            average_profit,
            last_scan: total.first().map(|o| o.timestamp),
        })
    }
}
