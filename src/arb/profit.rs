use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::utils::constants::ASSUMED_SLIPPAGE;

/// Trade size and the threshold an opportunity must clear.
///
/// Both detectors classify with the same rule:
/// `is_profitable <=> net_profit > trade_amount * min_profit_threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitPolicy {
    /// Notional size of every evaluated trade
    pub trade_amount: f64,
    /// Minimum net profit as a fraction of the trade amount
    pub min_profit_threshold: f64,
}

impl ProfitPolicy {
    /// Create a policy
    #[must_use]
    pub const fn new(trade_amount: f64, min_profit_threshold: f64) -> Self {
        Self {
            trade_amount,
            min_profit_threshold,
        }
    }

    /// Whether a net profit is actionable
    #[must_use]
    pub fn is_profitable(&self, net_profit: f64) -> bool {
        net_profit > self.trade_amount * self.min_profit_threshold
    }
}

/// Dry-run of executing an opportunity. Nothing is sent anywhere.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSimulation {
    /// Gas units the execution is assumed to burn
    pub estimated_gas: u64,
    /// Fractional slippage assumed
    pub estimated_slippage: f64,
    /// Trade amount plus net profit
    pub expected_output: f64,
    /// When the simulation ran
    pub timestamp: DateTime<Utc>,
}

impl TradeSimulation {
    /// Simulate executing a trade of `trade_amount` expected to net `net_profit`
    #[must_use]
    pub fn simulate(trade_amount: f64, net_profit: f64, estimated_gas: u64) -> Self {
        Self {
            estimated_gas,
            estimated_slippage: ASSUMED_SLIPPAGE,
            expected_output: trade_amount + net_profit,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        let policy = ProfitPolicy::new(1000.0, 0.01);
        assert!(!policy.is_profitable(-7.0));
        assert!(!policy.is_profitable(10.0));
        assert!(policy.is_profitable(10.000_1));
    }

    #[test]
    fn test_profitable_iff_above_threshold() {
        for _ in 0..500 {
            let trade_amount = fastrand::f64() * 10_000.0 + 1.0;
            let threshold = fastrand::f64() * 0.05;
            let net_profit = (fastrand::f64() - 0.5) * 200.0;

            let policy = ProfitPolicy::new(trade_amount, threshold);
            assert_eq!(
                policy.is_profitable(net_profit),
                net_profit > trade_amount * threshold
            );
        }
    }

    #[test]
    fn test_simulation_expected_output() {
        let simulation = TradeSimulation::simulate(1000.0, 25.0, 300_000);
        assert_eq!(simulation.expected_output, 1025.0);
        assert_eq!(simulation.estimated_gas, 300_000);
        assert_eq!(simulation.estimated_slippage, 0.005);
    }
}
