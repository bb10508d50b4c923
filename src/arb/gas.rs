use alloy::primitives::U256;

use crate::config::Config;

/// Wei in one unit of the native currency
const WEI_PER_NATIVE: f64 = 1e18;

/// Fixed-size gas estimate of an arbitrage execution, priced in the profit currency.
///
/// `gas_limit * gas_price` is converted to the native currency and then to the
/// profit currency with a configured constant. That constant does not track the
/// market, so estimates drift when the native currency moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasModel {
    /// Gas units per swap
    gas_limit: u64,
    /// Assumed gas price in wei
    gas_price_wei: U256,
    /// Price of one native unit in the profit currency
    native_price_quote: f64,
}

impl GasModel {
    /// Create a gas model
    #[must_use]
    pub const fn new(gas_limit: u64, gas_price_wei: U256, native_price_quote: f64) -> Self {
        Self {
            gas_limit,
            gas_price_wei,
            native_price_quote,
        }
    }

    /// Gas model from the configured limit, price and conversion rate
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self::new(
            config.gas_limit,
            config.gas_price_wei,
            config.native_price_quote,
        )
    }

    /// Gas units per swap
    #[must_use]
    pub const fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Cost of `swaps` swaps in the profit currency. A three hop cycle pays three times.
    #[must_use]
    pub fn estimate(&self, swaps: u32) -> f64 {
        let wei = U256::from(self.gas_limit).saturating_mul(self.gas_price_wei);
        let native = f64::from(wei) / WEI_PER_NATIVE;
        native * self.native_price_quote * f64::from(swaps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arb::test_helpers::approx_eq;

    #[test]
    fn test_reference_estimate() {
        // 300k gas at 20 gwei is 0.006 ETH, at $2000 that is $12
        let gas = GasModel::from_config(&Config::default());
        assert!(approx_eq(gas.estimate(1), 12.0));
    }

    #[test]
    fn test_estimate_scales_with_swaps() {
        let gas = GasModel::new(300_000, U256::from(20_000_000_000_u64), 2000.0);
        assert!(approx_eq(gas.estimate(3), 3.0 * gas.estimate(1)));
        assert!(approx_eq(gas.estimate(0), 0.0));
    }

    #[test]
    fn test_conversion_rate_is_injected() {
        let cheap = GasModel::new(300_000, U256::from(20_000_000_000_u64), 1000.0);
        assert!(approx_eq(cheap.estimate(1), 6.0));
    }
}
