//! Direct arbitrage: one token pair priced differently on two venues.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use log::{debug, info};

use super::gas::GasModel;
use super::profit::ProfitPolicy;
use super::rate::RateSource;
use crate::models::{DirectOpportunity, Network, Token, TokenPair, Venue};

/// Profit figures of one price comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectAssessment {
    /// `|price_a - price_b|`
    pub price_difference: f64,
    /// Spread relative to the cheaper price, times the trade amount
    pub potential_profit: f64,
    /// Single swap gas cost
    pub gas_cost: f64,
    /// `potential_profit - gas_cost`
    pub net_profit: f64,
    /// `net_profit / trade_amount * 100`
    pub profit_percentage: f64,
    /// Per the shared threshold rule
    pub is_profitable: bool,
}

/// Values the spread of two prices for the same pair.
///
/// Profit is measured against the cheaper side, not the midpoint. Returns
/// `None` when either price is not a positive finite number.
#[must_use]
pub fn assess_direct(
    price_a: f64,
    price_b: f64,
    gas_cost: f64,
    policy: &ProfitPolicy,
) -> Option<DirectAssessment> {
    let valid = |price: f64| price.is_finite() && price > 0.0;
    if !valid(price_a) || !valid(price_b) {
        return None;
    }

    let price_difference = (price_a - price_b).abs();
    let potential_profit = price_difference / price_a.min(price_b) * policy.trade_amount;
    let net_profit = potential_profit - gas_cost;

    Some(DirectAssessment {
        price_difference,
        potential_profit,
        gas_cost,
        net_profit,
        profit_percentage: net_profit / policy.trade_amount * 100.0,
        is_profitable: policy.is_profitable(net_profit),
    })
}

/// Compares each pair across every two venues that quote it
pub struct DirectDetector {
    /// Rate reads
    rates: Arc<RateSource>,
    /// Token tables used to resolve pair symbols per venue network
    tokens: BTreeMap<Network, Vec<Token>>,
    /// Single swap gas cost
    gas: GasModel,
    /// Trade size and threshold
    policy: ProfitPolicy,
    /// Reads in flight at once
    concurrency: usize,
}

impl DirectDetector {
    /// Create a detector
    #[must_use]
    pub fn new(
        rates: Arc<RateSource>,
        tokens: BTreeMap<Network, Vec<Token>>,
        gas: GasModel,
        policy: ProfitPolicy,
        concurrency: usize,
    ) -> Self {
        Self {
            rates,
            tokens,
            gas,
            policy,
            concurrency: concurrency.max(1),
        }
    }

    /// One record per pair per combination of two venues that both quoted it.
    ///
    /// Each `(pair, venue)` is read once. Venues that cannot resolve both
    /// symbols on their network, or whose read is unavailable, drop out of the
    /// comparison for that pair. Every record is returned whether profitable or not.
    pub async fn detect(&self, pairs: &[TokenPair], venues: &[Venue]) -> Vec<DirectOpportunity> {
        let reads: Vec<(usize, &Venue, &Token, &Token)> = pairs
            .iter()
            .enumerate()
            .flat_map(|(index, pair)| {
                venues.iter().filter_map(move |venue| {
                    let base = self.resolve(venue.network, &pair.base)?;
                    let quote = self.resolve(venue.network, &pair.quote)?;
                    Some((index, venue, base, quote))
                })
            })
            .collect();

        let quotes: Vec<(usize, &Venue, f64)> = stream::iter(reads)
            .map(|(index, venue, base, quote)| async move {
                self.rates
                    .get_rate(base, quote, venue)
                    .await
                    .map(|price| (index, venue, price))
            })
            .boxed()
            .buffered(self.concurrency)
            .filter_map(|quote| async move { quote })
            .collect()
            .await;

        let gas_cost = self.gas.estimate(1);
        let mut opportunities = Vec::new();

        for (index, pair) in pairs.iter().enumerate() {
            let prices: Vec<(&Venue, f64)> = quotes
                .iter()
                .filter(|(i, _, _)| *i == index)
                .map(|(_, venue, price)| (*venue, *price))
                .collect();

            debug!("direct: {pair} quoted on {} venues", prices.len());

            for ((venue_a, price_a), (venue_b, price_b)) in prices.iter().tuple_combinations() {
                let Some(assessment) = assess_direct(*price_a, *price_b, gas_cost, &self.policy)
                else {
                    continue;
                };

                if assessment.is_profitable {
                    info!(
                        "direct: profitable arbitrage found: {pair} - {}({price_a:.4}) vs {}({price_b:.4}) - net profit: {:.2}",
                        venue_a.name, venue_b.name, assessment.net_profit
                    );
                }

                opportunities.push(DirectOpportunity {
                    token_pair: pair.to_string(),
                    venue_a: venue_a.name.clone(),
                    venue_b: venue_b.name.clone(),
                    price_a: *price_a,
                    price_b: *price_b,
                    price_difference: assessment.price_difference,
                    trade_amount: self.policy.trade_amount,
                    potential_profit: assessment.potential_profit,
                    gas_cost: assessment.gas_cost,
                    net_profit: assessment.net_profit,
                    profit_percentage: assessment.profit_percentage,
                    is_profitable: assessment.is_profitable,
                    timestamp: Utc::now(),
                });
            }
        }

        opportunities
    }

    /// Token for a symbol on a network
    fn resolve(&self, network: Network, symbol: &str) -> Option<&Token> {
        self.tokens
            .get(&network)?
            .iter()
            .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::arb::test_helpers::*;
    use crate::config::Config;
    use crate::utils::shutdown::Shutdown;

    fn detector(reader: MockReader) -> (DirectDetector, Arc<MockReader>) {
        let config = Config::default();
        let reader = Arc::new(reader);
        let rates = Arc::new(RateSource::new(
            reader.clone(),
            Duration::from_secs(60),
            Duration::from_millis(200),
            Shutdown::never(),
        ));
        let detector = DirectDetector::new(
            rates,
            config.tokens.clone(),
            GasModel::from_config(&config),
            ProfitPolicy::new(config.trade_amount, config.min_profit_threshold),
            2,
        );
        (detector, reader)
    }

    #[test]
    fn test_reference_example() {
        let policy = ProfitPolicy::new(1000.0, 0.01);
        let assessment = assess_direct(2000.0, 2010.0, 12.0, &policy).unwrap();

        assert!(approx_eq(assessment.price_difference, 10.0));
        assert!(approx_eq(assessment.potential_profit, 5.0));
        assert!(approx_eq(assessment.net_profit, -7.0));
        assert!(approx_eq(assessment.profit_percentage, -0.7));
        assert!(!assessment.is_profitable);
    }

    #[test]
    fn test_profit_is_symmetric_in_price_order() {
        let policy = ProfitPolicy::new(1000.0, 0.01);
        let ab = assess_direct(2000.0, 2100.0, 12.0, &policy).unwrap();
        let ba = assess_direct(2100.0, 2000.0, 12.0, &policy).unwrap();
        assert_eq!(ab, ba);
        assert!(ab.is_profitable);
    }

    #[test]
    fn test_non_positive_prices_are_skipped() {
        let policy = ProfitPolicy::new(1000.0, 0.01);
        assert_eq!(assess_direct(0.0, 2000.0, 12.0, &policy), None);
        assert_eq!(assess_direct(2000.0, -1.0, 12.0, &policy), None);
        assert_eq!(assess_direct(f64::NAN, 2000.0, 12.0, &policy), None);
    }

    #[test]
    fn test_random_prices_hold_invariants() {
        let policy = ProfitPolicy::new(1000.0, 0.01);
        for _ in 0..1000 {
            let price_a = fastrand::f64() * 5000.0 + 1e-6;
            let price_b = fastrand::f64() * 5000.0 + 1e-6;
            let assessment = assess_direct(price_a, price_b, 12.0, &policy).unwrap();

            assert_eq!(assessment.price_difference, (price_a - price_b).abs());
            assert!(assessment.potential_profit >= 0.0);
            assert_eq!(
                assessment.net_profit,
                assessment.potential_profit - assessment.gas_cost
            );
            assert_eq!(
                assessment.is_profitable,
                assessment.net_profit > policy.trade_amount * policy.min_profit_threshold
            );
        }
    }

    #[tokio::test]
    async fn test_one_record_per_venue_combination() {
        let (weth, usdc) = (mainnet("WETH"), mainnet("USDC"));
        let polygon_usdc = token(Network::Polygon, "USDC");
        let polygon_weth = Token::new("WETH", alloy::primitives::Address::repeat_byte(0x77), 18);
        let (uni, sushi, quick) = (uniswap(), sushiswap(), quickswap());

        let reader = MockReader::new()
            .with_rate(&uni, &weth, &usdc, 2000.0)
            .with_rate(&sushi, &weth, &usdc, 2100.0)
            .with_rate(&quick, &polygon_weth, &polygon_usdc, 2050.0);
        let (mut detector, _) = detector(reader);
        detector
            .tokens
            .entry(Network::Polygon)
            .or_default()
            .push(polygon_weth);

        let opportunities = detector
            .detect(&[TokenPair::new("WETH", "USDC")], &[uni, sushi, quick])
            .await;

        // C(3, 2)
        assert_eq!(opportunities.len(), 3);
        let venues: Vec<(&str, &str)> = opportunities
            .iter()
            .map(|o| (o.venue_a.as_str(), o.venue_b.as_str()))
            .collect();
        assert_eq!(
            venues,
            vec![
                ("Uniswap V2", "SushiSwap"),
                ("Uniswap V2", "QuickSwap"),
                ("SushiSwap", "QuickSwap"),
            ]
        );

        let uni_sushi = &opportunities[0];
        assert_eq!(uni_sushi.token_pair, "WETH/USDC");
        assert!(approx_eq(uni_sushi.price_difference, 100.0));
        assert!(approx_eq(uni_sushi.potential_profit, 50.0));
        assert!(approx_eq(uni_sushi.gas_cost, 12.0));
        assert!(approx_eq(uni_sushi.net_profit, 38.0));
        assert!(uni_sushi.is_profitable);
    }

    #[tokio::test]
    async fn test_unavailable_venue_is_dropped() {
        let (weth, usdc) = (mainnet("WETH"), mainnet("USDC"));
        let (uni, sushi, quick) = (uniswap(), sushiswap(), quickswap());

        // No SushiSwap pool, and polygon has no WETH in its table
        let reader = MockReader::new().with_rate(&uni, &weth, &usdc, 2000.0);
        let (detector, reader) = detector(reader);

        let opportunities = detector
            .detect(&[TokenPair::new("WETH", "USDC")], &[uni, sushi, quick.clone()])
            .await;

        assert!(opportunities.is_empty());
        assert_eq!(reader.lookup_count(), 2);
        assert!(reader.lookups_on(&quick).is_empty());
    }

    #[tokio::test]
    async fn test_unprofitable_records_are_kept() {
        let (weth, usdc) = (mainnet("WETH"), mainnet("USDC"));
        let (uni, sushi) = (uniswap(), sushiswap());

        let reader = MockReader::new()
            .with_rate(&uni, &weth, &usdc, 2000.0)
            .with_rate(&sushi, &weth, &usdc, 2010.0);
        let (detector, _) = detector(reader);

        let opportunities = detector
            .detect(&[TokenPair::new("WETH", "USDC")], &[uni, sushi])
            .await;

        assert_eq!(opportunities.len(), 1);
        assert!(!opportunities[0].is_profitable);
        assert!(approx_eq(opportunities[0].net_profit, -7.0));
    }
}
