//! Triangular arbitrage: a three token cycle on one venue whose compounded
//! rate is not 1.
//!
//! Only venues on the primary network are searched, and candidates are the
//! first `token_limit` entries of that network's token table. The number of
//! triplets grows cubically with the candidate pool, hence the bound.

use std::sync::Arc;

use chrono::Utc;
use eyre::{bail, Result};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use log::{debug, info};

use super::gas::GasModel;
use super::profit::ProfitPolicy;
use super::rate::RateSource;
use crate::models::{Network, Token, TriangularOpportunity, Venue};

/// Swaps in a cycle, each paying the single swap gas cost
const CYCLE_SWAPS: u32 = 3;

/// Profit figures of one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleAssessment {
    /// Product of the three legs
    pub expected_return: f64,
    /// `(expected_return - 1) * trade_amount`
    pub potential_profit: f64,
    /// Three swaps of gas
    pub gas_cost: f64,
    /// `potential_profit - gas_cost`
    pub net_profit: f64,
    /// Per the shared threshold rule
    pub is_profitable: bool,
}

/// Values moving the trade amount around `A -> B -> C -> A`
#[must_use]
pub fn assess_cycle(
    rate_ab: f64,
    rate_bc: f64,
    rate_ca: f64,
    gas_cost: f64,
    policy: &ProfitPolicy,
) -> CycleAssessment {
    let expected_return = rate_ab * rate_bc * rate_ca;
    let potential_profit = (expected_return - 1.0) * policy.trade_amount;
    let net_profit = potential_profit - gas_cost;

    CycleAssessment {
        expected_return,
        potential_profit,
        gas_cost,
        net_profit,
        is_profitable: policy.is_profitable(net_profit),
    }
}

/// Evaluates ordered token triplets on each primary network venue
pub struct TriangularDetector {
    /// Rate reads
    rates: Arc<RateSource>,
    /// Candidate tokens of the primary network, in table order
    candidates: Vec<Token>,
    /// The only network searched
    primary: Network,
    /// Single swap gas cost
    gas: GasModel,
    /// Trade size and threshold
    policy: ProfitPolicy,
    /// Cycles evaluated at once
    concurrency: usize,
}

impl TriangularDetector {
    /// Create a detector over the first `token_limit` entries of `primary`'s token table
    #[must_use]
    pub fn new(
        rates: Arc<RateSource>,
        tokens: &[Token],
        primary: Network,
        token_limit: usize,
        gas: GasModel,
        policy: ProfitPolicy,
        concurrency: usize,
    ) -> Self {
        let candidates = tokens.iter().take(token_limit).cloned().collect();

        Self {
            rates,
            candidates,
            primary,
            gas,
            policy,
            concurrency: concurrency.max(1),
        }
    }

    /// One record per triplet per primary network venue with all three legs quoted.
    ///
    /// Triplets are combinations `i < j < k` of the candidate pool, walked in the
    /// direction `A -> B -> C -> A`. A triplet with any unavailable leg is
    /// skipped entirely.
    ///
    /// # Errors
    /// * If fewer than three candidate tokens are configured for the primary network
    pub async fn detect(&self, venues: &[Venue]) -> Result<Vec<TriangularOpportunity>> {
        if self.candidates.len() < 3 {
            bail!(
                "need at least 3 candidate tokens on {}, found {}",
                self.primary,
                self.candidates.len()
            );
        }

        let venues: Vec<&Venue> = venues
            .iter()
            .filter(|venue| venue.network == self.primary)
            .collect();
        if venues.is_empty() {
            debug!("triangular: no venues on {}, nothing to do", self.primary);
            return Ok(Vec::new());
        }

        let jobs: Vec<(&Venue, &Token, &Token, &Token)> = venues
            .iter()
            .flat_map(|venue| {
                self.candidates
                    .iter()
                    .tuple_combinations::<(_, _, _)>()
                    .map(move |(a, b, c)| (*venue, a, b, c))
            })
            .collect();

        debug!(
            "triangular: evaluating {} cycles across {} venues",
            jobs.len(),
            venues.len()
        );

        let gas_cost = self.gas.estimate(CYCLE_SWAPS);

        let opportunities = stream::iter(jobs)
            .map(|(venue, a, b, c)| async move {
                let (rate_ab, rate_bc, rate_ca) = futures::join!(
                    self.rates.get_rate(a, b, venue),
                    self.rates.get_rate(b, c, venue),
                    self.rates.get_rate(c, a, venue),
                );
                let (Some(rate_ab), Some(rate_bc), Some(rate_ca)) = (rate_ab, rate_bc, rate_ca)
                else {
                    debug!("triangular: {a}/{b}/{c} on {} incomplete, skipped", venue.name);
                    return None;
                };
                Some(self.record(venue, [a, b, c], [rate_ab, rate_bc, rate_ca], gas_cost))
            })
            .boxed()
            .buffered(self.concurrency)
            .filter_map(|opportunity| async move { opportunity })
            .collect()
            .await;

        Ok(opportunities)
    }

    /// Build the record for a fully quoted cycle
    fn record(
        &self,
        venue: &Venue,
        [a, b, c]: [&Token; 3],
        [rate_ab, rate_bc, rate_ca]: [f64; 3],
        gas_cost: f64,
    ) -> TriangularOpportunity {
        let assessment = assess_cycle(rate_ab, rate_bc, rate_ca, gas_cost, &self.policy);

        if assessment.is_profitable {
            info!(
                "triangular: arbitrage found on {}: {a} -> {b} -> {c}, expected return: {:.4}, net profit: {:.2}",
                venue.name, assessment.expected_return, assessment.net_profit
            );
        }

        TriangularOpportunity {
            token_a: a.symbol.clone(),
            token_b: b.symbol.clone(),
            token_c: c.symbol.clone(),
            venue: venue.name.clone(),
            rate_ab,
            rate_bc,
            rate_ca,
            expected_return: assessment.expected_return,
            trade_amount: self.policy.trade_amount,
            potential_profit: assessment.potential_profit,
            gas_cost: assessment.gas_cost,
            net_profit: assessment.net_profit,
            is_profitable: assessment.is_profitable,
            timestamp: Utc::now(),
        }
    }
}
