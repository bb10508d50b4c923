use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

/// The same token pair priced differently on two venues.
///
/// Created once per venue combination per scan and never mutated afterwards.
/// The same struct is inserted into and loaded from `direct_opportunities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schemas::direct_opportunities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct DirectOpportunity {
    /// Pair as `BASE/QUOTE`
    pub token_pair: String,
    /// First venue of the comparison
    pub venue_a: String,
    /// Second venue of the comparison
    pub venue_b: String,
    /// Quote per base on `venue_a`
    pub price_a: f64,
    /// Quote per base on `venue_b`
    pub price_b: f64,
    /// `|price_a - price_b|`
    pub price_difference: f64,
    /// Notional trade size
    pub trade_amount: f64,
    /// Spread valued against the cheaper side, times the trade amount
    pub potential_profit: f64,
    /// Estimated gas for one swap, in the quote currency
    pub gas_cost: f64,
    /// `potential_profit - gas_cost`
    pub net_profit: f64,
    /// `net_profit / trade_amount * 100`
    pub profit_percentage: f64,
    /// Whether the net profit clears the configured threshold
    pub is_profitable: bool,
    /// When the comparison was made
    #[diesel(column_name = created_at)]
    pub timestamp: DateTime<Utc>,
}

/// A three token cycle `A -> B -> C -> A` on one venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schemas::triangular_opportunities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct TriangularOpportunity {
    /// Start and end of the cycle
    pub token_a: String,
    /// Second token
    pub token_b: String,
    /// Third token
    pub token_c: String,
    /// Venue all three legs are quoted on
    pub venue: String,
    /// B per A
    pub rate_ab: f64,
    /// C per B
    pub rate_bc: f64,
    /// A per C, the closing leg
    pub rate_ca: f64,
    /// `rate_ab * rate_bc * rate_ca`
    pub expected_return: f64,
    /// Notional trade size in units of `token_a`
    pub trade_amount: f64,
    /// `(expected_return - 1) * trade_amount`
    pub potential_profit: f64,
    /// Estimated gas for three swaps
    pub gas_cost: f64,
    /// `potential_profit - gas_cost`
    pub net_profit: f64,
    /// Whether the net profit clears the configured threshold
    pub is_profitable: bool,
    /// When the cycle was evaluated
    #[diesel(column_name = created_at)]
    pub timestamp: DateTime<Utc>,
}
