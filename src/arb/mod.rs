//! # Arbitrage Module
//!
//! The detection engine: cached rate acquisition, the gas cost model, and the
//! two detectors (direct across venues, triangular within one venue).
//! Data flows one way: rates -> detectors -> scanner.

/// TTL cache of exchange rates
pub mod cache;
/// Direct (cross-venue) detection
pub mod direct;
/// Gas cost model
pub mod gas;
/// Shared profitability policy
pub mod profit;
/// Cached, oriented exchange rates
pub mod rate;
/// Scripted venue reader for tests
#[cfg(test)]
pub(crate) mod test_helpers;
/// Triangular (single-venue cycle) detection
pub mod triangular;

pub use cache::{RateCache, RateKey};
pub use direct::DirectDetector;
pub use gas::GasModel;
pub use profit::{ProfitPolicy, TradeSimulation};
pub use rate::RateSource;
pub use triangular::TriangularDetector;
