//! Exchange rates with caching.
//!
//! A rate is "units of `to` bought by one unit of `from`", read from the
//! reserves of the venue's pool for the pair. Everything that can go wrong
//! with a single read (no pool, RPC error, timeout, shutdown) collapses into
//! `None` so the detectors carry on with a hole in their data.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::U256;
use eyre::Result;
use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, warn};
use parking_lot::Mutex;

use super::cache::{RateCache, RateKey};
use crate::models::{Token, Venue};
use crate::utils::shutdown::Shutdown;
use crate::venue::{PoolReserves, VenueReader};

/// A venue read every concurrent miss on the same key awaits
type PendingRead = Shared<BoxFuture<'static, Option<f64>>>;

/// Reads in progress by key
type InFlight = Arc<Mutex<HashMap<RateKey, PendingRead>>>;

/// Why a read produced no rate
enum Unavailable {
    /// The venue has no pool for the pair
    NoPool,
    /// Reserves are empty or produced a non-positive rate
    Degenerate,
}

/// Cached rate reads against one [`VenueReader`].
///
/// Each call for a distinct key is an independent future, so callers decide
/// whether to await them one by one or run a bounded number at once. Calls
/// for a key that is already being read join that read instead of starting
/// another one.
pub struct RateSource {
    /// Chain access
    reader: Arc<dyn VenueReader>,
    /// Rates by `(from, to, venue)`
    cache: Arc<RateCache>,
    /// Reads not yet finished
    in_flight: InFlight,
    /// Upper bound on a single read
    read_timeout: Duration,
    /// Cancels pending reads
    shutdown: Shutdown,
}

impl RateSource {
    /// Create a rate source with an empty cache
    #[must_use]
    pub fn new(
        reader: Arc<dyn VenueReader>,
        cache_ttl: Duration,
        read_timeout: Duration,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            reader,
            cache: Arc::new(RateCache::new(cache_ttl)),
            in_flight: Arc::default(),
            read_timeout,
            shutdown,
        }
    }

    /// The cache, for inspection
    #[must_use]
    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    /// Current rate of `from -> to` on `venue`, or `None` if unavailable.
    ///
    /// Serves fresh cache entries without touching the venue. Otherwise
    /// performs exactly one venue read per key, shared by every caller that
    /// misses while it is pending, bounded by the read timeout and cancelled
    /// by shutdown. A successful result is cached.
    pub async fn get_rate(&self, from: &Token, to: &Token, venue: &Venue) -> Option<f64> {
        let key = RateKey::new(from.address, to.address, &venue.name);
        if let Some(rate) = self.cache.get(&key) {
            debug!("rates: cache hit {from}/{to} on {}: {rate}", venue.name);
            return Some(rate);
        }

        let pending = {
            let mut in_flight = self.in_flight.lock();
            // A read may have finished between the cache check and taking the lock
            if let Some(rate) = self.cache.get(&key) {
                return Some(rate);
            }
            match in_flight.get(&key) {
                Some(pending) => {
                    debug!("rates: joining pending read of {from}/{to} on {}", venue.name);
                    pending.clone()
                }
                None => {
                    let pending = self.start_read(key.clone(), from, to, venue);
                    in_flight.insert(key, pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Start the venue read for `key`. It caches its own result and clears
    /// its in-flight slot when done, even if the reader panics.
    fn start_read(&self, key: RateKey, from: &Token, to: &Token, venue: &Venue) -> PendingRead {
        let reader = Arc::clone(&self.reader);
        let cache = Arc::clone(&self.cache);
        let slot = InFlightSlot {
            in_flight: Arc::clone(&self.in_flight),
            key,
        };
        let (from, to, venue) = (from.clone(), to.clone(), venue.clone());
        let read_timeout = self.read_timeout;
        let mut shutdown = self.shutdown.clone();

        async move {
            let slot = slot;
            let read = tokio::time::timeout(read_timeout, read_rate(&*reader, &from, &to, &venue));

            let outcome = tokio::select! {
                outcome = read => outcome,
                () = shutdown.cancelled() => {
                    debug!("rates: read of {from}/{to} on {} cancelled by shutdown", venue.name);
                    return None;
                }
            };

            match outcome {
                Ok(Ok(Ok(rate))) => {
                    cache.insert(slot.key.clone(), rate);
                    Some(rate)
                }
                Ok(Ok(Err(Unavailable::NoPool))) => {
                    warn!("rates: no pair found for {from}/{to} on {}", venue.name);
                    None
                }
                Ok(Ok(Err(Unavailable::Degenerate))) => {
                    warn!("rates: empty reserves for {from}/{to} on {}", venue.name);
                    None
                }
                Ok(Err(e)) => {
                    warn!(
                        "rates: error fetching price for {from}/{to} on {}: {e}",
                        venue.name
                    );
                    None
                }
                Err(_) => {
                    warn!(
                        "rates: read of {from}/{to} on {} timed out after {read_timeout:?}",
                        venue.name
                    );
                    None
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// Removes a key from the in-flight table when its read is dropped
struct InFlightSlot {
    /// The table
    in_flight: InFlight,
    /// The read's key
    key: RateKey,
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.key);
    }
}

/// One uncached venue read: resolve the pool, read its reserves, orient them
async fn read_rate(
    reader: &dyn VenueReader,
    from: &Token,
    to: &Token,
    venue: &Venue,
) -> Result<Result<f64, Unavailable>> {
    let Some(pool) = reader.pool_address(venue, from.address, to.address).await? else {
        return Ok(Err(Unavailable::NoPool));
    };

    let reserves = reader.reserves(venue.network, pool).await?;
    Ok(oriented_rate(&reserves, from, to).ok_or(Unavailable::Degenerate))
}

/// Units of `to` per unit of `from` given a pool's reserves.
///
/// Reserves are in the pool's token order; whichever of the two is `token0`
/// decides the orientation. Amounts are normalized by each token's decimals.
/// Returns `None` unless the result is a positive finite number.
#[must_use]
pub fn oriented_rate(reserves: &PoolReserves, from: &Token, to: &Token) -> Option<f64> {
    let (reserve_from, reserve_to) = if reserves.token0 == from.address {
        (reserves.reserve0, reserves.reserve1)
    } else {
        (reserves.reserve1, reserves.reserve0)
    };

    if reserve_from == U256::ZERO || reserve_to == U256::ZERO {
        return None;
    }

    let amount_from = f64::from(reserve_from) / 10f64.powi(i32::from(from.decimals));
    let amount_to = f64::from(reserve_to) / 10f64.powi(i32::from(to.decimals));
    let rate = amount_to / amount_from;

    (rate.is_finite() && rate > 0.0).then_some(rate)
}
