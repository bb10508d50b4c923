//! # Venue reads
//!
//! The only place the engine touches the chain. [`VenueReader`] is the seam:
//! [`RpcVenueReader`] talks JSON-RPC through alloy, tests use a scripted reader.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use eyre::Result;

use crate::models::{Network, Venue};

/// JSON-RPC implementation
pub mod rpc;

pub use rpc::RpcVenueReader;

/// Reserves of a constant-product pool, in the pool's own token order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReserves {
    /// The pool's canonical first asset
    pub token0: Address,
    /// Raw reserve of `token0`
    pub reserve0: U256,
    /// Raw reserve of the other asset
    pub reserve1: U256,
}

/// Pool resolution and reserve reads per venue/network
#[async_trait]
pub trait VenueReader: Send + Sync {
    /// Latest block on a network. Used as the connectivity check before a scan.
    ///
    /// # Errors
    /// * If the network has no endpoint or the endpoint is unreachable
    async fn block_number(&self, network: Network) -> Result<u64>;

    /// Pool address for a token combination on a venue, `None` if the venue has no such pool
    ///
    /// # Errors
    /// * If the factory call fails
    async fn pool_address(
        &self,
        venue: &Venue,
        token_a: Address,
        token_b: Address,
    ) -> Result<Option<Address>>;

    /// Current reserves of a pool
    ///
    /// # Errors
    /// * If the pool calls fail
    async fn reserves(&self, network: Network, pool: Address) -> Result<PoolReserves>;
}
