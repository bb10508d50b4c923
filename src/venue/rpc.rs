use std::collections::HashMap;

use alloy::network::Ethereum;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::sol;
use async_trait::async_trait;
use eyre::{eyre, Result};
use log::info;
use url::Url;

use super::{PoolReserves, VenueReader};
use crate::models::{Network, Venue};

sol! {
    #[sol(rpc)]
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address);
    }
}

sol! {
    #[sol(rpc)]
    interface IUniswapV2Pair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        function token0() external view returns (address);
    }
}

/// Reads Uniswap V2 style factories and pairs over HTTP JSON-RPC, one provider per network
pub struct RpcVenueReader {
    /// Provider per configured network
    providers: HashMap<Network, RootProvider<Ethereum>>,
}

impl RpcVenueReader {
    /// Creates one HTTP provider per configured endpoint.
    ///
    /// Networks without an endpoint are left out; reads against them fail and
    /// surface as unavailable rates.
    #[must_use]
    pub fn new(rpc_urls: &HashMap<Network, Url>) -> Self {
        let providers = rpc_urls
            .iter()
            .map(|(network, url)| {
                let provider = ProviderBuilder::new().on_http(url.clone());
                info!("venue: {network} provider initialized");
                (*network, (*provider.root()).clone())
            })
            .collect();
        Self { providers }
    }

    /// Provider for a network
    fn provider(&self, network: Network) -> Result<&RootProvider<Ethereum>> {
        self.providers
            .get(&network)
            .ok_or_else(|| eyre!("No provider for network: {network}"))
    }
}

#[async_trait]
impl VenueReader for RpcVenueReader {
    async fn block_number(&self, network: Network) -> Result<u64> {
        Ok(self.provider(network)?.get_block_number().await?)
    }

    async fn pool_address(
        &self,
        venue: &Venue,
        token_a: Address,
        token_b: Address,
    ) -> Result<Option<Address>> {
        let factory = IUniswapV2Factory::new(venue.factory, self.provider(venue.network)?);
        let pair = factory.getPair(token_a, token_b).call().await?._0;

        // The factory answers with the zero address when the pair was never created
        Ok((pair != Address::ZERO).then_some(pair))
    }

    async fn reserves(&self, network: Network, pool: Address) -> Result<PoolReserves> {
        let pair = IUniswapV2Pair::new(pool, self.provider(network)?);
        let reserves = pair.getReserves().call().await?;
        let token0 = pair.token0().call().await?._0;

        Ok(PoolReserves {
            token0,
            reserve0: U256::from(reserves.reserve0),
            reserve1: U256::from(reserves.reserve1),
        })
    }
}
