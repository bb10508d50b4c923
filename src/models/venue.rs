use alloy::primitives::Address;
use derive_more::Display;
use eyre::{bail, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An EVM network a venue is deployed on
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Ethereum mainnet
    #[display("mainnet")]
    Mainnet,
    /// Polygon PoS
    #[display("polygon")]
    Polygon,
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "ethereum" => Ok(Self::Mainnet),
            "polygon" | "matic" => Ok(Self::Polygon),
            other => bail!("Unknown network: {other}"),
        }
    }
}

/// A constant-product trading protocol instance (Uniswap V2 style) on one network
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Venue {
    /// Human readable name, also the venue component of rate cache keys
    pub name: String,
    /// Pool factory, used to resolve pair addresses
    pub factory: Address,
    /// Router. Not used for reads; kept so the venue table is complete
    pub router: Address,
    /// Network the venue is deployed on
    pub network: Network,
}

impl Venue {
    /// Create a new venue
    #[must_use]
    pub fn new(name: &str, factory: Address, router: Address, network: Network) -> Self {
        Self {
            name: name.to_string(),
            factory,
            router,
            network,
        }
    }
}
