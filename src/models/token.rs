use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ERC20 token as known to one network's token table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Ticker symbol, used to match the same asset across networks
    pub symbol: String,
    /// Contract address on the network the token table belongs to
    pub address: Address,
    /// ERC20 decimals, used to normalize reserves
    pub decimals: u8,
}

impl Token {
    /// Create a new token
    #[must_use]
    pub fn new(symbol: &str, address: Address, decimals: u8) -> Self {
        Self {
            symbol: symbol.to_string(),
            address,
            decimals,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// A pair of token symbols to compare across venues, e.g. `WETH/USDC`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPair {
    /// Token sold
    pub base: String,
    /// Token bought
    pub quote: String,
}

impl TokenPair {
    /// Create a new pair from two symbols
    #[must_use]
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.to_string(),
            quote: quote.to_string(),
        }
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
