//! Process configuration.
//!
//! Loaded once at startup: reference defaults, then `.env` / environment
//! overrides, then an optional JSON markets file for the venue, token and pair
//! tables.

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::utils::parse_units;
use alloy::primitives::U256;
use eyre::{bail, eyre, Result, WrapErr};
use serde::Deserialize;
use url::Url;

use crate::models::{Network, Token, TokenPair, Venue};
use crate::utils::constants::{
    DEFAULT_GAS_LIMIT, MAINNET_DAI, MAINNET_USDC, MAINNET_USDT, MAINNET_WETH, POLYGON_DAI,
    POLYGON_USDC, POLYGON_USDT, POLYGON_WMATIC, QUICKSWAP_FACTORY, QUICKSWAP_ROUTER,
    SUSHISWAP_FACTORY, SUSHISWAP_ROUTER, UNISWAP_V2_FACTORY, UNISWAP_V2_ROUTER,
};

/// Runtime configuration of the scanner
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-RPC endpoint per network
    pub rpc_urls: HashMap<Network, Url>,
    /// Postgres URL of the opportunity store. In-memory store when `None`
    pub database_url: Option<String>,
    /// Minimum `net_profit / trade_amount` for an opportunity to be actionable
    pub min_profit_threshold: f64,
    /// Assumed gas price, in wei
    pub gas_price_wei: U256,
    /// Gas units for one swap
    pub gas_limit: u64,
    /// Fixed price of the native currency in the profit currency.
    /// Known to be inaccurate when the market moves.
    pub native_price_quote: f64,
    /// Notional trade size for all profit calculations
    pub trade_amount: f64,
    /// How long a cached rate stays fresh
    pub cache_ttl: Duration,
    /// Per-read timeout after which a rate is treated as unavailable
    pub read_timeout: Duration,
    /// Maximum rate reads in flight at once. 1 reads sequentially
    pub read_concurrency: usize,
    /// Period of the scan trigger
    pub scan_interval: Duration,
    /// Size bound of the candidate pool for triangular cycles
    pub triangular_token_limit: usize,
    /// Network checked before each scan and searched for triangular cycles
    pub primary_network: Network,
    /// Venues to sample
    pub venues: Vec<Venue>,
    /// Token table per network, in candidate order
    pub tokens: BTreeMap<Network, Vec<Token>>,
    /// Symbol pairs compared across venues
    pub pairs: Vec<TokenPair>,
}

/// Venue, token and pair tables as read from `MARKETS_FILE`.
/// Missing sections keep their defaults.
#[derive(Debug, Deserialize)]
struct MarketsFile {
    /// Replacement venue table
    venues: Option<Vec<Venue>>,
    /// Replacement token tables
    tokens: Option<BTreeMap<Network, Vec<Token>>>,
    /// Replacement pair list, as `BASE/QUOTE` strings
    pairs: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_urls: HashMap::new(),
            database_url: None,
            min_profit_threshold: 0.01,
            // 20 gwei
            gas_price_wei: U256::from(20_000_000_000_u64),
            gas_limit: DEFAULT_GAS_LIMIT,
            native_price_quote: 2000.0,
            trade_amount: 1000.0,
            cache_ttl: Duration::from_secs(10),
            read_timeout: Duration::from_secs(5),
            read_concurrency: 4,
            scan_interval: Duration::from_secs(30),
            triangular_token_limit: 4,
            primary_network: Network::Mainnet,
            venues: default_venues(),
            tokens: default_tokens(),
            pairs: default_pairs(),
        }
    }
}

impl Config {
    /// Loads `.env` if present and builds the configuration from the environment.
    ///
    /// # Errors
    /// * If a variable is set but cannot be parsed
    /// * If `MARKETS_FILE` cannot be read or parsed
    /// * If the resulting configuration is inconsistent, see [`Config::validate`]
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::default();

        for (network, key) in [
            (Network::Mainnet, "RPC_URL_MAINNET"),
            (Network::Polygon, "RPC_URL_POLYGON"),
        ] {
            if let Some(url) = env_var::<Url>(key)? {
                config.rpc_urls.insert(network, url);
            }
        }

        config.database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        if let Some(threshold) = env_var("MIN_PROFIT_THRESHOLD")? {
            config.min_profit_threshold = threshold;
        }
        if let Ok(gwei) = env::var("GAS_PRICE_GWEI") {
            config.gas_price_wei = parse_units(gwei.trim(), "gwei")
                .wrap_err_with(|| format!("Invalid GAS_PRICE_GWEI: {gwei}"))?
                .get_absolute();
        }
        if let Some(gas_limit) = env_var("GAS_LIMIT")? {
            config.gas_limit = gas_limit;
        }
        if let Some(price) = env_var("NATIVE_PRICE_QUOTE")? {
            config.native_price_quote = price;
        }
        if let Some(amount) = env_var("TRADE_AMOUNT")? {
            config.trade_amount = amount;
        }
        if let Some(secs) = env_var("RATE_CACHE_TTL_SECS")? {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = env_var("RATE_READ_TIMEOUT_SECS")? {
            config.read_timeout = Duration::from_secs(secs);
        }
        if let Some(concurrency) = env_var("RATE_READ_CONCURRENCY")? {
            config.read_concurrency = concurrency;
        }
        if let Some(secs) = env_var("SCAN_INTERVAL_SECONDS")? {
            config.scan_interval = Duration::from_secs(secs);
        }
        if let Some(limit) = env_var("TRIANGULAR_TOKEN_LIMIT")? {
            config.triangular_token_limit = limit;
        }
        if let Some(network) = env_var("PRIMARY_NETWORK")? {
            config.primary_network = network;
        }
        if let Ok(path) = env::var("MARKETS_FILE") {
            config.apply_markets_file(Path::new(&path))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Replace venue, token and pair tables with the ones in a JSON file.
    ///
    /// # Errors
    /// * If the file cannot be read or is not valid JSON
    /// * If a pair is not written as `BASE/QUOTE`
    pub fn apply_markets_file(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read markets file {}", path.display()))?;
        self.apply_markets_json(&raw)
            .wrap_err_with(|| format!("Invalid markets file {}", path.display()))
    }

    /// See [`Config::apply_markets_file`]
    fn apply_markets_json(&mut self, raw: &str) -> Result<()> {
        let markets: MarketsFile = serde_json::from_str(raw)?;
        if let Some(venues) = markets.venues {
            self.venues = venues;
        }
        if let Some(tokens) = markets.tokens {
            self.tokens = tokens;
        }
        if let Some(pairs) = markets.pairs {
            self.pairs = pairs
                .iter()
                .map(|pair| parse_pair(pair))
                .collect::<Result<_>>()?;
        }
        Ok(())
    }

    /// Checks the values a scan cannot run without.
    ///
    /// # Errors
    /// * If the threshold, trade amount or conversion rate is negative or not finite
    /// * If the trade amount is zero
    /// * If the read timeout or the read concurrency is zero
    /// * If no venue is configured
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("MIN_PROFIT_THRESHOLD", self.min_profit_threshold),
            ("TRADE_AMOUNT", self.trade_amount),
            ("NATIVE_PRICE_QUOTE", self.native_price_quote),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{name} must be a non-negative number, got {value}");
            }
        }
        if self.trade_amount == 0.0 {
            bail!("TRADE_AMOUNT must be greater than zero");
        }
        if self.read_timeout.is_zero() {
            bail!("RATE_READ_TIMEOUT_SECS must be greater than zero");
        }
        if self.read_concurrency == 0 {
            bail!("RATE_READ_CONCURRENCY must be at least 1");
        }
        if self.venues.is_empty() {
            bail!("No venues configured");
        }
        Ok(())
    }

    /// Look up a token by symbol in a network's table
    #[must_use]
    pub fn token(&self, network: Network, symbol: &str) -> Option<&Token> {
        self.tokens
            .get(&network)?
            .iter()
            .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
    }

    /// The token table of a network, empty when the network has none
    #[must_use]
    pub fn tokens_on(&self, network: Network) -> &[Token] {
        self.tokens.get(&network).map_or(&[], Vec::as_slice)
    }
}

/// Read and parse an optional environment variable
fn env_var<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| eyre!("Invalid {key}={raw}: {e}")),
        Err(_) => Ok(None),
    }
}

/// Parse `BASE/QUOTE`
fn parse_pair(raw: &str) -> Result<TokenPair> {
    match raw.split_once('/') {
        Some((base, quote)) if !base.is_empty() && !quote.is_empty() => {
            Ok(TokenPair::new(base.trim(), quote.trim()))
        }
        _ => bail!("Token pair must look like BASE/QUOTE, got {raw}"),
    }
}

/// Uniswap V2, SushiSwap and QuickSwap
fn default_venues() -> Vec<Venue> {
    vec![
        Venue::new(
            "Uniswap V2",
            UNISWAP_V2_FACTORY,
            UNISWAP_V2_ROUTER,
            Network::Mainnet,
        ),
        Venue::new(
            "SushiSwap",
            SUSHISWAP_FACTORY,
            SUSHISWAP_ROUTER,
            Network::Mainnet,
        ),
        Venue::new(
            "QuickSwap",
            QUICKSWAP_FACTORY,
            QUICKSWAP_ROUTER,
            Network::Polygon,
        ),
    ]
}

/// Majors and stables on both networks
fn default_tokens() -> BTreeMap<Network, Vec<Token>> {
    BTreeMap::from([
        (
            Network::Mainnet,
            vec![
                Token::new("WETH", MAINNET_WETH, 18),
                Token::new("USDC", MAINNET_USDC, 6),
                Token::new("USDT", MAINNET_USDT, 6),
                Token::new("DAI", MAINNET_DAI, 18),
            ],
        ),
        (
            Network::Polygon,
            vec![
                Token::new("WMATIC", POLYGON_WMATIC, 18),
                Token::new("USDC", POLYGON_USDC, 6),
                Token::new("USDT", POLYGON_USDT, 6),
                Token::new("DAI", POLYGON_DAI, 18),
            ],
        ),
    ])
}

/// WETH against the stables, and the stables against each other
fn default_pairs() -> Vec<TokenPair> {
    vec![
        TokenPair::new("WETH", "USDC"),
        TokenPair::new("WETH", "USDT"),
        TokenPair::new("WETH", "DAI"),
        TokenPair::new("USDC", "USDT"),
        TokenPair::new("USDC", "DAI"),
    ]
}
