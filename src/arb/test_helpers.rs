use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use eyre::{bail, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::config::Config;
use crate::models::{Network, Token, Venue};
use crate::venue::{PoolReserves, VenueReader};

/// Whole-token liquidity used for the quoted side of scripted pools
const POOL_DEPTH: f64 = 1_000.0;

/// A pool the mock knows about
#[derive(Clone)]
struct MockPool {
    /// Pool address handed out by `pool_address`
    address: Address,
    /// Reserves handed out by `reserves`
    reserves: PoolReserves,
}

/// Scripted [`VenueReader`].
///
/// Pools are registered per venue from a desired rate. Every read is counted
/// and recorded, and reads can be made to fail, hang or panic per token.
#[derive(Default)]
pub struct MockReader {
    /// Pools by venue name and unordered token pair
    pools: HashMap<(String, Address, Address), MockPool>,
    /// Reserves by pool address
    reserves: HashMap<Address, PoolReserves>,
    /// Reads involving these tokens return an error
    failing_tokens: HashSet<Address>,
    /// Reads involving these tokens never complete
    hanging_tokens: HashSet<Address>,
    /// Reads involving these tokens panic
    panicking_tokens: HashSet<Address>,
    /// Pool lookups take this long to answer
    delay: Option<Duration>,
    /// Whether the connectivity check fails
    unreachable: bool,
    /// Block reads wait on this before answering
    gate: Option<Arc<Notify>>,
    /// Number of block reads served
    pub block_reads: AtomicUsize,
    /// Every `(venue, from, to)` pool lookup, in call order
    pub lookups: Mutex<Vec<(String, Address, Address)>>,
}

impl MockReader {
    /// An empty reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pool on `venue` quoting `rate` units of `to` per `from`
    pub fn with_rate(mut self, venue: &Venue, from: &Token, to: &Token, rate: f64) -> Self {
        let reserve_from = raw_amount(POOL_DEPTH, from.decimals);
        let reserve_to = raw_amount(POOL_DEPTH * rate, to.decimals);

        // Pools order their tokens by address
        let (token0, reserve0, reserve1) = if from.address < to.address {
            (from.address, reserve_from, reserve_to)
        } else {
            (to.address, reserve_to, reserve_from)
        };

        let address = Address::with_last_byte(u8::try_from(self.reserves.len() + 1).unwrap());
        let reserves = PoolReserves {
            token0,
            reserve0,
            reserve1,
        };
        self.reserves.insert(address, reserves);
        self.pools.insert(
            pool_key(&venue.name, from.address, to.address),
            MockPool { address, reserves },
        );
        self
    }

    /// Reads touching `token` return an error
    pub fn failing(mut self, token: &Token) -> Self {
        self.failing_tokens.insert(token.address);
        self
    }

    /// Reads touching `token` never complete
    pub fn hanging(mut self, token: &Token) -> Self {
        self.hanging_tokens.insert(token.address);
        self
    }

    /// Every pool lookup takes `delay` to answer
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Reads touching `token` panic
    pub fn panicking(mut self, token: &Token) -> Self {
        self.panicking_tokens.insert(token.address);
        self
    }

    /// The connectivity check fails
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// The connectivity check waits for `gate` to be notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Number of pool lookups performed, i.e. venue reads that missed the cache
    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().len()
    }

    /// Lookups performed against one venue
    pub fn lookups_on(&self, venue: &Venue) -> Vec<(Address, Address)> {
        self.lookups
            .lock()
            .iter()
            .filter(|(name, _, _)| name == &venue.name)
            .map(|(_, from, to)| (*from, *to))
            .collect()
    }
}

#[async_trait]
impl VenueReader for MockReader {
    async fn block_number(&self, _network: Network) -> Result<u64> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.block_reads.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            bail!("could not detect network");
        }
        Ok(19_000_000)
    }

    async fn pool_address(
        &self,
        venue: &Venue,
        token_a: Address,
        token_b: Address,
    ) -> Result<Option<Address>> {
        self.lookups
            .lock()
            .push((venue.name.clone(), token_a, token_b));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let touches = |set: &HashSet<Address>| set.contains(&token_a) || set.contains(&token_b);
        if touches(&self.panicking_tokens) {
            panic!("scripted panic reading {token_a}/{token_b}");
        }
        if touches(&self.hanging_tokens) {
            std::future::pending::<()>().await;
        }
        if touches(&self.failing_tokens) {
            bail!("connection reset reading {token_a}/{token_b}");
        }

        Ok(self
            .pools
            .get(&pool_key(&venue.name, token_a, token_b))
            .map(|pool| pool.address))
    }

    async fn reserves(&self, _network: Network, pool: Address) -> Result<PoolReserves> {
        match self.reserves.get(&pool) {
            Some(reserves) => Ok(*reserves),
            None => bail!("no reserves for {pool}"),
        }
    }
}

/// Unordered lookup key
fn pool_key(venue: &str, a: Address, b: Address) -> (String, Address, Address) {
    if a < b {
        (venue.to_string(), a, b)
    } else {
        (venue.to_string(), b, a)
    }
}

/// Whole-token amount to raw units
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn raw_amount(amount: f64, decimals: u8) -> U256 {
    U256::from((amount * 10f64.powi(i32::from(decimals))).round() as u128)
}

/// Reference venue by name
pub fn venue(name: &str) -> Venue {
    Config::default()
        .venues
        .into_iter()
        .find(|venue| venue.name == name)
        .unwrap()
}

/// Uniswap V2 on mainnet
pub fn uniswap() -> Venue {
    venue("Uniswap V2")
}

/// SushiSwap on mainnet
pub fn sushiswap() -> Venue {
    venue("SushiSwap")
}

/// QuickSwap on polygon
pub fn quickswap() -> Venue {
    venue("QuickSwap")
}

/// Reference token by network and symbol
pub fn token(network: Network, symbol: &str) -> Token {
    Config::default().token(network, symbol).unwrap().clone()
}

/// Mainnet token by symbol
pub fn mainnet(symbol: &str) -> Token {
    token(Network::Mainnet, symbol)
}

/// Float comparison with a relative tolerance
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

thread_local! {
    /// Records logged on this thread since the last [`capture_logs`]
    static CAPTURED: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Logger keeping records per thread, so concurrently running tests don't
/// see each other's output
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED.with(|captured| {
            captured
                .borrow_mut()
                .push((record.level(), record.args().to_string()));
        });
    }

    fn flush(&self) {}
}

static CAPTURE_LOGGER: CaptureLogger = CaptureLogger;

/// Start capturing info and above logged on the current thread.
///
/// Single threaded tokio tests run every task on the test thread, so this
/// sees spawned tasks too.
pub fn capture_logs() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        log::set_logger(&CAPTURE_LOGGER).unwrap();
        log::set_max_level(LevelFilter::Info);
    });
    CAPTURED.with(|captured| captured.borrow_mut().clear());
}

/// Messages captured at `level` since [`capture_logs`]
pub fn captured_at(level: Level) -> Vec<String> {
    CAPTURED.with(|captured| {
        captured
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    })
}
