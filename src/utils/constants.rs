use alloy::primitives::{address, Address};

/// Uniswap V2 factory on Ethereum mainnet
pub const UNISWAP_V2_FACTORY: Address = address!("0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");
/// Uniswap V2 router on Ethereum mainnet
pub const UNISWAP_V2_ROUTER: Address = address!("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D");
/// SushiSwap factory on Ethereum mainnet
pub const SUSHISWAP_FACTORY: Address = address!("0xC0AEe478e3658e2610c5F7A4A2E1777cE9e4f2Ac");
/// SushiSwap router on Ethereum mainnet
pub const SUSHISWAP_ROUTER: Address = address!("0xd9e1cE17f2641f24aE83637ab66a2cca9C378B9F");
/// QuickSwap factory on Polygon
pub const QUICKSWAP_FACTORY: Address = address!("0x5757371414417b8C6CAd45bAeF941aBc7d3Ab32f");
/// QuickSwap router on Polygon
pub const QUICKSWAP_ROUTER: Address = address!("0xa5E0829CaCEd8fFDD4De3c43696c57F7D7A678ff");

/// WETH on mainnet
pub const MAINNET_WETH: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
/// USDC on mainnet
pub const MAINNET_USDC: Address = address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
/// USDT on mainnet
pub const MAINNET_USDT: Address = address!("0xdAC17F958D2ee523a2206206994597C13D831ec7");
/// DAI on mainnet
pub const MAINNET_DAI: Address = address!("0x6B175474E89094C44Da98b954EedeAC495271d0F");

/// WMATIC on Polygon
pub const POLYGON_WMATIC: Address = address!("0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270");
/// USDC (bridged) on Polygon
pub const POLYGON_USDC: Address = address!("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174");
/// USDT on Polygon
pub const POLYGON_USDT: Address = address!("0xc2132D05D31c914a87C6611C10748AEb04B58e8F");
/// DAI on Polygon
pub const POLYGON_DAI: Address = address!("0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063");

/// Gas units assumed for one swap
pub const DEFAULT_GAS_LIMIT: u64 = 300_000;
/// Slippage assumed by trade simulations
pub const ASSUMED_SLIPPAGE: f64 = 0.005;
