/*!
 * # Dexscan - Cross-venue Arbitrage Detection
 *
 * Dexscan samples exchange rates from constant-product pools on several
 * decentralized exchanges and detects two kinds of arbitrage opportunity:
 * the same pair priced differently on two venues, and a three token cycle on
 * one venue whose compounded rate is not 1. Nothing is ever executed.
 *
 * ## Module Structure
 *
 * - `arb`: Rate cache, cost model and the two detectors
 * - `config`: Configuration from defaults, environment and a markets file
 * - `db_service`: Opportunity store backed by Postgres or memory
 * - `models`: Venues, tokens and opportunity records
 * - `scanner`: Scan orchestration and the periodic trigger
 * - `schemas`: Database schema definitions
 * - `utils`: Logging, database pool, shutdown signal and wiring
 * - `venue`: Pool and reserve reads over JSON-RPC
 */

/// Arbitrage detection
pub mod arb;
/// Configuration management for the system
pub mod config;
/// Database interaction for persistent storage
pub mod db_service;
/// Data models for the application
pub mod models;
/// Scan orchestration
pub mod scanner;
/// Database schema definitions
pub mod schemas;
/// Utility functions and helpers
pub mod utils;
/// Chain reads
pub mod venue;
