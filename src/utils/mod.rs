/// App context
pub mod app_context;
/// Constants
pub mod constants;
/// Database pool
pub mod db_connect;
/// Logger
pub mod logger;
/// Shutdown signal
pub mod shutdown;
