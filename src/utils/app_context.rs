//! Application context wiring configuration to the chain reader and the store.

use std::sync::Arc;

use eyre::{bail, Result};
use log::{info, warn};

use crate::config::Config;
use crate::db_service::{MemoryOpportunityStore, OpportunityStore, PgOpportunityStore};
use crate::scanner::Scanner;
use crate::utils::db_connect::create_pool;
use crate::utils::shutdown::Shutdown;
use crate::venue::{RpcVenueReader, VenueReader};

/// Shared handles built once at startup
pub struct AppContext {
    /// Loaded configuration
    pub config: Config,
    /// Chain access for every configured network
    pub reader: Arc<dyn VenueReader>,
    /// Where opportunity records go
    pub store: Arc<dyn OpportunityStore>,
}

impl AppContext {
    /// Creates the context from a loaded configuration.
    ///
    /// Uses Postgres when `DATABASE_URL` is set, an in-memory store otherwise.
    ///
    /// # Errors
    /// * If the database pool cannot be created
    pub fn new(config: Config) -> Result<Self> {
        let reader: Arc<dyn VenueReader> = Arc::new(RpcVenueReader::new(&config.rpc_urls));
        let store = Self::store(&config)?;
        Ok(Self {
            config,
            reader,
            store,
        })
    }

    /// Picks the opportunity store for a configuration
    ///
    /// # Errors
    /// * If the database pool cannot be created
    pub fn store(config: &Config) -> Result<Arc<dyn OpportunityStore>> {
        if let Some(database_url) = &config.database_url {
            let pool = create_pool(database_url)?;
            info!("store: recording opportunities to Postgres");
            Ok(Arc::new(PgOpportunityStore::new(pool)))
        } else {
            warn!("store: DATABASE_URL not set, opportunities are kept in memory only");
            Ok(Arc::new(MemoryOpportunityStore::new()))
        }
    }

    /// Fails unless the primary network has an RPC endpoint. Scans cannot run without one.
    ///
    /// # Errors
    /// * If no endpoint is configured for the primary network
    pub fn ensure_primary_endpoint(&self) -> Result<()> {
        let primary = self.config.primary_network;
        if !self.config.rpc_urls.contains_key(&primary) {
            bail!(
                "RPC_URL_{} not configured, e.g. RPC_URL_{}=https://mainnet.infura.io/v3/YOUR_PROJECT_ID",
                primary.to_string().to_uppercase(),
                primary.to_string().to_uppercase()
            );
        }
        Ok(())
    }

    /// A scanner over this context's reader and store
    #[must_use]
    pub fn scanner(&self, shutdown: Shutdown) -> Scanner {
        Scanner::new(
            &self.config,
            Arc::clone(&self.reader),
            Arc::clone(&self.store),
            shutdown,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Network;

    #[tokio::test]
    async fn test_without_database_records_in_memory() {
        let ctx = AppContext::new(Config::default()).unwrap();
        let scanner = ctx.scanner(Shutdown::never());
        assert_eq!(scanner.scan_count(), 0);

        let recent = ctx.store.recent_direct(10, false).await.unwrap();
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn test_missing_primary_endpoint() {
        let mut config = Config::default();
        let ctx = AppContext::new(config.clone()).unwrap();
        let err = ctx.ensure_primary_endpoint().unwrap_err();
        assert!(err.to_string().starts_with("RPC_URL_MAINNET not configured"));

        config.rpc_urls.insert(
            Network::Mainnet,
            "http://localhost:8545".parse().unwrap(),
        );
        let ctx = AppContext::new(config).unwrap();
        assert!(ctx.ensure_primary_endpoint().is_ok());
    }
}
