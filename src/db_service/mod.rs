//! Persistence of opportunity records.
//!
//! The engine only ever talks to [`OpportunityStore`]. Postgres backs it in
//! production, a process-local list when no database is configured.

use async_trait::async_trait;
use eyre::Result;

use crate::models::{DirectOpportunity, TriangularOpportunity};

mod memory_store;
mod pg_store;
mod stats;

pub use memory_store::MemoryOpportunityStore;
pub use pg_store::PgOpportunityStore;
pub use stats::OpportunityStats;

/// Records opportunities and serves the most recent ones back
#[async_trait]
pub trait OpportunityStore: Send + Sync {
    /// Persist a direct opportunity, returning its id
    ///
    /// # Errors
    /// * If the write fails
    async fn record_direct(&self, opportunity: &DirectOpportunity) -> Result<i32>;

    /// Persist a triangular opportunity, returning its id
    ///
    /// # Errors
    /// * If the write fails
    async fn record_triangular(&self, opportunity: &TriangularOpportunity) -> Result<i32>;

    /// Up to `limit` direct opportunities, most recent first
    ///
    /// # Errors
    /// * If the read fails
    async fn recent_direct(&self, limit: i64, only_profitable: bool)
        -> Result<Vec<DirectOpportunity>>;

    /// Up to `limit` triangular opportunities, most recent first
    ///
    /// # Errors
    /// * If the read fails
    async fn recent_triangular(
        &self,
        limit: i64,
        only_profitable: bool,
    ) -> Result<Vec<TriangularOpportunity>>;
}
