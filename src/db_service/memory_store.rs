use async_trait::async_trait;
use eyre::Result;
use parking_lot::Mutex;

use super::OpportunityStore;
use crate::models::{DirectOpportunity, TriangularOpportunity};

/// Records with their ids, in insertion order
#[derive(Default)]
struct Tables {
    /// Direct records
    direct: Vec<(i32, DirectOpportunity)>,
    /// Triangular records
    triangular: Vec<(i32, TriangularOpportunity)>,
    /// Last id handed out, shared by both tables
    last_id: i32,
}

impl Tables {
    /// Next id
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

/// Process-local [`OpportunityStore`], used when no database is configured.
///
/// History is lost when the process exits.
#[derive(Default)]
pub struct MemoryOpportunityStore {
    /// Guarded tables, never held across an await
    tables: Mutex<Tables>,
}

impl MemoryOpportunityStore {
    /// An empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Most recent first by `(timestamp, id)`, optionally profitable only, at most `limit`
fn recent<T: Clone>(
    rows: &[(i32, T)],
    limit: i64,
    only_profitable: bool,
    is_profitable: impl Fn(&T) -> bool,
    timestamp: impl Fn(&T) -> chrono::DateTime<chrono::Utc>,
) -> Vec<T> {
    let limit = usize::try_from(limit).unwrap_or(0);
    let mut matching: Vec<&(i32, T)> = rows
        .iter()
        .filter(|(_, row)| !only_profitable || is_profitable(row))
        .collect();
    matching.sort_by(|(id_a, a), (id_b, b)| (timestamp(b), id_b).cmp(&(timestamp(a), id_a)));
    matching
        .into_iter()
        .take(limit)
        .map(|(_, row)| row.clone())
        .collect()
}

#[async_trait]
impl OpportunityStore for MemoryOpportunityStore {
    async fn record_direct(&self, opportunity: &DirectOpportunity) -> Result<i32> {
        let mut tables = self.tables.lock();
        let id = tables.next_id();
        tables.direct.push((id, opportunity.clone()));
        Ok(id)
    }

    async fn record_triangular(&self, opportunity: &TriangularOpportunity) -> Result<i32> {
        let mut tables = self.tables.lock();
        let id = tables.next_id();
        tables.triangular.push((id, opportunity.clone()));
        Ok(id)
    }

    async fn recent_direct(
        &self,
        limit: i64,
        only_profitable: bool,
    ) -> Result<Vec<DirectOpportunity>> {
        Ok(recent(
            &self.tables.lock().direct,
            limit,
            only_profitable,
            |o| o.is_profitable,
            |o| o.timestamp,
        ))
    }

    async fn recent_triangular(
        &self,
        limit: i64,
        only_profitable: bool,
    ) -> Result<Vec<TriangularOpportunity>> {
        Ok(recent(
            &self.tables.lock().triangular,
            limit,
            only_profitable,
            |o| o.is_profitable,
            |o| o.timestamp,
        ))
    }
}
