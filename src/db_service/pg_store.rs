use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use eyre::{Result, WrapErr};

use super::OpportunityStore;
use crate::models::{DirectOpportunity, TriangularOpportunity};
use crate::schemas::{direct_opportunities, triangular_opportunities};
use crate::utils::db_connect::DbPool;

/// [`OpportunityStore`] over the `direct_opportunities` and
/// `triangular_opportunities` tables
pub struct PgOpportunityStore {
    /// Connection pool
    pool: DbPool,
}

impl PgOpportunityStore {
    /// Create a store over an existing pool
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OpportunityStore for PgOpportunityStore {
    async fn record_direct(&self, opportunity: &DirectOpportunity) -> Result<i32> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(direct_opportunities::table)
            .values(opportunity)
            .returning(direct_opportunities::id)
            .get_result(&mut conn)
            .await
            .wrap_err("Error saving direct opportunity")
    }

    async fn record_triangular(&self, opportunity: &TriangularOpportunity) -> Result<i32> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(triangular_opportunities::table)
            .values(opportunity)
            .returning(triangular_opportunities::id)
            .get_result(&mut conn)
            .await
            .wrap_err("Error saving triangular opportunity")
    }

    async fn recent_direct(
        &self,
        limit: i64,
        only_profitable: bool,
    ) -> Result<Vec<DirectOpportunity>> {
        let mut conn = self.pool.get().await?;

        let mut query = direct_opportunities::table
            .select(DirectOpportunity::as_select())
            .order((
                direct_opportunities::created_at.desc(),
                direct_opportunities::id.desc(),
            ))
            .limit(limit)
            .into_boxed();
        if only_profitable {
            query = query.filter(direct_opportunities::is_profitable.eq(true));
        }

        query
            .load(&mut conn)
            .await
            .wrap_err("Error loading direct opportunities")
    }

    async fn recent_triangular(
        &self,
        limit: i64,
        only_profitable: bool,
    ) -> Result<Vec<TriangularOpportunity>> {
        let mut conn = self.pool.get().await?;

        let mut query = triangular_opportunities::table
            .select(TriangularOpportunity::as_select())
            .order((
                triangular_opportunities::created_at.desc(),
                triangular_opportunities::id.desc(),
            ))
            .limit(limit)
            .into_boxed();
        if only_profitable {
            query = query.filter(triangular_opportunities::is_profitable.eq(true));
        }

        query
            .load(&mut conn)
            .await
            .wrap_err("Error loading triangular opportunities")
    }
}
