use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{optimization_queries, property_queries};
use crate::errors::AppError;
use crate::models::{OptimizationRecord, OptimizationStatus, Property, PropertyFinancials};
use crate::store::{RecordStore, ALREADY_PROCESSED};

/// Postgres-backed record store. Approve runs the conditional status update
/// and the tenant rent write in one transaction.
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn transition(
        &self,
        id: Uuid,
        to: OptimizationStatus,
        reviewer: &str,
        write_rent: bool,
    ) -> Result<OptimizationRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        let transitioned =
            optimization_queries::conditional_transition(&mut *tx, id, to, reviewer).await?;

        let record = match transitioned {
            Some(record) => record,
            None => {
                // No row matched the CAS: either the record is gone or it
                // was already processed.
                let status = optimization_queries::fetch_status(&mut *tx, id).await?;
                tx.rollback().await?;
                return Err(match status {
                    None => AppError::NotFound("optimization not found".to_string()),
                    Some(_) => AppError::Conflict(ALREADY_PROCESSED.to_string()),
                });
            }
        };

        if write_rent {
            if let Some(tenant_id) = record.tenant_id {
                property_queries::update_tenant_rent(
                    &mut *tx,
                    tenant_id,
                    record.recommended_rent,
                )
                .await?;
            }
        }

        tx.commit().await?;
        Ok(record)
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn create_optimization(&self, record: &OptimizationRecord) -> Result<(), AppError> {
        optimization_queries::insert_optimization(&self.pool, record).await
    }

    async fn fetch_optimization(&self, id: Uuid) -> Result<OptimizationRecord, AppError> {
        optimization_queries::fetch_optimization(&self.pool, id).await
    }

    async fn list_optimizations(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<OptimizationRecord>, AppError> {
        optimization_queries::list_optimizations(&self.pool, property_id).await
    }

    async fn approve_optimization(
        &self,
        id: Uuid,
        reviewer: &str,
    ) -> Result<OptimizationRecord, AppError> {
        self.transition(id, OptimizationStatus::Approved, reviewer, true)
            .await
    }

    async fn reject_optimization(
        &self,
        id: Uuid,
        reviewer: &str,
    ) -> Result<OptimizationRecord, AppError> {
        self.transition(id, OptimizationStatus::Rejected, reviewer, false)
            .await
    }

    async fn fetch_property(&self, id: Uuid) -> Result<Property, AppError> {
        property_queries::fetch_property(&self.pool, id).await
    }

    async fn fetch_financials(
        &self,
        property_id: Uuid,
    ) -> Result<PropertyFinancials, AppError> {
        property_queries::fetch_financials(&self.pool, property_id).await
    }
}
