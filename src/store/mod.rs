pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{OptimizationRecord, Property, PropertyFinancials};

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// Persistence seam for the engine. The engine only creates, reads and
/// conditionally updates records it owns (optimizations) and writes one
/// field it is allowed to touch (a tenant's rent on approval); everything
/// else is read-only input data.
///
/// `approve_optimization` / `reject_optimization` must be conditional on the
/// record still being `pending` and must apply atomically, so a record
/// processed twice yields a conflict instead of a double-applied rent
/// change.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_optimization(&self, record: &OptimizationRecord) -> Result<(), AppError>;

    async fn fetch_optimization(&self, id: Uuid) -> Result<OptimizationRecord, AppError>;

    async fn list_optimizations(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<OptimizationRecord>, AppError>;

    /// Approve a pending optimization and write the recommended rent onto
    /// the linked tenant, as one atomic operation. Fails with
    /// `Conflict("Optimization already processed")` when not pending.
    async fn approve_optimization(
        &self,
        id: Uuid,
        reviewer: &str,
    ) -> Result<OptimizationRecord, AppError>;

    /// Reject a pending optimization. Same conditional-update contract as
    /// approval.
    async fn reject_optimization(
        &self,
        id: Uuid,
        reviewer: &str,
    ) -> Result<OptimizationRecord, AppError>;

    async fn fetch_property(&self, id: Uuid) -> Result<Property, AppError>;

    async fn fetch_financials(&self, property_id: Uuid)
        -> Result<PropertyFinancials, AppError>;
}

/// Conflict message reported when a non-pending record is processed again.
pub const ALREADY_PROCESSED: &str = "Optimization already processed";
