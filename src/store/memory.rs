use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    OptimizationRecord, OptimizationStatus, Property, PropertyFinancials, Tenant,
};
use crate::store::{RecordStore, ALREADY_PROCESSED};

#[derive(Default)]
struct Inner {
    optimizations: HashMap<Uuid, OptimizationRecord>,
    properties: HashMap<Uuid, Property>,
    financials: HashMap<Uuid, PropertyFinancials>,
    tenants: HashMap<Uuid, Tenant>,
    rent_updates: Vec<(Uuid, f64)>,
}

/// In-memory record store. All state sits behind one mutex, so the
/// approve/reject compare-and-swap is atomic the same way the Postgres
/// transaction is.
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: Mutex<Inner>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_property(&self, property: Property) {
        let mut inner = self.inner.lock();
        for tenant in &property.tenants {
            inner.tenants.insert(tenant.id, tenant.clone());
        }
        inner.properties.insert(property.id, property);
    }

    pub fn insert_financials(&self, financials: PropertyFinancials) {
        self.inner
            .lock()
            .insert_financials(financials);
    }

    pub fn tenant_rent(&self, tenant_id: Uuid) -> Option<f64> {
        self.inner.lock().tenants.get(&tenant_id).map(|t| t.rent_amount)
    }

    /// How many times a tenant's rent has been written. Used to assert the
    /// exactly-once behavior of approval.
    pub fn rent_update_count(&self, tenant_id: Uuid) -> usize {
        self.inner
            .lock()
            .rent_updates
            .iter()
            .filter(|(id, _)| *id == tenant_id)
            .count()
    }
}

impl Inner {
    fn insert_financials(&mut self, financials: PropertyFinancials) {
        self.financials.insert(financials.property_id, financials);
    }

    fn transition(
        &mut self,
        id: Uuid,
        to: OptimizationStatus,
        reviewer: &str,
        write_rent: bool,
    ) -> Result<OptimizationRecord, AppError> {
        let record = self
            .optimizations
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("optimization not found".to_string()))?;

        if record.status != OptimizationStatus::Pending {
            return Err(AppError::Conflict(ALREADY_PROCESSED.to_string()));
        }

        record.status = to;
        record.reviewed_by = Some(reviewer.to_string());
        record.reviewed_at = Some(Utc::now());
        let record = record.clone();

        if write_rent {
            if let Some(tenant_id) = record.tenant_id {
                if let Some(tenant) = self.tenants.get_mut(&tenant_id) {
                    tenant.rent_amount = record.recommended_rent;
                }
                self.rent_updates.push((tenant_id, record.recommended_rent));
            }
        }

        Ok(record)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_optimization(&self, record: &OptimizationRecord) -> Result<(), AppError> {
        self.inner
            .lock()
            .optimizations
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn fetch_optimization(&self, id: Uuid) -> Result<OptimizationRecord, AppError> {
        self.inner
            .lock()
            .optimizations
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("optimization not found".to_string()))
    }

    async fn list_optimizations(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<OptimizationRecord>, AppError> {
        let mut records: Vec<OptimizationRecord> = self
            .inner
            .lock()
            .optimizations
            .values()
            .filter(|r| r.property_id == property_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn approve_optimization(
        &self,
        id: Uuid,
        reviewer: &str,
    ) -> Result<OptimizationRecord, AppError> {
        self.inner
            .lock()
            .transition(id, OptimizationStatus::Approved, reviewer, true)
    }

    async fn reject_optimization(
        &self,
        id: Uuid,
        reviewer: &str,
    ) -> Result<OptimizationRecord, AppError> {
        self.inner
            .lock()
            .transition(id, OptimizationStatus::Rejected, reviewer, false)
    }

    async fn fetch_property(&self, id: Uuid) -> Result<Property, AppError> {
        self.inner
            .lock()
            .properties
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("property not found".to_string()))
    }

    async fn fetch_financials(
        &self,
        property_id: Uuid,
    ) -> Result<PropertyFinancials, AppError> {
        self.inner
            .lock()
            .financials
            .get(&property_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("financials not found".to_string()))
    }
}
