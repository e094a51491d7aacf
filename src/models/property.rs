use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tenant occupying (or having vacated) a unit of a property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub property_id: Uuid,
    pub unit_label: Option<String>,
    pub rent_amount: f64,
    pub active: bool,
}

/// Property facts the engine reads as calculation inputs. Owned by the
/// surrounding application; the engine never mutates anything here except a
/// tenant's rent on an approved optimization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub address: String,
    pub zip_code: String,
    pub property_type: String,
    pub purchase_price: f64,
    pub purchase_date: NaiveDate,
    pub total_units: u32,
    pub tenants: Vec<Tenant>,
}

/// Annual income/expense/debt figures for a property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyFinancials {
    pub property_id: Uuid,
    pub annual_income: f64,
    pub annual_expenses: f64,
    pub annual_debt_service: f64,
}

impl PropertyFinancials {
    /// Net operating income: income minus operating expenses, before debt
    /// service.
    pub fn noi(&self) -> f64 {
        self.annual_income - self.annual_expenses
    }
}
