use chrono::NaiveDate;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Property, PropertyFinancials, Tenant};

#[derive(Debug, FromRow)]
struct PropertyRow {
    id: Uuid,
    address: String,
    zip_code: String,
    property_type: String,
    purchase_price: f64,
    purchase_date: NaiveDate,
    total_units: i32,
}

#[derive(Debug, FromRow)]
struct TenantRow {
    id: Uuid,
    property_id: Uuid,
    unit_label: Option<String>,
    rent_amount: f64,
    active: bool,
}

pub async fn fetch_property(pool: &sqlx::PgPool, id: Uuid) -> Result<Property, AppError> {
    let property = sqlx::query_as::<_, PropertyRow>(
        "SELECT id, address, zip_code, property_type, purchase_price, purchase_date, total_units
         FROM properties WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("property not found".to_string()))?;

    let tenants = sqlx::query_as::<_, TenantRow>(
        "SELECT id, property_id, unit_label, rent_amount, active
         FROM tenants WHERE property_id = $1 ORDER BY unit_label",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Property {
        id: property.id,
        address: property.address,
        zip_code: property.zip_code,
        property_type: property.property_type,
        purchase_price: property.purchase_price,
        purchase_date: property.purchase_date,
        total_units: property.total_units.max(0) as u32,
        tenants: tenants
            .into_iter()
            .map(|t| Tenant {
                id: t.id,
                property_id: t.property_id,
                unit_label: t.unit_label,
                rent_amount: t.rent_amount,
                active: t.active,
            })
            .collect(),
    })
}

/// Annual figures aggregated from the property's financial line items.
pub async fn fetch_financials(
    pool: &sqlx::PgPool,
    property_id: Uuid,
) -> Result<PropertyFinancials, AppError> {
    let row: Option<(f64, f64, f64)> = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(amount) FILTER (WHERE category = 'income'), 0)::DOUBLE PRECISION,
            COALESCE(SUM(amount) FILTER (WHERE category = 'expense'), 0)::DOUBLE PRECISION,
            COALESCE(SUM(amount) FILTER (WHERE category = 'debt_service'), 0)::DOUBLE PRECISION
        FROM financial_line_items
        WHERE property_id = $1
        "#,
    )
    .bind(property_id)
    .fetch_optional(pool)
    .await?;

    let (annual_income, annual_expenses, annual_debt_service) = row.unwrap_or((0.0, 0.0, 0.0));
    Ok(PropertyFinancials {
        property_id,
        annual_income,
        annual_expenses,
        annual_debt_service,
    })
}

pub async fn update_tenant_rent(
    executor: impl sqlx::PgExecutor<'_>,
    tenant_id: Uuid,
    rent_amount: f64,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE tenants SET rent_amount = $2 WHERE id = $1")
        .bind(tenant_id)
        .bind(rent_amount)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("tenant not found".to_string()));
    }
    Ok(())
}
