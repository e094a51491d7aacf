use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    Concession, Confidence, MarketPosition, OptimizationRecord, OptimizationStatus,
};

#[derive(Debug, FromRow)]
struct OptimizationRow {
    id: Uuid,
    property_id: Uuid,
    tenant_id: Option<Uuid>,
    zip_code: String,
    bedrooms: i32,
    bathrooms: f64,
    square_feet: f64,
    occupancy_rate: Option<f64>,
    current_rent: f64,
    recommended_rent: f64,
    change_amount: f64,
    change_percent: f64,
    market_position: String,
    confidence: String,
    reasoning: serde_json::Value,
    insights: serde_json::Value,
    should_offer_concession: bool,
    concessions: serde_json::Value,
    status: String,
    reviewed_by: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

fn decode_err(msg: String) -> AppError {
    AppError::Db(sqlx::Error::Decode(msg.into()))
}

impl TryFrom<OptimizationRow> for OptimizationRecord {
    type Error = AppError;

    fn try_from(row: OptimizationRow) -> Result<Self, Self::Error> {
        let status = OptimizationStatus::parse(&row.status)
            .ok_or_else(|| decode_err(format!("unknown optimization status '{}'", row.status)))?;
        let confidence = Confidence::parse(&row.confidence)
            .ok_or_else(|| decode_err(format!("unknown confidence '{}'", row.confidence)))?;
        let reasoning: Vec<String> = serde_json::from_value(row.reasoning)
            .map_err(|e| decode_err(e.to_string()))?;
        let insights: Vec<String> = serde_json::from_value(row.insights)
            .map_err(|e| decode_err(e.to_string()))?;
        let concessions: Vec<Concession> = serde_json::from_value(row.concessions)
            .map_err(|e| decode_err(e.to_string()))?;

        Ok(OptimizationRecord {
            id: row.id,
            property_id: row.property_id,
            tenant_id: row.tenant_id,
            zip_code: row.zip_code,
            bedrooms: row.bedrooms as u32,
            bathrooms: row.bathrooms,
            square_feet: row.square_feet,
            occupancy_rate: row.occupancy_rate,
            current_rent: row.current_rent,
            recommended_rent: row.recommended_rent,
            change_amount: row.change_amount,
            change_percent: row.change_percent,
            market_position: MarketPosition::from_str_or_at(&row.market_position),
            confidence,
            reasoning,
            insights,
            should_offer_concession: row.should_offer_concession,
            concessions,
            status,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
            created_at: row.created_at,
        })
    }
}

const COLUMNS: &str = "id, property_id, tenant_id, zip_code, bedrooms, bathrooms, square_feet, \
     occupancy_rate, current_rent, recommended_rent, change_amount, change_percent, \
     market_position, confidence, reasoning, insights, should_offer_concession, concessions, \
     status, reviewed_by, reviewed_at, created_at";

pub async fn insert_optimization(
    pool: &sqlx::PgPool,
    record: &OptimizationRecord,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO optimizations
            (id, property_id, tenant_id, zip_code, bedrooms, bathrooms, square_feet,
             occupancy_rate, current_rent, recommended_rent, change_amount, change_percent,
             market_position, confidence, reasoning, insights, should_offer_concession,
             concessions, status, reviewed_by, reviewed_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)
        "#,
    )
    .bind(record.id)
    .bind(record.property_id)
    .bind(record.tenant_id)
    .bind(&record.zip_code)
    .bind(record.bedrooms as i32)
    .bind(record.bathrooms)
    .bind(record.square_feet)
    .bind(record.occupancy_rate)
    .bind(record.current_rent)
    .bind(record.recommended_rent)
    .bind(record.change_amount)
    .bind(record.change_percent)
    .bind(record.market_position.as_str())
    .bind(record.confidence.as_str())
    .bind(serde_json::json!(record.reasoning))
    .bind(serde_json::json!(record.insights))
    .bind(record.should_offer_concession)
    .bind(serde_json::json!(record.concessions))
    .bind(record.status.as_str())
    .bind(&record.reviewed_by)
    .bind(record.reviewed_at)
    .bind(record.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_optimization(
    pool: &sqlx::PgPool,
    id: Uuid,
) -> Result<OptimizationRecord, AppError> {
    let row = sqlx::query_as::<_, OptimizationRow>(&format!(
        "SELECT {COLUMNS} FROM optimizations WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("optimization not found".to_string()))?;
    row.try_into()
}

pub async fn list_optimizations(
    pool: &sqlx::PgPool,
    property_id: Uuid,
) -> Result<Vec<OptimizationRecord>, AppError> {
    let rows = sqlx::query_as::<_, OptimizationRow>(&format!(
        "SELECT {COLUMNS} FROM optimizations WHERE property_id = $1 ORDER BY created_at DESC"
    ))
    .bind(property_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(TryInto::try_into).collect()
}

/// Conditional compare-and-swap on status: only a `pending` record
/// transitions. Returns `None` when no row matched (missing or already
/// processed), leaving the caller to distinguish the two.
pub async fn conditional_transition(
    executor: impl sqlx::PgExecutor<'_>,
    id: Uuid,
    to: OptimizationStatus,
    reviewer: &str,
) -> Result<Option<OptimizationRecord>, AppError> {
    let row = sqlx::query_as::<_, OptimizationRow>(&format!(
        r#"
        UPDATE optimizations
        SET status = $2, reviewed_by = $3, reviewed_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(to.as_str())
    .bind(reviewer)
    .fetch_optional(executor)
    .await?;
    row.map(TryInto::try_into).transpose()
}

pub async fn fetch_status(
    executor: impl sqlx::PgExecutor<'_>,
    id: Uuid,
) -> Result<Option<String>, AppError> {
    let status: Option<(String,)> =
        sqlx::query_as("SELECT status FROM optimizations WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
    Ok(status.map(|(s,)| s))
}
