//! Quote persistence
//!
//! The quote aggregate plus its norm associations. Monetary columns are
//! stored as decimal text and surfaced as `rust_decimal::Decimal`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::norm_repository::norm_from_row;
use crate::error::Result;
use crate::models::{BuildingType, Norm, Quote, TimeUnit};

/// Fields needed to open a new quote from the creation form.
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub client_id: i64,
    pub project_name: String,
    pub is_detection: bool,
    pub is_protection: bool,
    pub is_human_safety: bool,
    pub deliver_autocad: bool,
    pub deliver_revit: bool,
    pub delivery_time_value: i64,
    pub delivery_time_unit: TimeUnit,
}

pub struct QuoteRepository {
    pool: SqlitePool,
}

impl QuoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: &NewQuote) -> Result<Quote> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO quotes
                (client_id, project_name, is_detection, is_protection, is_human_safety,
                 deliver_autocad, deliver_revit, delivery_time_value, delivery_time_unit,
                 created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(data.client_id)
        .bind(&data.project_name)
        .bind(data.is_detection)
        .bind(data.is_protection)
        .bind(data.is_human_safety)
        .bind(data.deliver_autocad)
        .bind(data.deliver_revit)
        .bind(data.delivery_time_value)
        .bind(data.delivery_time_unit.key())
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        Ok(Quote {
            id,
            client_id: data.client_id,
            project_name: data.project_name.clone(),
            is_detection: data.is_detection,
            is_protection: data.is_protection,
            is_human_safety: data.is_human_safety,
            deliver_autocad: data.deliver_autocad,
            deliver_revit: data.deliver_revit,
            building_type: None,
            area_sqm: None,
            manual_requirements: String::new(),
            manual_items_sh: String::new(),
            manual_items_detection: String::new(),
            manual_items_protection: String::new(),
            payment_advance: 40,
            payment_first_version: 40,
            payment_final: 20,
            delivery_time_value: data.delivery_time_value,
            delivery_time_unit: data.delivery_time_unit,
            value_protection: Decimal::ZERO,
            value_detection: Decimal::ZERO,
            value_human_safety: Decimal::ZERO,
            total_value: Decimal::ZERO,
            generated_doc: None,
            created_at: now,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Option<Quote>> {
        let row = sqlx::query("SELECT * FROM quotes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| quote_from_row(&r)).transpose()
    }

    /// Persist every mutable field of the quote.
    pub async fn update(&self, quote: &Quote) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE quotes SET
                project_name = ?,
                is_detection = ?, is_protection = ?, is_human_safety = ?,
                deliver_autocad = ?, deliver_revit = ?,
                building_type = ?, area_sqm = ?,
                manual_requirements = ?, manual_items_sh = ?,
                manual_items_detection = ?, manual_items_protection = ?,
                payment_advance = ?, payment_first_version = ?, payment_final = ?,
                delivery_time_value = ?, delivery_time_unit = ?,
                value_protection = ?, value_detection = ?, value_human_safety = ?,
                total_value = ?, generated_doc = ?
            WHERE id = ?
            "#,
        )
        .bind(&quote.project_name)
        .bind(quote.is_detection)
        .bind(quote.is_protection)
        .bind(quote.is_human_safety)
        .bind(quote.deliver_autocad)
        .bind(quote.deliver_revit)
        .bind(quote.building_type.map(|b| b.key()).unwrap_or(""))
        .bind(quote.area_sqm.map(|a| a.to_string()))
        .bind(&quote.manual_requirements)
        .bind(&quote.manual_items_sh)
        .bind(&quote.manual_items_detection)
        .bind(&quote.manual_items_protection)
        .bind(quote.payment_advance)
        .bind(quote.payment_first_version)
        .bind(quote.payment_final)
        .bind(quote.delivery_time_value)
        .bind(quote.delivery_time_unit.key())
        .bind(quote.value_protection.to_string())
        .bind(quote.value_detection.to_string())
        .bind(quote.value_human_safety.to_string())
        .bind(quote.total_value.to_string())
        .bind(&quote.generated_doc)
        .bind(quote.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Replace the quote's norm associations with exactly `norm_ids`.
    ///
    /// This is a set-membership write, not a merge: saving `[1, 3]` and
    /// later `[]` leaves zero associations. Previous rows are always
    /// discarded.
    pub async fn set_norms(&self, quote_id: i64, norm_ids: &[i64]) -> Result<()> {
        sqlx::query("DELETE FROM quote_norms WHERE quote_id = ?")
            .bind(quote_id)
            .execute(&self.pool)
            .await?;

        for norm_id in norm_ids {
            sqlx::query("INSERT OR IGNORE INTO quote_norms (quote_id, norm_id) VALUES (?, ?)")
                .bind(quote_id)
                .bind(norm_id)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    /// Norms currently associated with the quote, ordered by code.
    pub async fn norms(&self, quote_id: i64) -> Result<Vec<Norm>> {
        let rows = sqlx::query(
            r#"
            SELECT n.* FROM norms n
            JOIN quote_norms qn ON qn.norm_id = n.id
            WHERE qn.quote_id = ?
            ORDER BY n.code
            "#,
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(norm_from_row).collect()
    }

    /// Record the path of the generated document.
    pub async fn set_generated_doc(&self, quote_id: i64, path: &str) -> Result<()> {
        sqlx::query("UPDATE quotes SET generated_doc = ? WHERE id = ?")
            .bind(path)
            .bind(quote_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn quote_from_row(row: &SqliteRow) -> Result<Quote> {
    let building_type: String = row.try_get("building_type")?;
    let area_sqm: Option<String> = row.try_get("area_sqm")?;
    let delivery_time_unit: String = row.try_get("delivery_time_unit")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Quote {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        project_name: row.try_get("project_name")?,
        is_detection: row.try_get("is_detection")?,
        is_protection: row.try_get("is_protection")?,
        is_human_safety: row.try_get("is_human_safety")?,
        deliver_autocad: row.try_get("deliver_autocad")?,
        deliver_revit: row.try_get("deliver_revit")?,
        building_type: BuildingType::from_key(&building_type),
        area_sqm: area_sqm.as_deref().and_then(|a| Decimal::from_str(a).ok()),
        manual_requirements: row.try_get("manual_requirements")?,
        manual_items_sh: row.try_get("manual_items_sh")?,
        manual_items_detection: row.try_get("manual_items_detection")?,
        manual_items_protection: row.try_get("manual_items_protection")?,
        payment_advance: row.try_get("payment_advance")?,
        payment_first_version: row.try_get("payment_first_version")?,
        payment_final: row.try_get("payment_final")?,
        delivery_time_value: row.try_get("delivery_time_value")?,
        delivery_time_unit: TimeUnit::from_key(&delivery_time_unit).unwrap_or_default(),
        value_protection: decimal_column(row, "value_protection")?,
        value_detection: decimal_column(row, "value_detection")?,
        value_human_safety: decimal_column(row, "value_human_safety")?,
        total_value: decimal_column(row, "total_value")?,
        generated_doc: row.try_get("generated_doc")?,
        created_at,
    })
}

fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal> {
    let raw: String = row.try_get(column)?;
    Ok(Decimal::from_str(&raw).unwrap_or(Decimal::ZERO))
}
