//! Reference-norm persistence
//!
//! Norms are read-mostly reference data, seeded by hand or by tooling and
//! listed on every quote detail page.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::Result;
use crate::models::Norm;

pub struct NormRepository {
    pool: SqlitePool,
}

impl NormRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        code: &str,
        description: &str,
        services: &[String],
        default_selected: bool,
    ) -> Result<Norm> {
        let services_json = serde_json::to_string(services)?;
        let result = sqlx::query(
            "INSERT INTO norms (code, description, services, default_selected) VALUES (?, ?, ?, ?)",
        )
        .bind(code)
        .bind(description)
        .bind(&services_json)
        .bind(default_selected)
        .execute(&self.pool)
        .await?;

        Ok(Norm {
            id: result.last_insert_rowid(),
            code: code.to_string(),
            description: description.to_string(),
            services: services.to_vec(),
            default_selected,
        })
    }

    /// All norms ordered by code, for the detail page listing.
    pub async fn list(&self) -> Result<Vec<Norm>> {
        let rows = sqlx::query("SELECT * FROM norms ORDER BY code")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(norm_from_row).collect()
    }

    /// Norms flagged default-selected, the fallback set when a submission
    /// ticks none.
    pub async fn defaults(&self) -> Result<Vec<Norm>> {
        let rows = sqlx::query("SELECT * FROM norms WHERE default_selected = 1 ORDER BY code")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(norm_from_row).collect()
    }

    /// Norms matching the given ids; unknown ids are silently skipped.
    pub async fn by_ids(&self, ids: &[i64]) -> Result<Vec<Norm>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM norms WHERE id IN ({placeholders}) ORDER BY code");
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(norm_from_row).collect()
    }
}

pub(crate) fn norm_from_row(row: &SqliteRow) -> Result<Norm> {
    let services_json: String = row.try_get("services")?;
    Ok(Norm {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        description: row.try_get("description")?,
        // reference data seeded by hand; a bad JSON cell degrades to "no tags"
        services: serde_json::from_str(&services_json).unwrap_or_default(),
        default_selected: row.try_get("default_selected")?,
    })
}
