//! Template inventory persistence
//!
//! Written by the offline loader, read for the admin inventory. The
//! renderer resolves template files directly on disk.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::Result;
use crate::models::TemplateDoc;

pub struct TemplateRepository {
    pool: SqlitePool,
}

impl TemplateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or refresh the record for a template file, keyed by name.
    pub async fn upsert(&self, name: &str, services_tag: &str, formats_tag: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO template_docs (name, services_tag, formats_tag)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                services_tag = excluded.services_tag,
                formats_tag = excluded.formats_tag
            "#,
        )
        .bind(name)
        .bind(services_tag)
        .bind(formats_tag)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<TemplateDoc>> {
        let row = sqlx::query("SELECT * FROM template_docs WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| template_from_row(&r)).transpose()
    }

    pub async fn list(&self) -> Result<Vec<TemplateDoc>> {
        let rows = sqlx::query("SELECT * FROM template_docs ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(template_from_row).collect()
    }
}

fn template_from_row(row: &SqliteRow) -> Result<TemplateDoc> {
    Ok(TemplateDoc {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        services_tag: row.try_get("services_tag")?,
        formats_tag: row.try_get("formats_tag")?,
    })
}
