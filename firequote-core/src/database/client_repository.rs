//! Client persistence

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::Result;
use crate::intake::NewClient;
use crate::models::{Client, ClientTitle};

pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a client captured inline on the quote form.
    pub async fn create(&self, data: &NewClient) -> Result<Client> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO clients (title, full_name, position, company, city, email, phone, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(data.title.map(|t| t.key()).unwrap_or(""))
        .bind(&data.full_name)
        .bind(&data.position)
        .bind(&data.company)
        .bind(&data.city)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Client {
            id: result.last_insert_rowid(),
            title: data.title,
            full_name: data.full_name.clone(),
            position: data.position.clone(),
            company: data.company.clone(),
            city: data.city.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
            created_at: now,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Option<Client>> {
        let row = sqlx::query("SELECT * FROM clients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| client_from_row(&r)).transpose()
    }

    /// All clients, ordered for the form dropdown.
    pub async fn list(&self) -> Result<Vec<Client>> {
        let rows = sqlx::query("SELECT * FROM clients ORDER BY full_name, company")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(client_from_row).collect()
    }
}

fn client_from_row(row: &SqliteRow) -> Result<Client> {
    let title: String = row.try_get("title")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(Client {
        id: row.try_get("id")?,
        title: ClientTitle::from_key(&title),
        full_name: row.try_get("full_name")?,
        position: row.try_get("position")?,
        company: row.try_get("company")?,
        city: row.try_get("city")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        created_at,
    })
}
