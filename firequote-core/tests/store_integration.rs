//! Store integration tests
//!
//! Exercise the repositories against an in-memory database: client and
//! quote round-trips, and the replace-not-merge contract of the norm
//! association write.

use anyhow::Result;
use rust_decimal::Decimal;
use std::str::FromStr;

use firequote_core::database::{
    self, ClientRepository, NormRepository, QuoteRepository, TemplateRepository,
};
use firequote_core::database::quote_repository::NewQuote;
use firequote_core::intake::NewClient;
use firequote_core::models::{ClientTitle, TimeUnit};

struct TestStore {
    pool: sqlx::SqlitePool,
}

impl TestStore {
    async fn new() -> Result<Self> {
        Ok(Self {
            pool: database::connect_in_memory().await?,
        })
    }

    fn clients(&self) -> ClientRepository {
        ClientRepository::new(self.pool.clone())
    }

    fn norms(&self) -> NormRepository {
        NormRepository::new(self.pool.clone())
    }

    fn quotes(&self) -> QuoteRepository {
        QuoteRepository::new(self.pool.clone())
    }

    fn templates(&self) -> TemplateRepository {
        TemplateRepository::new(self.pool.clone())
    }

    async fn seed_quote(&self) -> Result<i64> {
        let client = self
            .clients()
            .create(&NewClient {
                title: Some(ClientTitle::Ingeniero),
                full_name: "Ana Pérez".into(),
                position: "Directora".into(),
                company: "ACME".into(),
                city: "Bogotá".into(),
                email: "ana@acme.example".into(),
                phone: "300 000 0000".into(),
            })
            .await?;

        let quote = self
            .quotes()
            .create(&NewQuote {
                client_id: client.id,
                project_name: "Torre Norte".into(),
                is_detection: true,
                is_protection: false,
                is_human_safety: false,
                deliver_autocad: true,
                deliver_revit: false,
                delivery_time_value: 3,
                delivery_time_unit: TimeUnit::Weeks,
            })
            .await?;
        Ok(quote.id)
    }
}

#[tokio::test]
async fn client_round_trip() -> Result<()> {
    let store = TestStore::new().await?;
    let created = store
        .clients()
        .create(&NewClient {
            title: None,
            full_name: "Carlos Ruiz".into(),
            position: String::new(),
            company: "Constructora Sur".into(),
            city: String::new(),
            email: String::new(),
            phone: String::new(),
        })
        .await?;

    let fetched = store.clients().get(created.id).await?.expect("persisted");
    assert_eq!(fetched.full_name, "Carlos Ruiz");
    assert_eq!(fetched.title, None);
    assert_eq!(fetched.company, "Constructora Sur");

    let all = store.clients().list().await?;
    assert_eq!(all.len(), 1);
    Ok(())
}

#[tokio::test]
async fn quote_round_trip_preserves_typed_fields() -> Result<()> {
    let store = TestStore::new().await?;
    let quote_id = store.seed_quote().await?;

    let mut quote = store.quotes().get(quote_id).await?.expect("persisted");
    assert!(quote.is_detection);
    assert!(quote.deliver_autocad);
    assert_eq!(quote.delivery_time_unit, TimeUnit::Weeks);
    assert_eq!(quote.payment_advance, 40);
    assert_eq!(quote.total_value, Decimal::ZERO);

    quote.manual_requirements = "planos\nmemorias".into();
    quote.total_value = Decimal::from_str("2500.75")?;
    quote.payment_advance = 50;
    store.quotes().update(&quote).await?;

    let reloaded = store.quotes().get(quote_id).await?.expect("still there");
    assert_eq!(reloaded.manual_requirements, "planos\nmemorias");
    assert_eq!(reloaded.total_value, Decimal::from_str("2500.75")?);
    assert_eq!(reloaded.payment_advance, 50);
    Ok(())
}

#[tokio::test]
async fn missing_quote_is_none() -> Result<()> {
    let store = TestStore::new().await?;
    assert!(store.quotes().get(999).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn set_norms_replaces_wholesale() -> Result<()> {
    let store = TestStore::new().await?;
    let quote_id = store.seed_quote().await?;

    let norms = store.norms();
    let n1 = norms
        .create("NFPA 13", "Rociadores", &["protection".into()], false)
        .await?;
    let n2 = norms
        .create("NFPA 72", "Alarmas", &["detection".into()], false)
        .await?;
    let n3 = norms
        .create("NFPA 101", "Seguridad humana", &["human_safety".into()], false)
        .await?;

    store.quotes().set_norms(quote_id, &[n1.id, n3.id]).await?;
    let assigned = store.quotes().norms(quote_id).await?;
    let codes: Vec<&str> = assigned.iter().map(|n| n.code.as_str()).collect();
    assert_eq!(codes, vec!["NFPA 101", "NFPA 13"]);

    // A later save with a different subset discards the previous set.
    store.quotes().set_norms(quote_id, &[n2.id]).await?;
    let assigned = store.quotes().norms(quote_id).await?;
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].code, "NFPA 72");

    // And an empty set (no ids, no defaults) leaves zero associations.
    store.quotes().set_norms(quote_id, &[]).await?;
    assert!(store.quotes().norms(quote_id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn default_norms_are_the_fallback_set() -> Result<()> {
    let store = TestStore::new().await?;
    let norms = store.norms();
    norms
        .create("NFPA 13", "Rociadores", &["protection".into()], true)
        .await?;
    norms
        .create("NFPA 72", "Alarmas", &["detection".into()], false)
        .await?;

    let defaults = norms.defaults().await?;
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].code, "NFPA 13");
    Ok(())
}

#[tokio::test]
async fn norms_by_ids_skips_unknown() -> Result<()> {
    let store = TestStore::new().await?;
    let n1 = store
        .norms()
        .create("NSR-10", "Titulo J", &[], false)
        .await?;

    let found = store.norms().by_ids(&[n1.id, 999]).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, "NSR-10");

    assert!(store.norms().by_ids(&[]).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn template_upsert_is_keyed_by_name() -> Result<()> {
    let store = TestStore::new().await?;
    let templates = store.templates();

    templates
        .upsert("detection_autocad.docx", "detection", "autocad")
        .await?;
    templates
        .upsert("detection_autocad.docx", "detection", "autocad")
        .await?;
    templates
        .upsert("human_safety.docx", "human_safety", "")
        .await?;

    let all = templates.list().await?;
    assert_eq!(all.len(), 2);

    let found = templates
        .find_by_name("human_safety.docx")
        .await?
        .expect("upserted");
    assert_eq!(found.services_tag, "human_safety");
    assert_eq!(found.formats_tag, "");
    Ok(())
}

#[tokio::test]
async fn generated_doc_pointer_is_recorded() -> Result<()> {
    let store = TestStore::new().await?;
    let quote_id = store.seed_quote().await?;

    store
        .quotes()
        .set_generated_doc(quote_id, "generated_docs/Cotizacion_Ana_Torre.docx")
        .await?;

    let quote = store.quotes().get(quote_id).await?.expect("persisted");
    assert_eq!(
        quote.generated_doc.as_deref(),
        Some("generated_docs/Cotizacion_Ana_Torre.docx")
    );
    Ok(())
}
