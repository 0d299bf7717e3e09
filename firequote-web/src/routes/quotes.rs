//! Quote endpoints
//!
//! `GET /` renders the creation form, `POST /` creates a quote and
//! redirects to its detail page. `GET /quote/:id` renders the detail page;
//! `POST /quote/:id` applies the submitted fields, replaces the norm set,
//! regenerates the Word document, and streams it back. Every failure path
//! redirects to the form with a message and produces no file.

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, RawForm, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use chrono::Local;

use firequote_core::database::{
    quote_repository::NewQuote, ClientRepository, NormRepository, QuoteRepository,
};
use firequote_core::error::{CoreError, ValidationError};
use firequote_core::intake::{FormData, QuoteCreateForm, QuoteDetailsForm};
use firequote_core::models::Quote;
use firequote_core::{render, templates};

use super::{pages, redirect_with_error, redirect_with_notice, Flash};
use crate::state::AppState;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

// ============================================================================
// Creation
// ============================================================================

pub async fn quote_form_page(State(state): State<AppState>, Query(flash): Query<Flash>) -> Response {
    let clients = match ClientRepository::new(state.pool.clone()).list().await {
        Ok(clients) => clients,
        Err(e) => {
            tracing::error!("failed to list clients: {e}");
            Vec::new()
        }
    };
    Html(pages::quote_form(&clients, &flash)).into_response()
}

pub async fn create_quote(State(state): State<AppState>, RawForm(body): RawForm) -> Response {
    let form = FormData::parse(&body);
    let parsed = QuoteCreateForm::from_form(&form);

    match try_create(&state, parsed).await {
        Ok(quote_id) => redirect_with_notice(
            &format!("/quote/{quote_id}"),
            "Cotización creada correctamente.",
        ),
        Err(e) => {
            tracing::warn!("quote creation rejected: {e}");
            redirect_with_error("/", &e.user_message())
        }
    }
}

async fn try_create(state: &AppState, form: QuoteCreateForm) -> Result<i64, CoreError> {
    let clients = ClientRepository::new(state.pool.clone());

    // No existing client picked: create one inline when the form carried
    // complete new-client data.
    let client_id = match form.existing_client {
        Some(id) => Some(id),
        None => match &form.new_client {
            Some(new_client) => Some(clients.create(new_client).await?.id),
            None => None,
        },
    };

    let (client_id, project_name) = match (client_id, form.project_name.clone()) {
        (Some(client_id), Some(project_name)) => (client_id, project_name),
        _ => return Err(ValidationError::MissingRequiredFields.into()),
    };

    let quote = QuoteRepository::new(state.pool.clone())
        .create(&NewQuote {
            client_id,
            project_name,
            is_detection: form.is_detection,
            is_protection: form.is_protection,
            is_human_safety: form.is_human_safety,
            deliver_autocad: form.deliver_autocad,
            deliver_revit: form.deliver_revit,
            delivery_time_value: form.delivery_time_value,
            delivery_time_unit: form.delivery_time_unit,
        })
        .await?;

    tracing::info!(quote_id = quote.id, client_id, "quote created");
    Ok(quote.id)
}

// ============================================================================
// Details & generation
// ============================================================================

pub async fn quote_details_page(
    State(state): State<AppState>,
    Path(quote_id): Path<i64>,
    Query(flash): Query<Flash>,
) -> Response {
    let quotes = QuoteRepository::new(state.pool.clone());
    let quote = match quotes.get(quote_id).await {
        Ok(Some(quote)) => quote,
        Ok(None) => return redirect_with_error("/", "La cotización no existe."),
        Err(e) => {
            tracing::error!("failed to load quote {quote_id}: {e}");
            return redirect_with_error("/", "Ocurrió un error al procesar la solicitud.");
        }
    };

    match load_details_page(&state, &quote, &flash).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("failed to render detail page for quote {quote_id}: {e}");
            redirect_with_error("/", &e.user_message())
        }
    }
}

async fn load_details_page(
    state: &AppState,
    quote: &Quote,
    flash: &Flash,
) -> Result<String, CoreError> {
    let client = ClientRepository::new(state.pool.clone())
        .get(quote.client_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    let norms = NormRepository::new(state.pool.clone());
    let all_norms = norms.list().await?;
    let default_ids: HashSet<i64> = norms.defaults().await?.iter().map(|n| n.id).collect();
    let selected_ids: HashSet<i64> = QuoteRepository::new(state.pool.clone())
        .norms(quote.id)
        .await?
        .iter()
        .map(|n| n.id)
        .collect();

    Ok(pages::quote_details(
        quote,
        &client,
        &all_norms,
        &selected_ids,
        &default_ids,
        flash,
    ))
}

pub async fn generate_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<i64>,
    RawForm(body): RawForm,
) -> Response {
    let quotes = QuoteRepository::new(state.pool.clone());
    let quote = match quotes.get(quote_id).await {
        Ok(Some(quote)) => quote,
        Ok(None) => return redirect_with_error("/", "La cotización no existe."),
        Err(e) => {
            tracing::error!("failed to load quote {quote_id}: {e}");
            return redirect_with_error("/", "Ocurrió un error al procesar la solicitud.");
        }
    };

    let form = FormData::parse(&body);
    match try_generate(&state, quote, &form).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(quote_id, "generation aborted: {e}");
            redirect_with_error("/", &e.user_message())
        }
    }
}

async fn try_generate(
    state: &AppState,
    mut quote: Quote,
    form: &FormData,
) -> Result<Response, CoreError> {
    let details = QuoteDetailsForm::from_form(form, &quote);
    details.apply(&mut quote);

    // Nothing has been written yet: a zero-service submission must leave
    // the stored quote exactly as it was.
    if quote.no_services_selected() {
        return Err(ValidationError::NoServicesSelected.into());
    }

    let quotes = QuoteRepository::new(state.pool.clone());
    let norms = NormRepository::new(state.pool.clone());

    // Explicitly ticked norms win; otherwise fall back to the default set.
    // Either way the association is replaced, not merged.
    let chosen_norms = if details.selected_norm_ids.is_empty() {
        norms.defaults().await?
    } else {
        norms.by_ids(&details.selected_norm_ids).await?
    };
    let chosen_ids: Vec<i64> = chosen_norms.iter().map(|n| n.id).collect();
    quotes.set_norms(quote.id, &chosen_ids).await?;
    quotes.update(&quote).await?;

    // Checked above: at least one service is on.
    let template_name = templates::template_filename(
        quote.is_detection,
        quote.is_protection,
        quote.is_human_safety,
        quote.deliver_autocad,
        quote.deliver_revit,
    )
    .ok_or(ValidationError::NoServicesSelected)?;

    let client = ClientRepository::new(state.pool.clone())
        .get(quote.client_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    let reference_norms = quotes.norms(quote.id).await?;
    let context = render::build_context(
        &quote,
        &client,
        &reference_norms,
        &details.additional_notes,
        Local::now().date_naive(),
    );

    let template_path = state.config.templates_dir.join(&template_name);
    let rendered = render::render_docx(&template_path, &context)?;

    // Persist the document, then stream the same bytes back.
    let output_name = render::output_filename(&client.full_name, &quote.project_name);
    std::fs::create_dir_all(&state.config.output_dir)?;
    let output_path = state.config.output_dir.join(&output_name);
    std::fs::write(&output_path, &rendered)?;
    quotes
        .set_generated_doc(quote.id, &output_path.to_string_lossy())
        .await?;

    tracing::info!(
        quote_id = quote.id,
        template = %template_name,
        output = %output_path.display(),
        "document generated"
    );

    let headers = [
        (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{output_name}\""),
        ),
    ];
    Ok((headers, rendered).into_response())
}
