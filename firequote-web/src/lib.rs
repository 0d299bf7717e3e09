//! FireQuote web server
//!
//! Two HTML endpoints over the quoting core: the creation form and the
//! quote detail page, whose POST regenerates and streams the Word
//! document. Errors always come back as a redirect with a user-visible
//! message; there is no machine-readable error surface.

pub mod config;
pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(routes::quotes::quote_form_page).post(routes::quotes::create_quote),
        )
        .route(
            "/quote/:quote_id",
            get(routes::quotes::quote_details_page).post(routes::quotes::generate_quote),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
