//! FireQuote core library
//!
//! Domain model and business logic for the quoting tool: clients, reference
//! norms, quotes, template selection, form intake normalization, and the
//! Word-document renderer. The HTTP layer lives in `firequote-web`; the
//! offline template loader lives in `xtask`.

pub mod database;
pub mod error;
pub mod intake;
pub mod models;
pub mod render;
pub mod templates;

pub use error::{CoreError, RenderError, Result, ValidationError};
pub use models::{BuildingType, Client, ClientTitle, Norm, Quote, TemplateDoc, TimeUnit};
