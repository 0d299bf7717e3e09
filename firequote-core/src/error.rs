//! Error handling for the quoting system
//!
//! User-facing variants carry the Spanish message shown after the
//! redirect; everything else wraps the underlying failure.

use thiserror::Error;

/// Main error type for the quoting system
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Message shown to the user on the redirect back to the form.
    ///
    /// Validation and missing-template failures carry their own wording;
    /// anything else collapses to a generic message so internals never
    /// leak into the page.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Validation(e) => e.to_string(),
            CoreError::Render(RenderError::TemplateNotFound(name)) => {
                format!("No se encontró la plantilla correspondiente: {name}")
            }
            _ => "Ocurrió un error al procesar la solicitud.".to_string(),
        }
    }
}

/// Validation failures surfaced directly to the user
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Missing client or project name on quote creation
    #[error("Por favor completa todos los campos obligatorios.")]
    MissingRequiredFields,

    /// All five service flags were false; generation cannot proceed
    #[error("No se seleccionó ningún servicio, por favor marca al menos uno.")]
    NoServicesSelected,
}

/// Failures from the document renderer
#[derive(Error, Debug)]
pub enum RenderError {
    /// The selected template file does not exist in the template directory
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// The template is not a well-formed .docx package
    #[error("malformed template {name}: {reason}")]
    MalformedTemplate { name: String, reason: String },

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
