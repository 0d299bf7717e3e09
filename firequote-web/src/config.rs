//! Server configuration
//!
//! Everything comes from the environment with working defaults, so a bare
//! `cargo run` serves against local directories.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory holding the Word templates the selector picks from
    pub templates_dir: PathBuf,
    /// Directory generated documents are written to before streaming
    pub output_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            templates_dir: std::env::var("FIREQUOTE_TEMPLATES_DIR")
                .unwrap_or_else(|_| "templates_docs".to_string())
                .into(),
            output_dir: std::env::var("FIREQUOTE_OUTPUT_DIR")
                .unwrap_or_else(|_| "generated_docs".to_string())
                .into(),
        }
    }
}
