//! Error types for the IaC module.

use thiserror::Error;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur while loading, composing or rendering.
///
/// None of these abort a documentation run on their own: classification and
/// topology inference never fail, and diagram failures degrade to
/// placeholders. They surface only from the input loader and the renderer.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("Input directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Invalid input bundle: {0}")]
    InvalidInput(String),

    #[error("Diagram composition failed: {0}")]
    Composition(String),

    #[error("Diagram rendering failed: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
