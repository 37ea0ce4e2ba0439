//! Error types for pickup-address

use thiserror::Error;

/// Main error type for pickup-address operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Geo error: {0}")]
    Geo(String),
}

impl From<handlebars::TemplateError> for Error {
    fn from(err: handlebars::TemplateError) -> Self {
        Error::Template(Box::new(err))
    }
}

/// Result type alias for pickup-address operations
pub type Result<T> = std::result::Result<T, Error>;
