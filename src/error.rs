// error.rs
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

/// Failures of the persistence backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("no state object found in store")]
    MissingState,
    #[error("failed to load state: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("no state object found in store")]
    NotFound,
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("invalid light index: {0}")]
    InvalidLight(String),
    #[error("validation failed for {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("storage error: {0}")]
    Store(#[from] StorageError),
    #[error("whitelist refresh failed: {0}")]
    Cache(#[from] CacheError),
    #[error("unauthorized user")]
    Unauthorized,
    #[error("body contains invalid json: {0}")]
    InvalidBody(String),
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
    #[error("method, {method}, not available for resource, {address}")]
    NotImplemented { method: String, address: String },
}

/// Bridge-protocol error payload: `{"error": {"type", "address", "description"}}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub kind: u16,
    pub address: String,
    pub description: String,
}

impl AppError {
    /// Bridge error type code.
    pub fn kind(&self) -> u16 {
        match self {
            AppError::Unauthorized => 1,
            AppError::InvalidBody(_) => 2,
            AppError::NotFound | AppError::InvalidPath(_) | AppError::InvalidLight(_) => 3,
            AppError::NotImplemented { .. } => 4,
            AppError::MissingParameter(_) => 5,
            AppError::Validation(_) => 7,
            AppError::Store(_) | AppError::Cache(_) => 901,
        }
    }

    pub fn address(&self) -> String {
        match self {
            AppError::InvalidPath(path) => format!("/{}", path.replace('.', "/")),
            AppError::InvalidLight(id) => format!("/lights/{id}"),
            AppError::NotImplemented { address, .. } => address.clone(),
            _ => "/".to_string(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: ErrorDetail {
                kind: self.kind(),
                address: self.address(),
                description: self.to_string(),
            },
        }
    }
}

// Errors travel as payloads with 200, as the bridge protocol does.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Store(_) | AppError::Cache(_) => error!(error = %self, "request failed"),
            _ => warn!(error = %self, kind = self.kind(), "request rejected"),
        }
        Json(self.body()).into_response()
    }
}
