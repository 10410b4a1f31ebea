use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::backend::BackendError;
use crate::form::{StoreError, TableError};
use crate::preview::PreviewError;

#[derive(Debug, Error)]
pub enum DeskError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("there is no latinized text to extract appointments from")]
    NothingToExtract,

    #[error("background task failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl ResponseError for DeskError {
    fn status_code(&self) -> StatusCode {
        match self {
            DeskError::Table(_) | DeskError::Preview(_) | DeskError::NothingToExtract => {
                StatusCode::BAD_REQUEST
            }
            DeskError::Store(StoreError::EmptyBatch | StoreError::InvalidDate(_)) => StatusCode::BAD_REQUEST,
            DeskError::Store(_) | DeskError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DeskError::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.to_string()
        }))
    }
}
