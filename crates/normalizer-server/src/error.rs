//! `AppError`: the HTTP-facing error type, grounded on
//! `control::error::AppError`/`ErrorWrapper` — a thiserror enum that maps to
//! a status code and a JSON `detail` body (spec.md §7).

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use normalizer_core::NormalizerError;
use serde::Serialize;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Normalizer(#[from] NormalizerError),

    /// A structural request error with a detail message, e.g. an unknown
    /// store name in the config, or a body that fails to deserialize.
    #[error("{0}")]
    BadRequest(String),

    /// The FastAPI-pydantic-shaped 422 body used for the single documented
    /// "empty CURIE list" scenario (spec.md §8, item 4): a list of
    /// `{loc, msg, type}` objects rather than a plain string.
    #[error("validation error")]
    EmptyCurieList { loc: Vec<&'static str> },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct DetailString {
    detail: String,
}

#[derive(Serialize)]
struct PydanticDetailEntry {
    loc: Vec<&'static str>,
    msg: &'static str,
    r#type: &'static str,
}

#[derive(Serialize)]
struct DetailList {
    detail: Vec<PydanticDetailEntry>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Normalizer(NormalizerError::StoreUnavailable(msg)) => {
                error!(error = %msg, "store unavailable");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(DetailString { detail: msg })).into_response()
            }
            AppError::Normalizer(NormalizerError::ValidationError(msg)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(DetailString { detail: msg })).into_response()
            }
            AppError::Normalizer(NormalizerError::ConfigurationError(msg)) => {
                error!(error = %msg, "configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(DetailString { detail: msg })).into_response()
            }
            AppError::Normalizer(NormalizerError::Serialization(msg)) => {
                error!(error = %msg, "serialization error");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(DetailString { detail: msg })).into_response()
            }
            AppError::BadRequest(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(DetailString { detail: msg })).into_response()
            }
            AppError::EmptyCurieList { loc } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(DetailList {
                    detail: vec![PydanticDetailEntry {
                        loc,
                        msg: "ensure this value has at least 1 items",
                        r#type: "value_error.list.min_items",
                    }],
                }),
            )
                .into_response(),
            AppError::Internal(err) => {
                error!(error = %err, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(DetailString { detail: err.to_string() })).into_response()
            }
        }
    }
}
