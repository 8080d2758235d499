use crate::pagination::PaginationError;
use crate::store::StoreError;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

pub const LOGIN_PATH: &str = "/login/";
pub const DASHBOARD_PATH: &str = "/dashboard/";

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("authentication required")]
    AuthenticationRequired,

    #[error("not allowed")]
    AuthorizationDenied,

    /// The addressed row doesn't exist; carries the list to go back to.
    #[error("not found, redirecting to {0}")]
    NotFound(String),

    /// A rendered form view with field errors.
    #[error("invalid form submission")]
    Validation(serde_json::Value),

    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Upload(#[from] MultipartError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

fn json_error(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn internal_error() -> Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        match self {
            RouteError::AuthenticationRequired => Redirect::to(LOGIN_PATH).into_response(),
            RouteError::AuthorizationDenied => Redirect::to(DASHBOARD_PATH).into_response(),
            RouteError::NotFound(list_path) => Redirect::to(&list_path).into_response(),
            RouteError::Validation(view) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(view)).into_response()
            }
            RouteError::Pagination(err) => {
                debug!("Rejected pagination parameters: {}", err);
                json_error(StatusCode::BAD_REQUEST, err.to_string())
            }
            RouteError::BadRequest(message) => json_error(StatusCode::BAD_REQUEST, message),
            RouteError::Upload(err) => {
                debug!("Rejected upload: {}", err.body_text());
                err.into_response()
            }
            RouteError::Store(err) => {
                error!("Storage failure: {}", err);
                internal_error()
            }
            RouteError::Internal(err) => {
                error!("Internal failure: {:#}", err);
                internal_error()
            }
        }
    }
}

pub type RouteResult = Result<Response, RouteError>;
