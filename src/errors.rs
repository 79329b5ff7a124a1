use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::FieldError;
use crate::services::api::ApiError;
use crate::services::manage::ManageError;
use crate::services::notify::Toast;
use crate::services::wizard::WizardError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{}", .0.first_message())]
    Api(#[from] ApiError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Manage(#[from] ManageError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

fn api_status(err: &ApiError) -> StatusCode {
    match err {
        ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        ApiError::SetupIncomplete => StatusCode::BAD_REQUEST,
        ApiError::Rejected { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        ApiError::Network(_) | ApiError::Decode(_) | ApiError::InvalidUrl(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl AppError {
    fn api(&self) -> Option<&ApiError> {
        match self {
            AppError::Api(e)
            | AppError::Wizard(WizardError::Api(e))
            | AppError::Manage(ManageError::Api(e)) => Some(e),
            _ => None,
        }
    }

    fn status(&self) -> StatusCode {
        if let Some(err) = self.api() {
            return api_status(err);
        }
        match self {
            AppError::Wizard(WizardError::DemoAccount) => StatusCode::FORBIDDEN,
            AppError::Wizard(WizardError::InvalidStep(_)) => StatusCode::CONFLICT,
            AppError::Wizard(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Manage(ManageError::Closed(_)) => StatusCode::CONFLICT,
            AppError::Manage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Api(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn field_errors(&self) -> &[FieldError] {
        match (self, self.api()) {
            (AppError::Wizard(WizardError::InvalidContact(errors)), _) => errors.as_slice(),
            (_, Some(ApiError::Rejected { errors, .. })) => errors.as_slice(),
            _ => &[],
        }
    }
}

impl AppError {
    fn body(&self) -> (StatusCode, serde_json::Value) {
        let status = self.status();
        let message = match self.api() {
            Some(err) => err.first_message(),
            None => self.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let mut body = serde_json::json!({ "error": message });
        let errors = self.field_errors();
        if !errors.is_empty() {
            body["errors"] = serde_json::json!(errors);
        }
        if let Some(path) = self.api().and_then(|e| e.redirect()) {
            body["redirect"] = serde_json::json!(path);
        }
        (status, body)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.body();
        (status, axum::Json(body)).into_response()
    }
}

/// An error answered together with the toasts raised before it happened.
#[derive(Debug)]
pub struct ToastedError {
    pub error: AppError,
    pub toasts: Vec<Toast>,
}

impl ToastedError {
    pub fn new(error: impl Into<AppError>, toasts: Vec<Toast>) -> Self {
        Self {
            error: error.into(),
            toasts,
        }
    }
}

impl IntoResponse for ToastedError {
    fn into_response(self) -> Response {
        let (status, mut body) = self.error.body();
        if !self.toasts.is_empty() {
            body["toasts"] = serde_json::json!(self.toasts);
        }
        (status, axum::Json(body)).into_response()
    }
}
