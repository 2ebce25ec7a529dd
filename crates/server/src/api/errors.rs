use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use storefront_core::errors::{ApplicationError, DomainError, InterfaceError};
use storefront_db::repositories::RepositoryError;

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: String,
}

/// Handler error: an `InterfaceError` that knows how to render itself.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn malformed_filter(detail: impl Into<String>) -> Self {
        DomainError::MalformedFilter(detail.into()).into()
    }
}

fn correlation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        Self(error.into_interface(correlation_id()))
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        ApplicationError::from(error).into()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        ApplicationError::from(error).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let interface = &self.0;

        if status.is_server_error() {
            error!(
                event_name = "api.request.failed",
                correlation_id = interface.correlation_id(),
                status = status.as_u16(),
                code = interface.code(),
                error = %interface,
                "request failed"
            );
        } else {
            warn!(
                event_name = "api.request.rejected",
                correlation_id = interface.correlation_id(),
                status = status.as_u16(),
                code = interface.code(),
                error = %interface,
                "request rejected"
            );
        }

        let body =
            ErrorBody { message: interface.user_message(), code: interface.code().to_string() };
        (status, Json(body)).into_response()
    }
}
