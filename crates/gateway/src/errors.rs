use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use storefront_core::errors::InterfaceError;

use crate::client::GatewayError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    code: String,
}

impl GatewayError {
    fn into_interface(self, correlation_id: String) -> InterfaceError {
        let message = self.to_string();
        match self {
            GatewayError::Timeout(_) => InterfaceError::GatewayTimeout { message, correlation_id },
            GatewayError::Unavailable(_) | GatewayError::Decode(_) => {
                InterfaceError::ServiceUnavailable { message, correlation_id }
            }
            GatewayError::Backend { .. }
            | GatewayError::InvalidUrl(_)
            | GatewayError::Client(_) => InterfaceError::Internal { message, correlation_id },
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if let GatewayError::Backend { status, body } = self {
            // JSON bodies pass through untouched; anything else gets a generic message.
            if serde_json::from_slice::<serde_json::Value>(&body).is_ok() {
                return (status, [(CONTENT_TYPE, "application/json")], body).into_response();
            }
            let fallback = ErrorBody {
                message: "Backend service error".to_string(),
                code: "backend_error".to_string(),
            };
            return (status, Json(fallback)).into_response();
        }

        let interface = self.into_interface(uuid::Uuid::new_v4().to_string());
        let status = StatusCode::from_u16(interface.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(
                event_name = "gateway.request.failed",
                correlation_id = %interface.correlation_id(),
                code = interface.code(),
                error = %interface,
                "gateway request failed"
            );
        }

        let body =
            ErrorBody { message: interface.user_message(), code: interface.code().to_string() };
        (status, Json(body)).into_response()
    }
}
