use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use employee_facade_core::GatewayError;
use tracing::error;

/// Renders a classified failure as `{ status, message }`.
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let report = self.0.report();
        let status =
            StatusCode::from_u16(report.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let causes: Vec<&str> = self.0.chain().map(|link| link.message()).collect();
        error!(
            stage = "api",
            status = report.status,
            kind = %self.0.kind(),
            message = %report.message,
            causes = ?causes,
            "request failed"
        );

        (status, Json(report)).into_response()
    }
}
