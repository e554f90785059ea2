use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use pelfish_core::store::StoreError;

use crate::domain::types::Report;

/// Records service error variants.
///
/// Every variant renders as `{"error": "<message>"}`; server-side detail only
/// reaches the logs.
#[derive(Debug, thiserror::Error)]
pub enum RecordsServiceError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Record not found")]
    RecordNotFound,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Failed to fetch {report}")]
    ReportFailed {
        report: Report,
        #[source]
        source: StoreError,
    },
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl RecordsServiceError {
    pub fn report_failed(report: Report) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::ReportFailed { report, source }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::RecordNotFound => "RECORD_NOT_FOUND",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::ReportFailed { .. } => "REPORT_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RecordNotFound => StatusCode::NOT_FOUND,
            Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::ReportFailed { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RecordsServiceError {
    fn into_response(self) -> Response {
        match &self {
            Self::ReportFailed { report, source } => {
                tracing::error!(error = ?source, kind = self.kind(), %report, "report failed");
            }
            Self::Internal(e) => {
                tracing::error!(error = ?e, kind = self.kind(), "internal error");
            }
            _ => {}
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), axum::Json(body)).into_response()
    }
}
