use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;

use pelfish_core::store::DocumentStore;

use crate::domain::types::{
    BiodiversityReport, GeographicReport, Report, ThreatShare, UserActivityReport,
};
use crate::error::RecordsServiceError;
use crate::handlers::session::AuthenticatedUser;
use crate::state::AppState;
use crate::usecase::reports::biodiversity::BiodiversityUseCase;
use crate::usecase::reports::geographic::GeographicUseCase;
use crate::usecase::reports::threat::ThreatDistributionUseCase;
use crate::usecase::reports::user_activity::UserActivityUseCase;

// Reports require a session. The extractor rejects before any store access.

#[derive(Serialize)]
pub struct ReportResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ReportResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Serialize)]
pub struct ThreatDistributionResponse {
    pub success: bool,
    pub data: Vec<ThreatShare>,
    pub total: u64,
}

// ── GET /api/admin/reports/biodiversity ──────────────────────────────────────

pub async fn biodiversity<S: DocumentStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Result<Json<ReportResponse<BiodiversityReport>>, RecordsServiceError> {
    let usecase = BiodiversityUseCase { store: state.store };
    let report = usecase
        .execute()
        .await
        .map_err(RecordsServiceError::report_failed(Report::Biodiversity))?;
    Ok(ReportResponse::ok(report))
}

// ── GET /api/admin/reports/geographic-stats ──────────────────────────────────

pub async fn geographic_stats<S: DocumentStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Result<Json<ReportResponse<GeographicReport>>, RecordsServiceError> {
    let usecase = GeographicUseCase { store: state.store };
    let report = usecase
        .execute()
        .await
        .map_err(RecordsServiceError::report_failed(Report::Geographic))?;
    Ok(ReportResponse::ok(report))
}

// ── GET /api/admin/reports/threat-distribution ───────────────────────────────

pub async fn threat_distribution<S: DocumentStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Result<Json<ThreatDistributionResponse>, RecordsServiceError> {
    let usecase = ThreatDistributionUseCase { store: state.store };
    let report = usecase
        .execute()
        .await
        .map_err(RecordsServiceError::report_failed(Report::ThreatDistribution))?;
    Ok(Json(ThreatDistributionResponse {
        success: true,
        data: report.data,
        total: report.total,
    }))
}

// ── GET /api/admin/reports/user-activity ─────────────────────────────────────

pub async fn user_activity<S: DocumentStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Result<Json<ReportResponse<UserActivityReport>>, RecordsServiceError> {
    let usecase = UserActivityUseCase { store: state.store };
    let report = usecase
        .execute(Utc::now())
        .await
        .map_err(RecordsServiceError::report_failed(Report::UserActivity))?;
    Ok(ReportResponse::ok(report))
}
