use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use pelfish_core::serde::document_to_json;
use pelfish_core::store::DocumentStore;
use pelfish_domain::id::RecordId;
use pelfish_records_schema::records::{Marker, RecordFields};

use crate::error::RecordsServiceError;
use crate::handlers::session::AuthenticatedUser;
use crate::state::AppState;
use crate::usecase::lifecycle::{
    CreateRecordsInput, CreateRecordsUseCase, SetActiveInput, SetActiveUseCase,
};
use crate::usecase::record::{
    DeleteRecordUseCase, GetMarkersUseCase, GetRecordUseCase, ListRecordsUseCase,
    UpdateMarkersInput, UpdateMarkersUseCase, UpdateRecordInput, UpdateRecordUseCase,
};

const SUCCESS: &str = "Success";

#[derive(Serialize)]
pub struct RecordResponse<T> {
    pub status: &'static str,
    pub response: T,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: String,
}

fn message(message: impl Into<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        status: SUCCESS,
        message: message.into(),
    })
}

// ── GET /api/admin/record ────────────────────────────────────────────────────

pub async fn list_records<S: DocumentStore + Clone + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<RecordResponse<Vec<Value>>>, RecordsServiceError> {
    let usecase = ListRecordsUseCase {
        repo: state.record_repo(),
    };
    let records = usecase.execute().await?;
    Ok(Json(RecordResponse {
        status: SUCCESS,
        response: records.into_iter().map(document_to_json).collect(),
    }))
}

// ── GET /api/admin/record/{record_id} ────────────────────────────────────────

pub async fn get_record<S: DocumentStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(record_id): Path<String>,
) -> Result<Json<RecordResponse<Value>>, RecordsServiceError> {
    let usecase = GetRecordUseCase {
        repo: state.record_repo(),
    };
    let record = usecase.execute(&RecordId::new(record_id)).await?;
    Ok(Json(RecordResponse {
        status: SUCCESS,
        response: document_to_json(record),
    }))
}

// ── GET /api/admin/record/{record_id}/markers ────────────────────────────────

pub async fn get_markers<S: DocumentStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(record_id): Path<String>,
) -> Result<Json<RecordResponse<Value>>, RecordsServiceError> {
    let usecase = GetMarkersUseCase {
        repo: state.record_repo(),
    };
    let markers = usecase.execute(&RecordId::new(record_id)).await?;
    Ok(Json(RecordResponse {
        status: SUCCESS,
        response: document_to_json(markers),
    }))
}

// ── POST /api/admin/record/upload ────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub status: &'static str,
    pub message: String,
    pub inserted_ids: Vec<RecordId>,
}

pub async fn upload_records<S: DocumentStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(records): Json<Vec<RecordFields>>,
) -> Result<Json<UploadResponse>, RecordsServiceError> {
    let usecase = CreateRecordsUseCase {
        repo: state.record_repo(),
    };
    let inserted_ids = usecase
        .execute(CreateRecordsInput {
            records,
            created_by: user.id,
            now: Utc::now(),
        })
        .await?;
    Ok(Json(UploadResponse {
        status: SUCCESS,
        message: format!("{} records successfully added", inserted_ids.len()),
        inserted_ids,
    }))
}

// ── POST /api/admin/record/update ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateRecordRequest {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

pub async fn update_record<S: DocumentStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<UpdateRecordRequest>,
) -> Result<Json<MessageResponse>, RecordsServiceError> {
    let usecase = UpdateRecordUseCase {
        repo: state.record_repo(),
    };
    usecase
        .execute(UpdateRecordInput {
            id: body.id,
            name: body.name,
            description: body.description,
            image: body.image,
            updated_by: user.id,
            now: Utc::now(),
        })
        .await?;
    Ok(message("Record successfully updated"))
}

// ── POST /api/admin/record/update-marker ─────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMarkersRequest {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub markers: Option<Vec<Marker>>,
}

pub async fn update_markers<S: DocumentStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<UpdateMarkersRequest>,
) -> Result<Json<MessageResponse>, RecordsServiceError> {
    let usecase = UpdateMarkersUseCase {
        repo: state.record_repo(),
    };
    usecase
        .execute(UpdateMarkersInput {
            id: body.id,
            markers: body.markers,
            updated_by: user.id,
            now: Utc::now(),
        })
        .await?;
    Ok(message("Markers successfully updated"))
}

// ── PATCH /api/admin/record/{record_id}/active ───────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    pub is_active: Option<bool>,
}

pub async fn set_record_active<S: DocumentStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(record_id): Path<String>,
    Json(body): Json<SetActiveRequest>,
) -> Result<Json<MessageResponse>, RecordsServiceError> {
    let is_active = body
        .is_active
        .ok_or(RecordsServiceError::MissingField("isActive"))?;
    let usecase = SetActiveUseCase {
        repo: state.record_repo(),
    };
    usecase
        .execute(SetActiveInput {
            id: RecordId::new(record_id),
            is_active,
            updated_by: user.id,
            now: Utc::now(),
        })
        .await?;
    Ok(message(if is_active {
        "Record restored"
    } else {
        "Record deactivated"
    }))
}

// ── POST /api/admin/record/delete ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DeleteRecordRequest {
    #[serde(rename = "_id")]
    pub id: Option<String>,
}

pub async fn delete_record<S: DocumentStore + Clone + 'static>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Json(body): Json<DeleteRecordRequest>,
) -> Result<Json<MessageResponse>, RecordsServiceError> {
    let usecase = DeleteRecordUseCase {
        repo: state.record_repo(),
    };
    usecase.execute(body.id).await?;
    Ok(message("Record successfully deleted"))
}
