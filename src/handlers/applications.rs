use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use entity::application::{self, ApplicationStatus};
use entity::document;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::queries::{self, applications::ApplicationFilter};
use crate::error::AppError;
use crate::handlers::{
    ApplicationResponse, ApplicationView, DocumentResponse, MessageResponse, PermitOfficeResponse,
};
use crate::pagination::{Page, Pagination};
use crate::status;
use crate::AppState;

// --- Request / Response types ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApplicationsQuery {
    pub status: Option<ApplicationStatus>,
    pub permit_office_id: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct ApplicantResponse {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetailResponse {
    #[serde(flatten)]
    pub application: ApplicationView,
    pub permit_office: PermitOfficeResponse,
    pub documents: Vec<DocumentResponse>,
    pub user: ApplicantResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    #[serde(rename = "type")]
    pub permit_type: Option<String>,
    pub permit_office_id: Option<String>,
    pub application_data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicationRequest {
    #[serde(rename = "type")]
    pub permit_type: Option<String>,
    pub application_data: Option<serde_json::Value>,
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDocumentRequest {
    pub filename: Option<String>,
    pub original_name: Option<String>,
    pub mimetype: Option<String>,
    pub size: Option<i64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn to_json_text(value: &serde_json::Value) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|e| AppError::Internal(e.to_string()))
}

fn ensure_draft(app: &application::Model) -> Result<(), AppError> {
    if app.status != ApplicationStatus::Draft {
        return Err(AppError::ApplicationNotDraft);
    }
    Ok(())
}

/// Attaches office summaries and documents to a batch of applications.
pub(crate) async fn with_relations(
    state: &AppState,
    applications: Vec<application::Model>,
) -> Result<Vec<ApplicationResponse>, AppError> {
    let office_ids = applications.iter().map(|a| a.permit_office_id.clone()).collect();
    let application_ids = applications.iter().map(|a| a.id.clone()).collect();
    let offices = queries::permit_offices::find_many_by_id(&state.db, office_ids).await?;
    let mut documents = queries::applications::documents_for(&state.db, application_ids).await?;

    Ok(applications
        .into_iter()
        .map(|a| {
            let docs = documents.remove(&a.id).unwrap_or_default();
            let office = offices.get(&a.permit_office_id);
            ApplicationResponse::new(a, office, docs)
        })
        .collect())
}

// --- Handlers ---

pub async fn list(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let page = Page::new(query.limit, query.offset);
    let filter = ApplicationFilter {
        status: query.status,
        permit_office_id: query.permit_office_id,
        ..ApplicationFilter::for_user(user.id())
    };
    let (applications, total) =
        queries::applications::find_page(&state.db, &filter, page).await?;

    Ok(Json(ApplicationListResponse {
        applications: with_relations(&state, applications).await?,
        pagination: page.envelope(total),
    }))
}

pub async fn get(
    AuthenticatedUser(user): AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApplicationDetailResponse>, AppError> {
    let app = queries::applications::find_owned(&state.db, &id, &user.id).await?;
    let office = queries::permit_offices::find_by_id(&state.db, &app.permit_office_id).await?;
    let documents = queries::applications::documents_for(&state.db, vec![app.id.clone()])
        .await?
        .remove(&app.id)
        .unwrap_or_default();

    Ok(Json(ApplicationDetailResponse {
        application: app.into(),
        permit_office: office.into(),
        documents: documents.into_iter().map(DocumentResponse::from).collect(),
        user: ApplicantResponse {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}

pub async fn create(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    let (Some(permit_type), Some(office_id)) =
        (non_blank(req.permit_type), non_blank(req.permit_office_id))
    else {
        return Err(AppError::BadRequest(
            "Type and permit office ID are required".into(),
        ));
    };

    let office = queries::permit_offices::find_by_id(&state.db, &office_id).await?;
    let data = req.application_data.unwrap_or_else(|| serde_json::json!({}));
    let now = chrono::Utc::now().naive_utc();

    let created = application::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        permit_type: Set(permit_type),
        status: Set(ApplicationStatus::Draft),
        application_data: Set(to_json_text(&data)?),
        user_id: Set(user.id().to_string()),
        permit_office_id: Set(office.id.clone()),
        submitted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(application_id = %created.id, office_id = %office.id, "Created application");
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::new(created, Some(&office), Vec::new())),
    ))
}

pub async fn update(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateApplicationRequest>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let existing = queries::applications::find_owned(&state.db, &id, user.id()).await?;
    let current = existing.status;

    // Reject before any column is touched.
    if let Some(next) = req.status {
        status::check_transition(current, next)?;
    }

    let now = chrono::Utc::now().naive_utc();
    let mut active: application::ActiveModel = existing.into();
    if let Some(permit_type) = req.permit_type {
        let permit_type = non_blank(Some(permit_type))
            .ok_or_else(|| AppError::BadRequest("Type cannot be empty".into()))?;
        active.permit_type = Set(permit_type);
    }
    if let Some(ref data) = req.application_data {
        active.application_data = Set(to_json_text(data)?);
    }
    if let Some(next) = req.status {
        active.status = Set(next);
        if next == ApplicationStatus::Submitted {
            active.submitted_at = Set(Some(now));
        }
        tracing::info!(application_id = %id, from = %current, to = %next, "Application status changed");
    }
    active.updated_at = Set(now);
    let updated = active.update(&state.db).await?;

    let mut loaded = with_relations(&state, vec![updated]).await?;
    loaded.pop().map(Json).ok_or(AppError::ApplicationNotFound)
}

pub async fn delete(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let existing = queries::applications::find_owned(&state.db, &id, user.id()).await?;
    ensure_draft(&existing)?;
    queries::applications::delete_with_documents(&state.db, &existing.id).await?;
    Ok(Json(MessageResponse::new("Application deleted successfully")))
}

pub async fn add_document(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), AppError> {
    let app = queries::applications::find_owned(&state.db, &id, user.id()).await?;
    ensure_draft(&app)?;

    let (Some(filename), Some(original_name), Some(mimetype), Some(size)) = (
        non_blank(req.filename),
        non_blank(req.original_name),
        non_blank(req.mimetype),
        req.size,
    ) else {
        return Err(AppError::BadRequest(
            "filename, originalName, mimetype and size are required".into(),
        ));
    };
    if size < 0 {
        return Err(AppError::BadRequest("size must not be negative".into()));
    }

    let created = document::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        application_id: Set(app.id.clone()),
        filename: Set(filename),
        original_name: Set(original_name),
        mimetype: Set(mimetype),
        size: Set(size),
        uploaded_at: Set(chrono::Utc::now().naive_utc()),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(application_id = %app.id, document_id = %created.id, "Attached document");
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn delete_document(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path((id, document_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let app = queries::applications::find_owned(&state.db, &id, user.id()).await?;
    ensure_draft(&app)?;
    let doc = queries::applications::find_document(&state.db, &app.id, &document_id).await?;
    queries::applications::delete_draft_document(&state.db, &app.id, &doc.id).await?;
    Ok(Json(MessageResponse::new("Document deleted successfully")))
}
