use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use entity::review;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::middleware::{AuthenticatedUser, OptionalSession};
use crate::db::queries::{self, reviews::ReviewFilter};
use crate::error::AppError;
use crate::handlers::{MessageResponse, ReviewResponse};
use crate::pagination::{Page, Pagination};
use crate::AppState;

// --- Request / Response types ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReviewsQuery {
    pub permit_office_id: Option<String>,
    pub user_id: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub permit_office_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

fn check_rating(rating: i32) -> Result<i32, AppError> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest("Rating must be between 1 and 5".into()));
    }
    Ok(rating)
}

/// Empty comments are stored as null.
fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment.filter(|c| !c.trim().is_empty())
}

/// Loads authors and offices for a batch of reviews.
pub(crate) async fn with_relations(
    state: &AppState,
    reviews: Vec<review::Model>,
) -> Result<Vec<ReviewResponse>, AppError> {
    let user_ids = reviews.iter().map(|r| r.user_id.clone()).collect();
    let office_ids = reviews.iter().map(|r| r.permit_office_id.clone()).collect();
    let users = queries::users::find_many_by_id(&state.db, user_ids).await?;
    let offices = queries::permit_offices::find_many_by_id(&state.db, office_ids).await?;

    Ok(reviews
        .into_iter()
        .map(|r| {
            let author = users.get(&r.user_id);
            let office = offices.get(&r.permit_office_id);
            ReviewResponse::new(r, author, office)
        })
        .collect())
}

// --- Handlers ---

pub async fn list(
    OptionalSession(session): OptionalSession,
    State(state): State<AppState>,
    Query(query): Query<ListReviewsQuery>,
) -> Result<Json<ReviewListResponse>, AppError> {
    tracing::debug!(authenticated = session.is_some(), "Listing reviews");

    let page = Page::new(query.limit, query.offset);
    let filter = ReviewFilter {
        permit_office_id: query.permit_office_id,
        user_id: query.user_id,
    };
    let (reviews, total) = queries::reviews::find_page(&state.db, &filter, page).await?;

    Ok(Json(ReviewListResponse {
        reviews: with_relations(&state, reviews).await?,
        pagination: page.envelope(total),
    }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewResponse>, AppError> {
    let review = queries::reviews::find_by_id(&state.db, &id).await?;
    let mut loaded = with_relations(&state, vec![review]).await?;
    loaded.pop().map(Json).ok_or(AppError::ReviewNotFound)
}

pub async fn create(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    let (Some(rating), Some(office_id)) = (req.rating, req.permit_office_id) else {
        return Err(AppError::BadRequest(
            "Rating and permit office ID are required".into(),
        ));
    };
    let rating = check_rating(rating)?;

    let office = queries::permit_offices::find_by_id(&state.db, &office_id).await?;
    if queries::reviews::find_by_user_and_office(&state.db, user.id(), &office.id)
        .await?
        .is_some()
    {
        return Err(AppError::ReviewAlreadyExists);
    }

    let now = chrono::Utc::now().naive_utc();
    let created = review::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        rating: Set(rating),
        comment: Set(normalize_comment(req.comment)),
        user_id: Set(user.id().to_string()),
        permit_office_id: Set(office.id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await
    // The unique index still catches a concurrent duplicate.
    .map_err(AppError::from_review_insert)?;

    tracing::info!(review_id = %created.id, office_id = %office.id, "Created review");
    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse::new(created, Some(&user.0), Some(&office))),
    ))
}

pub async fn update(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let existing = queries::reviews::find_owned(&state.db, &id, user.id()).await?;

    let mut active: review::ActiveModel = existing.into();
    if let Some(rating) = req.rating {
        active.rating = Set(check_rating(rating)?);
    }
    if req.comment.is_some() {
        active.comment = Set(normalize_comment(req.comment));
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let updated = active.update(&state.db).await?;

    let mut loaded = with_relations(&state, vec![updated]).await?;
    loaded.pop().map(Json).ok_or(AppError::ReviewNotFound)
}

pub async fn delete(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let existing = queries::reviews::find_owned(&state.db, &id, user.id()).await?;
    review::Entity::delete_by_id(existing.id).exec(&state.db).await?;
    Ok(Json(MessageResponse::new("Review deleted successfully")))
}
