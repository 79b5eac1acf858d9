use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDateTime;
use entity::application::ApplicationStatus;
use entity::user;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthenticatedUser;
use crate::db::queries::{self, applications::ApplicationFilter, reviews::ReviewFilter};
use crate::error::AppError;
use crate::handlers::{
    applications::{self, ApplicationListResponse},
    reviews::{self, ReviewListResponse},
    ApplicationResponse, MessageResponse, ReviewResponse,
};
use crate::pagination::Page;
use crate::AppState;

const RECENT_ACTIVITY: u64 = 5;

// --- Request / Response types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            phone: u.phone,
            image_url: u.image_url,
            role: u.role,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileStats {
    pub applications: u64,
    pub reviews: u64,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub stats: ProfileStats,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MyApplicationsQuery {
    pub status: Option<ApplicationStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MyReviewsQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStats {
    pub total: u64,
    pub by_status: BTreeMap<&'static str, u64>,
}

#[derive(Debug, Serialize)]
pub struct ReviewStats {
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub applications: ApplicationStats,
    pub reviews: ReviewStats,
}

#[derive(Debug, Serialize)]
pub struct RecentActivity {
    pub applications: Vec<ApplicationResponse>,
    pub reviews: Vec<ReviewResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub recent_activity: RecentActivity,
}

/// Optional profile text; blank clears the field.
fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn count_by_status(statuses: &[ApplicationStatus]) -> BTreeMap<&'static str, u64> {
    let mut counts = BTreeMap::new();
    for status in statuses {
        *counts.entry(status.as_str()).or_insert(0) += 1;
    }
    counts
}

// --- Handlers ---

pub async fn me(
    AuthenticatedUser(user): AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AppError> {
    let applications = queries::applications::count_by_user(&state.db, &user.id).await?;
    let reviews = queries::reviews::count_by_user(&state.db, &user.id).await?;

    Ok(Json(ProfileResponse {
        user: user.into(),
        stats: ProfileStats {
            applications,
            reviews,
        },
    }))
}

pub async fn update_me(
    AuthenticatedUser(user): AuthenticatedUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let mut active: user::ActiveModel = user.into();
    if let Some(name) = req.name {
        active.name = Set(optional_text(name));
    }
    if let Some(phone) = req.phone {
        active.phone = Set(optional_text(phone));
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_me(
    AuthenticatedUser(user): AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    queries::users::delete_with_data(&state.db, &user.id).await?;
    tracing::info!(user_id = %user.id, "Deleted account");
    Ok(Json(MessageResponse::new("Account deleted successfully")))
}

pub async fn my_applications(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Query(query): Query<MyApplicationsQuery>,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let page = Page::new(query.limit, query.offset);
    let filter = ApplicationFilter {
        status: query.status,
        ..ApplicationFilter::for_user(user.id())
    };
    let (items, total) = queries::applications::find_page(&state.db, &filter, page).await?;

    Ok(Json(ApplicationListResponse {
        applications: applications::with_relations(&state, items).await?,
        pagination: page.envelope(total),
    }))
}

pub async fn my_reviews(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Query(query): Query<MyReviewsQuery>,
) -> Result<Json<ReviewListResponse>, AppError> {
    let page = Page::new(query.limit, query.offset);
    let filter = ReviewFilter {
        user_id: Some(user.id().to_string()),
        permit_office_id: None,
    };
    let (items, total) = queries::reviews::find_page(&state.db, &filter, page).await?;

    Ok(Json(ReviewListResponse {
        reviews: reviews::with_relations(&state, items).await?,
        pagination: page.envelope(total),
    }))
}

pub async fn dashboard(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let statuses = queries::applications::statuses_by_user(&state.db, user.id()).await?;
    let review_total = queries::reviews::count_by_user(&state.db, user.id()).await?;

    let recent = Page::new(Some(RECENT_ACTIVITY), None);
    let (recent_applications, _) = queries::applications::find_page(
        &state.db,
        &ApplicationFilter::for_user(user.id()),
        recent,
    )
    .await?;
    let (recent_reviews, _) = queries::reviews::find_page(
        &state.db,
        &ReviewFilter {
            user_id: Some(user.id().to_string()),
            permit_office_id: None,
        },
        recent,
    )
    .await?;

    Ok(Json(DashboardResponse {
        stats: DashboardStats {
            applications: ApplicationStats {
                total: statuses.len() as u64,
                by_status: count_by_status(&statuses),
            },
            reviews: ReviewStats {
                total: review_total,
            },
        },
        recent_activity: RecentActivity {
            applications: applications::with_relations(&state, recent_applications).await?,
            reviews: reviews::with_relations(&state, recent_reviews).await?,
        },
    }))
}
