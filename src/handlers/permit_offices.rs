use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use entity::application::ApplicationStatus;
use entity::permit_office;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::middleware::AdminUser;
use crate::db::queries::{self, permit_offices::OfficeFilter, permit_offices::RatingSummary};
use crate::error::AppError;
use crate::geo::{self, Coordinate, Ranked};
use crate::handlers::{MessageResponse, PermitOfficeResponse};
use crate::office_type::OfficeType;
use crate::pagination::{Page, Pagination};
use crate::AppState;

// --- Request / Response types ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOfficesQuery {
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub search: Option<String>,
    pub permit_type: Option<String>,
    pub office_type: Option<String>,
    pub user_lat: Option<f64>,
    pub user_lng: Option<f64>,
    pub radius: Option<f64>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ListOfficesQuery {
    fn filter(&self) -> OfficeFilter {
        OfficeFilter {
            city: self.city.clone(),
            state: self.state.clone(),
            zip_code: self.zip_code.clone(),
            search: self.search.clone(),
            permit_type: self.permit_type.clone(),
            office_type: self.office_type.as_deref().and_then(OfficeType::parse_filter),
        }
    }

    fn origin(&self) -> Result<Option<Coordinate>, AppError> {
        match Coordinate::from_parts(self.user_lat, self.user_lng) {
            Some(c) if !c.is_valid() => Err(AppError::BadRequest(
                "userLat must be within [-90, 90] and userLng within [-180, 180]".into(),
            )),
            origin => Ok(origin),
        }
    }

    fn radius(&self) -> Result<Option<f64>, AppError> {
        match self.radius {
            Some(r) if !r.is_finite() || r < 0.0 => Err(AppError::BadRequest(
                "radius must be a non-negative number of miles".into(),
            )),
            radius => Ok(radius),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeListItem {
    #[serde(flatten)]
    pub office: PermitOfficeResponse,
    pub average_rating: Option<f64>,
    pub review_count: u64,
    pub office_type: Option<OfficeType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl OfficeListItem {
    fn new(office: permit_office::Model, rating: RatingSummary, distance: Option<f64>) -> Self {
        Self {
            office_type: OfficeType::classify(&office.name),
            office: office.into(),
            average_rating: rating.average,
            review_count: rating.count,
            distance,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OfficeListResponse {
    pub offices: Vec<OfficeListItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct ReviewerName {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeReview {
    pub id: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub user_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub user: ReviewerName,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeApplication {
    pub id: String,
    #[serde(rename = "type")]
    pub permit_type: String,
    pub status: ApplicationStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeDetailResponse {
    #[serde(flatten)]
    pub office: PermitOfficeResponse,
    pub average_rating: Option<f64>,
    pub review_count: u64,
    pub office_type: Option<OfficeType>,
    pub reviews: Vec<OfficeReview>,
    pub applications: Vec<OfficeApplication>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfficeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub hours: Option<serde_json::Value>,
    pub services_offered: Option<Vec<String>>,
    pub permit_types: Option<Vec<String>>,
}

/// Same fields as create; absent fields are left unchanged.
pub type UpdateOfficeRequest = CreateOfficeRequest;

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{field} is required")))
}

fn check_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), AppError> {
    if latitude.is_some_and(|lat| !(-90.0..=90.0).contains(&lat))
        || longitude.is_some_and(|lng| !(-180.0..=180.0).contains(&lng))
    {
        return Err(AppError::BadRequest(
            "latitude must be within [-90, 90] and longitude within [-180, 180]".into(),
        ));
    }
    Ok(())
}

fn to_json_text<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|e| AppError::Internal(e.to_string()))
}

// --- Handlers ---

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListOfficesQuery>,
) -> Result<Json<OfficeListResponse>, AppError> {
    let origin = query.origin()?;
    let radius = query.radius()?;
    let page = Page::new(query.limit, query.offset);
    let filter = query.filter();

    let (ranked, total) = match origin {
        Some(origin) => {
            let offices = queries::permit_offices::find_all(&state.db, &filter).await?;
            let ranked = geo::rank_by_distance(offices, Some(origin), radius);
            let total = ranked.len() as u64;
            (page.slice(ranked), total)
        }
        None => {
            let (offices, total) =
                queries::permit_offices::find_page(&state.db, &filter, page).await?;
            let ranked: Vec<Ranked<permit_office::Model>> = offices
                .into_iter()
                .map(|item| Ranked { item, distance: None })
                .collect();
            (ranked, total)
        }
    };

    let ids: Vec<String> = ranked.iter().map(|r| r.item.id.clone()).collect();
    let ratings = queries::permit_offices::rating_summaries(&state.db, &ids).await?;

    let offices = ranked
        .into_iter()
        .map(|r| {
            let rating = ratings.get(&r.item.id).copied().unwrap_or_default();
            OfficeListItem::new(r.item, rating, r.distance)
        })
        .collect();

    Ok(Json(OfficeListResponse {
        offices,
        pagination: page.envelope(total),
    }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OfficeDetailResponse>, AppError> {
    let office = queries::permit_offices::find_by_id(&state.db, &id).await?;
    let reviews = queries::reviews::find_by_office(&state.db, &id).await?;
    let applications = queries::applications::find_by_office(&state.db, &id).await?;

    let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();
    let rating = RatingSummary::from_ratings(&ratings);

    let author_ids = reviews.iter().map(|r| r.user_id.clone()).collect();
    let authors = queries::users::find_many_by_id(&state.db, author_ids).await?;

    let reviews = reviews
        .into_iter()
        .map(|r| OfficeReview {
            user: ReviewerName {
                name: authors.get(&r.user_id).and_then(|u| u.name.clone()),
            },
            id: r.id,
            rating: r.rating,
            comment: r.comment,
            user_id: r.user_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
        .collect();

    let applications = applications
        .into_iter()
        .map(|a| OfficeApplication {
            id: a.id,
            permit_type: a.permit_type,
            status: a.status,
            created_at: a.created_at,
        })
        .collect();

    Ok(Json(OfficeDetailResponse {
        office_type: OfficeType::classify(&office.name),
        office: office.into(),
        average_rating: rating.average,
        review_count: rating.count,
        reviews,
        applications,
    }))
}

pub async fn create(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateOfficeRequest>,
) -> Result<(StatusCode, Json<PermitOfficeResponse>), AppError> {
    check_coordinates(req.latitude, req.longitude)?;
    let now = chrono::Utc::now().naive_utc();

    let office = permit_office::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(required(req.name, "name")?),
        description: Set(req.description),
        address: Set(required(req.address, "address")?),
        city: Set(required(req.city, "city")?),
        state: Set(required(req.state, "state")?),
        zip_code: Set(required(req.zip_code, "zipCode")?),
        phone: Set(req.phone),
        email: Set(req.email),
        website: Set(req.website),
        latitude: Set(req.latitude),
        longitude: Set(req.longitude),
        hours: Set(to_json_text(&req.hours.unwrap_or_else(|| serde_json::json!({})))?),
        services_offered: Set(to_json_text(&req.services_offered.unwrap_or_default())?),
        permit_types: Set(to_json_text(&req.permit_types.unwrap_or_default())?),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(office_id = %office.id, admin = %admin.id, "Created permit office");
    Ok((StatusCode::CREATED, Json(office.into())))
}

pub async fn update(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOfficeRequest>,
) -> Result<Json<PermitOfficeResponse>, AppError> {
    let office = queries::permit_offices::find_by_id(&state.db, &id).await?;
    check_coordinates(req.latitude, req.longitude)?;

    let mut active: permit_office::ActiveModel = office.into();
    if req.name.is_some() {
        active.name = Set(required(req.name, "name")?);
    }
    if req.address.is_some() {
        active.address = Set(required(req.address, "address")?);
    }
    if req.city.is_some() {
        active.city = Set(required(req.city, "city")?);
    }
    if req.state.is_some() {
        active.state = Set(required(req.state, "state")?);
    }
    if req.zip_code.is_some() {
        active.zip_code = Set(required(req.zip_code, "zipCode")?);
    }
    if let Some(description) = req.description {
        active.description = Set(Some(description));
    }
    if let Some(phone) = req.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(email) = req.email {
        active.email = Set(Some(email));
    }
    if let Some(website) = req.website {
        active.website = Set(Some(website));
    }
    if let Some(latitude) = req.latitude {
        active.latitude = Set(Some(latitude));
    }
    if let Some(longitude) = req.longitude {
        active.longitude = Set(Some(longitude));
    }
    if let Some(ref hours) = req.hours {
        active.hours = Set(to_json_text(hours)?);
    }
    if let Some(ref services) = req.services_offered {
        active.services_offered = Set(to_json_text(services)?);
    }
    if let Some(ref permit_types) = req.permit_types {
        active.permit_types = Set(to_json_text(permit_types)?);
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let office = active.update(&state.db).await?;
    tracing::info!(office_id = %office.id, admin = %admin.id, "Updated permit office");
    Ok(Json(office.into()))
}

pub async fn delete(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    queries::permit_offices::find_by_id(&state.db, &id).await?;
    queries::permit_offices::delete_with_data(&state.db, &id).await?;

    tracing::info!(office_id = %id, admin = %admin.id, "Deleted permit office");
    Ok(Json(MessageResponse::new("Permit office deleted successfully")))
}
