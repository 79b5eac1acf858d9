pub mod applications;
pub mod auth;
pub mod permit_offices;
pub mod reviews;
pub mod users;
pub mod webhooks;

use chrono::NaiveDateTime;
use entity::application::ApplicationStatus;
use entity::{application, document, permit_office, review, user};
use serde::Serialize;

// --- Shared response views ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitOfficeResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub hours: serde_json::Value,
    pub services_offered: Vec<String>,
    pub permit_types: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<permit_office::Model> for PermitOfficeResponse {
    fn from(o: permit_office::Model) -> Self {
        Self {
            hours: serde_json::from_str(&o.hours).unwrap_or_else(|_| serde_json::json!({})),
            services_offered: serde_json::from_str(&o.services_offered).unwrap_or_default(),
            permit_types: serde_json::from_str(&o.permit_types).unwrap_or_default(),
            id: o.id,
            name: o.name,
            description: o.description,
            address: o.address,
            city: o.city,
            state: o.state,
            zip_code: o.zip_code,
            phone: o.phone,
            email: o.email,
            website: o.website,
            latitude: o.latitude,
            longitude: o.longitude,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

/// Office fields embedded in reviews and applications.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeSummary {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
}

impl From<&permit_office::Model> for OfficeSummary {
    fn from(o: &permit_office::Model) -> Self {
        Self {
            id: o.id.clone(),
            name: o.name.clone(),
            address: o.address.clone(),
            city: o.city.clone(),
            state: o.state.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAuthor {
    pub id: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

impl From<&user::Model> for ReviewAuthor {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            image_url: u.image_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub user_id: String,
    pub permit_office_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub user: Option<ReviewAuthor>,
    pub permit_office: Option<OfficeSummary>,
}

impl ReviewResponse {
    pub fn new(
        r: review::Model,
        author: Option<&user::Model>,
        office: Option<&permit_office::Model>,
    ) -> Self {
        Self {
            id: r.id,
            rating: r.rating,
            comment: r.comment,
            user_id: r.user_id,
            permit_office_id: r.permit_office_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
            user: author.map(ReviewAuthor::from),
            permit_office: office.map(OfficeSummary::from),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub mimetype: String,
    pub size: i64,
    pub uploaded_at: NaiveDateTime,
}

impl From<document::Model> for DocumentResponse {
    fn from(d: document::Model) -> Self {
        Self {
            id: d.id,
            filename: d.filename,
            original_name: d.original_name,
            mimetype: d.mimetype,
            size: d.size,
            uploaded_at: d.uploaded_at,
        }
    }
}

/// Application fields common to every application payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub id: String,
    #[serde(rename = "type")]
    pub permit_type: String,
    pub status: ApplicationStatus,
    pub application_data: serde_json::Value,
    pub user_id: String,
    pub permit_office_id: String,
    pub submitted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<application::Model> for ApplicationView {
    fn from(a: application::Model) -> Self {
        Self {
            application_data: serde_json::from_str(&a.application_data)
                .unwrap_or_else(|_| serde_json::json!({})),
            id: a.id,
            permit_type: a.permit_type,
            status: a.status,
            user_id: a.user_id,
            permit_office_id: a.permit_office_id,
            submitted_at: a.submitted_at,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    #[serde(flatten)]
    pub application: ApplicationView,
    pub permit_office: Option<OfficeSummary>,
    pub documents: Vec<DocumentResponse>,
}

impl ApplicationResponse {
    pub fn new(
        a: application::Model,
        office: Option<&permit_office::Model>,
        documents: Vec<document::Model>,
    ) -> Self {
        Self {
            application: a.into(),
            permit_office: office.map(OfficeSummary::from),
            documents: documents.into_iter().map(DocumentResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
