use std::collections::HashSet;

use entity::permit_office;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QuerySelect, Set};
use serde::Deserialize;

use crate::error::AppError;

const SAMPLE_OFFICES: &str = include_str!("../seed/permit_offices.json");

/// One office record in the bundled sample data.
#[derive(Debug, Deserialize)]
pub struct SampleOffice {
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
    #[serde(default)]
    pub hours: serde_json::Value,
    #[serde(default)]
    pub services_offered: Vec<String>,
    #[serde(default)]
    pub permit_types: Vec<String>,
}

/// Result of a seed run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub created: usize,
    /// Offices skipped because an office with the same name exists.
    pub skipped: usize,
}

pub fn sample_offices() -> Result<Vec<SampleOffice>, AppError> {
    serde_json::from_str(SAMPLE_OFFICES)
        .map_err(|e| AppError::Internal(format!("Invalid sample office data: {e}")))
}

/// Inserts the bundled sample offices whose names are not present yet.
pub async fn load_sample_offices(db: &DatabaseConnection) -> Result<SeedResult, AppError> {
    let existing: HashSet<String> = permit_office::Entity::find()
        .select_only()
        .column(permit_office::Column::Name)
        .into_tuple::<String>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let mut result = SeedResult::default();
    for office in sample_offices()? {
        if existing.contains(&office.name) {
            result.skipped += 1;
            continue;
        }

        let now = chrono::Utc::now().naive_utc();
        let hours = if office.hours.is_null() {
            serde_json::json!({})
        } else {
            office.hours
        };
        permit_office::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(office.name.clone()),
            description: Set(office.description),
            address: Set(office.address),
            city: Set(office.city),
            state: Set(office.state),
            zip_code: Set(office.zip_code),
            phone: Set(office.phone),
            email: Set(office.email),
            website: Set(office.website),
            latitude: Set(office.latitude),
            longitude: Set(office.longitude),
            hours: Set(hours.to_string()),
            services_offered: Set(serde_json::Value::from(office.services_offered).to_string()),
            permit_types: Set(serde_json::Value::from(office.permit_types).to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        tracing::debug!(name = %office.name, "Seeded permit office");
        result.created += 1;
    }

    Ok(result)
}
