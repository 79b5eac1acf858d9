use std::collections::HashMap;

use entity::{application, document, permit_office, review};
use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, TransactionTrait,
};

use crate::db::pool::Db;
use crate::error::AppError;
use crate::geo::{Coordinate, Located};
use crate::office_type::OfficeType;
use crate::pagination::Page;

/// Attribute filters for office search. Geo filtering happens after the query.
#[derive(Debug, Default, Clone)]
pub struct OfficeFilter {
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub search: Option<String>,
    pub permit_type: Option<String>,
    pub office_type: Option<OfficeType>,
}

impl OfficeFilter {
    pub fn condition(&self) -> Condition {
        use permit_office::Column;

        let mut cond = Condition::all();

        if let Some(city) = non_empty(&self.city) {
            cond = cond.add(contains_literal(Column::City, city));
        }
        if let Some(state) = non_empty(&self.state) {
            cond = cond.add(contains_literal(Column::State, state));
        }
        if let Some(zip) = non_empty(&self.zip_code) {
            cond = cond.add(Column::ZipCode.eq(zip));
        }
        if let Some(search) = non_empty(&self.search) {
            cond = cond.add(
                [
                    Column::Name,
                    Column::Description,
                    Column::Address,
                    Column::City,
                    Column::State,
                ]
                .into_iter()
                .fold(Condition::any(), |c, col| c.add(contains_literal(col, search))),
            );
        }
        if let Some(permit_type) = non_empty(&self.permit_type) {
            if !permit_type.eq_ignore_ascii_case("all") {
                cond = cond.add(has_permit_type(permit_type));
            }
        }
        if let Some(kind) = self.office_type {
            let any_pattern = kind
                .patterns()
                .iter()
                .fold(Condition::any(), |c, p| c.add(contains_literal(Column::Name, p)));
            cond = cond.add(any_pattern);
        }

        cond
    }

    fn select(&self) -> Select<permit_office::Entity> {
        permit_office::Entity::find()
            .filter(self.condition())
            .order_by_asc(permit_office::Column::Name)
            .order_by_asc(permit_office::Column::Id)
    }
}

impl Located for permit_office::Model {
    fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }
}

/// Case-insensitive substring match on `value` taken literally.
fn contains_literal(column: permit_office::Column, value: &str) -> SimpleExpr {
    column.like(LikeExpr::new(format!("%{}%", escape_like(value))).escape('\\'))
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Exact membership in the JSON `permit_types` array.
fn has_permit_type(permit_type: &str) -> SimpleExpr {
    Expr::cust_with_values(
        r#"EXISTS (SELECT 1 FROM json_each("permit_offices"."permit_types") WHERE json_each.value = ?)"#,
        [permit_type.to_string()],
    )
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// One page of matching offices and the total match count.
pub async fn find_page(
    db: &Db,
    filter: &OfficeFilter,
    page: Page,
) -> Result<(Vec<permit_office::Model>, u64), AppError> {
    let total = filter.select().count(db).await?;
    let offices = filter
        .select()
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?;
    Ok((offices, total))
}

/// Every matching office, for ranking in memory.
pub async fn find_all(
    db: &Db,
    filter: &OfficeFilter,
) -> Result<Vec<permit_office::Model>, AppError> {
    Ok(filter.select().all(db).await?)
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: u64,
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }
        let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        Self {
            average: Some(sum as f64 / ratings.len() as f64),
            count: ratings.len() as u64,
        }
    }
}

/// Rating summaries keyed by office id; offices without reviews are absent.
pub async fn rating_summaries(
    db: &Db,
    office_ids: &[String],
) -> Result<HashMap<String, RatingSummary>, AppError> {
    if office_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(String, i32)> = review::Entity::find()
        .select_only()
        .column(review::Column::PermitOfficeId)
        .column(review::Column::Rating)
        .filter(review::Column::PermitOfficeId.is_in(office_ids.iter().cloned()))
        .into_tuple()
        .all(db)
        .await?;

    let mut ratings: HashMap<String, Vec<i32>> = HashMap::new();
    for (office_id, rating) in rows {
        ratings.entry(office_id).or_default().push(rating);
    }

    Ok(ratings
        .into_iter()
        .map(|(id, r)| (id, RatingSummary::from_ratings(&r)))
        .collect())
}

pub async fn find_by_id(db: &Db, id: &str) -> Result<permit_office::Model, AppError> {
    permit_office::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::PermitOfficeNotFound)
}

pub async fn find_many_by_id(
    db: &Db,
    ids: Vec<String>,
) -> Result<HashMap<String, permit_office::Model>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let offices = permit_office::Entity::find()
        .filter(permit_office::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(offices.into_iter().map(|o| (o.id.clone(), o)).collect())
}

/// Deletes an office together with its reviews, applications and documents.
pub async fn delete_with_data(db: &Db, office_id: &str) -> Result<(), AppError> {
    let txn = db.begin().await?;

    let application_ids: Vec<String> = application::Entity::find()
        .select_only()
        .column(application::Column::Id)
        .filter(application::Column::PermitOfficeId.eq(office_id))
        .into_tuple()
        .all(&txn)
        .await?;

    if !application_ids.is_empty() {
        document::Entity::delete_many()
            .filter(document::Column::ApplicationId.is_in(application_ids))
            .exec(&txn)
            .await?;
    }
    application::Entity::delete_many()
        .filter(application::Column::PermitOfficeId.eq(office_id))
        .exec(&txn)
        .await?;
    review::Entity::delete_many()
        .filter(review::Column::PermitOfficeId.eq(office_id))
        .exec(&txn)
        .await?;
    permit_office::Entity::delete_by_id(office_id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("County"), "County");
    }

    #[test]
    fn rating_summary_averages() {
        let summary = RatingSummary::from_ratings(&[5, 4, 3]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, Some(4.0));
        assert_eq!(RatingSummary::from_ratings(&[]).average, None);
    }
}
