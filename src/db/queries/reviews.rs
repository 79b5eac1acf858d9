use entity::review;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Select,
};

use crate::db::pool::Db;
use crate::error::AppError;
use crate::pagination::Page;

#[derive(Debug, Default, Clone)]
pub struct ReviewFilter {
    pub permit_office_id: Option<String>,
    pub user_id: Option<String>,
}

impl ReviewFilter {
    fn select(&self) -> Select<review::Entity> {
        let mut cond = Condition::all();
        if let Some(ref office_id) = self.permit_office_id {
            cond = cond.add(review::Column::PermitOfficeId.eq(office_id.as_str()));
        }
        if let Some(ref user_id) = self.user_id {
            cond = cond.add(review::Column::UserId.eq(user_id.as_str()));
        }
        review::Entity::find()
            .filter(cond)
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
    }
}

/// Newest reviews first, with the total match count.
pub async fn find_page(
    db: &Db,
    filter: &ReviewFilter,
    page: Page,
) -> Result<(Vec<review::Model>, u64), AppError> {
    let total = filter.select().count(db).await?;
    let reviews = filter
        .select()
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?;
    Ok((reviews, total))
}

pub async fn find_by_id(db: &Db, id: &str) -> Result<review::Model, AppError> {
    review::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::ReviewNotFound)
}

/// A review owned by `user_id`; someone else's review reads as not found.
pub async fn find_owned(db: &Db, id: &str, user_id: &str) -> Result<review::Model, AppError> {
    review::Entity::find_by_id(id)
        .filter(review::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(AppError::ReviewNotFound)
}

pub async fn find_by_user_and_office(
    db: &Db,
    user_id: &str,
    permit_office_id: &str,
) -> Result<Option<review::Model>, AppError> {
    Ok(review::Entity::find()
        .filter(review::Column::UserId.eq(user_id))
        .filter(review::Column::PermitOfficeId.eq(permit_office_id))
        .one(db)
        .await?)
}

pub async fn count_by_user(db: &Db, user_id: &str) -> Result<u64, AppError> {
    Ok(review::Entity::find()
        .filter(review::Column::UserId.eq(user_id))
        .count(db)
        .await?)
}

/// All reviews of one office, newest first.
pub async fn find_by_office(db: &Db, permit_office_id: &str) -> Result<Vec<review::Model>, AppError> {
    Ok(ReviewFilter {
        permit_office_id: Some(permit_office_id.to_string()),
        user_id: None,
    }
    .select()
    .all(db)
    .await?)
}
