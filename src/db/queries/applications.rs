use std::collections::HashMap;

use entity::application::{self, ApplicationStatus};
use entity::document;
use sea_orm::sea_query::{Query, SelectStatement};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, TransactionTrait,
};

use crate::db::pool::Db;
use crate::error::AppError;
use crate::pagination::Page;

#[derive(Debug, Default, Clone)]
pub struct ApplicationFilter {
    pub user_id: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub permit_office_id: Option<String>,
}

impl ApplicationFilter {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            ..Default::default()
        }
    }

    fn select(&self) -> Select<application::Entity> {
        let mut cond = Condition::all();
        if let Some(ref user_id) = self.user_id {
            cond = cond.add(application::Column::UserId.eq(user_id.as_str()));
        }
        if let Some(status) = self.status {
            cond = cond.add(application::Column::Status.eq(status));
        }
        if let Some(ref office_id) = self.permit_office_id {
            cond = cond.add(application::Column::PermitOfficeId.eq(office_id.as_str()));
        }
        application::Entity::find()
            .filter(cond)
            .order_by_desc(application::Column::UpdatedAt)
            .order_by_desc(application::Column::Id)
    }
}

/// Most recently updated first, with the total match count.
pub async fn find_page(
    db: &Db,
    filter: &ApplicationFilter,
    page: Page,
) -> Result<(Vec<application::Model>, u64), AppError> {
    let total = filter.select().count(db).await?;
    let applications = filter
        .select()
        .offset(page.offset)
        .limit(page.limit)
        .all(db)
        .await?;
    Ok((applications, total))
}

/// An application owned by `user_id`; someone else's reads as not found.
pub async fn find_owned(
    db: &Db,
    id: &str,
    user_id: &str,
) -> Result<application::Model, AppError> {
    application::Entity::find_by_id(id)
        .filter(application::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(AppError::ApplicationNotFound)
}

pub async fn find_by_office(
    db: &Db,
    permit_office_id: &str,
) -> Result<Vec<application::Model>, AppError> {
    Ok(application::Entity::find()
        .filter(application::Column::PermitOfficeId.eq(permit_office_id))
        .order_by_desc(application::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn count_by_user(db: &Db, user_id: &str) -> Result<u64, AppError> {
    Ok(application::Entity::find()
        .filter(application::Column::UserId.eq(user_id))
        .count(db)
        .await?)
}

/// Statuses of all of a user's applications, one entry per application.
pub async fn statuses_by_user(db: &Db, user_id: &str) -> Result<Vec<ApplicationStatus>, AppError> {
    Ok(application::Entity::find()
        .select_only()
        .column(application::Column::Status)
        .filter(application::Column::UserId.eq(user_id))
        .into_tuple()
        .all(db)
        .await?)
}

/// Documents grouped by application id, oldest upload first.
pub async fn documents_for(
    db: &Db,
    application_ids: Vec<String>,
) -> Result<HashMap<String, Vec<document::Model>>, AppError> {
    if application_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let documents = document::Entity::find()
        .filter(document::Column::ApplicationId.is_in(application_ids))
        .order_by_asc(document::Column::UploadedAt)
        .all(db)
        .await?;

    let mut grouped: HashMap<String, Vec<document::Model>> = HashMap::new();
    for doc in documents {
        grouped.entry(doc.application_id.clone()).or_default().push(doc);
    }
    Ok(grouped)
}

pub async fn find_document(
    db: &Db,
    application_id: &str,
    document_id: &str,
) -> Result<document::Model, AppError> {
    document::Entity::find_by_id(document_id)
        .filter(document::Column::ApplicationId.eq(application_id))
        .one(db)
        .await?
        .ok_or(AppError::DocumentNotFound)
}

/// Deletes a draft application and its documents. Anything past DRAFT is left
/// untouched, even if it moved on after the caller checked.
pub async fn delete_with_documents(db: &Db, application_id: &str) -> Result<(), AppError> {
    let txn = db.begin().await?;
    document::Entity::delete_many()
        .filter(document::Column::ApplicationId.in_subquery(draft_id(application_id)))
        .exec(&txn)
        .await?;
    let deleted = application::Entity::delete_many()
        .filter(application::Column::Id.eq(application_id))
        .filter(application::Column::Status.eq(ApplicationStatus::Draft))
        .exec(&txn)
        .await?;
    if deleted.rows_affected == 0 {
        // Dropping the transaction rolls it back.
        return Err(AppError::ApplicationNotDraft);
    }
    txn.commit().await?;
    Ok(())
}

/// Deletes one document of a draft application.
pub async fn delete_draft_document(
    db: &Db,
    application_id: &str,
    document_id: &str,
) -> Result<(), AppError> {
    let deleted = document::Entity::delete_many()
        .filter(document::Column::Id.eq(document_id))
        .filter(document::Column::ApplicationId.in_subquery(draft_id(application_id)))
        .exec(db)
        .await?;
    if deleted.rows_affected == 0 {
        return Err(AppError::ApplicationNotDraft);
    }
    Ok(())
}

fn draft_id(application_id: &str) -> SelectStatement {
    Query::select()
        .column(application::Column::Id)
        .from(application::Entity)
        .and_where(application::Column::Id.eq(application_id))
        .and_where(application::Column::Status.eq(ApplicationStatus::Draft))
        .to_owned()
}
