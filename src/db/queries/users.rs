use std::collections::HashMap;

use entity::{application, document, review, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
    SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::auth::identity::IdentityProfile;
use crate::db::pool::Db;
use crate::error::AppError;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

pub async fn find_by_external_id<C: ConnectionTrait>(
    db: &C,
    external_id: &str,
) -> Result<Option<user::Model>, AppError> {
    Ok(user::Entity::find()
        .filter(user::Column::ExternalId.eq(external_id))
        .one(db)
        .await?)
}

pub async fn find_many_by_id(
    db: &Db,
    ids: Vec<String>,
) -> Result<HashMap<String, user::Model>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(users.into_iter().map(|u| (u.id.clone(), u)).collect())
}

/// Inserts a user for a first-seen identity. A concurrent insert of the same
/// identity resolves to the row that won.
pub async fn provision(db: &Db, profile: IdentityProfile) -> Result<user::Model, AppError> {
    let now = chrono::Utc::now().naive_utc();
    let external_id = profile.external_id.clone();
    let model = user::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        external_id: Set(profile.external_id),
        email: Set(profile.email),
        name: Set(profile.name),
        phone: Set(profile.phone),
        image_url: Set(profile.image_url),
        role: Set(ROLE_USER.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    match model.insert(db).await {
        Ok(created) => {
            tracing::info!(external_id = %created.external_id, "Provisioned user");
            Ok(created)
        }
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            find_by_external_id(db, &external_id)
                .await?
                .ok_or(AppError::UserNotFound)
        }
        Err(err) => Err(err.into()),
    }
}

/// Creates or refreshes a user from provider data. Role is left untouched on update.
pub async fn upsert_profile(db: &Db, profile: IdentityProfile) -> Result<user::Model, AppError> {
    let Some(existing) = find_by_external_id(db, &profile.external_id).await? else {
        return provision(db, profile).await;
    };

    let mut active: user::ActiveModel = existing.into();
    active.email = Set(profile.email);
    active.name = Set(profile.name);
    active.phone = Set(profile.phone);
    active.image_url = Set(profile.image_url);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    Ok(active.update(db).await?)
}

/// Deletes a user with its reviews, applications and their documents.
pub async fn delete_with_data(db: &Db, user_id: &str) -> Result<(), AppError> {
    let txn = db.begin().await?;

    let application_ids: Vec<String> = application::Entity::find()
        .select_only()
        .column(application::Column::Id)
        .filter(application::Column::UserId.eq(user_id))
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
        .filter(application::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    review::Entity::delete_many()
        .filter(review::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    user::Entity::delete_by_id(user_id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Grants the admin role. Returns `false` if the user already had it.
pub async fn promote_to_admin(db: &Db, email: &str) -> Result<bool, AppError> {
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or(AppError::UserNotFound)?;

    if user.role == ROLE_ADMIN {
        return Ok(false);
    }

    let mut active: user::ActiveModel = user.into();
    active.role = Set(ROLE_ADMIN.to_string());
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await?;
    Ok(true)
}
