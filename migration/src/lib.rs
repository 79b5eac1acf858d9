pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_users;
mod m20261019_000002_create_permit_offices;
mod m20261019_000003_create_reviews;
mod m20261019_000004_create_applications;
mod m20261019_000005_create_documents;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_users::Migration),
            Box::new(m20261019_000002_create_permit_offices::Migration),
            Box::new(m20261019_000003_create_reviews::Migration),
            Box::new(m20261019_000004_create_applications::Migration),
            Box::new(m20261019_000005_create_documents::Migration),
        ]
    }
}
