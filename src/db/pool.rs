use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

pub type Db = DatabaseConnection;

pub async fn connect(database_url: &str) -> Result<Db, DbErr> {
    let mut opts = ConnectOptions::new(database_url);
    opts.max_connections(5)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    // An in-memory SQLite database exists per connection.
    if database_url.contains(":memory:") {
        opts.max_connections(1);
    }
    Database::connect(opts).await
}
