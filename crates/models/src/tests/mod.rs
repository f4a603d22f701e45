use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;


/// Row-level session query tests
pub mod session_tests;


/// Fresh migrated SQLite database, private to the calling test
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = crate::db::connect_sqlite_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
