use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::{info, instrument};

use crate::configuration::Settings;
use crate::migration::{Migrator, MigratorTrait};

#[instrument(skip(settings))]
pub async fn init_db(settings: &Settings) -> anyhow::Result<DatabaseConnection> {
    info!("데이터베이스 연결 설정 중...");

    // 인메모리 SQLite 는 연결마다 별도 DB 이므로 하나만 사용
    let max_connections = if settings.database_url.contains(":memory:") { 1 } else { 10 };

    let mut options = ConnectOptions::new(settings.database_url.clone());
    options
        .max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    info!("데이터베이스에 연결 시도 중...");
    let db = Database::connect(options).await?;
    info!("데이터베이스 연결 완료");

    Ok(db)
}

/// Connects and brings the schema up to date.
pub async fn init_db_with_migrations(settings: &Settings) -> anyhow::Result<DatabaseConnection> {
    let db = init_db(settings).await?;
    info!("데이터베이스 마이그레이션 실행 중...");
    Migrator::up(&db, None).await?;
    info!("마이그레이션 완료");
    Ok(db)
}
