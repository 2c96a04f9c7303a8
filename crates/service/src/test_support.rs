#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::connect_with_config;

// Migrations run once per test process; `false` means no usable database
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

pub fn test_config() -> configs::DatabaseConfig {
    let mut cfg = configs::AppConfig::load_or_env()
        .map(|c| c.database)
        .unwrap_or_else(|_| configs::DatabaseConfig { url: models::db::DATABASE_URL.clone(), ..Default::default() });
    cfg.max_connections = cfg.max_connections.max(10);
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.acquire_timeout_secs = 10;
    cfg
}

/// Fresh connection for the current test's runtime, or `None` to skip.
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    common::utils::logging::init_logging_default();
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }

    let ready = *MIGRATED
        .get_or_init(|| async {
            let db = match connect_with_config(&test_config()).await {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("skip: cannot connect to db: {}", e);
                    return false;
                }
            };
            if let Err(e) = migration::Migrator::up(&db, None).await {
                eprintln!("skip: migrate up failed: {}", e);
                return false;
            }
            true
        })
        .await;
    if !ready {
        return Ok(None);
    }

    let db = connect_with_config(&test_config()).await?;
    Ok(Some(db))
}
