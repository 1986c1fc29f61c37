use crate::config::DbConfig;
use crate::error::AppError;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::str::FromStr;

pub type DbPool = Pool<Sqlite>;

pub async fn connect(cfg: &DbConfig) -> Result<DbPool, AppError> {
    let options = SqliteConnectOptions::from_str(&cfg.url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Create the goal table if it does not exist yet.
pub async fn migrate(pool: &DbPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta_goals (
            namespace TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            period_kind TEXT NOT NULL,
            period_index INTEGER NOT NULL,
            value REAL NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (namespace, entity_id, period_kind, period_index)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}
