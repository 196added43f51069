use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Schema of the stock tables; every statement is idempotent.
const SCHEMA: &[(&str, &str)] = &[
    (
        "a025_device",
        r#"
        CREATE TABLE IF NOT EXISTS a025_device (
            id TEXT PRIMARY KEY NOT NULL,
            canonical_key TEXT NOT NULL,
            display_name TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT,
            updated_at TEXT
        );
        "#,
    ),
    (
        "a026_stock_box",
        r#"
        CREATE TABLE IF NOT EXISTS a026_stock_box (
            id TEXT PRIMARY KEY NOT NULL,
            device TEXT NOT NULL,
            box_no TEXT NOT NULL,
            location TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (device, box_no)
        );
        "#,
    ),
    (
        "a027_stock_item",
        r#"
        CREATE TABLE IF NOT EXISTS a027_stock_item (
            id TEXT PRIMARY KEY NOT NULL,
            identifier TEXT NOT NULL UNIQUE,
            box_id TEXT NOT NULL REFERENCES a026_stock_box(id),
            location TEXT NOT NULL,
            import_id TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    ),
    (
        "a027_stock_item_box_idx",
        "CREATE INDEX IF NOT EXISTS idx_a027_stock_item_box ON a027_stock_item (box_id);",
    ),
    (
        "a028_inbound_import",
        r#"
        CREATE TABLE IF NOT EXISTS a028_inbound_import (
            id TEXT PRIMARY KEY NOT NULL,
            file_name TEXT NOT NULL,
            location TEXT NOT NULL,
            actor TEXT NOT NULL,
            devices_count INTEGER NOT NULL DEFAULT 0,
            boxes_count INTEGER NOT NULL DEFAULT 0,
            new_boxes_count INTEGER NOT NULL DEFAULT 0,
            items_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        "#,
    ),
];

pub async fn initialize_database(db_file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    tracing::info!("Connecting to database: {}", absolute_path.display());
    let conn = Database::connect(&db_url).await?;
    bootstrap_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

/// Create missing tables and indexes
pub async fn bootstrap_schema<C: ConnectionTrait>(conn: &C) -> anyhow::Result<()> {
    for (name, sql) in SCHEMA {
        tracing::debug!("Ensuring schema object {}", name);
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await
        .map_err(|e| anyhow::anyhow!("failed to create {}: {}", name, e))?;
    }
    Ok(())
}

/// Fresh in-memory database with the production schema
#[cfg(test)]
pub async fn connect_in_memory() -> DatabaseConnection {
    use sea_orm::ConnectOptions;

    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    // one connection: every pooled connection to :memory: would be a separate database
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("in-memory sqlite must open");
    bootstrap_schema(&conn)
        .await
        .expect("schema bootstrap must succeed");
    conn
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}
