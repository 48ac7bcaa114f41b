use crate::{Db, Error, Result};
use sqlx::Row as _;
use sqlx::sqlite::SqliteRow;

fn names(rows: &[SqliteRow]) -> Result<Vec<String>> {
    rows.iter()
        .map(|row| row.try_get("name").map_err(Error::from))
        .collect()
}

pub async fn get_tables(db: &Db) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(db.sqlite()?)
    .await?;
    names(&rows)
}

pub async fn get_indexes(db: &Db, table: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(sqlx::AssertSqlSafe(format!(
        r#"PRAGMA index_list("{table}")"#
    )))
    .fetch_all(db.sqlite()?)
    .await?;
    names(&rows)
}

pub async fn get_columns(db: &Db, table: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(sqlx::AssertSqlSafe(format!(
        r#"PRAGMA table_info("{table}")"#
    )))
    .fetch_all(db.sqlite()?)
    .await?;
    names(&rows)
}
