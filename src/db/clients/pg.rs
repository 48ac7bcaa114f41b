use crate::{Db, Error, Result};
use sqlx::Row as _;
use sqlx::postgres::PgRow;

pub async fn get_tables(db: &Db) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT table_name::text AS name FROM information_schema.tables \
         WHERE table_schema = 'public' ORDER BY table_name",
    )
    .fetch_all(db.postgres()?)
    .await?;
    names(&rows)
}

pub async fn get_indexes(db: &Db, table: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT indexname::text AS name FROM pg_indexes \
         WHERE schemaname = 'public' AND tablename = $1",
    )
    .bind(table)
    .fetch_all(db.postgres()?)
    .await?;
    names(&rows)
}

pub async fn get_columns(db: &Db, table: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT column_name::text AS name FROM information_schema.columns \
         WHERE table_schema = 'public' AND table_name = $1 \
         ORDER BY ordinal_position",
    )
    .bind(table)
    .fetch_all(db.postgres()?)
    .await?;
    names(&rows)
}

fn names(rows: &[PgRow]) -> Result<Vec<String>> {
    rows.iter()
        .map(|row| row.try_get("name").map_err(Error::from))
        .collect()
}
