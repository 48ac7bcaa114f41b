use crate::{Db, Error, Result};
use sqlx::Row as _;
use sqlx::mysql::MySqlRow;

pub async fn get_tables(db: &Db) -> Result<Vec<String>> {
    let rows = sqlx::query("SHOW TABLES").fetch_all(db.mysql()?).await?;
    rows.iter()
        // single column, named `Tables_in_<database>`
        .map(|row| row.try_get::<String, _>(0).map_err(Error::from))
        .collect()
}

pub async fn get_indexes(db: &Db, table: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(sqlx::AssertSqlSafe(format!("SHOW INDEXES FROM `{table}`")))
        .fetch_all(db.mysql()?)
        .await?;
    column(&rows, "Key_name")
}

pub async fn get_columns(db: &Db, table: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(sqlx::AssertSqlSafe(format!("SHOW COLUMNS FROM `{table}`")))
        .fetch_all(db.mysql()?)
        .await?;
    column(&rows, "Field")
}

/// Report `posts` columns still declared as plain `text`; those predate the
/// MEDIUMTEXT widening and lose content past 64KB.
pub async fn check_post_table(db: &Db) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT column_name AS name FROM information_schema.columns \
         WHERE table_schema = DATABASE() AND table_name = 'posts' \
         AND data_type = 'text'",
    )
    .fetch_all(db.mysql()?)
    .await?;
    let narrow = column(&rows, "name")?;
    if !narrow.is_empty() {
        crate::warn!(
            "posts columns need widening to mediumtext: {}",
            narrow.join(", ")
        );
    }
    Ok(narrow)
}

fn column(rows: &[MySqlRow], name: &str) -> Result<Vec<String>> {
    rows.iter()
        .map(|row| row.try_get(name).map_err(Error::from))
        .collect()
}
