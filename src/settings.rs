//! Settings rows: the key/value store behind the settings API.
//!
//! Reads go through a moka cache keyed by setting key; edits refresh the cache
//! entry and the HTTP layer tells downstream caches to invalidate.

use crate::{Db, Error, Result};
use chrono::{NaiveDateTime, SecondsFormat, Utc};
use moka::future::Cache;
use sea_query::{Expr, Iden, Order, Query, QueryStatementWriter};
use serde::{Serialize, Serializer};
use sqlx::Row as _;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Iden)]
enum Settings {
    Table,
    Id,
    Uuid,
    Key,
    Value,
    Type,
    CreatedAt,
    CreatedBy,
    UpdatedAt,
    UpdatedBy,
}

#[derive(Clone, Debug, Serialize)]
pub struct Setting {
    pub id: i32,
    pub uuid: String,
    pub key: String,
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(serialize_with = "ser_datetime")]
    pub created_at: NaiveDateTime,
    pub created_by: i32,
    #[serde(serialize_with = "ser_datetime_opt")]
    pub updated_at: Option<NaiveDateTime>,
    pub updated_by: Option<i32>,
}

fn ser_datetime<S>(value: &NaiveDateTime, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn ser_datetime_opt<S>(
    value: &Option<NaiveDateTime>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(value) => ser_datetime(value, serializer),
        None => serializer.serialize_none(),
    }
}

/// Default settings seeded on first run: `(key, value, type)`.
pub static DEFAULTS: &[(&str, Option<&str>, &str)] = &[
    ("databaseVersion", Some("000"), "core"),
    ("dbHash", None, "core"),
    ("title", Some("Quill"), "blog"),
    ("description", Some("Just a publishing platform."), "blog"),
    ("logo", Some(""), "blog"),
    ("cover", Some(""), "blog"),
    ("defaultLang", Some("en_US"), "blog"),
    ("postsPerPage", Some("6"), "blog"),
    ("forceI18n", Some("true"), "blog"),
    ("permalinks", Some("/:slug/"), "blog"),
    ("activeTheme", Some("default"), "theme"),
];

macro_rules! setting_from_row {
    ($row:expr) => {{
        let row = $row;
        Setting {
            id: row.try_get("id")?,
            uuid: row.try_get("uuid")?,
            key: row.try_get("key")?,
            value: row.try_get("value")?,
            kind: row.try_get("type")?,
            created_at: row.try_get("created_at")?,
            created_by: row.try_get("created_by")?,
            updated_at: row.try_get("updated_at")?,
            updated_by: row.try_get("updated_by")?,
        }
    }};
}

/// Render a statement to SQL for the live dialect. Rendering happens up front so
/// the non-`Send` sea-query statement is dropped before any `.await`, keeping the
/// enclosing futures `Send` (required by the axum handlers).
fn render<Q: QueryStatementWriter>(stmt: &Q, dialect: crate::Dialect) -> String {
    match dialect {
        crate::Dialect::Sqlite => stmt.to_string(sea_query::SqliteQueryBuilder),
        crate::Dialect::Mysql => stmt.to_string(sea_query::MysqlQueryBuilder),
        crate::Dialect::Postgres => stmt.to_string(sea_query::PostgresQueryBuilder),
    }
}

fn select_settings(key: Option<&str>) -> sea_query::SelectStatement {
    let mut stmt = Query::select();
    stmt.columns([
        Settings::Id,
        Settings::Uuid,
        Settings::Key,
        Settings::Value,
        Settings::Type,
        Settings::CreatedAt,
        Settings::CreatedBy,
        Settings::UpdatedAt,
        Settings::UpdatedBy,
    ])
    .from(Settings::Table)
    .order_by(Settings::Id, Order::Asc);
    if let Some(key) = key {
        stmt.and_where(Expr::col(Settings::Key).eq(key));
    }
    stmt
}

pub(crate) async fn fetch_all_settings(db: &Db) -> Result<Vec<Setting>> {
    let sql = render(&select_settings(None), db.dialect());
    crate::with_db!(db, |pool, _builder| {
        let rows = sqlx::query(sqlx::AssertSqlSafe(sql))
            .fetch_all(pool)
            .await?;
        let mut settings = Vec::with_capacity(rows.len());
        for row in &rows {
            settings.push(setting_from_row!(row));
        }
        Ok(settings)
    })
}

pub(crate) async fn fetch_setting(db: &Db, key: &str) -> Result<Option<Setting>> {
    let sql = render(&select_settings(Some(key)), db.dialect());
    crate::with_db!(db, |pool, _builder| {
        let row = sqlx::query(sqlx::AssertSqlSafe(sql))
            .fetch_optional(pool)
            .await?;
        Ok(match &row {
            Some(row) => Some(setting_from_row!(row)),
            None => None,
        })
    })
}

async fn insert_setting(db: &Db, key: &str, value: Option<&str>, kind: &str) -> Result<()> {
    // Scope the (non-Send) statement so it is dropped before the `.await` below,
    // keeping the future `Send`.
    let sql = {
        let mut stmt = Query::insert();
        stmt.into_table(Settings::Table)
            .columns([
                Settings::Uuid,
                Settings::Key,
                Settings::Value,
                Settings::Type,
                Settings::CreatedAt,
                Settings::CreatedBy,
            ])
            .values([
                Expr::value(Uuid::new_v4().to_string()),
                Expr::value(key),
                Expr::value(value.map(str::to_owned)),
                Expr::value(kind),
                Expr::value(Utc::now().naive_utc()),
                Expr::value(1),
            ])?;
        render(&stmt, db.dialect())
    };
    crate::with_db!(db, |pool, _builder| {
        sqlx::query(sqlx::AssertSqlSafe(sql))
            .execute(pool)
            .await?;
    });
    Ok(())
}

async fn update_setting(db: &Db, key: &str, value: Option<String>) -> Result<()> {
    // Scope the (non-Send) statement so it is dropped before the `.await` below,
    // keeping the future `Send` (required by the axum handlers).
    let sql = {
        let mut stmt = Query::update();
        stmt.table(Settings::Table)
            .value(Settings::Value, Expr::value(value))
            .value(Settings::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .value(Settings::UpdatedBy, Expr::value(1))
            .and_where(Expr::col(Settings::Key).eq(key));
        render(&stmt, db.dialect())
    };
    crate::with_db!(db, |pool, _builder| {
        sqlx::query(sqlx::AssertSqlSafe(sql))
            .execute(pool)
            .await?;
    });
    Ok(())
}

/// Seed every default setting that is not present yet. Returns how many rows
/// were inserted.
pub async fn populate_defaults(db: &Db) -> Result<usize> {
    let existing: Vec<String> = fetch_all_settings(db)
        .await?
        .into_iter()
        .map(|setting| setting.key)
        .collect();
    let mut seeded = 0;
    for (key, value, kind) in DEFAULTS {
        if !existing.iter().any(|k| k == key) {
            insert_setting(db, key, *value, kind).await?;
            seeded += 1;
        }
    }
    Ok(seeded)
}

#[derive(Clone)]
pub struct SettingsStore {
    db: Arc<Db>,
    cache: Cache<String, Setting>,
}

impl SettingsStore {
    pub fn new(db: Arc<Db>) -> Self {
        Self {
            db,
            cache: Cache::new(256),
        }
    }

    /// All settings, core type included.
    pub async fn browse(&self) -> Result<Vec<Setting>> {
        fetch_all_settings(&self.db).await
    }

    pub async fn read(&self, key: &str) -> Result<Setting> {
        if let Some(setting) = self.cache.get(key).await {
            return Ok(setting);
        }
        let setting = fetch_setting(&self.db, key)
            .await?
            .ok_or_else(|| Error::SettingNotFound(key.to_owned()))?;
        self.cache.insert(key.to_owned(), setting.clone()).await;
        Ok(setting)
    }

    /// Update an existing setting. Missing keys are a `SettingNotFound` error;
    /// the row is checked first since affected-row counts cannot distinguish a
    /// missing key from an unchanged value on every backend.
    pub async fn edit(&self, key: &str, value: Option<String>) -> Result<Setting> {
        if fetch_setting(&self.db, key).await?.is_none() {
            return Err(Error::SettingNotFound(key.to_owned()));
        }
        update_setting(&self.db, key, value).await?;
        let updated = fetch_setting(&self.db, key)
            .await?
            .ok_or_else(|| Error::Internal(format!("setting `{key}` vanished during update")))?;
        self.cache.insert(key.to_owned(), updated.clone()).await;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::commands;
    use crate::testing::sqlite_db;

    async fn seeded_store() -> (SettingsStore, tempfile::TempDir) {
        let (db, dir) = sqlite_db().await;
        commands::create_table(&db, "settings").await.unwrap();
        populate_defaults(&db).await.unwrap();
        (SettingsStore::new(Arc::new(db)), dir)
    }

    #[tokio::test]
    async fn populate_defaults_is_idempotent() -> Result {
        let (db, _dir) = sqlite_db().await;
        commands::create_table(&db, "settings").await?;
        assert_eq!(populate_defaults(&db).await?, DEFAULTS.len());
        assert_eq!(populate_defaults(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn read_returns_seeded_title() -> Result {
        let (store, _dir) = seeded_store().await;
        let title = store.read("title").await?;
        assert_eq!(title.key, "title");
        assert_eq!(title.value.as_deref(), Some("Quill"));
        assert_eq!(title.kind, "blog");
        assert_eq!(title.created_by, 1);
        assert!(title.updated_at.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn edit_updates_value_and_cache() -> Result {
        let (store, _dir) = seeded_store().await;
        store.read("title").await?; // warm the cache

        let updated = store.edit("title", Some("Changed".into())).await?;
        assert_eq!(updated.value.as_deref(), Some("Changed"));
        assert!(updated.updated_at.is_some());

        // the cached entry must reflect the edit
        let cached = store.read("title").await?;
        assert_eq!(cached.value.as_deref(), Some("Changed"));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_reads_are_consistent() -> Result {
        let (store, _dir) = seeded_store().await;
        let reads = (0..8).map(|_| store.read("title"));
        let settings = futures::future::try_join_all(reads).await?;
        assert!(settings.iter().all(|s| s.value.as_deref() == Some("Quill")));
        Ok(())
    }

    #[tokio::test]
    async fn edit_unknown_key_is_not_found() -> Result {
        let (store, _dir) = seeded_store().await;
        let err = store.edit("testvalue", Some("x".into())).await.unwrap_err();
        assert_eq!(err.to_string(), "Unable to find setting: testvalue");
        assert!(matches!(err, Error::SettingNotFound(_)));
        Ok(())
    }

    #[test]
    fn settings_serialize_with_iso_timestamps() {
        let setting = Setting {
            id: 1,
            uuid: "8640acbf-9828-4efa-9e76-4a0ffa35b2f7".into(),
            key: "title".into(),
            value: Some("Quill".into()),
            kind: "blog".into(),
            created_at: chrono::NaiveDate::from_ymd_opt(2014, 2, 17)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            created_by: 1,
            updated_at: None,
            updated_by: None,
        };
        let json = serde_json::to_value(&setting).unwrap();
        assert_eq!(json["type"], "blog");
        assert_eq!(json["created_at"], "2014-02-17T10:30:00.000Z");
        assert!(json["updated_at"].is_null());
    }
}
