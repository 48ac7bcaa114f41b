//! Database layer.
//!
//! This module owns everything that talks to the configured database:
//!
//! - `schema`   : the static declarative table/column specification.
//! - `commands` : DDL and introspection operations driven by that spec.
//! - `clients`  : per-database-client introspection helpers.
//! - `migrate`  : first-run initialisation (create tables, seed settings).
//!
//! The deployment's *client* (`sqlite3`, `mysql` or `pg`) is plain configuration
//! and is looked up per introspection call; the connection pool variant is chosen
//! from the connection url scheme. DDL and DML are rendered per-dialect with
//! sea-query and executed through sqlx.

pub mod clients;
pub mod commands;
pub mod migrate;
pub mod schema;

use crate::*;
use sqlx::{MySqlPool, PgPool, SqlitePool};

#[derive(Debug)]
pub enum DbPool {
    Sqlite(SqlitePool),
    Mysql(MySqlPool),
    Postgres(PgPool),
}

/// SQL dialect of the live connection, used to render DDL/DML.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Mysql,
    Postgres,
}

#[derive(Debug)]
pub struct Db {
    pub pool: DbPool,
    /// Configured database client name, e.g. `sqlite3`. Introspection support is
    /// keyed on this string, not on the pool variant.
    pub client: String,
}

impl Db {
    pub fn new(pool: DbPool, client: impl Into<String>) -> Self {
        Self {
            pool,
            client: client.into(),
        }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.url.as_str();
        let pool = if url.starts_with("sqlite:") {
            DbPool::Sqlite(SqlitePool::connect(url).await?)
        } else if url.starts_with("mysql:") {
            DbPool::Mysql(MySqlPool::connect(url).await?)
        } else if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            DbPool::Postgres(PgPool::connect(url).await?)
        } else {
            return Err(Error::Config(format!(
                "unrecognised database url scheme: {url}"
            )));
        };
        debug!(client = %config.client, "database connection established");
        Ok(Self::new(pool, config.client.clone()))
    }

    pub fn dialect(&self) -> Dialect {
        match self.pool {
            DbPool::Sqlite(_) => Dialect::Sqlite,
            DbPool::Mysql(_) => Dialect::Mysql,
            DbPool::Postgres(_) => Dialect::Postgres,
        }
    }

    pub fn sqlite(&self) -> Result<&SqlitePool> {
        match &self.pool {
            DbPool::Sqlite(pool) => Ok(pool),
            _ => Err(Error::Config(
                "database client sqlite3 requires a sqlite connection".into(),
            )),
        }
    }

    pub fn mysql(&self) -> Result<&MySqlPool> {
        match &self.pool {
            DbPool::Mysql(pool) => Ok(pool),
            _ => Err(Error::Config(
                "database client mysql requires a mysql connection".into(),
            )),
        }
    }

    pub fn postgres(&self) -> Result<&PgPool> {
        match &self.pool {
            DbPool::Postgres(pool) => Ok(pool),
            _ => Err(Error::Config(
                "database client pg requires a postgres connection".into(),
            )),
        }
    }

    pub async fn close(&self) {
        match &self.pool {
            DbPool::Sqlite(pool) => pool.close().await,
            DbPool::Mysql(pool) => pool.close().await,
            DbPool::Postgres(pool) => pool.close().await,
        }
    }
}

/// Run `$body` with `$pool` bound to the typed sqlx pool and `$builder` to the
/// matching sea-query builder. The body is monomorphised per backend, so plain
/// `sqlx::Row::try_get` calls work without generic bounds.
#[macro_export]
macro_rules! with_db {
    ($db:expr, |$pool:ident, $builder:ident| $body:block) => {
        match &$db.pool {
            $crate::DbPool::Sqlite($pool) => {
                let $builder = ::sea_query::SqliteQueryBuilder;
                $body
            }
            $crate::DbPool::Mysql($pool) => {
                let $builder = ::sea_query::MysqlQueryBuilder;
                $body
            }
            $crate::DbPool::Postgres($pool) => {
                let $builder = ::sea_query::PostgresQueryBuilder;
                $body
            }
        }
    };
}
