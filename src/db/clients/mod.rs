//! Per-database-client introspection helpers.
//!
//! The configured client string selects one of these at call time; anything
//! outside the supported set is rejected by the commands layer with
//! `No support for database client <client>`.

pub mod mysql;
pub mod pg;
pub mod sqlite3;

use crate::{Db, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
pub enum Client {
    #[display("sqlite3")]
    Sqlite3,
    #[display("mysql")]
    Mysql,
    #[display("pg")]
    Pg,
}

impl Client {
    /// Look a client up in the supported set.
    pub fn lookup(name: &str) -> Option<Client> {
        match name {
            "sqlite3" => Some(Client::Sqlite3),
            "mysql" => Some(Client::Mysql),
            "pg" => Some(Client::Pg),
            _ => None,
        }
    }

    pub async fn get_tables(self, db: &Db) -> Result<Vec<String>> {
        match self {
            Client::Sqlite3 => sqlite3::get_tables(db).await,
            Client::Mysql => mysql::get_tables(db).await,
            Client::Pg => pg::get_tables(db).await,
        }
    }

    pub async fn get_indexes(self, db: &Db, table: &str) -> Result<Vec<String>> {
        match self {
            Client::Sqlite3 => sqlite3::get_indexes(db, table).await,
            Client::Mysql => mysql::get_indexes(db, table).await,
            Client::Pg => pg::get_indexes(db, table).await,
        }
    }

    pub async fn get_columns(self, db: &Db, table: &str) -> Result<Vec<String>> {
        match self {
            Client::Sqlite3 => sqlite3::get_columns(db, table).await,
            Client::Mysql => mysql::get_columns(db, table).await,
            Client::Pg => pg::get_columns(db, table).await,
        }
    }
}
