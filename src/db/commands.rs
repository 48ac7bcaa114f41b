//! Schema commands: translate the declarative column spec into DDL and delegate
//! introspection to the configured client.
//!
//! Creation distinguishes between text with a fieldtype, string with a
//! maxlength, and all others; then applies nullability, primary, unique,
//! unsigned, references and default, in that order. Each operation is a single
//! async call against the database and surfaces failures directly.

use super::clients::Client;
use super::schema::{self, ColumnKind, ColumnSpec, DefaultValue, TextSize};
use super::{Db, Dialect};
use crate::{Error, Result};
use sea_query::{
    Alias, ColumnDef, ForeignKey, Index, IndexCreateStatement, IndexDropStatement,
    SchemaStatementBuilder as _, Table, TableAlterStatement, TableCreateStatement,
    TableDropStatement,
};

fn column_def(name: &str, spec: &ColumnSpec, dialect: Dialect) -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new(name));
    match spec.kind {
        ColumnKind::Increments => {
            def.integer().auto_increment();
        }
        ColumnKind::Str { maxlength } => {
            def.string_len(maxlength);
        }
        ColumnKind::Text { fieldtype } => match (fieldtype, dialect) {
            (Some(TextSize::Medium), Dialect::Mysql) => {
                def.custom(Alias::new("mediumtext"));
            }
            _ => {
                def.text();
            }
        },
        ColumnKind::Integer => {
            if spec.unsigned {
                def.unsigned();
            } else {
                def.integer();
            }
        }
        ColumnKind::Bool => {
            def.boolean();
        }
        ColumnKind::DateTime => {
            def.date_time();
        }
    }
    if spec.nullable {
        def.null();
    } else {
        def.not_null();
    }
    if spec.primary {
        def.primary_key();
    }
    if spec.unique {
        def.unique_key();
    }
    match spec.default_to {
        Some(DefaultValue::Str(value)) => {
            def.default(value);
        }
        Some(DefaultValue::Bool(value)) => {
            def.default(value);
        }
        None => {}
    }
    def
}

fn split_reference(target: &str) -> Result<(&str, &str)> {
    target
        .split_once('.')
        .ok_or_else(|| Error::Internal(format!("malformed column reference `{target}`")))
}

pub(crate) fn create_table_statement(
    table: &str,
    dialect: Dialect,
) -> Result<TableCreateStatement> {
    let spec = schema::table(table).ok_or_else(|| Error::UnknownTable(table.into()))?;
    let mut stmt = Table::create();
    stmt.table(Alias::new(spec.name));
    for (name, column) in spec.columns {
        stmt.col(&mut column_def(name, column, dialect));
    }
    for (name, column) in spec.columns {
        if let Some(target) = column.references {
            let (ref_table, ref_column) = split_reference(target)?;
            let fk_name = format!("{}_{}_foreign", spec.name, name);
            stmt.foreign_key(
                ForeignKey::create()
                    .name(fk_name.as_str())
                    .from(Alias::new(spec.name), Alias::new(*name))
                    .to(Alias::new(ref_table), Alias::new(ref_column)),
            );
        }
    }
    Ok(stmt)
}

pub(crate) fn add_column_statement(
    table: &str,
    column: &str,
    dialect: Dialect,
) -> Result<TableAlterStatement> {
    let spec = schema::table(table).ok_or_else(|| Error::UnknownTable(table.into()))?;
    let column_spec = spec
        .columns
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, spec)| spec)
        .ok_or_else(|| Error::UnknownColumn(table.into(), column.into()))?;
    let mut stmt = Table::alter();
    stmt.table(Alias::new(spec.name))
        .add_column(&mut column_def(column, column_spec, dialect));
    Ok(stmt)
}

fn drop_table_statement(table: &str) -> TableDropStatement {
    let mut stmt = Table::drop();
    stmt.table(Alias::new(table)).if_exists();
    stmt
}

fn unique_index_name(table: &str, column: &str) -> String {
    format!("{table}_{column}_unique")
}

fn add_unique_statement(table: &str, column: &str) -> IndexCreateStatement {
    let name = unique_index_name(table, column);
    let mut stmt = Index::create();
    stmt.name(name.as_str())
        .table(Alias::new(table))
        .col(Alias::new(column))
        .unique();
    stmt
}

fn drop_unique_statement(table: &str, column: &str) -> IndexDropStatement {
    let name = unique_index_name(table, column);
    let mut stmt = Index::drop();
    stmt.name(name.as_str()).table(Alias::new(table));
    stmt
}

/// Create a table with every column of its spec, in spec order.
pub async fn create_table(db: &Db, table: &str) -> Result<()> {
    let stmt = create_table_statement(table, db.dialect())?;
    crate::with_db!(db, |pool, builder| {
        sqlx::query(sqlx::AssertSqlSafe(stmt.to_string(builder)))
            .execute(pool)
            .await?;
    });
    Ok(())
}

pub async fn delete_table(db: &Db, table: &str) -> Result<()> {
    let stmt = drop_table_statement(table);
    crate::with_db!(db, |pool, builder| {
        sqlx::query(sqlx::AssertSqlSafe(stmt.to_string(builder)))
            .execute(pool)
            .await?;
    });
    Ok(())
}

/// Add a single spec'd column to an existing table.
pub async fn add_column(db: &Db, table: &str, column: &str) -> Result<()> {
    let stmt = add_column_statement(table, column, db.dialect())?;
    crate::with_db!(db, |pool, builder| {
        sqlx::query(sqlx::AssertSqlSafe(stmt.to_string(builder)))
            .execute(pool)
            .await?;
    });
    Ok(())
}

pub async fn add_unique(db: &Db, table: &str, column: &str) -> Result<()> {
    let stmt = add_unique_statement(table, column);
    crate::with_db!(db, |pool, builder| {
        sqlx::query(sqlx::AssertSqlSafe(stmt.to_string(builder)))
            .execute(pool)
            .await?;
    });
    Ok(())
}

pub async fn drop_unique(db: &Db, table: &str, column: &str) -> Result<()> {
    let stmt = drop_unique_statement(table, column);
    crate::with_db!(db, |pool, builder| {
        sqlx::query(sqlx::AssertSqlSafe(stmt.to_string(builder)))
            .execute(pool)
            .await?;
    });
    Ok(())
}

fn client_for(db: &Db) -> Result<Client> {
    let client =
        Client::lookup(&db.client).ok_or_else(|| Error::UnsupportedClient(db.client.clone()))?;
    crate::trace!("introspection delegated to the {client} client");
    Ok(client)
}

pub async fn get_tables(db: &Db) -> Result<Vec<String>> {
    client_for(db)?.get_tables(db).await
}

pub async fn get_indexes(db: &Db, table: &str) -> Result<Vec<String>> {
    client_for(db)?.get_indexes(db, table).await
}

pub async fn get_columns(db: &Db, table: &str) -> Result<Vec<String>> {
    client_for(db)?.get_columns(db, table).await
}

/// Post-migration sanity check. Only the mysql client has one; every other
/// client resolves to an empty result.
pub async fn check_tables(db: &Db) -> Result<Vec<String>> {
    match Client::lookup(&db.client) {
        Some(Client::Mysql) => super::clients::mysql::check_post_table(db).await,
        _ => Ok(Vec::new()),
    }
}
