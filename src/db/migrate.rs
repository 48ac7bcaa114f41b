use super::{Db, commands, schema};
use crate::{Result, info, settings};
use itertools::Itertools as _;

/// First-run initialisation: create every spec'd table that is missing, seed
/// the default settings, then run the client's post-migration check.
pub async fn init(db: &Db) -> Result<()> {
    let existing = commands::get_tables(db).await?;

    let mut created = Vec::new();
    for table in schema::tables() {
        if !existing.iter().any(|t| t == table.name) {
            commands::create_table(db, table.name).await?;
            created.push(table.name);
        }
    }
    if !created.is_empty() {
        info!("created tables: {}", created.iter().join(", "));
    }

    let seeded = settings::populate_defaults(db).await?;
    if seeded > 0 {
        info!("seeded {seeded} default settings");
    }

    commands::check_tables(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sqlite_db;

    #[tokio::test]
    async fn init_creates_all_tables_and_seeds_settings() -> Result {
        let (db, _dir) = sqlite_db().await;
        init(&db).await?;

        let tables = commands::get_tables(&db).await?;
        for spec in schema::tables() {
            assert!(tables.iter().any(|t| t == spec.name), "missing {}", spec.name);
        }

        let title = settings::fetch_setting(&db, "title").await?;
        assert!(title.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn init_is_idempotent() -> Result {
        let (db, _dir) = sqlite_db().await;
        init(&db).await?;
        init(&db).await?;

        let settings = settings::fetch_all_settings(&db).await?;
        let titles = settings.iter().filter(|s| s.key == "title").count();
        assert_eq!(titles, 1);
        Ok(())
    }
}
