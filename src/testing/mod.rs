#![cfg(test)]
crate::reexport!(container);
crate::reexport!(context);
pub use rstest::*;

use crate::*;

pub(crate) fn common_init() {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // Only initialize once for all tests
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env()) // <- reads RUST_LOG
            .with_test_writer() // ensures it integrates with `cargo test` output
            .init();
    });
}

/// File-backed sqlite database in a temp dir; the dir guard keeps it alive for
/// the duration of the test.
pub(crate) async fn sqlite_db() -> (Db, tempfile::TempDir) {
    common_init();
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = DatabaseConfig {
        client: "sqlite3".into(),
        url: format!("sqlite://{}/quill.db?mode=rwc", dir.path().display()),
    };
    let db = Db::connect(&config).await.expect("sqlite test db");
    (db, dir)
}

mod isolated_integration_tests {
    use super::{super::*, *};

    #[test_context(IsolatedIntegrationTest)]
    #[tokio::test]
    #[ignore = "needs a local docker daemon"]
    async fn can_connect(ctx: &mut IsolatedIntegrationTest) -> Result {
        sqlx::query("SELECT 1;").fetch_one(ctx.db.postgres()?).await?;
        Ok(())
    }

    #[test_context(IsolatedIntegrationTest)]
    #[tokio::test]
    #[ignore = "needs a local docker daemon"]
    async fn migrate_init_builds_the_full_schema(ctx: &mut IsolatedIntegrationTest) -> Result {
        migrate::init(&ctx.db).await?;

        let tables = commands::get_tables(&ctx.db).await?;
        for spec in schema::tables() {
            assert!(tables.iter().any(|t| t == spec.name), "missing {}", spec.name);
        }

        let columns = commands::get_columns(&ctx.db, "settings").await?;
        let expected = schema::table("settings")
            .unwrap()
            .columns
            .iter()
            .map(|(name, _)| name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(columns, expected);
        Ok(())
    }

    #[test_context(IsolatedIntegrationTest)]
    #[rstest]
    #[case("roles", "name")]
    #[case("users", "bio")]
    #[tokio::test]
    #[ignore = "needs a local docker daemon"]
    async fn unique_indexes_round_trip(
        ctx: &mut IsolatedIntegrationTest,
        #[case] table: &str,
        #[case] column: &str,
    ) -> Result {
        commands::create_table(&ctx.db, table).await?;

        commands::add_unique(&ctx.db, table, column).await?;
        let name = format!("{table}_{column}_unique");
        let indexes = commands::get_indexes(&ctx.db, table).await?;
        assert!(indexes.iter().any(|i| *i == name), "{indexes:?}");

        commands::drop_unique(&ctx.db, table, column).await?;
        let indexes = commands::get_indexes(&ctx.db, table).await?;
        assert!(!indexes.iter().any(|i| *i == name));
        Ok(())
    }
}
