use crate::testing::*;
use crate::{Db, DbPool};
use sqlx::Postgres;
use test_context::AsyncTestContext;
pub use test_context::test_context;

/// A fresh, randomly named database in the shared postgres container, wrapped
/// in a `Db` configured for the `pg` client.
pub struct IsolatedIntegrationTest {
    pub db: Db,
    pub database: String,
}

impl IsolatedIntegrationTest {
    async fn random_database<'c, E: sqlx::Executor<'c, Database = Postgres>>(exec: E) -> String {
        use rand::Rng;
        let db = format!(
            "test_db_{}",
            rand::rng()
                .sample_iter(&rand::distr::Alphanumeric)
                .take(8)
                .map(char::from)
                .collect::<String>()
                .to_lowercase()
        );

        sqlx::query(sqlx::AssertSqlSafe(format!("CREATE DATABASE {db}")))
            .execute(exec)
            .await
            .expect("Failed to create test database");
        db
    }
}

impl AsyncTestContext for IsolatedIntegrationTest {
    async fn setup() -> Self {
        crate::testing::common_init();
        let postgres_pool = pool("postgres").await;
        let database = Self::random_database(&postgres_pool).await;

        Self {
            db: Db::new(DbPool::Postgres(pool(&database).await), "pg"),
            database,
        }
    }

    async fn teardown(self) {
        self.db.close().await;

        let pool = pool("postgres").await;
        sqlx::query(sqlx::AssertSqlSafe(format!(
            "DROP DATABASE {}",
            self.database
        )))
        .execute(&pool)
        .await
        .expect("Failed to drop test database");
    }
}
