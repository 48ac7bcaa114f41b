use confique::Config as _;
use std::sync::OnceLock;

#[derive(confique::Config)]
pub struct Config {
    #[config(nested)]
    pub database: DatabaseConfig,
    #[config(nested)]
    pub server: ServerConfig,
    #[cfg(test)]
    #[config(env = "QUILL_CONTAINER_RAMDISKED", default = true)]
    pub container_ramdisked: bool,
    #[cfg(test)]
    #[config(env = "QUILL_CONTAINER_LOGS", default = false)]
    pub container_logs: bool,
}

#[derive(confique::Config)]
pub struct DatabaseConfig {
    /// Database client the deployment is configured for. Schema introspection is
    /// only implemented for `sqlite3`, `mysql` and `pg`.
    #[config(env = "QUILL_DATABASE_CLIENT", default = "sqlite3")]
    pub client: String,
    #[config(env = "QUILL_DATABASE_URL", default = "sqlite://quill.db?mode=rwc")]
    pub url: String,
}

#[derive(confique::Config)]
pub struct ServerConfig {
    #[config(env = "QUILL_HOST", default = "127.0.0.1")]
    pub host: String,
    #[config(env = "QUILL_PORT", default = 2368)]
    pub port: u16,
}

pub fn config() -> &'static Config {
    static CONFIG: OnceLock<Config> = OnceLock::new();
    CONFIG.get_or_init(|| {
        Config::builder()
            .env()
            .load()
            .expect("Failed to load one or more value configuration from the current environment")
    })
}
