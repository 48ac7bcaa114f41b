#[macro_export]
macro_rules! reexport {
    ($module:ident) => {
        $crate::reexport!($module, false);
    };
    ($module:ident, test) => {
        $crate::reexport!($module, true);
    };
    ($module:ident, $is_test:literal) => {
        #[cfg_attr($is_test, cfg(test))]
        mod $module;
        #[cfg_attr($is_test, cfg(test))]
        #[allow(unused_imports)]
        #[allow(ambiguous_glob_reexports)]
        pub use $module::*;
    };
}

reexport!(testing, test);
reexport!(config);
reexport!(error);
// `db` defines the `#[macro_export] with_db!` macro, which is referred to by
// absolute path (`crate::with_db!`). A macro_export macro introduced through
// another macro's expansion can't be named by absolute path, so declare this
// module literally (identical to what `reexport!(db)` expands to).
mod db;
#[allow(unused_imports)]
#[allow(ambiguous_glob_reexports)]
pub use db::*;
reexport!(settings);
reexport!(server);
#[allow(unused_imports)]
pub(crate) use tracing::{debug, error, info, span, trace, warn};

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()) // <- reads RUST_LOG
        .init();

    let config = config();
    let db = Arc::new(Db::connect(&config.database).await?);
    migrate::init(&db).await?;

    let state = AppState::new(db);
    let token = state.tokens.issue().await;
    info!("admin api token: {token}");

    serve(state, &config.server).await
}
