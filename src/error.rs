use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Query build error: {0}")]
    QueryBuild(#[from] sea_query::error::Error),

    #[error("No support for database client {0}")]
    UnsupportedClient(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown column: {0}.{1}")]
    UnknownColumn(String, String),

    #[error("Unable to find setting: {0}")]
    SettingNotFound(String),

    #[error("Access denied")]
    Unauthorized,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T = ()> = std::result::Result<T, Error>;

impl Error {
    /// Error type label carried in JSON error bodies.
    fn kind(&self) -> &'static str {
        match self {
            Error::SettingNotFound(_) => "NotFoundError",
            Error::Unauthorized => "UnauthorizedError",
            _ => "InternalServerError",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::SettingNotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            crate::error!("request failed: {self}");
        }
        let body = serde_json::json!({
            "errors": [{ "message": self.to_string(), "type": self.kind() }]
        });
        (status, Json(body)).into_response()
    }
}
