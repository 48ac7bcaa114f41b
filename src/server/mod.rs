//! HTTP API.
//!
//! Axum-based JSON API mounted under `/ghost/api/v0.1`. Every settings route
//! requires a bearer token; successful edits answer with an
//! `X-Cache-Invalidate: /*` header so downstream caches drop their copies.

crate::reexport!(auth);
#[cfg(test)]
mod api_tests;

use crate::{Db, Result, ServerConfig, Setting, SettingsStore, info};
use axum::extract::{Path, State};
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const API_PREFIX: &str = "/ghost/api/v0.1";
const CACHE_INVALIDATE: &str = "x-cache-invalidate";

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: SettingsStore,
    pub tokens: Tokens,
}

impl AppState {
    pub fn new(db: Arc<Db>) -> Self {
        Self {
            settings: SettingsStore::new(db),
            tokens: Tokens::default(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/settings/", get(browse_settings).put(edit_settings))
        .route("/settings/{key}/", get(read_setting));
    Router::new()
        .route("/", get(|| async { "quill ok" }))
        .nest(API_PREFIX, api)
        .with_state(state)
}

pub async fn serve(state: AppState, config: &ServerConfig) -> Result {
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[derive(Serialize)]
struct SettingsBody {
    settings: Vec<Setting>,
}

#[derive(Deserialize)]
struct SettingsPatch {
    settings: Vec<SettingPatch>,
}

#[derive(Deserialize)]
struct SettingPatch {
    key: String,
    #[serde(default)]
    value: Option<serde_json::Value>,
}

impl SettingPatch {
    /// Settings values are stored as text; non-string JSON values keep their
    /// JSON rendering.
    fn value_as_text(&self) -> Option<String> {
        match &self.value {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(value)) => Some(value.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

async fn browse_settings(
    _auth: Authenticated,
    State(state): State<AppState>,
) -> Result<Json<SettingsBody>> {
    let settings = state.settings.browse().await?;
    Ok(Json(SettingsBody { settings }))
}

async fn read_setting(
    _auth: Authenticated,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SettingsBody>> {
    let setting = state.settings.read(&key).await?;
    Ok(Json(SettingsBody {
        settings: vec![setting],
    }))
}

async fn edit_settings(
    _auth: Authenticated,
    State(state): State<AppState>,
    Json(body): Json<SettingsPatch>,
) -> Result<impl IntoResponse> {
    let mut updated = Vec::with_capacity(body.settings.len());
    for patch in &body.settings {
        let value = patch.value_as_text();
        updated.push(state.settings.edit(&patch.key, value).await?);
    }
    Ok((
        AppendHeaders([(CACHE_INVALIDATE, "/*")]),
        Json(SettingsBody { settings: updated }),
    ))
}
