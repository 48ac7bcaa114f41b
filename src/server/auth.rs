use crate::Error;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Opaque bearer-token store. How tokens are granted is someone else's problem;
/// this only answers "is this token valid right now".
#[derive(Clone, Default)]
pub struct Tokens {
    inner: Arc<RwLock<HashSet<String>>>,
}

impl Tokens {
    pub async fn issue(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.inner.write().await.insert(token.clone());
        token
    }

    pub async fn is_valid(&self, token: &str) -> bool {
        self.inner.read().await.contains(token)
    }

    pub async fn revoke(&self, token: &str) -> bool {
        self.inner.write().await.remove(token)
    }
}

/// Extractor that rejects requests without a valid `Authorization: Bearer`
/// header before the handler body runs.
pub struct Authenticated;

impl FromRequestParts<super::AppState> for Authenticated {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &super::AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let token = header.strip_prefix("Bearer ").unwrap_or_default();
        if !token.is_empty() && state.tokens.is_valid(token).await {
            Ok(Authenticated)
        } else {
            Err(Error::Unauthorized)
        }
    }
}
