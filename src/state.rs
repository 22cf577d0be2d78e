use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::session::SessionState;

/// In-memory session states, keyed by the `quiz_session` cookie token.
///
/// Session state is ephemeral by design; restarting the server simply
/// starts everyone on a fresh run.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionState>>>,
}

impl SessionStore {
    pub async fn get(&self, token: Uuid) -> Option<SessionState> {
        self.inner.read().await.get(&token).cloned()
    }

    pub async fn put(&self, token: Uuid, state: SessionState) {
        self.inner.write().await.insert(token, state);
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub sessions: SessionStore,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
