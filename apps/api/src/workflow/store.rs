use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::workflow::state::Workflow;

/// In-memory owner of every session's workflow. Nothing is persisted.
///
/// Closures passed to `update`/`read` run under the lock and must stay synchronous;
/// remote calls happen between two `update`s, never inside one.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Workflow>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, Workflow::new());
        id
    }

    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Workflow) -> T,
    ) -> Result<T, AppError> {
        let mut sessions = self.sessions.write().await;
        let workflow = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        workflow.touch();
        Ok(f(workflow))
    }

    pub async fn read<T>(&self, id: Uuid, f: impl FnOnce(&Workflow) -> T) -> Result<T, AppError> {
        let sessions = self.sessions.read().await;
        let workflow = sessions.get(&id).ok_or_else(|| not_found(id))?;
        Ok(f(workflow))
    }

    /// Abandons a session. Completions still in flight for it find nothing to update.
    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session with no `update` for longer than `ttl`. Returns how many went.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, wf| wf.idle_for() <= ttl);
        before - sessions.len()
    }

    /// Background sweep calling `evict_idle` every `every`.
    pub fn spawn_sweeper(&self, ttl: Duration, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(ttl).await;
                if evicted > 0 {
                    info!("Evicted {evicted} idle session(s)");
                }
            }
        })
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
