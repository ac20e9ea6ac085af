use log::info;
use report_common::model::publish::{PublishSession, SessionView};
use report_common::{ReportError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Publish attempts in progress, keyed by session id.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, PublishSession>>>,
}

impl SessionStore {
    pub async fn insert(&self, session: PublishSession) -> SessionView {
        let view = session.view();
        self.sessions
            .write()
            .await
            .insert(session.id().to_string(), session);
        view
    }

    pub async fn view(&self, session_id: &str) -> Result<SessionView> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(PublishSession::view)
            .ok_or_else(|| ReportError::SessionNotFound(session_id.to_string()))
    }

    /// Drops a session and the table it holds.
    pub async fn remove(&self, session_id: &str) -> Result<()> {
        self.sessions
            .write()
            .await
            .remove(session_id)
            .map(|session| info!("closed publish session {} at {}", session_id, session.step()))
            .ok_or_else(|| ReportError::SessionNotFound(session_id.to_string()))
    }

    /// Runs `f` against one session under the write lock. Session methods
    /// leave the session unchanged when they fail.
    pub async fn update<T, F>(&self, session_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut PublishSession) -> Result<T>,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| ReportError::SessionNotFound(session_id.to_string()))?;
        f(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_common::model::publish::PublishStep;
    use report_common::model::template::Template;

    #[tokio::test]
    async fn update_reaches_the_stored_session() {
        let store = SessionStore::default();
        let view = store
            .insert(PublishSession::new(Template::new("A").unwrap()))
            .await;
        assert_eq!(view.step, PublishStep::Upload);

        let err = store.update(&view.id, |s| s.advance()).await.unwrap_err();
        assert!(matches!(err, ReportError::MissingField(_)));
        assert!(matches!(
            store.view("nope").await,
            Err(ReportError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn removed_sessions_are_gone() {
        let store = SessionStore::default();
        let view = store
            .insert(PublishSession::new(Template::new("A").unwrap()))
            .await;
        store.remove(&view.id).await.unwrap();
        assert!(matches!(
            store.view(&view.id).await,
            Err(ReportError::SessionNotFound(_))
        ));
        assert!(store.remove(&view.id).await.is_err());
    }
}
