use crate::types::SessionAction;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Process-wide authenticated-user state.
pub trait SessionStore: Send + Sync {
    fn current_user(&self) -> Option<Value>;
    fn dispatch(&self, action: SessionAction);
}

#[derive(Clone, Default)]
pub struct SharedSession {
    user: Arc<RwLock<Option<Value>>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: Value) -> Self {
        Self {
            user: Arc::new(RwLock::new(Some(user))),
        }
    }

    pub fn logout(&self) {
        let mut guard = self.user.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

impl SessionStore for SharedSession {
    fn current_user(&self) -> Option<Value> {
        self.user
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn dispatch(&self, action: SessionAction) {
        match action {
            SessionAction::Login(payload) => {
                info!("Session updated after login");
                let mut guard = self.user.write().unwrap_or_else(|e| e.into_inner());
                *guard = Some(payload);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_replaces_current_user_for_all_clones() {
        let session = SharedSession::with_user(json!({ "id": 1 }));
        let handle = session.clone();

        handle.dispatch(SessionAction::Login(json!({ "id": 2 })));
        assert_eq!(session.current_user(), Some(json!({ "id": 2 })));

        session.logout();
        assert_eq!(handle.current_user(), None);
    }
}
