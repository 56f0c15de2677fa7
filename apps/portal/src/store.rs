use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::session::Session;
use crate::wizard::Wizard;

/// Owner of all per-browser state: sessions and the wizard each one has open.
///
/// Handlers only ever get clones or short closures over the entries; no lock
/// is held across a backend call.
#[derive(Default)]
pub struct PortalStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    wizards: RwLock<HashMap<Uuid, Wizard>>,
}

impl PortalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_session(&self, session: Session) {
        self.sessions.write().await.insert(session.id, session);
    }

    pub async fn session(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Drops the session and any wizard it had open.
    pub async fn remove_session(&self, id: Uuid) -> Option<Session> {
        self.wizards.write().await.remove(&id);
        self.sessions.write().await.remove(&id)
    }

    /// Opens a wizard for the session, replacing one already open.
    pub async fn open_wizard(&self, session_id: Uuid, wizard: Wizard) {
        self.wizards.write().await.insert(session_id, wizard);
    }

    pub async fn close_wizard(&self, session_id: Uuid) -> Option<Wizard> {
        self.wizards.write().await.remove(&session_id)
    }

    /// Closes the session's wizard only while it is still the one with `wizard_id`.
    pub async fn close_wizard_if(&self, session_id: Uuid, wizard_id: Uuid) -> Option<Wizard> {
        let mut wizards = self.wizards.write().await;
        if wizards.get(&session_id).map(Wizard::id) == Some(wizard_id) {
            wizards.remove(&session_id)
        } else {
            None
        }
    }

    pub async fn read_wizard<R>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&Wizard) -> R,
    ) -> Option<R> {
        self.wizards.read().await.get(&session_id).map(f)
    }

    pub async fn with_wizard<R>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut Wizard) -> R,
    ) -> Option<R> {
        self.wizards.write().await.get_mut(&session_id).map(f)
    }
}
