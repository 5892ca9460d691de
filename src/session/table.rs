/*!
 * Table of live sessions, indexed by id and by display handle.
 */

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::{TextTrackError, TextTrackResult};

use super::models::SessionId;
use super::state::SessionState;

/// A live session. The state mutex serializes every operation on the session.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    display_handle: String,
    pub(crate) state: Mutex<SessionState>,
}

impl Session {
    fn new(id: SessionId, display_handle: String) -> Self {
        Self {
            id,
            display_handle,
            state: Mutex::new(SessionState::new()),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn display_handle(&self) -> &str {
        &self.display_handle
    }
}

/// Result of an open request
#[derive(Debug, Clone)]
pub enum Opened {
    Created(Arc<Session>),
    Existing(Arc<Session>),
}

impl Opened {
    pub fn session(&self) -> &Arc<Session> {
        match self {
            Opened::Created(s) | Opened::Existing(s) => s,
        }
    }
}

#[derive(Debug)]
struct TableInner {
    by_id: HashMap<SessionId, Arc<Session>>,
    by_handle: HashMap<String, SessionId>,
    next_id: SessionId,
}

impl TableInner {
    fn allocate_id(&mut self) -> SessionId {
        loop {
            let candidate = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            if candidate != 0 && !self.by_id.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

/// Owner of every live session
#[derive(Debug)]
pub struct SessionTable {
    inner: Mutex<TableInner>,
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTable {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TableInner {
                by_id: HashMap::new(),
                by_handle: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Open a session on a display handle, reusing the live one if any.
    ///
    /// `on_create` runs under the table lock, before any other caller can
    /// see the new session.
    pub fn open(&self, display_handle: &str, on_create: impl FnOnce(&Session)) -> Opened {
        let mut inner = self.inner.lock();
        if let Some(session) = inner
            .by_handle
            .get(display_handle)
            .and_then(|id| inner.by_id.get(id))
        {
            return Opened::Existing(Arc::clone(session));
        }

        let id = inner.allocate_id();
        let session = Arc::new(Session::new(id, display_handle.to_string()));
        on_create(&session);
        inner.by_id.insert(id, Arc::clone(&session));
        inner.by_handle.insert(display_handle.to_string(), id);
        Opened::Created(session)
    }

    /// Look up a live session
    pub fn get(&self, id: SessionId) -> TextTrackResult<Arc<Session>> {
        self.inner
            .lock()
            .by_id
            .get(&id)
            .cloned()
            .ok_or(TextTrackError::SessionNotFound(id))
    }

    /// Remove a session from the table; its id and handle become free
    pub fn remove(&self, id: SessionId) -> TextTrackResult<Arc<Session>> {
        let mut inner = self.inner.lock();
        let session = inner
            .by_id
            .remove(&id)
            .ok_or(TextTrackError::SessionNotFound(id))?;
        inner.by_handle.remove(session.display_handle());
        Ok(session)
    }

    /// Snapshot of all live sessions, ordered by id
    pub fn sessions(&self) -> Vec<Arc<Session>> {
        let mut sessions: Vec<Arc<Session>> = self.inner.lock().by_id.values().cloned().collect();
        sessions.sort_by_key(|s| s.id());
        sessions
    }

    pub fn len(&self) -> usize {
        self.inner.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
