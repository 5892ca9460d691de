/*!
 * In-process render engine that records what it is told.
 *
 * Used by the command line front end and by tests to observe the effects of
 * session operations without a display.
 */

use std::collections::HashMap;

use log::trace;
use parking_lot::RwLock;
use serde::Serialize;

use crate::session::{ContentMode, DataPacket, SessionId};
use crate::style::ClosedCaptionsStyle;

use super::RenderEngine;

/// Recorded state of one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedSession {
    pub display_handle: String,
    pub mode: ContentMode,
    pub visible: bool,
    /// Packets presented since the last clear, in presentation order
    pub presented: Vec<DataPacket>,
    pub last_timestamp_ms: Option<u64>,
    pub timestamps_received: usize,
    pub style: Option<ClosedCaptionsStyle>,
    pub preview_text: Option<String>,
    pub clear_count: usize,
}

impl RenderedSession {
    /// What a viewer would see: nothing while hidden
    pub fn on_screen(&self) -> Vec<&DataPacket> {
        if self.visible {
            self.presented.iter().collect()
        } else {
            Vec::new()
        }
    }
}

/// Recording render engine
#[derive(Debug)]
pub struct MemoryRenderer {
    sessions: RwLock<HashMap<SessionId, RenderedSession>>,
    closed: RwLock<Vec<SessionId>>,
    preview_enabled: bool,
}

impl Default for MemoryRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MemoryRenderer {
    pub fn new(preview_enabled: bool) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            closed: RwLock::new(Vec::new()),
            preview_enabled,
        }
    }

    /// Recorded state of an open session
    pub fn session(&self, session_id: SessionId) -> Option<RenderedSession> {
        self.sessions.read().get(&session_id).cloned()
    }

    /// Ids of sessions that were closed, in close order
    pub fn closed_sessions(&self) -> Vec<SessionId> {
        self.closed.read().clone()
    }

    fn update(&self, session_id: SessionId, f: impl FnOnce(&mut RenderedSession)) {
        if let Some(session) = self.sessions.write().get_mut(&session_id) {
            f(session);
        }
    }
}

impl RenderEngine for MemoryRenderer {
    fn open(&self, session_id: SessionId, display_handle: &str) {
        trace!("render: open {} on '{}'", session_id, display_handle);
        self.sessions.write().insert(
            session_id,
            RenderedSession {
                display_handle: display_handle.to_string(),
                ..Default::default()
            },
        );
    }

    fn close(&self, session_id: SessionId) {
        trace!("render: close {}", session_id);
        self.sessions.write().remove(&session_id);
        self.closed.write().push(session_id);
    }

    fn clear(&self, session_id: SessionId) {
        self.update(session_id, |s| {
            s.presented.clear();
            s.preview_text = None;
            s.clear_count += 1;
        });
    }

    fn set_mode(&self, session_id: SessionId, mode: &ContentMode) {
        self.update(session_id, |s| s.mode = *mode);
    }

    fn set_visible(&self, session_id: SessionId, visible: bool) {
        self.update(session_id, |s| s.visible = visible);
    }

    fn present(&self, session_id: SessionId, packet: &DataPacket) {
        trace!("render: present #{} on {}", packet.sequence, session_id);
        self.update(session_id, |s| s.presented.push(packet.clone()));
    }

    fn timestamp(&self, session_id: SessionId, media_timestamp_ms: u64) {
        self.update(session_id, |s| {
            s.last_timestamp_ms = Some(media_timestamp_ms);
            s.timestamps_received += 1;
        });
    }

    fn apply_style(&self, session_id: SessionId, style: &ClosedCaptionsStyle) {
        self.update(session_id, |s| s.style = Some(style.clone()));
    }

    fn preview_available(&self) -> bool {
        self.preview_enabled
    }

    fn preview(&self, session_id: SessionId, text: &str) {
        self.update(session_id, |s| s.preview_text = Some(text.to_string()));
    }
}
