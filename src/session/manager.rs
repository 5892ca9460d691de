/*!
 * Session manager: entry point for every session and style operation.
 *
 * This module handles:
 * - Opening, closing, resetting, pausing and muting render sessions
 * - Content mode selection and data/timestamp intake
 * - Global and per-session closed captions styles
 * - Style observer registration and change fan-out
 *
 * Every operation on a session id first checks the session is live, then
 * validates its arguments, then commits. Nothing is applied on failure.
 */

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use parking_lot::Mutex;

use crate::errors::{TextTrackError, TextTrackResult};
use crate::notification::{NotificationHub, ObserverId, StyleObserver};
use crate::render::RenderEngine;
use crate::style::{
    ClosedCaptionsStyle, FontEdge, FontFamily, FontSize, StyleEvent, StyleField, StyleFieldKind,
    StyleStore,
};

use super::models::{CcService, ContentMode, DataType, SessionId, SessionInfo};
use super::state::{Intake, SessionState};
use super::table::{Opened, Session, SessionTable};

/// Facade over sessions, styles and notifications
pub struct SessionManager {
    table: SessionTable,
    styles: StyleStore,
    hub: NotificationHub,
    engine: Arc<dyn RenderEngine>,
    /// Orders global style commits with their publication. Publishing only
    /// enqueues, so holders never wait on observers.
    style_commits: Mutex<()>,
}

impl SessionManager {
    /// Create a manager with the all-default global style
    pub fn new(engine: Arc<dyn RenderEngine>) -> Self {
        Self {
            table: SessionTable::new(),
            styles: StyleStore::default(),
            hub: NotificationHub::new(),
            engine,
            style_commits: Mutex::new(()),
        }
    }

    /// Create a manager seeded with an initial global style
    pub fn with_style(
        engine: Arc<dyn RenderEngine>,
        initial_style: ClosedCaptionsStyle,
    ) -> TextTrackResult<Self> {
        Ok(Self {
            styles: StyleStore::new(initial_style)?,
            ..Self::new(engine)
        })
    }

    /// Run `op` on a live session while holding its lock
    fn with_session<R>(
        &self,
        session_id: SessionId,
        op: &str,
        f: impl FnOnce(&Session, &mut SessionState) -> TextTrackResult<R>,
    ) -> TextTrackResult<R> {
        let result = self.table.get(session_id).and_then(|session| {
            let mut state = session.state.lock();
            if state.is_closed() {
                return Err(TextTrackError::SessionNotFound(session_id));
            }
            f(&session, &mut state)
        });

        match &result {
            Ok(_) => debug!("{} on session {}", op, session_id),
            Err(e) => debug!("{} on session {} rejected: {}", op, session_id, e),
        }
        result
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Open a session on a display, or return the session already using it
    pub fn open_session(&self, display_handle: &str) -> TextTrackResult<SessionId> {
        if display_handle.is_empty() {
            return Err(TextTrackError::invalid_argument("display handle is empty"));
        }

        let opened = self.table.open(display_handle, |session| {
            let id = session.id();
            self.engine.open(id, display_handle);
            self.engine.set_visible(id, false);
            self.engine.apply_style(id, &self.styles.effective_style(id));
        });

        match opened {
            Opened::Created(session) => {
                info!("Opened session {} on '{}'", session.id(), display_handle);
                Ok(session.id())
            }
            Opened::Existing(session) => {
                debug!("Reusing session {} on '{}'", session.id(), display_handle);
                Ok(session.id())
            }
        }
    }

    /// Close a session; its id becomes invalid
    pub fn close_session(&self, session_id: SessionId) -> TextTrackResult<()> {
        let session = self.table.remove(session_id)?;
        let mut state = session.state.lock();
        if state.is_closed() {
            return Err(TextTrackError::SessionNotFound(session_id));
        }

        state.close();
        self.styles.clear_override(session_id);
        self.engine.close(session_id);
        info!("Closed session {} on '{}'", session_id, session.display_handle());
        Ok(())
    }

    /// Clear the display and return to the opened presentation state.
    /// The content mode and mute state are kept.
    pub fn reset_session(&self, session_id: SessionId) -> TextTrackResult<()> {
        self.with_session(session_id, "reset", |_, state| {
            let dropped = state.reset();
            if dropped > 0 {
                debug!("Reset of session {} discarded {} held packet(s)", session_id, dropped);
            }
            self.engine.clear(session_id);
            Ok(())
        })
    }

    pub fn pause_session(&self, session_id: SessionId) -> TextTrackResult<()> {
        self.with_session(session_id, "pause", |_, state| {
            state.pause();
            Ok(())
        })
    }

    /// Resume a paused session, presenting held data in arrival order
    pub fn resume_session(&self, session_id: SessionId) -> TextTrackResult<()> {
        self.with_session(session_id, "resume", |_, state| {
            for packet in state.resume() {
                self.engine.present(session_id, &packet);
            }
            Ok(())
        })
    }

    pub fn mute_session(&self, session_id: SessionId) -> TextTrackResult<()> {
        self.with_session(session_id, "mute", |_, state| {
            state.mute();
            self.engine.set_visible(session_id, false);
            Ok(())
        })
    }

    pub fn unmute_session(&self, session_id: SessionId) -> TextTrackResult<()> {
        self.with_session(session_id, "unmute", |_, state| {
            state.unmute();
            self.engine.set_visible(session_id, true);
            Ok(())
        })
    }

    // =========================================================================
    // Data intake
    // =========================================================================

    /// Hand a payload to the session. `display_offset_ms` is carried but unused.
    pub fn send_session_data(
        &self,
        session_id: SessionId,
        data_type: DataType,
        display_offset_ms: i32,
        data: impl Into<String>,
    ) -> TextTrackResult<()> {
        self.with_session(session_id, "send data", |_, state| {
            match state.accept_data(data_type, display_offset_ms, data.into())? {
                Intake::Present(packet) => self.engine.present(session_id, &packet),
                Intake::Held => debug!(
                    "Session {} is paused, holding packet ({} held)",
                    session_id,
                    state.held_count()
                ),
            }
            Ok(())
        })
    }

    /// Forward a media clock sample as-is
    pub fn send_session_timestamp(
        &self,
        session_id: SessionId,
        media_timestamp_ms: u64,
    ) -> TextTrackResult<()> {
        self.with_session(session_id, "send timestamp", |_, _| {
            self.engine.timestamp(session_id, media_timestamp_ms);
            Ok(())
        })
    }

    /// Show static preview text when the session's mode and the engine allow it
    pub fn set_preview_text(&self, session_id: SessionId, text: &str) -> TextTrackResult<()> {
        self.with_session(session_id, "preview", |_, state| {
            state.check_preview()?;
            if !self.engine.preview_available() {
                return Err(TextTrackError::NotSupported(
                    "render engine has preview disabled".to_string(),
                ));
            }
            self.engine.preview(session_id, text);
            Ok(())
        })
    }

    // =========================================================================
    // Mode selection (every selection re-mutes the session)
    // =========================================================================

    fn select_mode(
        &self,
        session_id: SessionId,
        mode: impl FnOnce() -> TextTrackResult<ContentMode>,
    ) -> TextTrackResult<()> {
        self.with_session(session_id, "select mode", |_, state| {
            let mode = mode()?;
            let dropped = state.select_mode(mode);
            if dropped > 0 {
                debug!("Mode change on session {} discarded {} held packet(s)", session_id, dropped);
            }
            self.engine.set_mode(session_id, &mode);
            self.engine.set_visible(session_id, false);
            info!("Session {} switched to {} (muted)", session_id, mode);
            Ok(())
        })
    }

    /// Closed captions mode; `service` is CC1-4, TEXT1-4 or SERVICE1-64
    pub fn set_session_closed_captions_service(
        &self,
        session_id: SessionId,
        service: &str,
    ) -> TextTrackResult<()> {
        self.select_mode(session_id, || {
            let service: CcService = service.parse()?;
            Ok(ContentMode::ClosedCaptions { service })
        })
    }

    /// Teletext mode on a caption page within 100..=899
    pub fn set_session_teletext_selection(
        &self,
        session_id: SessionId,
        page: u16,
    ) -> TextTrackResult<()> {
        self.select_mode(session_id, || ContentMode::teletext(page))
    }

    /// DVB subtitle mode (ETSI EN 300 743 page ids)
    pub fn set_session_dvb_subtitle_selection(
        &self,
        session_id: SessionId,
        composition_page_id: u16,
        ancillary_page_id: u16,
    ) -> TextTrackResult<()> {
        self.select_mode(session_id, || {
            Ok(ContentMode::DvbSubtitle {
                composition_page_id,
                ancillary_page_id,
            })
        })
    }

    pub fn set_session_webvtt_selection(&self, session_id: SessionId) -> TextTrackResult<()> {
        self.select_mode(session_id, || Ok(ContentMode::WebVtt))
    }

    pub fn set_session_ttml_selection(&self, session_id: SessionId) -> TextTrackResult<()> {
        self.select_mode(session_id, || Ok(ContentMode::Ttml))
    }

    pub fn set_session_scte_selection(&self, session_id: SessionId) -> TextTrackResult<()> {
        self.select_mode(session_id, || Ok(ContentMode::Scte))
    }

    // =========================================================================
    // Global style
    // =========================================================================

    fn commit_global(
        &self,
        commit: impl FnOnce(&StyleStore) -> TextTrackResult<Vec<StyleEvent>>,
    ) -> TextTrackResult<()> {
        let changed = {
            let _order = self.style_commits.lock();
            let events = commit(&self.styles)?;
            let changed = events.iter().any(StyleEvent::is_field_change);
            self.hub.publish(events);
            changed
        };

        if changed {
            self.propagate_global_style();
        }
        Ok(())
    }

    /// Push the current global style to every session without a custom style
    fn propagate_global_style(&self) {
        for session in self.table.sessions() {
            let id = session.id();
            let state = session.state.lock();
            if state.is_closed() || self.styles.has_override(id) {
                continue;
            }
            self.engine.apply_style(id, &self.styles.effective_style(id));
        }
    }

    /// Replace the global style
    pub fn set_closed_captions_style(&self, style: ClosedCaptionsStyle) -> TextTrackResult<()> {
        self.commit_global(|styles| styles.set_global(style))
    }

    pub fn get_closed_captions_style(&self) -> ClosedCaptionsStyle {
        self.styles.global()
    }

    /// Replace a single field of the global style
    pub fn set_style_field(&self, field: StyleField) -> TextTrackResult<()> {
        self.commit_global(|styles| styles.set_global_field(field))
    }

    pub fn get_style_field(&self, kind: StyleFieldKind) -> StyleField {
        self.styles.with_global(|style| style.field(kind))
    }

    pub fn set_font_family(&self, font: FontFamily) -> TextTrackResult<()> {
        self.set_style_field(StyleField::FontFamily(font))
    }

    pub fn get_font_family(&self) -> FontFamily {
        self.styles.with_global(|s| s.font_family)
    }

    pub fn set_font_size(&self, size: FontSize) -> TextTrackResult<()> {
        self.set_style_field(StyleField::FontSize(size))
    }

    pub fn get_font_size(&self) -> FontSize {
        self.styles.with_global(|s| s.font_size)
    }

    pub fn set_font_color(&self, color: &str) -> TextTrackResult<()> {
        self.set_style_field(StyleField::FontColor(color.to_string()))
    }

    pub fn get_font_color(&self) -> String {
        self.styles.with_global(|s| s.font_color.clone())
    }

    pub fn set_font_opacity(&self, opacity: i8) -> TextTrackResult<()> {
        self.set_style_field(StyleField::FontOpacity(opacity))
    }

    pub fn get_font_opacity(&self) -> i8 {
        self.styles.with_global(|s| s.font_opacity)
    }

    pub fn set_font_edge(&self, edge: FontEdge) -> TextTrackResult<()> {
        self.set_style_field(StyleField::FontEdge(edge))
    }

    pub fn get_font_edge(&self) -> FontEdge {
        self.styles.with_global(|s| s.font_edge)
    }

    pub fn set_font_edge_color(&self, color: &str) -> TextTrackResult<()> {
        self.set_style_field(StyleField::FontEdgeColor(color.to_string()))
    }

    pub fn get_font_edge_color(&self) -> String {
        self.styles.with_global(|s| s.font_edge_color.clone())
    }

    pub fn set_background_color(&self, color: &str) -> TextTrackResult<()> {
        self.set_style_field(StyleField::BackgroundColor(color.to_string()))
    }

    pub fn get_background_color(&self) -> String {
        self.styles.with_global(|s| s.background_color.clone())
    }

    pub fn set_background_opacity(&self, opacity: i8) -> TextTrackResult<()> {
        self.set_style_field(StyleField::BackgroundOpacity(opacity))
    }

    pub fn get_background_opacity(&self) -> i8 {
        self.styles.with_global(|s| s.background_opacity)
    }

    pub fn set_window_color(&self, color: &str) -> TextTrackResult<()> {
        self.set_style_field(StyleField::WindowColor(color.to_string()))
    }

    pub fn get_window_color(&self) -> String {
        self.styles.with_global(|s| s.window_color.clone())
    }

    pub fn set_window_opacity(&self, opacity: i8) -> TextTrackResult<()> {
        self.set_style_field(StyleField::WindowOpacity(opacity))
    }

    pub fn get_window_opacity(&self) -> i8 {
        self.styles.with_global(|s| s.window_opacity)
    }

    // =========================================================================
    // Per-session style
    // =========================================================================

    /// Give a session its own style; it stops following global changes
    pub fn apply_custom_style_to_session(
        &self,
        session_id: SessionId,
        style: ClosedCaptionsStyle,
    ) -> TextTrackResult<()> {
        self.with_session(session_id, "apply custom style", |_, _| {
            self.styles.set_override(session_id, style.clone())?;
            self.engine.apply_style(session_id, &style);
            Ok(())
        })
    }

    /// Drop a session's custom style; it follows the global style again
    pub fn clear_custom_style_from_session(&self, session_id: SessionId) -> TextTrackResult<()> {
        self.with_session(session_id, "clear custom style", |_, _| {
            if self.styles.clear_override(session_id) {
                self.engine
                    .apply_style(session_id, &self.styles.effective_style(session_id));
            }
            Ok(())
        })
    }

    /// Style currently applied to a session
    pub fn effective_style(&self, session_id: SessionId) -> TextTrackResult<ClosedCaptionsStyle> {
        self.with_session(session_id, "effective style", |_, _| {
            Ok(self.styles.effective_style(session_id))
        })
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Register a style observer; it immediately receives the current global style
    pub fn register(&self, observer: Arc<dyn StyleObserver>) -> TextTrackResult<ObserverId> {
        self.hub.register(observer, || self.styles.global())
    }

    pub fn unregister(&self, observer: &Arc<dyn StyleObserver>) -> TextTrackResult<ObserverId> {
        self.hub.unregister(observer)
    }

    /// Wait for queued style notifications to be delivered; false on timeout
    pub fn wait_for_notifications(&self, timeout: Duration) -> bool {
        self.hub.wait_idle(timeout)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    fn info_for(&self, session: &Session, state: &SessionState) -> SessionInfo {
        SessionInfo {
            id: session.id(),
            display_handle: session.display_handle().to_string(),
            lifecycle: state.lifecycle(),
            paused: state.is_paused(),
            muted: state.is_muted(),
            content_mode: *state.mode(),
            has_custom_style: self.styles.has_override(session.id()),
            held_packets: state.held_count(),
        }
    }

    pub fn session_info(&self, session_id: SessionId) -> TextTrackResult<SessionInfo> {
        self.with_session(session_id, "info", |session, state| {
            Ok(self.info_for(session, state))
        })
    }

    /// Snapshot of every live session, ordered by id
    pub fn sessions(&self) -> Vec<SessionInfo> {
        self.table
            .sessions()
            .iter()
            .filter_map(|session| {
                let state = session.state.lock();
                (!state.is_closed()).then(|| self.info_for(session, &state))
            })
            .collect()
    }
}
