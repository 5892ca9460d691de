/*!
 * Storage for the global closed captions style and per-session overrides.
 *
 * Global style and overrides share one lock so that writers are serialized
 * and an effective-style resolution never observes a torn state.
 */

use std::collections::HashMap;

use log::{debug, info};
use parking_lot::RwLock;

use crate::errors::TextTrackResult;
use crate::session::SessionId;

use super::events::StyleEvent;
use super::models::{ClosedCaptionsStyle, StyleField};

/// Effective style for a session: its override when present, else the global style
pub fn resolve_effective_style<'a>(
    global: &'a ClosedCaptionsStyle,
    custom: Option<&'a ClosedCaptionsStyle>,
) -> &'a ClosedCaptionsStyle {
    custom.unwrap_or(global)
}

#[derive(Debug, Default)]
struct StyleState {
    global: ClosedCaptionsStyle,
    overrides: HashMap<SessionId, ClosedCaptionsStyle>,
}

/// Global style plus per-session overrides
#[derive(Debug, Default)]
pub struct StyleStore {
    state: RwLock<StyleState>,
}

impl StyleStore {
    /// Create a store seeded with an initial global style
    pub fn new(initial: ClosedCaptionsStyle) -> TextTrackResult<Self> {
        initial.validate()?;
        Ok(Self {
            state: RwLock::new(StyleState {
                global: initial,
                overrides: HashMap::new(),
            }),
        })
    }

    /// Snapshot of the global style
    pub fn global(&self) -> ClosedCaptionsStyle {
        self.state.read().global.clone()
    }

    /// Read from the global style without cloning all of it
    pub fn with_global<R>(&self, f: impl FnOnce(&ClosedCaptionsStyle) -> R) -> R {
        f(&self.state.read().global)
    }

    /// Replace the global style.
    ///
    /// Returns the events describing the change, always ending with the whole
    /// style; the caller delivers them after this call has released the lock.
    pub fn set_global(&self, style: ClosedCaptionsStyle) -> TextTrackResult<Vec<StyleEvent>> {
        style.validate()?;

        let mut state = self.state.write();
        let events = StyleEvent::changes_between(&state.global, &style);
        state.global = style;
        info!("Global closed captions style updated ({} field(s) changed)", events.len() - 1);
        Ok(events)
    }

    /// Replace one field of the global style
    pub fn set_global_field(&self, field: StyleField) -> TextTrackResult<Vec<StyleEvent>> {
        field.validate()?;

        let mut state = self.state.write();
        let mut updated = state.global.clone();
        let kind = field.kind();
        field.apply_to(&mut updated);

        let events = StyleEvent::changes_between(&state.global, &updated);
        if events.iter().any(StyleEvent::is_field_change) {
            state.global = updated;
            info!("Global closed captions style field {} updated", kind);
        } else {
            debug!("Global style field {} unchanged", kind);
        }
        Ok(events)
    }

    /// Install or replace the override for a session
    pub fn set_override(&self, session_id: SessionId, style: ClosedCaptionsStyle) -> TextTrackResult<()> {
        style.validate()?;
        self.state.write().overrides.insert(session_id, style);
        debug!("Custom style applied to session {}", session_id);
        Ok(())
    }

    /// Remove the override for a session; returns whether one existed
    pub fn clear_override(&self, session_id: SessionId) -> bool {
        self.state.write().overrides.remove(&session_id).is_some()
    }

    pub fn has_override(&self, session_id: SessionId) -> bool {
        self.state.read().overrides.contains_key(&session_id)
    }

    /// Effective style for a session
    pub fn effective_style(&self, session_id: SessionId) -> ClosedCaptionsStyle {
        let state = self.state.read();
        resolve_effective_style(&state.global, state.overrides.get(&session_id)).clone()
    }
}
