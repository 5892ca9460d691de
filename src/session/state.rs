/*!
 * Per-session lifecycle and mode-selection rules.
 *
 * Transitions here are pure: they update the session state and tell the
 * caller what to hand to the render engine. Pause/run and mute/unmute are
 * independent axes on top of the lifecycle.
 */

use std::collections::VecDeque;

use crate::errors::{TextTrackError, TextTrackResult};

use super::models::{ContentMode, DataPacket, DataType, Lifecycle};

/// What to do with a packet that was just accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intake {
    /// Present it now
    Present(DataPacket),
    /// Held until the session resumes
    Held,
}

/// State of one render session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    lifecycle: Lifecycle,
    mode: ContentMode,
    paused: bool,
    muted: bool,
    held: VecDeque<DataPacket>,
    next_sequence: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// A freshly opened session: muted, running, no content mode
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::Open,
            mode: ContentMode::Unset,
            paused: false,
            muted: true,
            held: VecDeque::new(),
            next_sequence: 1,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn mode(&self) -> &ContentMode {
        &self.mode
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle == Lifecycle::Closed
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Select a content mode.
    ///
    /// Replaces any previous mode together with its parameters, re-mutes the
    /// session and discards packets held for the previous mode.
    pub fn select_mode(&mut self, mode: ContentMode) -> usize {
        debug_assert!(mode.is_set(), "use reset to go back to the opened state");
        self.mode = mode;
        self.lifecycle = Lifecycle::ModeSelected;
        self.muted = true;
        let dropped = self.held.len();
        self.held.clear();
        dropped
    }

    /// Back to the opened presentation state.
    ///
    /// The display is cleared and held packets are discarded; the selected
    /// content mode and the mute flag are kept.
    pub fn reset(&mut self) -> usize {
        self.paused = false;
        let dropped = self.held.len();
        self.held.clear();
        dropped
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume presentation; returns held packets in arrival order
    pub fn resume(&mut self) -> Vec<DataPacket> {
        self.paused = false;
        self.held.drain(..).collect()
    }

    pub fn mute(&mut self) {
        self.muted = true;
    }

    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Accept a payload, checking it against the selected content mode
    pub fn accept_data(
        &mut self,
        data_type: DataType,
        display_offset_ms: i32,
        payload: String,
    ) -> TextTrackResult<Intake> {
        match self.mode.accepted_data_type() {
            None => {
                return Err(TextTrackError::invalid_state(
                    "no content mode selected".to_string(),
                ));
            }
            Some(expected) if expected != data_type => {
                return Err(TextTrackError::invalid_state(format!(
                    "{} data does not match {} mode (expects {})",
                    data_type, self.mode, expected
                )));
            }
            Some(_) => {}
        }

        let packet = DataPacket {
            sequence: self.next_sequence,
            data_type,
            display_offset_ms,
            payload,
        };
        self.next_sequence += 1;

        if self.paused {
            self.held.push_back(packet);
            Ok(Intake::Held)
        } else {
            Ok(Intake::Present(packet))
        }
    }

    /// Check preview text is possible in the current mode
    pub fn check_preview(&self) -> TextTrackResult<()> {
        if self.mode.supports_preview() {
            Ok(())
        } else {
            Err(TextTrackError::NotSupported(format!(
                "preview is not available in {} mode",
                self.mode
            )))
        }
    }

    /// Terminal transition; held packets are dropped
    pub fn close(&mut self) {
        self.lifecycle = Lifecycle::Closed;
        self.held.clear();
    }
}
