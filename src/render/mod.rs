/*!
 * Boundary to the downstream text rendering engine.
 *
 * The engine decodes accepted payloads, composites glyphs and times their
 * presentation. The session manager only tells it what was accepted and how
 * a session is configured.
 */

pub mod memory;

pub use memory::{MemoryRenderer, RenderedSession};

use crate::session::{ContentMode, DataPacket, SessionId};
use crate::style::ClosedCaptionsStyle;

/// Downstream rendering engine.
///
/// Calls for one session never interleave; calls for different sessions may
/// arrive concurrently.
pub trait RenderEngine: Send + Sync {
    /// A session was created on a display
    fn open(&self, session_id: SessionId, display_handle: &str);

    /// A session was closed; release its windows and surfaces
    fn close(&self, session_id: SessionId);

    /// Clear whatever the session currently shows
    fn clear(&self, session_id: SessionId);

    fn set_mode(&self, session_id: SessionId, mode: &ContentMode);

    fn set_visible(&self, session_id: SessionId, visible: bool);

    /// Present an accepted payload
    fn present(&self, session_id: SessionId, packet: &DataPacket);

    /// Media clock sample used to time presentation
    fn timestamp(&self, session_id: SessionId, media_timestamp_ms: u64);

    /// The effective style of the session changed
    fn apply_style(&self, session_id: SessionId, style: &ClosedCaptionsStyle);

    /// Whether this engine can show preview text at all
    fn preview_available(&self) -> bool {
        true
    }

    fn preview(&self, session_id: SessionId, text: &str);
}
