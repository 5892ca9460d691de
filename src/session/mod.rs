/*!
 * Render session management.
 *
 * This module provides:
 * - Session value types and content modes (`models`)
 * - The per-session state machine (`state`)
 * - The table of live sessions (`table`)
 * - The `SessionManager` facade implementing every session and style operation
 */

pub mod manager;
pub mod models;
pub mod state;
pub mod table;

// Re-export main types
pub use manager::SessionManager;
pub use models::{
    CcService, ContentMode, DataPacket, DataType, Lifecycle, SessionId, SessionInfo,
    TELETEXT_PAGE_MAX, TELETEXT_PAGE_MIN,
};
pub use state::{Intake, SessionState};
pub use table::{Session, SessionTable};
