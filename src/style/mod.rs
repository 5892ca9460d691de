/*!
 * Closed captions style handling.
 *
 * - `models`: the style value object, its enumerations and validation
 * - `events`: change notifications and change detection
 * - `store`: global style and per-session overrides
 */

pub mod events;
pub mod models;
pub mod store;

// Re-export main types
pub use events::StyleEvent;
pub use models::{
    ClosedCaptionsStyle, FontEdge, FontFamily, FontSize, StyleField, StyleFieldKind,
    CONTENT_DEFAULT_OPACITY,
};
pub use store::{resolve_effective_style, StyleStore};
