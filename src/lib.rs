/*!
 * # texttrack - Text track rendering session manager
 *
 * A Rust library for managing text-track rendering sessions of a media
 * player: closed captions, teletext, DVB subtitles, WebVTT, TTML and SCTE.
 *
 * ## Features
 *
 * - Open one render session per display, reused on repeated opens
 * - Select the content mode of a session (every selection re-mutes it)
 * - Feed payloads and media timestamps, with pause/resume holding data in order
 * - Global closed captions style with per-field setters and getters
 * - Per-session custom styles that stop following global changes
 * - Style change notifications to registered observers
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `style`: Closed captions style values, change detection and storage
 * - `notification`: Observer registry and fan-out of style events
 * - `session`: Session table, state machine and the `SessionManager` facade
 * - `render`: Boundary to the downstream render engine, plus an in-memory engine
 * - `app_controller`: Script-driven controller used by the command line tool
 * - `errors`: Error types and status codes
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod notification;
pub mod render;
pub mod session;
pub mod style;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ObserverError, StatusCode, TextTrackError, TextTrackResult};
pub use notification::{NotificationHub, ObserverId, StyleObserver};
pub use render::{MemoryRenderer, RenderEngine};
pub use session::{CcService, ContentMode, DataType, SessionId, SessionInfo, SessionManager};
pub use style::{ClosedCaptionsStyle, FontEdge, FontFamily, FontSize, StyleEvent, StyleField};
