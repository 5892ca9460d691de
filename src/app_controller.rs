/*!
 * Script-driven application controller.
 *
 * A script is a JSON array of operations. The controller runs them in order
 * against a `SessionManager` backed by the in-memory render engine and
 * reports one outcome per step.
 *
 * Value arguments (styles, enum names, pages, opacities) are kept as raw JSON
 * until the step runs, so a malformed value fails that step with
 * `INVALID_ARGUMENT` instead of rejecting the whole script.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::{AppError, StatusCode, TextTrackError, TextTrackResult};
use crate::render::MemoryRenderer;
use crate::session::{DataType, SessionId, SessionManager};
use crate::style::{ClosedCaptionsStyle, StyleField, StyleFieldKind};

/// One scripted operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    OpenSession {
        display_handle: String,
    },
    CloseSession {
        session: SessionId,
    },
    ResetSession {
        session: SessionId,
    },
    PauseSession {
        session: SessionId,
    },
    ResumeSession {
        session: SessionId,
    },
    MuteSession {
        session: SessionId,
    },
    UnmuteSession {
        session: SessionId,
    },
    SendSessionData {
        session: SessionId,
        data_type: Value,
        #[serde(default)]
        display_offset_ms: i32,
        data: String,
    },
    SendSessionTimestamp {
        session: SessionId,
        media_timestamp_ms: u64,
    },
    SetPreviewText {
        session: SessionId,
        text: String,
    },
    SetSessionClosedCaptionsService {
        session: SessionId,
        service: String,
    },
    SetSessionTeletextSelection {
        session: SessionId,
        page: Value,
    },
    SetSessionDvbSubtitleSelection {
        session: SessionId,
        composition_page_id: Value,
        ancillary_page_id: Value,
    },
    SetSessionWebvttSelection {
        session: SessionId,
    },
    SetSessionTtmlSelection {
        session: SessionId,
    },
    SetSessionScteSelection {
        session: SessionId,
    },
    SetClosedCaptionsStyle {
        style: Value,
    },
    GetClosedCaptionsStyle,
    SetStyleField {
        change: Value,
    },
    GetStyleField {
        field: Value,
    },
    ApplyCustomStyleToSession {
        session: SessionId,
        style: Value,
    },
    ClearCustomStyleFromSession {
        session: SessionId,
    },
    GetEffectiveStyle {
        session: SessionId,
    },
    SessionInfo {
        session: SessionId,
    },
    ListSessions,
}

impl ScriptStep {
    // @returns: Operation name as written in scripts
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenSession { .. } => "open_session",
            Self::CloseSession { .. } => "close_session",
            Self::ResetSession { .. } => "reset_session",
            Self::PauseSession { .. } => "pause_session",
            Self::ResumeSession { .. } => "resume_session",
            Self::MuteSession { .. } => "mute_session",
            Self::UnmuteSession { .. } => "unmute_session",
            Self::SendSessionData { .. } => "send_session_data",
            Self::SendSessionTimestamp { .. } => "send_session_timestamp",
            Self::SetPreviewText { .. } => "set_preview_text",
            Self::SetSessionClosedCaptionsService { .. } => "set_session_closed_captions_service",
            Self::SetSessionTeletextSelection { .. } => "set_session_teletext_selection",
            Self::SetSessionDvbSubtitleSelection { .. } => "set_session_dvb_subtitle_selection",
            Self::SetSessionWebvttSelection { .. } => "set_session_webvtt_selection",
            Self::SetSessionTtmlSelection { .. } => "set_session_ttml_selection",
            Self::SetSessionScteSelection { .. } => "set_session_scte_selection",
            Self::SetClosedCaptionsStyle { .. } => "set_closed_captions_style",
            Self::GetClosedCaptionsStyle => "get_closed_captions_style",
            Self::SetStyleField { .. } => "set_style_field",
            Self::GetStyleField { .. } => "get_style_field",
            Self::ApplyCustomStyleToSession { .. } => "apply_custom_style_to_session",
            Self::ClearCustomStyleFromSession { .. } => "clear_custom_style_from_session",
            Self::GetEffectiveStyle { .. } => "get_effective_style",
            Self::SessionInfo { .. } => "session_info",
            Self::ListSessions => "list_sessions",
        }
    }
}

/// Result of one script step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub op: &'static str,
    pub status: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn to_value<T: Serialize>(value: T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

fn done(result: TextTrackResult<()>) -> TextTrackResult<Option<Value>> {
    result.map(|_| None)
}

/// Decode a raw script argument; a malformed value fails only its step
fn argument<T: DeserializeOwned>(name: &str, value: &Value) -> TextTrackResult<T> {
    T::deserialize(value)
        .map_err(|e| TextTrackError::invalid_argument(format!("{}: {}", name, e)))
}

/// Application controller
pub struct Controller {
    renderer: Arc<MemoryRenderer>,
    manager: SessionManager,
}

impl Controller {
    /// Build a controller from a validated configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let renderer = Arc::new(MemoryRenderer::new(config.renderer.preview_enabled));
        let manager = SessionManager::with_style(renderer.clone(), config.closed_captions_style)
            .context("Failed to initialise the session manager")?;

        Ok(Self { renderer, manager })
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn renderer(&self) -> &Arc<MemoryRenderer> {
        &self.renderer
    }

    /// Read a script file
    pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?;
        Self::parse_script(&content)
            .with_context(|| format!("Failed to parse script: {}", path.display()))
    }

    pub fn parse_script(content: &str) -> Result<Vec<ScriptStep>> {
        let steps: Vec<ScriptStep> = serde_json::from_str(content).map_err(AppError::from)?;
        Ok(steps)
    }

    /// Run every step, continuing past failures
    pub fn run(&self, steps: &[ScriptStep]) -> Vec<StepOutcome> {
        info!("Running script with {} step(s)", steps.len());
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let result = self.execute(step);
                let outcome = StepOutcome {
                    step: index + 1,
                    op: step.name(),
                    status: StatusCode::of(&result),
                    error: result.as_ref().err().map(|e| e.to_string()),
                    value: result.ok().flatten(),
                };
                debug!("Step {} {} -> {}", outcome.step, outcome.op, outcome.status);
                outcome
            })
            .collect()
    }

    /// Execute a single step
    pub fn execute(&self, step: &ScriptStep) -> TextTrackResult<Option<Value>> {
        let m = &self.manager;
        match step {
            ScriptStep::OpenSession { display_handle } => {
                m.open_session(display_handle).map(to_value)
            }
            ScriptStep::CloseSession { session } => done(m.close_session(*session)),
            ScriptStep::ResetSession { session } => done(m.reset_session(*session)),
            ScriptStep::PauseSession { session } => done(m.pause_session(*session)),
            ScriptStep::ResumeSession { session } => done(m.resume_session(*session)),
            ScriptStep::MuteSession { session } => done(m.mute_session(*session)),
            ScriptStep::UnmuteSession { session } => done(m.unmute_session(*session)),
            ScriptStep::SendSessionData {
                session,
                data_type,
                display_offset_ms,
                data,
            } => {
                self.require_session(*session)?;
                let data_type: DataType = argument("data_type", data_type)?;
                done(m.send_session_data(*session, data_type, *display_offset_ms, data.as_str()))
            }
            ScriptStep::SendSessionTimestamp {
                session,
                media_timestamp_ms,
            } => done(m.send_session_timestamp(*session, *media_timestamp_ms)),
            ScriptStep::SetPreviewText { session, text } => done(m.set_preview_text(*session, text)),
            ScriptStep::SetSessionClosedCaptionsService { session, service } => {
                done(m.set_session_closed_captions_service(*session, service))
            }
            ScriptStep::SetSessionTeletextSelection { session, page } => {
                self.require_session(*session)?;
                let page: u16 = argument("page", page)?;
                done(m.set_session_teletext_selection(*session, page))
            }
            ScriptStep::SetSessionDvbSubtitleSelection {
                session,
                composition_page_id,
                ancillary_page_id,
            } => {
                self.require_session(*session)?;
                let composition: u16 = argument("composition_page_id", composition_page_id)?;
                let ancillary: u16 = argument("ancillary_page_id", ancillary_page_id)?;
                done(m.set_session_dvb_subtitle_selection(*session, composition, ancillary))
            }
            ScriptStep::SetSessionWebvttSelection { session } => {
                done(m.set_session_webvtt_selection(*session))
            }
            ScriptStep::SetSessionTtmlSelection { session } => {
                done(m.set_session_ttml_selection(*session))
            }
            ScriptStep::SetSessionScteSelection { session } => {
                done(m.set_session_scte_selection(*session))
            }
            ScriptStep::SetClosedCaptionsStyle { style } => {
                let style: ClosedCaptionsStyle = argument("style", style)?;
                done(m.set_closed_captions_style(style))
            }
            ScriptStep::GetClosedCaptionsStyle => Ok(to_value(m.get_closed_captions_style())),
            ScriptStep::SetStyleField { change } => {
                let change: StyleField = argument("change", change)?;
                done(self.set_field(change))
            }
            ScriptStep::GetStyleField { field } => {
                let field: StyleFieldKind = argument("field", field)?;
                Ok(self.get_field(field))
            }
            ScriptStep::ApplyCustomStyleToSession { session, style } => {
                self.require_session(*session)?;
                let style: ClosedCaptionsStyle = argument("style", style)?;
                done(m.apply_custom_style_to_session(*session, style))
            }
            ScriptStep::ClearCustomStyleFromSession { session } => {
                done(m.clear_custom_style_from_session(*session))
            }
            ScriptStep::GetEffectiveStyle { session } => m.effective_style(*session).map(to_value),
            ScriptStep::SessionInfo { session } => m.session_info(*session).map(to_value),
            ScriptStep::ListSessions => Ok(to_value(m.sessions())),
        }
    }

    /// Unknown sessions are reported before malformed arguments
    fn require_session(&self, session: SessionId) -> TextTrackResult<()> {
        self.manager.session_info(session).map(|_| ())
    }

    fn set_field(&self, change: StyleField) -> TextTrackResult<()> {
        let m = &self.manager;
        match change {
            StyleField::FontFamily(v) => m.set_font_family(v),
            StyleField::FontSize(v) => m.set_font_size(v),
            StyleField::FontColor(v) => m.set_font_color(&v),
            StyleField::FontOpacity(v) => m.set_font_opacity(v),
            StyleField::FontEdge(v) => m.set_font_edge(v),
            StyleField::FontEdgeColor(v) => m.set_font_edge_color(&v),
            StyleField::BackgroundColor(v) => m.set_background_color(&v),
            StyleField::BackgroundOpacity(v) => m.set_background_opacity(v),
            StyleField::WindowColor(v) => m.set_window_color(&v),
            StyleField::WindowOpacity(v) => m.set_window_opacity(v),
        }
    }

    fn get_field(&self, kind: StyleFieldKind) -> Option<Value> {
        let m = &self.manager;
        match kind {
            StyleFieldKind::FontFamily => to_value(m.get_font_family()),
            StyleFieldKind::FontSize => to_value(m.get_font_size()),
            StyleFieldKind::FontColor => to_value(m.get_font_color()),
            StyleFieldKind::FontOpacity => to_value(m.get_font_opacity()),
            StyleFieldKind::FontEdge => to_value(m.get_font_edge()),
            StyleFieldKind::FontEdgeColor => to_value(m.get_font_edge_color()),
            StyleFieldKind::BackgroundColor => to_value(m.get_background_color()),
            StyleFieldKind::BackgroundOpacity => to_value(m.get_background_opacity()),
            StyleFieldKind::WindowColor => to_value(m.get_window_color()),
            StyleFieldKind::WindowOpacity => to_value(m.get_window_opacity()),
        }
    }
}
