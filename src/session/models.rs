/*!
 * Session-level value types: identifiers, content modes and data packets.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{TextTrackError, TextTrackResult};

/// Identifier of a render session
pub type SessionId = u32;

/// Lowest selectable teletext page
pub const TELETEXT_PAGE_MIN: u16 = 100;

/// Highest selectable teletext page
pub const TELETEXT_PAGE_MAX: u16 = 899;

static SERVICE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(CC|TEXT|SERVICE)([1-9][0-9]?)$").expect("service pattern is valid")
});

/// Closed captions service selector: CC1-4 and TEXT1-4 (CEA-608), SERVICE1-64 (CEA-708)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CcService {
    Cc(u8),
    Text(u8),
    Service(u8),
}

impl FromStr for CcService {
    type Err = TextTrackError;

    fn from_str(s: &str) -> TextTrackResult<Self> {
        let invalid = || {
            TextTrackError::invalid_argument(format!(
                "service must be CC[1-4], TEXT[1-4] or SERVICE[1-64], got '{}'",
                s
            ))
        };

        let captures = SERVICE_PATTERN.captures(s).ok_or_else(invalid)?;
        let number: u8 = captures[2].parse().map_err(|_| invalid())?;
        match (&captures[1], number) {
            ("CC", 1..=4) => Ok(Self::Cc(number)),
            ("TEXT", 1..=4) => Ok(Self::Text(number)),
            ("SERVICE", 1..=64) => Ok(Self::Service(number)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for CcService {
    type Error = TextTrackError;

    fn try_from(value: String) -> TextTrackResult<Self> {
        value.parse()
    }
}

impl From<CcService> for String {
    fn from(service: CcService) -> Self {
        service.to_string()
    }
}

impl fmt::Display for CcService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cc(n) => write!(f, "CC{}", n),
            Self::Text(n) => write!(f, "TEXT{}", n),
            Self::Service(n) => write!(f, "SERVICE{}", n),
        }
    }
}

/// Kind of payload carried by `SendSessionData`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum DataType {
    Pes = 0,
    Ttml = 1,
    Cc = 2,
    Webvtt = 3,
}

impl TryFrom<u8> for DataType {
    type Error = TextTrackError;

    fn try_from(value: u8) -> TextTrackResult<Self> {
        match value {
            0 => Ok(Self::Pes),
            1 => Ok(Self::Ttml),
            2 => Ok(Self::Cc),
            3 => Ok(Self::Webvtt),
            _ => Err(TextTrackError::invalid_argument(format!(
                "unknown data type {}",
                value
            ))),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pes => "PES",
            Self::Ttml => "TTML",
            Self::Cc => "CC",
            Self::Webvtt => "WEBVTT",
        };
        f.write_str(name)
    }
}

/// Text track standard a session decodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ContentMode {
    #[default]
    Unset,
    ClosedCaptions {
        service: CcService,
    },
    Teletext {
        page: u16,
    },
    DvbSubtitle {
        composition_page_id: u16,
        ancillary_page_id: u16,
    },
    WebVtt,
    Ttml,
    Scte,
}

impl ContentMode {
    /// Teletext mode for a page within 100..=899
    pub fn teletext(page: u16) -> TextTrackResult<Self> {
        if (TELETEXT_PAGE_MIN..=TELETEXT_PAGE_MAX).contains(&page) {
            Ok(Self::Teletext { page })
        } else {
            Err(TextTrackError::invalid_argument(format!(
                "teletext page must be within {}..={}, got {}",
                TELETEXT_PAGE_MIN, TELETEXT_PAGE_MAX, page
            )))
        }
    }

    /// Payload type this mode consumes; `None` while unset.
    ///
    /// Teletext, DVB subtitles and SCTE-27 all arrive as PES packets.
    pub fn accepted_data_type(&self) -> Option<DataType> {
        match self {
            Self::Unset => None,
            Self::ClosedCaptions { .. } => Some(DataType::Cc),
            Self::Teletext { .. } | Self::DvbSubtitle { .. } | Self::Scte => Some(DataType::Pes),
            Self::WebVtt => Some(DataType::Webvtt),
            Self::Ttml => Some(DataType::Ttml),
        }
    }

    /// Text based renderers can show preview text; bitmap based ones cannot
    pub fn supports_preview(&self) -> bool {
        matches!(self, Self::ClosedCaptions { .. } | Self::WebVtt | Self::Ttml)
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::ClosedCaptions { service } => write!(f, "closed captions ({})", service),
            Self::Teletext { page } => write!(f, "teletext (page {})", page),
            Self::DvbSubtitle {
                composition_page_id,
                ancillary_page_id,
            } => write!(
                f,
                "dvb subtitle (composition {}, ancillary {})",
                composition_page_id, ancillary_page_id
            ),
            Self::WebVtt => write!(f, "webvtt"),
            Self::Ttml => write!(f, "ttml"),
            Self::Scte => write!(f, "scte"),
        }
    }
}

/// Payload accepted by a session, tagged with its arrival order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPacket {
    /// Per-session arrival sequence number, starting at 1
    pub sequence: u64,
    pub data_type: DataType,
    /// Carried through untouched; no behavior is attached to it
    pub display_offset_ms: i32,
    pub payload: String,
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Created, no content mode selected
    Open,
    /// A content mode has been selected
    ModeSelected,
    /// Torn down; the id is no longer valid
    Closed,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Open => write!(f, "open"),
            Lifecycle::ModeSelected => write!(f, "mode_selected"),
            Lifecycle::Closed => write!(f, "closed"),
        }
    }
}

/// Snapshot of a session for display and diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub display_handle: String,
    pub lifecycle: Lifecycle,
    pub paused: bool,
    pub muted: bool,
    pub content_mode: ContentMode,
    pub has_custom_style: bool,
    /// Packets held while paused
    pub held_packets: usize,
}
