/*!
 * Closed captions style value types.
 *
 * Enumeration values follow CEA-708, with -1 meaning "use the stream default"
 * where the standard has no such value.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{TextTrackError, TextTrackResult};

/// Opacity value meaning "use the stream default"
pub const CONTENT_DEFAULT_OPACITY: i8 = -1;

/// Highest accepted opacity (fully solid)
pub const MAX_OPACITY: i8 = 100;

static COLOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?[0-9A-Fa-f]{6}$").expect("color pattern is valid"));

/// Font family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum FontFamily {
    #[default]
    ContentDefault = 0,
    MonospacedSerif = 1,
    ProportionalSerif = 2,
    MonospaceSansSerif = 3,
    ProportionalSansSerif = 4,
    Casual = 5,
    Cursive = 6,
    SmallCapital = 7,
}

impl TryFrom<u8> for FontFamily {
    type Error = TextTrackError;

    fn try_from(value: u8) -> TextTrackResult<Self> {
        match value {
            0 => Ok(Self::ContentDefault),
            1 => Ok(Self::MonospacedSerif),
            2 => Ok(Self::ProportionalSerif),
            3 => Ok(Self::MonospaceSansSerif),
            4 => Ok(Self::ProportionalSansSerif),
            5 => Ok(Self::Casual),
            6 => Ok(Self::Cursive),
            7 => Ok(Self::SmallCapital),
            _ => Err(TextTrackError::invalid_argument(format!(
                "unknown font family {}",
                value
            ))),
        }
    }
}

/// Font size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i8)]
pub enum FontSize {
    #[default]
    ContentDefault = -1,
    Small = 0,
    Regular = 1,
    Large = 2,
    ExtraLarge = 3,
}

impl TryFrom<i8> for FontSize {
    type Error = TextTrackError;

    fn try_from(value: i8) -> TextTrackResult<Self> {
        match value {
            -1 => Ok(Self::ContentDefault),
            0 => Ok(Self::Small),
            1 => Ok(Self::Regular),
            2 => Ok(Self::Large),
            3 => Ok(Self::ExtraLarge),
            _ => Err(TextTrackError::invalid_argument(format!(
                "unknown font size {}",
                value
            ))),
        }
    }
}

/// Font edge style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i8)]
pub enum FontEdge {
    #[default]
    ContentDefault = -1,
    None = 0,
    Raised = 1,
    Depressed = 2,
    Uniform = 3,
    LeftDropShadow = 4,
    RightDropShadow = 5,
}

impl TryFrom<i8> for FontEdge {
    type Error = TextTrackError;

    fn try_from(value: i8) -> TextTrackResult<Self> {
        match value {
            -1 => Ok(Self::ContentDefault),
            0 => Ok(Self::None),
            1 => Ok(Self::Raised),
            2 => Ok(Self::Depressed),
            3 => Ok(Self::Uniform),
            4 => Ok(Self::LeftDropShadow),
            5 => Ok(Self::RightDropShadow),
            _ => Err(TextTrackError::invalid_argument(format!(
                "unknown font edge {}",
                value
            ))),
        }
    }
}

/// Check a color string: empty (stream default) or six hex digits with an optional '#'
pub fn validate_color(name: &str, color: &str) -> TextTrackResult<()> {
    if color.is_empty() || COLOR_PATTERN.is_match(color) {
        Ok(())
    } else {
        Err(TextTrackError::invalid_argument(format!(
            "{} must be empty or #rrggbb, got '{}'",
            name, color
        )))
    }
}

/// Check an opacity: -1 (stream default) or 0-100
pub fn validate_opacity(name: &str, opacity: i8) -> TextTrackResult<()> {
    if opacity == CONTENT_DEFAULT_OPACITY || (0..=MAX_OPACITY).contains(&opacity) {
        Ok(())
    } else {
        Err(TextTrackError::invalid_argument(format!(
            "{} must be -1 or within 0..=100, got {}",
            name, opacity
        )))
    }
}

/// Complete closed captions style.
///
/// Color fields are empty for "use stream default"; opacity fields use
/// [`CONTENT_DEFAULT_OPACITY`] for the same purpose.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedCaptionsStyle {
    #[serde(default)]
    pub font_family: FontFamily,
    #[serde(default)]
    pub font_size: FontSize,
    #[serde(default)]
    pub font_color: String,
    #[serde(default = "default_opacity")]
    pub font_opacity: i8,
    #[serde(default)]
    pub font_edge: FontEdge,
    #[serde(default)]
    pub font_edge_color: String,
    #[serde(default)]
    pub background_color: String,
    #[serde(default = "default_opacity")]
    pub background_opacity: i8,
    #[serde(default)]
    pub window_color: String,
    #[serde(default = "default_opacity")]
    pub window_opacity: i8,
}

fn default_opacity() -> i8 {
    CONTENT_DEFAULT_OPACITY
}

impl Default for ClosedCaptionsStyle {
    fn default() -> Self {
        Self {
            font_family: FontFamily::ContentDefault,
            font_size: FontSize::ContentDefault,
            font_color: String::new(),
            font_opacity: CONTENT_DEFAULT_OPACITY,
            font_edge: FontEdge::ContentDefault,
            font_edge_color: String::new(),
            background_color: String::new(),
            background_opacity: CONTENT_DEFAULT_OPACITY,
            window_color: String::new(),
            window_opacity: CONTENT_DEFAULT_OPACITY,
        }
    }
}

impl ClosedCaptionsStyle {
    /// Validate every color and opacity field
    pub fn validate(&self) -> TextTrackResult<()> {
        validate_color("fontColor", &self.font_color)?;
        validate_color("fontEdgeColor", &self.font_edge_color)?;
        validate_color("backgroundColor", &self.background_color)?;
        validate_color("windowColor", &self.window_color)?;
        validate_opacity("fontOpacity", self.font_opacity)?;
        validate_opacity("backgroundOpacity", self.background_opacity)?;
        validate_opacity("windowOpacity", self.window_opacity)?;
        Ok(())
    }

    /// Read one field as a [`StyleField`]
    pub fn field(&self, kind: StyleFieldKind) -> StyleField {
        match kind {
            StyleFieldKind::FontFamily => StyleField::FontFamily(self.font_family),
            StyleFieldKind::FontSize => StyleField::FontSize(self.font_size),
            StyleFieldKind::FontColor => StyleField::FontColor(self.font_color.clone()),
            StyleFieldKind::FontOpacity => StyleField::FontOpacity(self.font_opacity),
            StyleFieldKind::FontEdge => StyleField::FontEdge(self.font_edge),
            StyleFieldKind::FontEdgeColor => StyleField::FontEdgeColor(self.font_edge_color.clone()),
            StyleFieldKind::BackgroundColor => {
                StyleField::BackgroundColor(self.background_color.clone())
            }
            StyleFieldKind::BackgroundOpacity => {
                StyleField::BackgroundOpacity(self.background_opacity)
            }
            StyleFieldKind::WindowColor => StyleField::WindowColor(self.window_color.clone()),
            StyleFieldKind::WindowOpacity => StyleField::WindowOpacity(self.window_opacity),
        }
    }
}

/// Identifies a single style field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleFieldKind {
    FontFamily,
    FontSize,
    FontColor,
    FontOpacity,
    FontEdge,
    FontEdgeColor,
    BackgroundColor,
    BackgroundOpacity,
    WindowColor,
    WindowOpacity,
}

impl StyleFieldKind {
    /// All fields in declaration order
    pub const ALL: [StyleFieldKind; 10] = [
        Self::FontFamily,
        Self::FontSize,
        Self::FontColor,
        Self::FontOpacity,
        Self::FontEdge,
        Self::FontEdgeColor,
        Self::BackgroundColor,
        Self::BackgroundOpacity,
        Self::WindowColor,
        Self::WindowOpacity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::FontFamily => "fontFamily",
            Self::FontSize => "fontSize",
            Self::FontColor => "fontColor",
            Self::FontOpacity => "fontOpacity",
            Self::FontEdge => "fontEdge",
            Self::FontEdgeColor => "fontEdgeColor",
            Self::BackgroundColor => "backgroundColor",
            Self::BackgroundOpacity => "backgroundOpacity",
            Self::WindowColor => "windowColor",
            Self::WindowOpacity => "windowOpacity",
        }
    }
}

impl fmt::Display for StyleFieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value for one style field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum StyleField {
    FontFamily(FontFamily),
    FontSize(FontSize),
    FontColor(String),
    FontOpacity(i8),
    FontEdge(FontEdge),
    FontEdgeColor(String),
    BackgroundColor(String),
    BackgroundOpacity(i8),
    WindowColor(String),
    WindowOpacity(i8),
}

impl StyleField {
    pub fn kind(&self) -> StyleFieldKind {
        match self {
            Self::FontFamily(_) => StyleFieldKind::FontFamily,
            Self::FontSize(_) => StyleFieldKind::FontSize,
            Self::FontColor(_) => StyleFieldKind::FontColor,
            Self::FontOpacity(_) => StyleFieldKind::FontOpacity,
            Self::FontEdge(_) => StyleFieldKind::FontEdge,
            Self::FontEdgeColor(_) => StyleFieldKind::FontEdgeColor,
            Self::BackgroundColor(_) => StyleFieldKind::BackgroundColor,
            Self::BackgroundOpacity(_) => StyleFieldKind::BackgroundOpacity,
            Self::WindowColor(_) => StyleFieldKind::WindowColor,
            Self::WindowOpacity(_) => StyleFieldKind::WindowOpacity,
        }
    }

    /// Validate this value in isolation
    pub fn validate(&self) -> TextTrackResult<()> {
        let name = self.kind().name();
        match self {
            Self::FontColor(c)
            | Self::FontEdgeColor(c)
            | Self::BackgroundColor(c)
            | Self::WindowColor(c) => validate_color(name, c),
            Self::FontOpacity(o) | Self::BackgroundOpacity(o) | Self::WindowOpacity(o) => {
                validate_opacity(name, *o)
            }
            Self::FontFamily(_) | Self::FontSize(_) | Self::FontEdge(_) => Ok(()),
        }
    }

    /// Write this value into a style
    pub fn apply_to(self, style: &mut ClosedCaptionsStyle) {
        match self {
            Self::FontFamily(v) => style.font_family = v,
            Self::FontSize(v) => style.font_size = v,
            Self::FontColor(v) => style.font_color = v,
            Self::FontOpacity(v) => style.font_opacity = v,
            Self::FontEdge(v) => style.font_edge = v,
            Self::FontEdgeColor(v) => style.font_edge_color = v,
            Self::BackgroundColor(v) => style.background_color = v,
            Self::BackgroundOpacity(v) => style.background_opacity = v,
            Self::WindowColor(v) => style.window_color = v,
            Self::WindowOpacity(v) => style.window_opacity = v,
        }
    }
}
