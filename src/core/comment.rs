use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a comment. Local submissions use authoring milliseconds, fetched
/// comments carry whatever key the store issued.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    /// Scale relative to the base font ("1em", "1.5em", "2em").
    pub fn em(self) -> f64 {
        match self {
            FontSize::Small => 1.0,
            FontSize::Medium => 1.5,
            FontSize::Large => 2.0,
        }
    }

    pub fn to_css(self) -> &'static str {
        match self {
            FontSize::Small => "1em",
            FontSize::Medium => "1.5em",
            FontSize::Large => "2em",
        }
    }

    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim() {
            "1em" | "small" => Some(FontSize::Small),
            "1.5em" | "medium" => Some(FontSize::Medium),
            "2em" | "large" => Some(FontSize::Large),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Mode {
    /// Stationary, stacked from the top of the surface.
    Top,
    /// Traverses the surface right to left.
    #[default]
    Move,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Top => "top",
            Mode::Move => "move",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "top" => Some(Mode::Top),
            "move" => Some(Mode::Move),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub font_size: FontSize,
    pub color: String,
    pub mode: Mode,
    /// Whole playback second at which the comment appears.
    pub scheduled_time: u64,
    /// Authoring wall-clock time, opaque metadata.
    pub authored_at: String,
}

impl Comment {
    /// Playback second a locally authored comment is stamped with.
    /// Top comments never land on second zero.
    pub fn scheduled_time_for(position: f64, mode: Mode) -> u64 {
        let second = if position.is_finite() && position > 0.0 {
            position.floor() as u64
        } else {
            0
        };

        if second == 0 && mode == Mode::Top {
            1
        } else {
            second
        }
    }
}

/// What a user typed into the send box, before it becomes a [`Comment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSubmission {
    pub text: String,
    pub font_size: FontSize,
    pub mode: Mode,
    pub color: String,
}

impl LocalSubmission {
    pub fn new(text: impl Into<String>, font_size: FontSize, mode: Mode, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size,
            mode,
            color: color.into(),
        }
    }
}
