use serde::{Deserialize, Deserializer, Serialize};

use crate::core::{Comment, CommentId, FontSize, Mode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("unknown font size: {0}")]
    UnknownFontSize(String),
    #[error("unknown mode: {0}")]
    UnknownMode(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

/// A comment record as the store sends and receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireComment {
    #[serde(default)]
    pub font_size: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "seconds_from_number_or_string")]
    pub play_time: u64,
    #[serde(default)]
    pub date: String,
}

/// The store's reply to both submit and fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireResponse {
    pub send_success: bool,
    #[serde(default)]
    pub bullet_screen_content: Vec<WireComment>,
}

fn seconds_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Int(u64),
        Float(f64),
        Text(String),
    }

    let seconds = match Seconds::deserialize(deserializer)? {
        Seconds::Int(value) => value,
        Seconds::Float(value) => value.max(0.0).floor() as u64,
        Seconds::Text(text) => {
            let text = text.trim();
            match text.parse::<u64>() {
                Ok(value) => value,
                Err(_) => match text.parse::<f64>() {
                    Ok(value) if value.is_finite() => value.max(0.0).floor() as u64,
                    _ => {
                        return Err(<D::Error as serde::de::Error>::custom(format!(
                            "invalid playTime: {:?}",
                            text
                        )))
                    }
                },
            }
        }
    };
    Ok(seconds)
}

impl WireComment {
    /// Every field a submission needs is present. Anything less is a fetch.
    pub fn is_complete(&self) -> bool {
        !self.font_size.is_empty()
            && !self.user_id.is_empty()
            && !self.mode.is_empty()
            && !self.color.is_empty()
            && !self.message.is_empty()
            && !self.date.is_empty()
    }
}

impl From<&Comment> for WireComment {
    fn from(comment: &Comment) -> Self {
        Self {
            font_size: comment.font_size.to_css().to_string(),
            user_id: comment.id.to_string(),
            mode: comment.mode.as_str().to_string(),
            color: comment.color.clone(),
            message: comment.text.clone(),
            play_time: comment.scheduled_time,
            date: comment.authored_at.clone(),
        }
    }
}

impl TryFrom<WireComment> for Comment {
    type Error = WireError;

    fn try_from(wire: WireComment) -> Result<Self, Self::Error> {
        if wire.user_id.is_empty() {
            return Err(WireError::MissingField("userId"));
        }
        if wire.message.is_empty() {
            return Err(WireError::MissingField("message"));
        }
        let font_size = FontSize::from_css(&wire.font_size)
            .ok_or_else(|| WireError::UnknownFontSize(wire.font_size.clone()))?;
        let mode = Mode::parse(&wire.mode)
            .ok_or_else(|| WireError::UnknownMode(wire.mode.clone()))?;

        Ok(Comment {
            id: CommentId::new(wire.user_id),
            text: wire.message,
            font_size,
            color: if wire.color.is_empty() { "#fff".to_string() } else { wire.color },
            mode,
            scheduled_time: wire.play_time,
            authored_at: wire.date,
        })
    }
}

/// Convert a fetched record set, skipping rows that do not describe a comment.
pub fn comments_from_wire(rows: Vec<WireComment>) -> Vec<Comment> {
    rows.into_iter()
        .filter_map(|row| {
            let user_id = row.user_id.clone();
            match Comment::try_from(row) {
                Ok(comment) => Some(comment),
                Err(e) => {
                    log::warn!("Skipping malformed comment record {:?}: {}", user_id, e);
                    None
                }
            }
        })
        .collect()
}
