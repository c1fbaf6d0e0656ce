// =============================================================================
// COMMENT STORE
// =============================================================================
//
// Request/response channel to whatever keeps comments between viewers.
//
// The overlay only needs two calls: submit a new comment and fetch the whole
// sorted set for the current video. Both answer with the full set.
//
// =============================================================================

pub mod memory;
pub mod wire;

pub use memory::MemoryStore;
pub use wire::{comments_from_wire, WireComment, WireError, WireResponse};

use crate::core::Comment;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreResponse {
    pub accepted: bool,
    pub all_comments: Vec<Comment>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("comment store unreachable: {0}")]
    Transport(String),
    #[error("comment store rejected the request")]
    Rejected,
    #[error("malformed store response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid comment record: {0}")]
    Wire(#[from] WireError),
}

pub trait CommentStore {
    fn submit(&mut self, comment: &Comment) -> Result<StoreResponse, StoreError>;
    fn fetch(&mut self) -> Result<StoreResponse, StoreError>;
}

/// Decode a raw store reply body.
pub fn decode_response(body: &str) -> Result<StoreResponse, StoreError> {
    let response: WireResponse = serde_json::from_str(body)?;
    Ok(StoreResponse {
        accepted: response.send_success,
        all_comments: comments_from_wire(response.bullet_screen_content),
    })
}
