use crate::core::Comment;
use crate::store::{comments_from_wire, CommentStore, StoreError, StoreResponse, WireComment, WireResponse};

/// Session-scoped store holding wire records in memory. Seed it from a JSON
/// fixture to replay an existing comment set.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Vec<WireComment>,
    submissions: usize,
    fetches: usize,
    failure: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comments(comments: &[Comment]) -> Self {
        Self {
            rows: comments.iter().map(WireComment::from).collect(),
            ..Self::default()
        }
    }

    /// Accepts either a full store reply or a bare array of records.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let rows = match serde_json::from_str::<WireResponse>(json) {
            Ok(response) => response.bullet_screen_content,
            Err(_) => serde_json::from_str::<Vec<WireComment>>(json)?,
        };
        Ok(Self {
            rows,
            ..Self::default()
        })
    }

    /// Make every following call fail with a transport error.
    pub fn fail_with(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }

    pub fn recover(&mut self) {
        self.failure = None;
    }

    pub fn submissions(&self) -> usize {
        self.submissions
    }

    pub fn fetches(&self) -> usize {
        self.fetches
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        match &self.failure {
            Some(reason) => Err(StoreError::Transport(reason.clone())),
            None => Ok(()),
        }
    }

    fn all_sorted(&self) -> StoreResponse {
        let mut rows = self.rows.clone();
        rows.sort_by_key(|row| row.play_time);
        StoreResponse {
            accepted: true,
            all_comments: comments_from_wire(rows),
        }
    }
}

impl CommentStore for MemoryStore {
    fn submit(&mut self, comment: &Comment) -> Result<StoreResponse, StoreError> {
        self.submissions += 1;
        self.check_reachable()?;

        let row = WireComment::from(comment);
        if row.is_complete() {
            if !self.rows.iter().any(|existing| existing.user_id == row.user_id) {
                self.rows.push(row);
            }
        } else {
            log::debug!("Incomplete record for {}, answering as a fetch", comment.id);
        }
        Ok(self.all_sorted())
    }

    fn fetch(&mut self) -> Result<StoreResponse, StoreError> {
        self.fetches += 1;
        self.check_reachable()?;
        Ok(self.all_sorted())
    }
}
