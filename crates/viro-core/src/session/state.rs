//! SessionState domain model.

use crate::history::HistoryLog;
use crate::identity::UserIdentity;
use serde::Serialize;

/// Everything the presentation layer needs to render one session.
///
/// A session owns exactly one `SessionState`. It starts empty and is reset
/// to empty when the user signs out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    /// The signed-in user, if any
    pub current_user: Option<UserIdentity>,
    /// The current user's history; empty when nobody is signed in
    pub history: HistoryLog,
    /// Whether a generation request is in flight
    pub is_generating: bool,
    /// Last user-visible error message
    pub last_error: Option<String>,
    /// Text of the last successful generation
    pub last_result: Option<String>,
    /// Topic of the last submission
    pub last_topic: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user.is_some()
    }
}
