//! # Load State
//!
//! ```text
//!            load                ok
//!   Idle ──────────► Loading ──────────► Ready
//!                       │                  │
//!                       │ err              │ refresh
//!                       ▼                  ▼
//!                     Error ──refresh──► Loading
//! ```
//!
//! Mutations never change the state.

use std::sync::Arc;

use serde::Serialize;
use ts_rs::TS;

/// Load status of one resource cache, shared by all of its consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum AsyncState {
    /// Nothing requested yet.
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last load failed with this message.
    Error(String),
}

impl AsyncState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AsyncState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AsyncState::Ready)
    }

    /// The failure message, if the last load failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            AsyncState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Items and state as one consistent value.
///
/// Published on the cache's watch channel after every change.
#[derive(Debug)]
pub struct Snapshot<T> {
    pub items: Arc<Vec<T>>,
    pub state: AsyncState,
}

impl<T> Snapshot<T> {
    pub(crate) fn empty() -> Self {
        Snapshot {
            items: Arc::new(Vec::new()),
            state: AsyncState::Idle,
        }
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Snapshot {
            items: Arc::clone(&self.items),
            state: self.state.clone(),
        }
    }
}
