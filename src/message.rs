//! The ordered message set posted each cycle.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when constructing a message set.
#[derive(Debug, Error)]
pub enum MessageSetError {
    /// A message set needs at least a parent message.
    #[error("message set must contain at least one message")]
    Empty,
}

/// An ordered, non-empty sequence of messages.
///
/// The first message is the parent that establishes a thread; every
/// following message is posted as a reply in that thread, in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct MessageSet(Vec<String>);

impl MessageSet {
    /// Create a message set, rejecting an empty sequence.
    pub fn new(messages: Vec<String>) -> Result<Self, MessageSetError> {
        if messages.is_empty() {
            return Err(MessageSetError::Empty);
        }
        Ok(Self(messages))
    }

    /// The parent message that opens the thread.
    pub fn parent(&self) -> &str {
        &self.0[0]
    }

    /// The replies posted into the thread, in order.
    pub fn replies(&self) -> &[String] {
        &self.0[1..]
    }

    /// Total number of messages, parent included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a message set cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Vec<String>> for MessageSet {
    type Error = MessageSetError;

    fn try_from(messages: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(messages)
    }
}
