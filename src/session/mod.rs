pub mod controller;

pub use controller::{Controller, EditRetryPolicy};

use std::fmt;

/// Identity of one conversation: a user inside a chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub chat_id: String,
    pub user_id: String,
}

impl SessionKey {
    pub fn new(chat_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            user_id: user_id.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chat_id, self.user_id)
    }
}
