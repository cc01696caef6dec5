//! Identifiers and record states shared by the windowing and loading code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(Arc::from(id.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(Arc::from(s))
            }
        }
    };
}

define_id! {
    /// Opaque content id of a message, unique within its thread.
    MessageId
}

define_id! {
    /// Opaque id of a chat thread.
    ThreadId
}

/// Resolved content of a single message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: MessageId,
    pub thread: ThreadId,
    pub sender: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    /// Id of the message this one replies to, if any.
    #[serde(default)]
    pub reply_to: Option<MessageId>,
}

impl MessageRecord {
    pub fn new(id: MessageId, thread: ThreadId, sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            thread,
            sender: sender.into(),
            body: body.into(),
            created_at: Utc::now(),
            reply_to: None,
        }
    }

    pub fn with_reply_to(mut self, target: MessageId) -> Self {
        self.reply_to = Some(target);
        self
    }
}

/// Per-id state of a record in the shared cache.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordState {
    Loading,
    Resolved(Arc<MessageRecord>),
    /// The fetch for this record failed. Only this row is affected.
    Failed(String),
}

impl RecordState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RecordState::Loading)
    }

    /// Settled means the fetch finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }

    pub fn record(&self) -> Option<&Arc<MessageRecord>> {
        match self {
            RecordState::Resolved(record) => Some(record),
            _ => None,
        }
    }
}

/// Id-keyed results so late resolutions patch the right slot no matter the
/// order they arrive in.
pub type RecordMap = HashMap<MessageId, RecordState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_compare_by_content() {
        let a = MessageId::new("0x1-42");
        let b: MessageId = "0x1-42".into();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0x1-42");
        assert_eq!(format!("{a:?}"), "MessageId(0x1-42)");
    }

    #[test]
    fn test_record_state_settled() {
        assert!(!RecordState::Loading.is_settled());
        assert!(RecordState::Failed("boom".into()).is_settled());

        let record = MessageRecord::new("m1".into(), "t1".into(), "alice", "hi");
        let state = RecordState::Resolved(Arc::new(record));
        assert!(state.is_settled());
        assert_eq!(state.record().map(|r| r.body.as_str()), Some("hi"));
    }

    #[test]
    fn test_record_serializes_ids_as_plain_strings() {
        let record = MessageRecord::new("m1".into(), "t1".into(), "alice", "hi")
            .with_reply_to("m0".into());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "m1");
        assert_eq!(json["reply_to"], "m0");
    }
}
