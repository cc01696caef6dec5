// Re-export the platform-independent state so callers need one dependency.
pub use threadcore::{
    Advance, Anchor, BlockList, FillDecision, Generation, ListConfig, ListItem, ListSnapshot,
    MessageId, MessageRecord, RecordMap, RecordState, ThreadId,
};

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod index;
pub mod memory_fetcher;
pub mod scroll;
pub mod view;

pub use cache::{QueryCache, RecordFetcher, RecordSource};
pub use events::ViewEvent;
pub use index::{MemoryIndex, MessageIdIndex};
pub use memory_fetcher::MemoryFetcher;
pub use scroll::ScrollOutcome;
pub use view::ThreadView;
