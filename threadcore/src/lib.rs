// Platform-independent chat list state. Nothing in here spawns tasks or awaits;
// the async orchestration lives in the `threadview` crate.
pub mod config;
pub mod controller;
pub mod error;
pub mod fill;
pub mod filter;
pub mod search;
pub mod snapshot;
pub mod types;
pub mod window;

pub use config::ListConfig;
pub use controller::{Advance, Generation, SearchTicket, WindowController};
pub use error::WindowError;
pub use fill::{FillDecision, FillGuard, FillProbe};
pub use filter::BlockList;
pub use search::{ScrollSearch, SearchStep};
pub use snapshot::{ListItem, ListSnapshot};
pub use types::{MessageId, MessageRecord, RecordMap, RecordState, ThreadId};
pub use window::{Anchor, Window};
