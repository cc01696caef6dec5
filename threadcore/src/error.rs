use thiserror::Error;

use crate::controller::Generation;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("no thread is open")]
    NoThread,
    #[error("stale update for generation {got}, current is {current}")]
    StaleGeneration { got: Generation, current: Generation },
}
