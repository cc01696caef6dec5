//! Stepper behind scroll-to-message: grows the window until the target is
//! windowed and resolved, or the id list runs out.

use log::debug;

use crate::controller::{Advance, WindowController};
use crate::types::{MessageId, RecordState};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchStep {
    /// Target is windowed and resolved; scroll to it.
    Found,
    /// Target is windowed but its record is still loading.
    Waiting,
    /// Target is windowed but its record failed to load.
    Unavailable,
    /// The window grew by a page; step again.
    Advanced { from: usize, to: usize },
    /// The whole list is windowed and the target isn't in it.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct ScrollSearch {
    target: MessageId,
    advances: usize,
}

impl ScrollSearch {
    pub fn new(target: MessageId) -> Self {
        Self {
            target,
            advances: 0,
        }
    }

    pub fn target(&self) -> &MessageId {
        &self.target
    }

    /// Number of pages this search added to the window.
    pub fn advances(&self) -> usize {
        self.advances
    }

    /// `lookup` reports the target's record state; it is only called once the
    /// target is windowed.
    pub fn step(
        &mut self,
        ctrl: &mut WindowController,
        lookup: impl FnOnce(&MessageId) -> RecordState,
    ) -> SearchStep {
        if ctrl.in_window(&self.target) {
            return match lookup(&self.target) {
                RecordState::Resolved(_) => SearchStep::Found,
                RecordState::Loading => SearchStep::Waiting,
                RecordState::Failed(_) => SearchStep::Unavailable,
            };
        }
        match ctrl.advance() {
            Advance::Grew { from, to } => {
                self.advances += 1;
                SearchStep::Advanced { from, to }
            }
            Advance::Exhausted | Advance::Paused => {
                debug!(
                    target: "Window/Search",
                    "{} not among {} ids after {} advances",
                    self.target,
                    ctrl.ids().len(),
                    self.advances
                );
                SearchStep::Exhausted
            }
        }
    }

    /// Steps until a terminal result, treating every windowed record as
    /// whatever `lookup` says. `Waiting` is returned as-is so the caller can
    /// wait for the record.
    pub fn run(
        &mut self,
        ctrl: &mut WindowController,
        mut lookup: impl FnMut(&MessageId) -> RecordState,
    ) -> SearchStep {
        loop {
            match self.step(ctrl, &mut lookup) {
                SearchStep::Advanced { .. } => continue,
                other => return other,
            }
        }
    }
}
