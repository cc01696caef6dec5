//! What the virtualized list renders: the windowed, filtered ids in display
//! order with their record states.

use crate::controller::{Generation, WindowController};
use crate::filter::BlockList;
use crate::types::{MessageId, RecordState, ThreadId};
use crate::window::Anchor;

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub id: MessageId,
    pub state: RecordState,
    pub is_last_read: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    pub thread: Option<ThreadId>,
    pub generation: Generation,
    /// Newest first: index 0 is the bottom row of the reversed list.
    pub items: Vec<ListItem>,
    /// Visible ids in the whole thread, windowed or not.
    pub total: usize,
    /// Items whose fetch has settled.
    pub loaded_count: usize,
    pub pending: usize,
    /// Ids in the window, before filtering.
    pub window_len: usize,
    pub has_more: bool,
    /// The thread has no messages at all.
    pub is_empty: bool,
    /// Everything is loaded: show the start-of-conversation notice on top.
    pub show_top_notice: bool,
    /// Visible messages newer than the last-read marker.
    pub unread_count: usize,
    pub scroll_threshold: f32,
}

impl ListSnapshot {
    pub fn build(
        ctrl: &WindowController,
        blocked: &BlockList,
        last_read: Option<&MessageId>,
        scroll_threshold: f32,
        mut lookup: impl FnMut(&MessageId) -> RecordState,
    ) -> Self {
        let anchor = ctrl.window().anchor();
        let mut items: Vec<ListItem> = blocked
            .filter(ctrl.window_ids())
            .map(|id| ListItem {
                id: id.clone(),
                state: lookup(id),
                is_last_read: last_read == Some(id),
            })
            .collect();
        if anchor == Anchor::Tail {
            items.reverse();
        }

        let visible: Vec<&MessageId> = blocked.filter(ctrl.ids()).collect();
        let total = visible.len();
        let loaded_count = items.iter().filter(|item| item.state.is_settled()).count();
        let pending = items.len() - loaded_count;
        let has_more = loaded_count < total;

        let unread_count = last_read
            .and_then(|marker| visible.iter().position(|id| *id == marker))
            .map(|pos| match anchor {
                Anchor::Tail => total - pos - 1,
                Anchor::Head => pos,
            })
            .unwrap_or(0);

        Self {
            thread: ctrl.thread().cloned(),
            generation: ctrl.generation(),
            total,
            loaded_count,
            pending,
            window_len: ctrl.window_len(),
            has_more,
            is_empty: ctrl.ids().is_empty(),
            show_top_notice: !has_more && !items.is_empty(),
            unread_count,
            scroll_threshold,
            items,
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, id: &MessageId) -> Option<&ListItem> {
        self.items.iter().find(|item| &item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRecord;
    use std::sync::Arc;

    fn list(n: usize) -> Arc<[MessageId]> {
        (0..n).map(|i| MessageId::new(format!("m{i}"))).collect()
    }

    fn resolved(id: &MessageId) -> RecordState {
        RecordState::Resolved(Arc::new(MessageRecord::new(id.clone(), "t".into(), "bob", "x")))
    }

    #[test]
    fn test_tail_window_renders_newest_first() {
        let mut ctrl = WindowController::new(3, Anchor::Tail);
        ctrl.open("t".into(), list(10));
        let snap = ListSnapshot::build(&ctrl, &BlockList::default(), None, 1000.0, resolved);
        let ids: Vec<_> = snap.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["m9", "m8", "m7"]);
        assert_eq!(snap.total, 10);
        assert!(snap.has_more);
        assert!(!snap.show_top_notice);
    }

    #[test]
    fn test_blocked_ids_hidden_and_not_counted() {
        let mut ctrl = WindowController::new(5, Anchor::Head);
        ctrl.open("t".into(), list(4));
        let blocked = BlockList::new(["m1".into()]);
        let snap = ListSnapshot::build(&ctrl, &blocked, None, 1000.0, resolved);
        assert_eq!(snap.item_count(), 3);
        assert_eq!(snap.total, 3);
        assert_eq!(snap.window_len, 4);
        assert!(!snap.has_more);
        assert!(snap.show_top_notice);
        assert!(snap.get(&"m1".into()).is_none());
    }

    #[test]
    fn test_loading_items_keep_has_more() {
        let mut ctrl = WindowController::new(5, Anchor::Head);
        ctrl.open("t".into(), list(4));
        let snap = ListSnapshot::build(&ctrl, &BlockList::default(), None, 1000.0, |id| {
            if id.as_str() == "m2" {
                RecordState::Loading
            } else {
                resolved(id)
            }
        });
        assert_eq!(snap.loaded_count, 3);
        assert_eq!(snap.pending, 1);
        assert!(snap.has_more);
    }

    #[test]
    fn test_unread_count() {
        let mut ctrl = WindowController::new(3, Anchor::Tail);
        ctrl.open("t".into(), list(10));
        let marker = MessageId::new("m6");
        let snap = ListSnapshot::build(&ctrl, &BlockList::default(), Some(&marker), 1000.0, resolved);
        assert_eq!(snap.unread_count, 3);
        assert!(snap.get(&marker).is_none());

        let marker = MessageId::new("m8");
        let snap = ListSnapshot::build(&ctrl, &BlockList::default(), Some(&marker), 1000.0, resolved);
        assert_eq!(snap.unread_count, 1);
        assert!(snap.get(&marker).unwrap().is_last_read);
    }

    #[test]
    fn test_empty_thread() {
        let mut ctrl = WindowController::new(3, Anchor::Tail);
        ctrl.open("t".into(), list(0));
        let snap = ListSnapshot::build(&ctrl, &BlockList::default(), None, 1000.0, resolved);
        assert!(snap.is_empty);
        assert!(!snap.has_more);
        assert!(!snap.show_top_notice);
    }
}
