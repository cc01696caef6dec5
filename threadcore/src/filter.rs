use std::collections::HashSet;

use crate::types::MessageId;

/// Message ids hidden from the list (blocked senders, moderated content).
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    ids: HashSet<MessageId>,
}

impl BlockList {
    pub fn new(ids: impl IntoIterator<Item = MessageId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn is_blocked(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Visible ids, order preserved.
    pub fn filter<'a>(&'a self, ids: &'a [MessageId]) -> impl Iterator<Item = &'a MessageId> + 'a {
        ids.iter().filter(move |id| !self.is_blocked(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keeps_order() {
        let ids: Vec<MessageId> = ["a", "b", "c", "d"].into_iter().map(MessageId::from).collect();
        let blocked = BlockList::new(["b".into(), "zz".into()]);
        let visible: Vec<_> = blocked.filter(&ids).map(|id| id.as_str()).collect();
        assert_eq!(visible, vec!["a", "c", "d"]);
        assert_eq!(blocked.len(), 2);
    }
}
