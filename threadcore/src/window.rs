//! Page-based window over a thread's ordered id list.
//!
//! The window stores how many pages are loaded rather than a fixed length, so
//! new ids arriving in the index never shrink or reset it. Its materialized
//! length over a list of `n` ids is `min(page_size * pages, n)`.

use serde::{Deserialize, Serialize};

use crate::types::MessageId;

/// Which end of the id list the window is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Prefix of the list. Use when the index yields newest-first.
    Head,
    /// Suffix of the list. Use when the index yields oldest-first.
    #[default]
    Tail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    page_size: usize,
    pages: usize,
    anchor: Anchor,
}

impl Window {
    /// Initial window of a freshly opened thread: one page.
    pub fn reset(page_size: usize, anchor: Anchor) -> Self {
        Self {
            page_size,
            pages: 1,
            anchor,
        }
    }

    /// A window with nothing loaded yet.
    pub fn empty(page_size: usize, anchor: Anchor) -> Self {
        Self {
            page_size,
            pages: 0,
            anchor,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn len(&self, total: usize) -> usize {
        self.page_size.saturating_mul(self.pages).min(total)
    }

    pub fn is_empty(&self, total: usize) -> bool {
        self.len(total) == 0
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.len(total) < total
    }

    /// Grows the window by one page. Returns false (and changes nothing) when
    /// the window already covers `total` or the page size is zero.
    pub fn advance(&mut self, total: usize) -> bool {
        if self.page_size == 0 || !self.has_more(total) {
            return false;
        }
        self.pages += 1;
        true
    }

    /// The windowed part of `ids`, in list order.
    pub fn slice<'a>(&self, ids: &'a [MessageId]) -> &'a [MessageId] {
        let len = self.len(ids.len());
        match self.anchor {
            Anchor::Head => &ids[..len],
            Anchor::Tail => &ids[ids.len() - len..],
        }
    }

    pub fn contains(&self, ids: &[MessageId], id: &MessageId) -> bool {
        self.slice(ids).contains(id)
    }
}
