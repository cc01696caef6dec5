//! Loads another page when the rendered messages don't fill the viewport, so
//! the list becomes scrollable and the edge-triggered load can take over.
//!
//! The re-entry guard is the window length: the guard fires at most once per
//! window length, and only after every windowed record has settled. Each fire
//! therefore needs the window to grow first, which bounds the number of fires
//! by the number of pages.

use log::trace;

/// Layout and loading measurements taken after a render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillProbe {
    pub content_height: f32,
    pub viewport_height: f32,
    /// Ids in the window, before any filtering.
    pub window_len: usize,
    /// Windowed records still loading.
    pub pending: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillDecision {
    /// Load the next page now.
    Fill,
    /// Underfilled, but waiting for records to settle or for the last fill to land.
    Waiting,
    Idle,
}

#[derive(Debug, Clone, Default)]
pub struct FillGuard {
    slack: f32,
    fired_at: Option<usize>,
}

impl FillGuard {
    pub fn new(slack: f32) -> Self {
        Self {
            slack,
            fired_at: None,
        }
    }

    pub fn check(&mut self, probe: FillProbe) -> FillDecision {
        let underfilled = probe.content_height + self.slack < probe.viewport_height;
        if !underfilled || !probe.has_more {
            self.fired_at = None;
            return FillDecision::Idle;
        }
        if probe.pending > 0 || self.fired_at == Some(probe.window_len) {
            trace!(
                target: "Window/Fill",
                "Underfilled, waiting (pending={}, window={})",
                probe.pending,
                probe.window_len
            );
            return FillDecision::Waiting;
        }
        self.fired_at = Some(probe.window_len);
        FillDecision::Fill
    }

    pub fn reset(&mut self) {
        self.fired_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(content: f32, window_len: usize, pending: usize) -> FillProbe {
        FillProbe {
            content_height: content,
            viewport_height: 800.0,
            window_len,
            pending,
            has_more: true,
        }
    }

    #[test]
    fn test_fires_once_per_window_length() {
        let mut guard = FillGuard::default();
        assert_eq!(guard.check(probe(200.0, 15, 0)), FillDecision::Fill);

        // Same measurements again, nothing grew: must not spin.
        for _ in 0..1000 {
            assert_eq!(guard.check(probe(200.0, 15, 0)), FillDecision::Waiting);
        }

        // Window grew but the new page is still loading.
        assert_eq!(guard.check(probe(200.0, 30, 15)), FillDecision::Waiting);
        // Loaded, still underfilled.
        assert_eq!(guard.check(probe(500.0, 30, 0)), FillDecision::Fill);
    }

    #[test]
    fn test_idle_when_filled_or_nothing_left() {
        let mut guard = FillGuard::default();
        assert_eq!(guard.check(probe(900.0, 15, 0)), FillDecision::Idle);

        let mut done = probe(100.0, 15, 0);
        done.has_more = false;
        assert_eq!(guard.check(done), FillDecision::Idle);
    }

    #[test]
    fn test_marker_clears_once_filled() {
        let mut guard = FillGuard::default();
        assert_eq!(guard.check(probe(200.0, 15, 0)), FillDecision::Fill);
        assert_eq!(guard.check(probe(900.0, 15, 0)), FillDecision::Idle);
        // Viewport grew (window resize) at the same window length.
        assert_eq!(guard.check(probe(200.0, 15, 0)), FillDecision::Fill);
    }

    #[test]
    fn test_slack() {
        let mut guard = FillGuard::new(100.0);
        assert_eq!(guard.check(probe(750.0, 15, 0)), FillDecision::Idle);
        assert_eq!(guard.check(probe(650.0, 15, 0)), FillDecision::Fill);
    }

    #[test]
    fn test_fire_count_bounded_by_pages() {
        // Simulate a driver that advances on every Fill with content that never fills.
        let mut guard = FillGuard::default();
        let (total, page) = (47usize, 5usize);
        let mut window_len = page;
        let mut fires = 0;
        for _ in 0..10_000 {
            let p = FillProbe {
                content_height: 10.0,
                viewport_height: 800.0,
                window_len,
                pending: 0,
                has_more: window_len < total,
            };
            if guard.check(p) == FillDecision::Fill {
                fires += 1;
                window_len = (window_len + page).min(total);
            }
        }
        assert_eq!(window_len, total);
        assert_eq!(fires, total.div_ceil(page) - 1);
    }
}
