use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::MessageId;
use crate::window::Anchor;

/// Messages windowed per page.
pub const DEFAULT_PAGE_SIZE: usize = 15;
/// Distance in pixels from the loaded edge at which the list asks for more.
pub const DEFAULT_SCROLL_THRESHOLD: f32 = 1000.0;
const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub page_size: usize,
    pub anchor: Anchor,
    pub scroll_threshold: f32,
    /// Added to the content height before comparing it with the viewport.
    pub fill_slack: f32,
    /// How long scroll-to-message waits for the target's record.
    pub resolve_timeout_ms: u64,
    pub pinned_message: Option<MessageId>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            anchor: Anchor::default(),
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            fill_slack: 0.0,
            resolve_timeout_ms: DEFAULT_RESOLVE_TIMEOUT_MS,
            pinned_message: None,
        }
    }
}

impl ListConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate();
        Ok(config)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    /// Logs settings that make the list inert. They are not rejected.
    pub fn validate(&self) {
        if self.page_size == 0 {
            warn!(target: "Config", "page_size is 0, the window will never grow");
        }
        if self.scroll_threshold < 0.0 {
            warn!(target: "Config", "negative scroll_threshold {}, edge loading disabled", self.scroll_threshold);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ListConfig::from_json(r#"{ "page_size": 30, "anchor": "head" }"#).unwrap();
        assert_eq!(config.page_size, 30);
        assert_eq!(config.anchor, Anchor::Head);
        assert_eq!(config.scroll_threshold, DEFAULT_SCROLL_THRESHOLD);
        assert_eq!(config.resolve_timeout(), Duration::from_secs(10));
        assert!(config.pinned_message.is_none());
    }

    #[test]
    fn test_pinned_message() {
        let config = ListConfig::from_json(r#"{ "pinned_message": "0xabc-1" }"#).unwrap();
        assert_eq!(config.pinned_message, Some(MessageId::new("0xabc-1")));
    }

    #[test]
    fn test_bad_anchor_rejected() {
        assert!(ListConfig::from_json(r#"{ "anchor": "middle" }"#).is_err());
    }
}
