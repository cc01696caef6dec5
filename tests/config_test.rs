use std::io::Write;

use threadview::Anchor;
use threadview::config::{ConfigError, load};

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "page_size": 25, "anchor": "head", "pinned_message": "0x1-9" }}"#).unwrap();

    let config = load(file.path()).unwrap();
    assert_eq!(config.page_size, 25);
    assert_eq!(config.anchor, Anchor::Head);
    assert_eq!(config.pinned_message.unwrap().as_str(), "0x1-9");
    assert_eq!(config.scroll_threshold, 1000.0);
}

#[test]
fn test_load_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(matches!(load(&missing), Err(ConfigError::Io(_))));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ page_size: }").unwrap();
    assert!(matches!(load(&bad), Err(ConfigError::Parse(_))));
}
