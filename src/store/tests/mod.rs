//! Unit tests for the keyfile store.
//! Text in, text out; no filesystem involved.

use crate::store::{KeyFile, StoreError};

const SAMPLE: &str = "\
[connection]
id=office
autoconnect=false

[ipv4]
method=auto
dns=10.0.0.1;10.0.0.2;
";

#[test]
fn parse_groups_and_keys_in_order() {
    let kf = KeyFile::parse(SAMPLE).unwrap();

    let groups: Vec<_> = kf.groups().collect();
    assert_eq!(groups, vec!["connection", "ipv4"]);
    assert_eq!(kf.keys("connection"), vec!["id", "autoconnect"]);
}

#[test]
fn typed_getters() {
    let kf = KeyFile::parse(SAMPLE).unwrap();

    assert_eq!(kf.get_string("connection", "id").unwrap(), "office");
    assert!(!kf.get_bool("connection", "autoconnect").unwrap());
    assert_eq!(
        kf.get_string_list("ipv4", "dns").unwrap(),
        vec!["10.0.0.1", "10.0.0.2"]
    );
    assert!(kf.get_string("ipv4", "missing").is_none());
}

#[test]
fn has_key_distinguishes_missing_group() {
    let kf = KeyFile::parse(SAMPLE).unwrap();

    assert!(kf.has_key("ipv4", "method").unwrap());
    assert!(!kf.has_key("ipv4", "gateway").unwrap());
    assert!(matches!(
        kf.has_key("ipv6", "method"),
        Err(StoreError::GroupNotFound(_))
    ));
}

#[test]
fn parse_rejects_malformed_lines() {
    assert!(matches!(
        KeyFile::parse("key=value\n"),
        Err(StoreError::Parse { line: 1, .. })
    ));
    assert!(matches!(
        KeyFile::parse("[group\n"),
        Err(StoreError::Parse { line: 1, .. })
    ));
    assert!(matches!(
        KeyFile::parse("[g]\nno separator\n"),
        Err(StoreError::Parse { line: 2, .. })
    ));
}

#[test]
fn duplicate_keys_resolve_to_last() {
    let kf = KeyFile::parse("[g]\nk=first\nk=second\n").unwrap();

    assert_eq!(kf.keys("g"), vec!["k", "k"]);
    assert_eq!(kf.get_string("g", "k").unwrap(), "second");
}

#[test]
fn set_replaces_in_place_and_drops_duplicates() {
    let mut kf = KeyFile::parse("[g]\na=1\nk=first\nk=second\n").unwrap();

    kf.set_string("g", "k", "third");
    assert_eq!(kf.keys("g"), vec!["a", "k"]);
    assert_eq!(kf.get_string("g", "k").unwrap(), "third");
}

#[test]
fn serialize_roundtrip_preserves_escapes() {
    let mut kf = KeyFile::new();
    kf.set_string("wifi", "ssid", "my net\twith\ttabs");
    kf.set_string("wifi", "comment", "  leading spaces");
    kf.set_string_list(
        "ipv4",
        "dns-search",
        &["a;b".to_string(), "plain".to_string()],
    );

    let reparsed = KeyFile::parse(&kf.serialize()).unwrap();
    assert_eq!(
        reparsed.get_string("wifi", "ssid").unwrap(),
        "my net\twith\ttabs"
    );
    assert_eq!(
        reparsed.get_string("wifi", "comment").unwrap(),
        "  leading spaces"
    );
    assert_eq!(
        reparsed.get_string_list("ipv4", "dns-search").unwrap(),
        vec!["a;b", "plain"]
    );
}

#[test]
fn integer_lists() {
    let mut kf = KeyFile::new();
    kf.set_u8_list("wifi", "ssid", &[104, 111, 109, 101]);

    assert_eq!(kf.get_value("wifi", "ssid").unwrap(), "104;111;109;101;");
    assert_eq!(
        kf.get_i32_list("wifi", "ssid").unwrap(),
        vec![104, 111, 109, 101]
    );
}

#[test]
fn backslash_semicolon_survives_get_string() {
    let kf = KeyFile::parse("[wifi]\nssid=my\\;net\n").unwrap();

    // The escaped separator must reach the caller untouched; the byte
    // grammar unescapes it, not the store.
    assert_eq!(kf.get_string("wifi", "ssid").unwrap(), "my\\;net");
}
