//! Unit tests for the codec's value grammars.

use std::path::PathBuf;

use crate::keyfile::reader::{uuid_from_strings, ReadContext};
use crate::keyfile::values::{get_bytes, get_one_uint, is_json_object, strict_base64_decode};
use crate::store::KeyFile;

fn ctx_over<'a>(store: &'a KeyFile, group: &str) -> ReadContext<'a> {
    let mut ctx = ReadContext::new(store, PathBuf::from("/tmp"), None);
    ctx.group = group.to_string();
    ctx
}

mod bytes {
    use super::*;

    fn bytes_of(value: &str, zero_terminate: bool, unescape: bool) -> Option<Vec<u8>> {
        let store = KeyFile::parse(&format!("[g]\nk={value}\n")).unwrap();
        let mut ctx = ctx_over(&store, "g");
        get_bytes(&mut ctx, "k", zero_terminate, unescape)
    }

    #[test]
    fn empty_value_is_empty_blob() {
        assert_eq!(bytes_of("", false, false), Some(Vec::new()));
    }

    #[test]
    fn terminated_integer_list_decodes() {
        assert_eq!(bytes_of("104;111;109;101;", false, false), Some(b"home".to_vec()));
        assert_eq!(bytes_of(" 1 ; 2 ;", false, false), Some(vec![1, 2]));
    }

    #[test]
    fn unterminated_list_is_a_string() {
        // without the trailing separator this is not a legacy list
        assert_eq!(bytes_of("104;111", false, false), Some(b"104;111".to_vec()));
    }

    #[test]
    fn out_of_range_list_is_a_string() {
        assert_eq!(bytes_of("300;1;", false, false), Some(b"300;1;".to_vec()));
    }

    #[test]
    fn escaped_semicolon_unescapes() {
        assert_eq!(bytes_of("my\\;net", false, true), Some(b"my;net".to_vec()));
        assert_eq!(bytes_of("my\\;net", false, false), Some(b"my\\;net".to_vec()));
    }

    #[test]
    fn zero_terminate_appends_nul() {
        assert_eq!(bytes_of("ab", true, false), Some(b"ab\0".to_vec()));
        // an empty string is not a valid string to terminate
        assert_eq!(bytes_of("", true, false), Some(Vec::new()));
    }
}

mod base64_strictness {
    use super::*;

    #[test]
    fn accepts_canonical_forms() {
        assert_eq!(strict_base64_decode("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(strict_base64_decode("aGVsbG8h").unwrap(), b"hello!");
    }

    #[test]
    fn rejects_unpadded_length() {
        assert!(strict_base64_decode("aGVsbG8").is_none());
    }

    #[test]
    fn rejects_interior_padding_and_whitespace() {
        assert!(strict_base64_decode("aGV=bG8=").is_none());
        assert!(strict_base64_decode("aGVs bG8=").is_none());
        assert!(strict_base64_decode("aGVsbG8=\n").is_none());
    }

    #[test]
    fn rejects_foreign_alphabets() {
        // url-safe alphabet is not welcome here
        assert!(strict_base64_decode("aGVs-G8_").is_none());
    }
}

mod numbers {
    use super::*;

    #[test]
    fn bounded_parse() {
        let store = KeyFile::new();
        let mut ctx = ctx_over(&store, "g");

        assert_eq!(get_one_uint(&mut ctx, None, Some("128"), 128), Some(128));
        assert_eq!(get_one_uint(&mut ctx, None, Some("129"), 128), None);
        assert_eq!(get_one_uint(&mut ctx, None, Some(""), 128), None);
        assert_eq!(get_one_uint(&mut ctx, None, Some("-1"), 128), None);
        assert_eq!(get_one_uint(&mut ctx, None, Some(" 42 "), 128), Some(42));
    }
}

mod team_json {
    use super::*;

    #[test]
    fn object_detection() {
        assert!(is_json_object("{}"));
        assert!(is_json_object(r#"{"runner": {"name": "lacp"}}"#));
        assert!(is_json_object(r#"  {"a": "br{ace}"}  "#));
        assert!(!is_json_object("[1,2]"));
        assert!(!is_json_object(r#"{"a": 1} trailing"#));
        assert!(!is_json_object("{\"unterminated\": "));
        assert!(!is_json_object("plain text"));
    }
}

mod uuids {
    use super::*;

    #[test]
    fn uuid_synthesis_is_stable() {
        let a = uuid_from_strings(&["keyfile", "/etc/profiles/office"]);
        let b = uuid_from_strings(&["keyfile", "/etc/profiles/office"]);
        let c = uuid_from_strings(&["keyfile", "/etc/profiles/home"]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 36);
    }
}
