//! Traffic-control qdisc and filter specifications.
//!
//! Handles are 32-bit values split into a 16-bit major and minor part,
//! written in the iproute2 `maj:min` hexadecimal notation. Specs are
//! parsed from a flat token stream: `[root | parent HANDLE]
//! [handle HANDLE] KIND [action ...]`.

use std::fmt;

use super::error::GrammarError;

/// The unspecified handle.
pub const TC_HANDLE_UNSPEC: u32 = 0;

/// The root qdisc handle.
pub const TC_HANDLE_ROOT: u32 = 0xFFFF_FFFF;

/// Parses a `maj:min` handle.
///
/// Accepts `maj:min`, `maj:` and a bare `maj`, all hexadecimal. Returns
/// `None` for anything else (including `root`, which is a keyword rather
/// than a handle).
pub fn parse_tc_handle(s: &str) -> Option<u32> {
    let (maj, min) = match s.split_once(':') {
        Some((maj, "")) => (maj, 0),
        Some((maj, min)) => (maj, u16::from_str_radix(min, 16).ok()?.into()),
        None => (s, 0),
    };
    let maj: u32 = u16::from_str_radix(maj, 16).ok()?.into();
    Some(maj << 16 | min)
}

/// Formats a handle as `maj:min`, omitting a zero minor part.
pub fn format_tc_handle(handle: u32) -> String {
    let maj = handle >> 16;
    let min = handle & 0xFFFF;
    if min == 0 {
        format!("{maj:x}:")
    } else {
        format!("{maj:x}:{min:x}")
    }
}

/// A queueing discipline attached to a parent handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcQdisc {
    /// Qdisc kind, e.g. `fq_codel`
    pub kind: String,
    /// The qdisc's own handle, or [`TC_HANDLE_UNSPEC`]
    pub handle: u32,
    /// Parent handle, or [`TC_HANDLE_ROOT`]
    pub parent: u32,
}

impl TcQdisc {
    /// Parses a qdisc spec string.
    ///
    /// # Errors
    ///
    /// Returns `GrammarError::Tc` for a missing kind, a malformed handle
    /// or trailing tokens.
    pub fn parse(spec: &str) -> Result<Self, GrammarError> {
        let mut tokens = spec.split_whitespace().peekable();
        let (kind, handle, parent) = parse_common(&mut tokens)?;
        if let Some(extra) = tokens.next() {
            return Err(GrammarError::tc(format!("unsupported attribute '{extra}'")));
        }
        Ok(Self {
            kind,
            handle,
            parent,
        })
    }

    /// The parent as it appears in a keyfile key suffix.
    pub fn parent_label(&self) -> String {
        parent_label(self.parent)
    }

    /// The spec without its parent, as stored in a keyfile value.
    pub fn rest(&self) -> String {
        rest_label(self.handle, &self.kind, None)
    }
}

/// A traffic filter attached to a parent handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcTfilter {
    /// Filter kind, e.g. `matchall`
    pub kind: String,
    /// The filter's own handle, or [`TC_HANDLE_UNSPEC`]
    pub handle: u32,
    /// Parent handle, or [`TC_HANDLE_ROOT`]
    pub parent: u32,
    /// Optional action spec, kept verbatim
    pub action: Option<String>,
}

impl TcTfilter {
    /// Parses a tfilter spec string.
    ///
    /// Everything after an `action` keyword is preserved verbatim as the
    /// filter's action.
    ///
    /// # Errors
    ///
    /// Returns `GrammarError::Tc` for a missing kind or malformed handle.
    pub fn parse(spec: &str) -> Result<Self, GrammarError> {
        let mut tokens = spec.split_whitespace().peekable();
        let (kind, handle, parent) = parse_common(&mut tokens)?;

        let action = match tokens.next() {
            None => None,
            Some("action") => {
                let rest: Vec<&str> = tokens.collect();
                if rest.is_empty() {
                    return Err(GrammarError::tc("empty action"));
                }
                Some(rest.join(" "))
            }
            Some(extra) => {
                return Err(GrammarError::tc(format!("unsupported attribute '{extra}'")))
            }
        };

        Ok(Self {
            kind,
            handle,
            parent,
            action,
        })
    }

    /// The parent as it appears in a keyfile key suffix.
    pub fn parent_label(&self) -> String {
        parent_label(self.parent)
    }

    /// The spec without its parent, as stored in a keyfile value.
    pub fn rest(&self) -> String {
        rest_label(self.handle, &self.kind, self.action.as_deref())
    }
}

type Tokens<'a> = std::iter::Peekable<std::str::SplitWhitespace<'a>>;

fn parse_common(tokens: &mut Tokens<'_>) -> Result<(String, u32, u32), GrammarError> {
    let mut kind = None;
    let mut handle = TC_HANDLE_UNSPEC;
    let mut parent = TC_HANDLE_UNSPEC;

    while let Some(&token) = tokens.peek() {
        match token {
            "root" => {
                parent = TC_HANDLE_ROOT;
                tokens.next();
            }
            "parent" => {
                tokens.next();
                parent = expect_handle(tokens, "parent")?;
            }
            "handle" => {
                tokens.next();
                handle = expect_handle(tokens, "handle")?;
            }
            _ => {
                if kind.is_some() {
                    break;
                }
                kind = Some(token.to_string());
                tokens.next();
            }
        }
    }

    let kind = kind.ok_or_else(|| GrammarError::tc("missing kind"))?;
    Ok((kind, handle, parent))
}

fn expect_handle(tokens: &mut Tokens<'_>, what: &str) -> Result<u32, GrammarError> {
    let token = tokens
        .next()
        .ok_or_else(|| GrammarError::tc(format!("missing {what} handle")))?;
    parse_tc_handle(token).ok_or_else(|| GrammarError::tc(format!("invalid {what} '{token}'")))
}

fn parent_label(parent: u32) -> String {
    if parent == TC_HANDLE_ROOT {
        "root".to_string()
    } else {
        format_tc_handle(parent)
    }
}

fn rest_label(handle: u32, kind: &str, action: Option<&str>) -> String {
    let mut out = String::new();
    if handle != TC_HANDLE_UNSPEC {
        out.push_str("handle ");
        out.push_str(&format_tc_handle(handle));
        out.push(' ');
    }
    out.push_str(kind);
    if let Some(action) = action {
        out.push_str(" action ");
        out.push_str(action);
    }
    out
}

impl fmt::Display for TcQdisc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parent {} {}", self.parent_label(), self.rest())
    }
}

impl fmt::Display for TcTfilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parent {} {}", self.parent_label(), self.rest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_parse_and_format() {
        assert_eq!(parse_tc_handle("1:"), Some(0x0001_0000));
        assert_eq!(parse_tc_handle("1:2"), Some(0x0001_0002));
        assert_eq!(parse_tc_handle("ffff"), Some(0xFFFF_0000));
        assert_eq!(parse_tc_handle("root"), None);
        assert_eq!(parse_tc_handle("1:2:3"), None);

        assert_eq!(format_tc_handle(0x0001_0000), "1:");
        assert_eq!(format_tc_handle(0x0001_0002), "1:2");
    }

    #[test]
    fn qdisc_parse_root() {
        let qdisc = TcQdisc::parse("root fq_codel").unwrap();

        assert_eq!(qdisc.kind, "fq_codel");
        assert_eq!(qdisc.parent, TC_HANDLE_ROOT);
        assert_eq!(qdisc.handle, TC_HANDLE_UNSPEC);
        assert_eq!(qdisc.parent_label(), "root");
        assert_eq!(qdisc.rest(), "fq_codel");
    }

    #[test]
    fn qdisc_parse_with_handles() {
        let qdisc = TcQdisc::parse("parent 1:2 handle 30: pfifo").unwrap();

        assert_eq!(qdisc.parent, 0x0001_0002);
        assert_eq!(qdisc.handle, 0x0030_0000);
        assert_eq!(qdisc.rest(), "handle 30: pfifo");
    }

    #[test]
    fn qdisc_rejects_garbage() {
        assert!(TcQdisc::parse("root").is_err());
        assert!(TcQdisc::parse("root fq_codel extra").is_err());
        assert!(TcQdisc::parse("parent bogus fq_codel").is_err());
    }

    #[test]
    fn tfilter_action_preserved() {
        let tfilter = TcTfilter::parse("parent 1234: matchall action drop").unwrap();

        assert_eq!(tfilter.kind, "matchall");
        assert_eq!(tfilter.action.as_deref(), Some("drop"));
        assert_eq!(tfilter.rest(), "matchall action drop");
    }
}
