//! Property values and their declared kinds.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{CertValue, IpAddress, IpRoute, SriovVf, TcQdisc, TcTfilter};

/// The declared type of a setting property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Optional string
    Str,
    /// Unsigned 32-bit integer
    Uint32,
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 64-bit integer
    Uint64,
    /// Boolean
    Bool,
    /// Signed byte
    Char,
    /// Optional byte blob; absent and empty are distinct
    Bytes,
    /// List of strings
    StringList,
    /// String-to-string map
    StringMap,
    /// Array of unsigned 32-bit integers
    UintArray,
    /// Enumeration, stored as its numeric value
    Enum,
    /// Bit flags, stored as an unsigned 32-bit value
    Flags,
    /// IP addresses
    Addresses,
    /// IP routes
    Routes,
    /// SR-IOV virtual functions
    Vfs,
    /// Traffic-control qdiscs
    Qdiscs,
    /// Traffic-control filters
    Tfilters,
    /// Certificate reference
    Cert,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Str => "string",
            PropertyKind::Uint32 => "uint32",
            PropertyKind::Int32 => "int32",
            PropertyKind::Int64 => "int64",
            PropertyKind::Uint64 => "uint64",
            PropertyKind::Bool => "boolean",
            PropertyKind::Char => "char",
            PropertyKind::Bytes => "bytes",
            PropertyKind::StringList => "string list",
            PropertyKind::StringMap => "string map",
            PropertyKind::UintArray => "uint32 array",
            PropertyKind::Enum => "enum",
            PropertyKind::Flags => "flags",
            PropertyKind::Addresses => "addresses",
            PropertyKind::Routes => "routes",
            PropertyKind::Vfs => "sriov vfs",
            PropertyKind::Qdiscs => "qdiscs",
            PropertyKind::Tfilters => "tfilters",
            PropertyKind::Cert => "certificate",
        };
        write!(f, "{name}")
    }
}

/// A property value.
///
/// The closed union of everything a setting property can hold. Each
/// variant corresponds to exactly one [`PropertyKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Optional string; `None` means unset
    Str(Option<String>),
    /// Unsigned 32-bit integer
    Uint32(u32),
    /// Signed 32-bit integer
    Int32(i32),
    /// Signed 64-bit integer
    Int64(i64),
    /// Unsigned 64-bit integer
    Uint64(u64),
    /// Boolean
    Bool(bool),
    /// Signed byte
    Char(i8),
    /// Optional byte blob; `None` means unset, `Some(vec![])` is an
    /// empty blob
    Bytes(Option<Vec<u8>>),
    /// List of strings
    StringList(Vec<String>),
    /// String-to-string map
    StringMap(BTreeMap<String, String>),
    /// Array of unsigned 32-bit integers
    UintArray(Vec<u32>),
    /// Enumeration value
    Enum(i32),
    /// Bit flags
    Flags(u32),
    /// IP addresses
    Addresses(Vec<IpAddress>),
    /// IP routes
    Routes(Vec<IpRoute>),
    /// SR-IOV virtual functions
    Vfs(Vec<SriovVf>),
    /// Traffic-control qdiscs
    Qdiscs(Vec<TcQdisc>),
    /// Traffic-control filters
    Tfilters(Vec<TcTfilter>),
    /// Certificate reference; `None` means unset
    Cert(Option<CertValue>),
}

impl Value {
    /// The kind this value belongs to.
    pub fn kind(&self) -> PropertyKind {
        match self {
            Value::Str(_) => PropertyKind::Str,
            Value::Uint32(_) => PropertyKind::Uint32,
            Value::Int32(_) => PropertyKind::Int32,
            Value::Int64(_) => PropertyKind::Int64,
            Value::Uint64(_) => PropertyKind::Uint64,
            Value::Bool(_) => PropertyKind::Bool,
            Value::Char(_) => PropertyKind::Char,
            Value::Bytes(_) => PropertyKind::Bytes,
            Value::StringList(_) => PropertyKind::StringList,
            Value::StringMap(_) => PropertyKind::StringMap,
            Value::UintArray(_) => PropertyKind::UintArray,
            Value::Enum(_) => PropertyKind::Enum,
            Value::Flags(_) => PropertyKind::Flags,
            Value::Addresses(_) => PropertyKind::Addresses,
            Value::Routes(_) => PropertyKind::Routes,
            Value::Vfs(_) => PropertyKind::Vfs,
            Value::Qdiscs(_) => PropertyKind::Qdiscs,
            Value::Tfilters(_) => PropertyKind::Tfilters,
            Value::Cert(_) => PropertyKind::Cert,
        }
    }

    /// The string held by a `Str` value, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => s.as_deref(),
            _ => None,
        }
    }

    /// The map held by a `StringMap` value, if this is one.
    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Value::StringMap(map) => Some(map),
            _ => None,
        }
    }
}
