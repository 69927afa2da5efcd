//! IP addresses, routes and typed route attributes.

use std::{
    collections::BTreeMap,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
};

/// Address family of an IP configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrFamily {
    /// IPv4
    V4,
    /// IPv6
    V6,
}

impl AddrFamily {
    /// Human-readable family label used in warning messages.
    pub fn label(self) -> &'static str {
        match self {
            AddrFamily::V4 => "IPv4",
            AddrFamily::V6 => "IPv6",
        }
    }

    /// Largest valid prefix length for the family.
    pub fn max_prefix(self) -> u32 {
        match self {
            AddrFamily::V4 => 32,
            AddrFamily::V6 => 128,
        }
    }

    /// The family's unspecified (all-zero) address.
    pub fn unspecified(self) -> IpAddr {
        match self {
            AddrFamily::V4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            AddrFamily::V6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }

    /// Whether `addr` belongs to this family.
    pub fn matches(self, addr: IpAddr) -> bool {
        matches!(
            (self, addr),
            (AddrFamily::V4, IpAddr::V4(_)) | (AddrFamily::V6, IpAddr::V6(_))
        )
    }

    /// Parses an address string, requiring it to be of this family.
    pub fn parse(self, s: &str) -> Option<IpAddr> {
        let addr: IpAddr = s.parse().ok()?;
        self.matches(addr).then_some(addr)
    }
}

/// A single IP address with its prefix length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpAddress {
    /// The address itself
    pub address: IpAddr,
    /// Prefix length in bits
    pub prefix: u32,
}

impl IpAddress {
    /// Creates an address, validating the prefix length against the family.
    pub fn new(address: IpAddr, prefix: u32) -> Option<Self> {
        let family = family_of(address);
        (prefix <= family.max_prefix()).then_some(Self { address, prefix })
    }
}

/// A static route: destination network, optional next hop, metric and
/// typed attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpRoute {
    /// Destination network address
    pub dest: IpAddr,
    /// Destination prefix length in bits
    pub prefix: u32,
    /// Next hop, if any
    pub next_hop: Option<IpAddr>,
    /// Route metric; `-1` means unset
    pub metric: i64,
    /// Additional typed attributes, keyed by attribute name
    pub attributes: BTreeMap<String, RouteAttr>,
}

impl IpRoute {
    /// Creates a route without attributes.
    ///
    /// The prefix length must be valid and non-zero, the next hop (when
    /// present) must be of the destination's family, and the metric must
    /// be `-1` or fit an unsigned 32-bit value.
    pub fn new(dest: IpAddr, prefix: u32, next_hop: Option<IpAddr>, metric: i64) -> Option<Self> {
        let family = family_of(dest);
        if prefix == 0 || prefix > family.max_prefix() {
            return None;
        }
        if let Some(hop) = next_hop {
            if !family.matches(hop) {
                return None;
            }
        }
        if metric < -1 || metric > i64::from(u32::MAX) {
            return None;
        }
        Some(Self {
            dest,
            prefix,
            next_hop,
            metric,
            attributes: BTreeMap::new(),
        })
    }

    /// Address family of the route's destination.
    pub fn family(&self) -> AddrFamily {
        family_of(self.dest)
    }
}

/// Returns the family of an address.
pub(crate) fn family_of(addr: IpAddr) -> AddrFamily {
    match addr {
        IpAddr::V4(_) => AddrFamily::V4,
        IpAddr::V6(_) => AddrFamily::V6,
    }
}

/// A typed route attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAttr {
    /// Free-form string attribute
    Str(String),
    /// Unsigned 32-bit attribute
    Uint32(u32),
    /// Boolean attribute
    Bool(bool),
    /// Address-valued attribute
    Addr(IpAddr),
}

#[derive(Clone, Copy)]
enum AttrKind {
    Str,
    Uint32,
    Bool,
    Addr,
}

struct AttrSpec {
    name: &'static str,
    kind: AttrKind,
    /// Restricts the attribute to routes of one family, if set.
    family: Option<AddrFamily>,
}

const ATTR_SPECS: &[AttrSpec] = &[
    AttrSpec {
        name: "cwnd",
        kind: AttrKind::Uint32,
        family: None,
    },
    AttrSpec {
        name: "from",
        kind: AttrKind::Str,
        family: Some(AddrFamily::V6),
    },
    AttrSpec {
        name: "initcwnd",
        kind: AttrKind::Uint32,
        family: None,
    },
    AttrSpec {
        name: "initrwnd",
        kind: AttrKind::Uint32,
        family: None,
    },
    AttrSpec {
        name: "lock-cwnd",
        kind: AttrKind::Bool,
        family: None,
    },
    AttrSpec {
        name: "lock-initcwnd",
        kind: AttrKind::Bool,
        family: None,
    },
    AttrSpec {
        name: "lock-initrwnd",
        kind: AttrKind::Bool,
        family: None,
    },
    AttrSpec {
        name: "lock-mtu",
        kind: AttrKind::Bool,
        family: None,
    },
    AttrSpec {
        name: "lock-window",
        kind: AttrKind::Bool,
        family: None,
    },
    AttrSpec {
        name: "mtu",
        kind: AttrKind::Uint32,
        family: None,
    },
    AttrSpec {
        name: "onlink",
        kind: AttrKind::Bool,
        family: None,
    },
    AttrSpec {
        name: "src",
        kind: AttrKind::Addr,
        family: None,
    },
    AttrSpec {
        name: "table",
        kind: AttrKind::Uint32,
        family: None,
    },
    AttrSpec {
        name: "tos",
        kind: AttrKind::Uint32,
        family: None,
    },
    AttrSpec {
        name: "window",
        kind: AttrKind::Uint32,
        family: None,
    },
];

fn attr_spec(name: &str) -> Option<&'static AttrSpec> {
    ATTR_SPECS.iter().find(|s| s.name == name)
}

/// Parses a comma-separated `name=value` attribute list against the
/// attribute schema.
///
/// Unknown names, family mismatches and unparsable values are dropped
/// without a warning; the remaining attributes are returned keyed by
/// name.
pub fn parse_route_attributes(value: &str, family: AddrFamily) -> BTreeMap<String, RouteAttr> {
    let mut attrs = BTreeMap::new();

    for item in value.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let Some((name, raw)) = item.split_once('=') else {
            continue;
        };
        let Some(spec) = attr_spec(name) else {
            continue;
        };
        if spec.family.is_some_and(|f| f != family) {
            continue;
        }
        let parsed = match spec.kind {
            AttrKind::Str => validate_prefix_string(raw, family).map(RouteAttr::Str),
            AttrKind::Uint32 => raw.parse().ok().map(RouteAttr::Uint32),
            AttrKind::Bool => match raw {
                "true" | "1" => Some(RouteAttr::Bool(true)),
                "false" | "0" => Some(RouteAttr::Bool(false)),
                _ => None,
            },
            AttrKind::Addr => family.parse(raw).map(RouteAttr::Addr),
        };
        if let Some(attr) = parsed {
            attrs.insert(name.to_string(), attr);
        }
    }

    attrs
}

/// Validates an `addr` or `addr/plen` source-prefix string.
fn validate_prefix_string(raw: &str, family: AddrFamily) -> Option<String> {
    let (addr, plen) = match raw.split_once('/') {
        Some((a, p)) => (a, Some(p)),
        None => (raw, None),
    };
    family.parse(addr)?;
    if let Some(p) = plen {
        let plen: u32 = p.parse().ok()?;
        if plen > family.max_prefix() {
            return None;
        }
    }
    Some(raw.to_string())
}

/// Formats attributes as a comma-separated `name=value` list, sorted by
/// name. Returns `None` for an empty map.
pub fn format_route_attributes(attrs: &BTreeMap<String, RouteAttr>) -> Option<String> {
    if attrs.is_empty() {
        return None;
    }

    let formatted: Vec<String> = attrs
        .iter()
        .map(|(name, attr)| match attr {
            RouteAttr::Str(s) => format!("{name}={s}"),
            RouteAttr::Uint32(v) => format!("{name}={v}"),
            RouteAttr::Bool(b) => format!("{name}={b}"),
            RouteAttr::Addr(a) => format!("{name}={a}"),
        })
        .collect();
    Some(formatted.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_rejects_zero_prefix_and_family_mismatch() {
        assert!(IpRoute::new("10.0.0.0".parse().unwrap(), 0, None, -1).is_none());
        assert!(IpRoute::new(
            "10.0.0.0".parse().unwrap(),
            24,
            Some("fe80::1".parse().unwrap()),
            -1
        )
        .is_none());
        assert!(IpRoute::new("10.0.0.0".parse().unwrap(), 24, None, -1).is_some());
    }

    #[test]
    fn attributes_parse_known_and_drop_unknown() {
        let attrs = parse_route_attributes("mtu=1400,bogus=1,onlink=true", AddrFamily::V4);

        assert_eq!(attrs.get("mtu"), Some(&RouteAttr::Uint32(1400)));
        assert_eq!(attrs.get("onlink"), Some(&RouteAttr::Bool(true)));
        assert!(!attrs.contains_key("bogus"));
    }

    #[test]
    fn attributes_respect_family_restriction() {
        let v4 = parse_route_attributes("from=2001:db8::/32", AddrFamily::V4);
        assert!(v4.is_empty());

        let v6 = parse_route_attributes("from=2001:db8::/32", AddrFamily::V6);
        assert_eq!(
            v6.get("from"),
            Some(&RouteAttr::Str("2001:db8::/32".to_string()))
        );
    }

    #[test]
    fn attributes_drop_invalid_values() {
        let attrs = parse_route_attributes("mtu=huge,src=not-an-ip,window=9000", AddrFamily::V4);

        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("window"), Some(&RouteAttr::Uint32(9000)));
    }

    #[test]
    fn attributes_format_sorted() {
        let attrs = parse_route_attributes("window=10,mtu=1400", AddrFamily::V4);

        assert_eq!(
            format_route_attributes(&attrs).unwrap(),
            "mtu=1400,window=10"
        );
        assert!(format_route_attributes(&BTreeMap::new()).is_none());
    }
}
