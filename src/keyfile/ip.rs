//! Compound IP grammar: address and route lines, indexed key arrays,
//! route attributes, DNS lists and the IPv6 address-generation mode.
//!
//! Address and route lines use the grammar
//! `address [SEP prefix] [SEP gateway] [SEP metric]` where `/`, `;` and
//! `,` are interchangeable separators. Readers accept a number of
//! deprecated spellings; the writer emits `addr/plen[,gateway[,metric]]`.

use crate::settings::{
    Setting, Value, ADDR_GEN_MODE_EUI64, ADDR_GEN_MODE_STABLE_PRIVACY, SETTING_IP6,
};
use crate::types::{
    format_route_attributes, parse_route_attributes, AddrFamily, IpAddress, IpRoute,
};

use super::reader::ReadContext;
use super::values::{apply, get_one_uint};
use super::warn::WarnSeverity;
use super::writer::WriteContext;

const IP_ADDRESS_CHARS: &str = "0123456789abcdefABCDEF:.%";
const DIGITS: &str = "0123456789";
const DELIMITERS: &str = "/;,";

/// Splits a compound value into character-class-limited fields.
///
/// A field ends at any delimiter; a character that is neither in the
/// class nor a delimiter fails the field and leaves the input position
/// unchanged so the caller can report it.
struct FieldReader<'a> {
    rest: Option<&'a str>,
}

impl<'a> FieldReader<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: Some(input) }
    }

    /// Reads the next field. `Ok(None)` means the input is exhausted or
    /// empty; `Err(c)` reports the offending character.
    fn next_field(&mut self, class: &str) -> Result<Option<&'a str>, char> {
        let Some(s) = self.rest else {
            return Ok(None);
        };
        if s.is_empty() {
            return Ok(None);
        }

        for (i, c) in s.char_indices() {
            if class.contains(c) {
                continue;
            }
            if DELIMITERS.contains(c) {
                let field = &s[..i];
                self.rest = Some(&s[i + c.len_utf8()..]);
                return Ok(Some(field));
            }
            return Err(c);
        }

        self.rest = None;
        Ok(Some(s))
    }
}

fn default_prefix(route: bool, family: AddrFamily) -> u32 {
    match (route, family) {
        (true, AddrFamily::V6) => 128,
        (false, AddrFamily::V6) => 64,
        (_, AddrFamily::V4) => 24,
    }
}

/// One parsed address or route line.
enum ParsedLine {
    Addr {
        address: IpAddress,
        /// Gateway text exactly as found; hoisted into the setting's
        /// `gateway` property by the caller.
        gateway: Option<String>,
    },
    Route(IpRoute),
}

/// Parses one `addressN`/`routeN` value.
///
/// Returns `None` when the line was discarded (a warning has been
/// raised) or the operation was aborted.
fn read_one_ip_value(
    ctx: &mut ReadContext<'_>,
    property: &str,
    key_name: &str,
    family: AddrFamily,
    is_route: bool,
) -> Option<ParsedLine> {
    let group = ctx.group.clone();
    let value = ctx.store.get_string(&group, key_name)?;

    let mut fields = FieldReader::new(&value);

    let address_str = match fields.next_field(IP_ADDRESS_CHARS) {
        Ok(field) => field,
        Err(c) => {
            ctx.warn(
                Some(property),
                WarnSeverity::Warn,
                format!("unexpected character '{c}' for address {key_name}: '{value}'"),
            );
            return None;
        }
    };

    // The prefix length is skippable; a failed field is retried as the
    // gateway below.
    let plen_str = fields.next_field(DIGITS).unwrap_or(None);

    let gateway_str = match fields.next_field(IP_ADDRESS_CHARS) {
        Ok(field) => field,
        Err(c) => {
            ctx.warn(
                Some(property),
                WarnSeverity::Warn,
                format!("unexpected character '{c}' for {key_name}: '{value}'"),
            );
            return None;
        }
    };

    let metric_str = if is_route {
        match fields.next_field(DIGITS) {
            Ok(field) => field,
            Err(c) => {
                ctx.warn(
                    Some(property),
                    WarnSeverity::Warn,
                    format!("unexpected character '{c}' in metric for {key_name}: '{value}'"),
                );
                return None;
            }
        }
    } else {
        None
    };

    match fields.rest {
        Some(rest) if !rest.is_empty() => {
            ctx.warn(
                Some(property),
                WarnSeverity::Warn,
                format!("garbage at the end of value {key_name}: '{value}'"),
            );
            return None;
        }
        Some(_) => {
            if !ctx.warn(
                Some(property),
                WarnSeverity::Info,
                format!("deprecated semicolon at the end of value {key_name}: '{value}'"),
            ) {
                return None;
            }
        }
        None => {}
    }

    // Prefix length, defaulted when missing or (for routes) zero.
    let max_prefix = family.max_prefix();
    let plen = match plen_str {
        Some(p) => match get_one_uint(ctx, Some(property), Some(p), max_prefix) {
            Some(v) if !(is_route && v == 0) => v,
            _ => {
                if ctx.aborted() {
                    return None;
                }
                let fallback = default_prefix(is_route, family);
                if !ctx.warn(
                    Some(property),
                    WarnSeverity::Warn,
                    format!(
                        "invalid prefix length for {key_name} '{value}', defaulting to {fallback}"
                    ),
                ) {
                    return None;
                }
                fallback
            }
        },
        None => {
            let fallback = default_prefix(is_route, family);
            if !ctx.warn(
                Some(property),
                WarnSeverity::Warn,
                format!("missing prefix length for {key_name} '{value}', defaulting to {fallback}"),
            ) {
                return None;
            }
            fallback
        }
    };

    let address_str = address_str.unwrap_or_default();
    let Some(address) = family.parse(address_str) else {
        ctx.warn(
            Some(property),
            WarnSeverity::Warn,
            format!(
                "ignoring invalid {} address '{address_str}'",
                family.label()
            ),
        );
        return None;
    };

    if is_route {
        let mut metric: i64 = -1;
        let mut next_hop = None;

        if let Some(gw) = gateway_str.filter(|g| !g.is_empty()) {
            match family.parse(gw) {
                Some(hop) => next_hop = Some(hop),
                None => {
                    // Workaround for routes written by an old broken
                    // writer: an IPv6 "gateway" that is really a metric,
                    // with the actual gateway omitted. Accepted on read,
                    // never written back.
                    if family == AddrFamily::V6 && metric_str.is_none() {
                        if let Some(m) = get_one_uint(ctx, None, Some(gw), u32::MAX) {
                            metric = i64::from(m);
                        } else {
                            ctx.warn(
                                Some(property),
                                WarnSeverity::Warn,
                                format!(
                                    "ignoring invalid gateway '{gw}' for {} route",
                                    family.label()
                                ),
                            );
                            return None;
                        }
                    } else {
                        ctx.warn(
                            Some(property),
                            WarnSeverity::Warn,
                            format!(
                                "ignoring invalid gateway '{gw}' for {} route",
                                family.label()
                            ),
                        );
                        return None;
                    }
                }
            }
        }

        if let Some(m) = metric_str {
            metric = i64::from(get_one_uint(ctx, Some(property), Some(m), u32::MAX)?);
        }

        let Some(route) = IpRoute::new(address, plen, next_hop, metric) else {
            ctx.warn(
                Some(property),
                WarnSeverity::Warn,
                format!("ignoring invalid {} route '{value}'", family.label()),
            );
            return None;
        };
        Some(ParsedLine::Route(route))
    } else {
        let Some(address) = IpAddress::new(address, plen) else {
            ctx.warn(
                Some(property),
                WarnSeverity::Warn,
                format!("ignoring invalid {} address '{value}'", family.label()),
            );
            return None;
        };
        Some(ParsedLine::Addr {
            address,
            gateway: gateway_str
                .filter(|g| !g.is_empty())
                .map(str::to_string),
        })
    }
}

/// Matches `base`, `base0` or `base<N>` (decimal without leading zeros).
///
/// Returns the index, `-1` for the bare form.
fn match_indexed_key(key: &str, base: &str) -> Option<i32> {
    let rest = key.strip_prefix(base)?;
    if rest.is_empty() {
        return Some(-1);
    }
    if rest == "0" {
        return Some(0);
    }
    let mut bytes = rest.bytes();
    let first = bytes.next()?;
    if !(b'1'..=b'9').contains(&first) || !bytes.all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// Reader for the `addresses` and `routes` properties.
///
/// Collects every singular and plural indexed key of the group, orders
/// them by (index, kind, key), collapses duplicate keys keeping the
/// later occurrence, and parses each in turn. For routes, a sibling
/// `<key>_options` value supplies typed attributes.
pub(crate) fn ip_address_or_route_parser(
    ctx: &mut ReadContext<'_>,
    setting: &mut Setting,
    key: &str,
) {
    let group = ctx.group.clone();
    let is_routes = key == "routes";
    let family = if setting.name() == SETTING_IP6 {
        AddrFamily::V6
    } else {
        AddrFamily::V4
    };
    let (singular, plural) = if is_routes {
        ("route", "routes")
    } else {
        ("address", "addresses")
    };

    // (index, kind, key): kind 0 for the singular form, 1 for plural.
    let mut build_list: Vec<(i32, i8, String)> = Vec::new();
    for s_key in ctx.store.keys(&group) {
        if let Some(idx) = match_indexed_key(s_key, singular) {
            build_list.push((idx, 0, s_key.to_string()));
        } else if let Some(idx) = match_indexed_key(s_key, plural) {
            build_list.push((idx, 1, s_key.to_string()));
        }
    }
    if build_list.is_empty() {
        return;
    }
    build_list.sort();

    let mut addresses = Vec::new();
    let mut routes = Vec::new();
    let mut gateway: Option<String> = None;

    for (i, entry) in build_list.iter().enumerate() {
        // The store hands out duplicate keys as often as they occur;
        // keep the later one.
        if build_list.get(i + 1) == Some(entry) {
            continue;
        }
        let (_, _, s_key) = entry;

        let item = read_one_ip_value(ctx, key, s_key, family, is_routes);
        if ctx.aborted() {
            return;
        }
        match item {
            Some(ParsedLine::Route(mut route)) => {
                let options_key = format!("{s_key}_options");
                if let Some(options) = ctx.store.get_string(&group, &options_key) {
                    if !options.is_empty() {
                        route.attributes = parse_route_attributes(&options, family);
                    }
                }
                routes.push(route);
            }
            Some(ParsedLine::Addr {
                address,
                gateway: gw,
            }) => {
                if gateway.is_none() {
                    gateway = gw;
                }
                addresses.push(address);
            }
            None => {}
        }
    }

    if is_routes {
        if !routes.is_empty() {
            apply(setting, key, Value::Routes(routes));
        }
    } else if !addresses.is_empty() {
        apply(setting, key, Value::Addresses(addresses));
    }

    if let Some(gw) = gateway {
        if setting.is_default("gateway") {
            apply(setting, "gateway", Value::Str(Some(gw)));
        }
    }
}

/// DNS list reader: invalid entries are dropped with a warning.
pub(crate) fn ip_dns_parser(ctx: &mut ReadContext<'_>, setting: &mut Setting, key: &str) {
    let group = ctx.group.clone();
    let Some(list) = ctx.store.get_string_list(&group, key) else {
        return;
    };
    if list.is_empty() {
        return;
    }

    let family = if setting.name() == SETTING_IP6 {
        AddrFamily::V6
    } else {
        AddrFamily::V4
    };

    let mut kept = Vec::with_capacity(list.len());
    for entry in list {
        if family.parse(&entry).is_some() {
            kept.push(entry);
        } else if !ctx.warn(
            Some(key),
            WarnSeverity::Warn,
            format!(
                "ignoring invalid DNS server {} address '{entry}'",
                family.label()
            ),
        ) {
            return;
        }
    }

    apply(setting, key, Value::StringList(kept));
}

/// DNS list writer: emitted only when non-empty.
pub(crate) fn dns_writer(ctx: &mut WriteContext<'_>, setting: &Setting, key: &str, value: &Value) {
    let Value::StringList(list) = value else {
        return;
    };
    if !list.is_empty() {
        ctx.store.set_string_list(setting.name(), key, list);
    }
}

/// IPv6 address-generation mode reader; an absent key means `eui64`.
pub(crate) fn ip6_addr_gen_mode_parser(ctx: &mut ReadContext<'_>, setting: &mut Setting, key: &str) {
    let group = ctx.group.clone();
    let mode = match ctx.store.get_string(&group, key) {
        Some(s) => match s.as_str() {
            "eui64" => ADDR_GEN_MODE_EUI64,
            "stable-privacy" => ADDR_GEN_MODE_STABLE_PRIVACY,
            _ => {
                ctx.warn(
                    Some(key),
                    WarnSeverity::Warn,
                    format!("invalid option '{s}', use one of [eui64,stable-privacy]"),
                );
                return;
            }
        },
        None => ADDR_GEN_MODE_EUI64,
    };
    apply(setting, key, Value::Enum(mode));
}

/// IPv6 address-generation mode writer; always writes the string form.
pub(crate) fn ip6_addr_gen_mode_writer(
    ctx: &mut WriteContext<'_>,
    setting: &Setting,
    key: &str,
    value: &Value,
) {
    let Value::Enum(mode) = value else {
        return;
    };
    let text = match *mode {
        ADDR_GEN_MODE_EUI64 => "eui64",
        ADDR_GEN_MODE_STABLE_PRIVACY => "stable-privacy",
        _ => return,
    };
    ctx.store.set_string(setting.name(), key, text);
}

fn write_ip_values(
    ctx: &mut WriteContext<'_>,
    group: &str,
    base: &str,
    lines: Vec<(String, u32, Option<String>, i64, Option<String>)>,
) {
    for (i, (addr, plen, gw, metric, options)) in lines.into_iter().enumerate() {
        let key = format!("{base}{}", i + 1);
        let mut out = format!("{addr}/{plen}");
        if gw.is_some() || metric != -1 {
            // Older parsers cannot handle an omitted gateway before a
            // metric, so the unspecified address fills the slot.
            let gw = gw.unwrap_or_else(|| {
                if addr.contains(':') {
                    "::".to_string()
                } else {
                    "0.0.0.0".to_string()
                }
            });
            out.push(',');
            out.push_str(&gw);
            if metric != -1 {
                out.push(',');
                out.push_str(&metric.to_string());
            }
        }
        ctx.store.set_string(group, &key, &out);
        if let Some(options) = options {
            ctx.store.set_string(group, &format!("{key}_options"), &options);
        }
    }
}

/// Address array writer; the first line carries the setting's gateway.
pub(crate) fn addr_writer(ctx: &mut WriteContext<'_>, setting: &Setting, _key: &str, value: &Value) {
    let Value::Addresses(addresses) = value else {
        return;
    };
    if addresses.is_empty() {
        return;
    }
    let gateway = setting.string_value("gateway").map(str::to_string);

    let lines = addresses
        .iter()
        .enumerate()
        .map(|(i, addr)| {
            let gw = if i == 0 { gateway.clone() } else { None };
            (addr.address.to_string(), addr.prefix, gw, -1, None)
        })
        .collect();
    write_ip_values(ctx, setting.name(), "address", lines);
}

/// Route array writer, including per-route `_options` attributes.
pub(crate) fn route_writer(ctx: &mut WriteContext<'_>, setting: &Setting, _key: &str, value: &Value) {
    let Value::Routes(routes) = value else {
        return;
    };
    if routes.is_empty() {
        return;
    }

    let lines = routes
        .iter()
        .map(|route| {
            (
                route.dest.to_string(),
                route.prefix,
                route.next_hop.map(|h| h.to_string()),
                route.metric,
                format_route_attributes(&route.attributes),
            )
        })
        .collect();
    write_ip_values(ctx, setting.name(), "route", lines);
}
