//! The static settings catalog.
//!
//! Every setting kind the codec understands is described here as a
//! [`SettingSchema`]: an ordered list of property descriptors giving each
//! property's name, declared kind, default value and flags. The codec is
//! entirely driven by these tables; there is no runtime reflection.
//!
//! The catalog itself is alphabetized by setting name and looked up by
//! binary search.

use super::value::{PropertyKind, Value};

/// Canonical name of the connection identity setting.
pub const SETTING_CONNECTION: &str = "connection";
/// Canonical name of the VPN setting.
pub const SETTING_VPN: &str = "vpn";
/// Canonical name of the bond setting.
pub const SETTING_BOND: &str = "bond";
/// Canonical name of the user-data setting.
pub const SETTING_USER: &str = "user";
/// Canonical name of the IPv4 configuration setting.
pub const SETTING_IP4: &str = "ipv4";
/// Canonical name of the IPv6 configuration setting.
pub const SETTING_IP6: &str = "ipv6";
/// Canonical name of the wireless setting.
pub const SETTING_WIRELESS: &str = "802-11-wireless";
/// Canonical name of the wired setting.
pub const SETTING_WIRED: &str = "802-3-ethernet";

/// `ipv6.addr-gen-mode`: interface identifier from the link MAC.
pub const ADDR_GEN_MODE_EUI64: i32 = 0;
/// `ipv6.addr-gen-mode`: RFC 7217 stable privacy addressing.
pub const ADDR_GEN_MODE_STABLE_PRIVACY: i32 = 1;

/// `serial.parity`: no parity bit.
pub const PARITY_NONE: i32 = 0;
/// `serial.parity`: even parity.
pub const PARITY_EVEN: i32 = 1;
/// `serial.parity`: odd parity.
pub const PARITY_ODD: i32 = 2;

/// Describes one declared property of a setting kind.
#[derive(Debug)]
pub struct PropertyDescriptor {
    /// Property name, also the keyfile key
    pub name: &'static str,
    /// Declared kind; generic codec behavior is driven by this
    pub kind: PropertyKind,
    /// Default value; properties at their default are not written
    pub default: Value,
    /// Whether the property can be set at all
    pub writable: bool,
    /// Whether the property holds a secret
    pub secret: bool,
}

/// A setting kind: its canonical name and declared properties, in a
/// stable order.
#[derive(Debug)]
pub struct SettingSchema {
    /// Canonical setting name, also the keyfile group
    pub name: &'static str,
    /// Declared properties in enumeration order
    pub properties: &'static [PropertyDescriptor],
}

impl SettingSchema {
    /// Finds a declared property by name.
    pub fn property(&self, name: &str) -> Option<&'static PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

const fn prop(name: &'static str, kind: PropertyKind, default: Value) -> PropertyDescriptor {
    PropertyDescriptor {
        name,
        kind,
        default,
        writable: true,
        secret: false,
    }
}

const fn secret(name: &'static str, kind: PropertyKind, default: Value) -> PropertyDescriptor {
    PropertyDescriptor {
        name,
        kind,
        default,
        writable: true,
        secret: true,
    }
}

static CONNECTION: &[PropertyDescriptor] = &[
    prop("id", PropertyKind::Str, Value::Str(None)),
    prop("uuid", PropertyKind::Str, Value::Str(None)),
    prop("interface-name", PropertyKind::Str, Value::Str(None)),
    prop("type", PropertyKind::Str, Value::Str(None)),
    prop("autoconnect", PropertyKind::Bool, Value::Bool(true)),
    prop("autoconnect-priority", PropertyKind::Int32, Value::Int32(0)),
    prop("timestamp", PropertyKind::Uint64, Value::Uint64(0)),
    prop("read-only", PropertyKind::Bool, Value::Bool(false)),
    prop(
        "permissions",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop("zone", PropertyKind::Str, Value::Str(None)),
    prop("master", PropertyKind::Str, Value::Str(None)),
    prop("slave-type", PropertyKind::Str, Value::Str(None)),
    prop(
        "secondaries",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop("gateway-ping-timeout", PropertyKind::Uint32, Value::Uint32(0)),
    prop("metered", PropertyKind::Enum, Value::Enum(0)),
    prop("lldp", PropertyKind::Int32, Value::Int32(-1)),
    prop("stable-id", PropertyKind::Str, Value::Str(None)),
];

static WIRED: &[PropertyDescriptor] = &[
    prop("port", PropertyKind::Str, Value::Str(None)),
    prop("speed", PropertyKind::Uint32, Value::Uint32(0)),
    prop("duplex", PropertyKind::Str, Value::Str(None)),
    prop("auto-negotiate", PropertyKind::Bool, Value::Bool(false)),
    prop("mac-address", PropertyKind::Str, Value::Str(None)),
    prop("cloned-mac-address", PropertyKind::Str, Value::Str(None)),
    prop(
        "mac-address-blacklist",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop("mtu", PropertyKind::Uint32, Value::Uint32(0)),
    prop(
        "s390-subchannels",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop("s390-nettype", PropertyKind::Str, Value::Str(None)),
    prop(
        "s390-options",
        PropertyKind::StringMap,
        Value::StringMap(std::collections::BTreeMap::new()),
    ),
    prop("wake-on-lan", PropertyKind::Flags, Value::Flags(1)),
    prop("wake-on-lan-password", PropertyKind::Str, Value::Str(None)),
];

static WIRELESS: &[PropertyDescriptor] = &[
    prop("ssid", PropertyKind::Bytes, Value::Bytes(None)),
    prop("mode", PropertyKind::Str, Value::Str(None)),
    prop("band", PropertyKind::Str, Value::Str(None)),
    prop("channel", PropertyKind::Uint32, Value::Uint32(0)),
    prop("bssid", PropertyKind::Str, Value::Str(None)),
    prop("rate", PropertyKind::Uint32, Value::Uint32(0)),
    prop("tx-power", PropertyKind::Uint32, Value::Uint32(0)),
    prop("mac-address", PropertyKind::Str, Value::Str(None)),
    prop("cloned-mac-address", PropertyKind::Str, Value::Str(None)),
    prop(
        "mac-address-blacklist",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop("mtu", PropertyKind::Uint32, Value::Uint32(0)),
    prop(
        "seen-bssids",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop("hidden", PropertyKind::Bool, Value::Bool(false)),
    prop("powersave", PropertyKind::Uint32, Value::Uint32(0)),
];

static WIRELESS_SECURITY: &[PropertyDescriptor] = &[
    prop("key-mgmt", PropertyKind::Str, Value::Str(None)),
    prop("wep-tx-keyidx", PropertyKind::Uint32, Value::Uint32(0)),
    prop("auth-alg", PropertyKind::Str, Value::Str(None)),
    prop(
        "proto",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop(
        "pairwise",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop(
        "group",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop("leap-username", PropertyKind::Str, Value::Str(None)),
    secret("wep-key0", PropertyKind::Str, Value::Str(None)),
    secret("wep-key1", PropertyKind::Str, Value::Str(None)),
    secret("wep-key2", PropertyKind::Str, Value::Str(None)),
    secret("wep-key3", PropertyKind::Str, Value::Str(None)),
    prop("wep-key-flags", PropertyKind::Flags, Value::Flags(0)),
    prop("wep-key-type", PropertyKind::Enum, Value::Enum(0)),
    secret("psk", PropertyKind::Str, Value::Str(None)),
    prop("psk-flags", PropertyKind::Flags, Value::Flags(0)),
    secret("leap-password", PropertyKind::Str, Value::Str(None)),
    prop("leap-password-flags", PropertyKind::Flags, Value::Flags(0)),
];

static EAP: &[PropertyDescriptor] = &[
    prop("eap", PropertyKind::StringList, Value::StringList(Vec::new())),
    prop("identity", PropertyKind::Str, Value::Str(None)),
    prop("anonymous-identity", PropertyKind::Str, Value::Str(None)),
    prop("pac-file", PropertyKind::Str, Value::Str(None)),
    prop("ca-cert", PropertyKind::Cert, Value::Cert(None)),
    prop("ca-path", PropertyKind::Str, Value::Str(None)),
    prop("subject-match", PropertyKind::Str, Value::Str(None)),
    prop(
        "altsubject-matches",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop("client-cert", PropertyKind::Cert, Value::Cert(None)),
    prop("phase1-peapver", PropertyKind::Str, Value::Str(None)),
    prop("phase1-peaplabel", PropertyKind::Str, Value::Str(None)),
    prop("phase2-auth", PropertyKind::Str, Value::Str(None)),
    prop("phase2-autheap", PropertyKind::Str, Value::Str(None)),
    prop("phase2-ca-cert", PropertyKind::Cert, Value::Cert(None)),
    prop("phase2-client-cert", PropertyKind::Cert, Value::Cert(None)),
    secret("password", PropertyKind::Str, Value::Str(None)),
    prop("password-flags", PropertyKind::Flags, Value::Flags(0)),
    secret("password-raw", PropertyKind::Bytes, Value::Bytes(None)),
    prop("password-raw-flags", PropertyKind::Flags, Value::Flags(0)),
    prop("private-key", PropertyKind::Cert, Value::Cert(None)),
    secret("private-key-password", PropertyKind::Str, Value::Str(None)),
    prop(
        "private-key-password-flags",
        PropertyKind::Flags,
        Value::Flags(0),
    ),
    prop("phase2-private-key", PropertyKind::Cert, Value::Cert(None)),
    secret(
        "phase2-private-key-password",
        PropertyKind::Str,
        Value::Str(None),
    ),
    prop(
        "phase2-private-key-password-flags",
        PropertyKind::Flags,
        Value::Flags(0),
    ),
    prop("system-ca-certs", PropertyKind::Bool, Value::Bool(false)),
];

static BLUETOOTH: &[PropertyDescriptor] = &[
    prop("bdaddr", PropertyKind::Str, Value::Str(None)),
    prop("type", PropertyKind::Str, Value::Str(None)),
];

static BOND: &[PropertyDescriptor] = &[prop(
    "options",
    PropertyKind::StringMap,
    Value::StringMap(std::collections::BTreeMap::new()),
)];

static BRIDGE: &[PropertyDescriptor] = &[
    prop("mac-address", PropertyKind::Str, Value::Str(None)),
    prop("stp", PropertyKind::Bool, Value::Bool(true)),
    prop("priority", PropertyKind::Uint32, Value::Uint32(0x8000)),
    prop("forward-delay", PropertyKind::Uint32, Value::Uint32(15)),
    prop("hello-time", PropertyKind::Uint32, Value::Uint32(2)),
    prop("max-age", PropertyKind::Uint32, Value::Uint32(20)),
    prop("ageing-time", PropertyKind::Uint32, Value::Uint32(300)),
    prop("multicast-snooping", PropertyKind::Bool, Value::Bool(true)),
];

static GSM: &[PropertyDescriptor] = &[
    prop("number", PropertyKind::Str, Value::Str(None)),
    prop("username", PropertyKind::Str, Value::Str(None)),
    secret("password", PropertyKind::Str, Value::Str(None)),
    prop("password-flags", PropertyKind::Flags, Value::Flags(0)),
    prop("apn", PropertyKind::Str, Value::Str(None)),
    prop("network-id", PropertyKind::Str, Value::Str(None)),
    secret("pin", PropertyKind::Str, Value::Str(None)),
    prop("pin-flags", PropertyKind::Flags, Value::Flags(0)),
    prop("home-only", PropertyKind::Bool, Value::Bool(false)),
    prop("device-id", PropertyKind::Str, Value::Str(None)),
    prop("sim-id", PropertyKind::Str, Value::Str(None)),
    prop("sim-operator-id", PropertyKind::Str, Value::Str(None)),
    prop("mtu", PropertyKind::Uint32, Value::Uint32(0)),
];

static INFINIBAND: &[PropertyDescriptor] = &[
    prop("mac-address", PropertyKind::Str, Value::Str(None)),
    prop("mtu", PropertyKind::Uint32, Value::Uint32(0)),
    prop("transport-mode", PropertyKind::Str, Value::Str(None)),
    prop("p-key", PropertyKind::Int32, Value::Int32(-1)),
    prop("parent", PropertyKind::Str, Value::Str(None)),
];

static IP4: &[PropertyDescriptor] = &[
    prop("method", PropertyKind::Str, Value::Str(None)),
    prop("dns", PropertyKind::StringList, Value::StringList(Vec::new())),
    prop(
        "dns-search",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop(
        "dns-options",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop("dns-priority", PropertyKind::Int32, Value::Int32(0)),
    prop("addresses", PropertyKind::Addresses, Value::Addresses(Vec::new())),
    prop("gateway", PropertyKind::Str, Value::Str(None)),
    prop("routes", PropertyKind::Routes, Value::Routes(Vec::new())),
    prop("route-metric", PropertyKind::Int64, Value::Int64(-1)),
    prop("ignore-auto-routes", PropertyKind::Bool, Value::Bool(false)),
    prop("ignore-auto-dns", PropertyKind::Bool, Value::Bool(false)),
    prop("dhcp-hostname", PropertyKind::Str, Value::Str(None)),
    prop("dhcp-send-hostname", PropertyKind::Bool, Value::Bool(true)),
    prop("never-default", PropertyKind::Bool, Value::Bool(false)),
    prop("may-fail", PropertyKind::Bool, Value::Bool(true)),
    prop("dad-timeout", PropertyKind::Int32, Value::Int32(-1)),
    prop("dhcp-timeout", PropertyKind::Int32, Value::Int32(0)),
    prop("dhcp-client-id", PropertyKind::Str, Value::Str(None)),
    prop("dhcp-fqdn", PropertyKind::Str, Value::Str(None)),
];

static IP6: &[PropertyDescriptor] = &[
    prop("method", PropertyKind::Str, Value::Str(None)),
    prop("dns", PropertyKind::StringList, Value::StringList(Vec::new())),
    prop(
        "dns-search",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop(
        "dns-options",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop("dns-priority", PropertyKind::Int32, Value::Int32(0)),
    prop("addresses", PropertyKind::Addresses, Value::Addresses(Vec::new())),
    prop("gateway", PropertyKind::Str, Value::Str(None)),
    prop("routes", PropertyKind::Routes, Value::Routes(Vec::new())),
    prop("route-metric", PropertyKind::Int64, Value::Int64(-1)),
    prop("ignore-auto-routes", PropertyKind::Bool, Value::Bool(false)),
    prop("ignore-auto-dns", PropertyKind::Bool, Value::Bool(false)),
    prop("dhcp-hostname", PropertyKind::Str, Value::Str(None)),
    prop("dhcp-send-hostname", PropertyKind::Bool, Value::Bool(true)),
    prop("never-default", PropertyKind::Bool, Value::Bool(false)),
    prop("may-fail", PropertyKind::Bool, Value::Bool(true)),
    prop("dad-timeout", PropertyKind::Int32, Value::Int32(-1)),
    prop("dhcp-timeout", PropertyKind::Int32, Value::Int32(0)),
    prop(
        "addr-gen-mode",
        PropertyKind::Enum,
        Value::Enum(ADDR_GEN_MODE_EUI64),
    ),
    prop("ip6-privacy", PropertyKind::Enum, Value::Enum(-1)),
    prop("token", PropertyKind::Str, Value::Str(None)),
];

static PROXY: &[PropertyDescriptor] = &[
    prop("method", PropertyKind::Enum, Value::Enum(0)),
    prop("browser-only", PropertyKind::Bool, Value::Bool(false)),
    prop("pac-url", PropertyKind::Str, Value::Str(None)),
    prop("pac-script", PropertyKind::Str, Value::Str(None)),
];

static SERIAL: &[PropertyDescriptor] = &[
    prop("baud", PropertyKind::Uint32, Value::Uint32(57600)),
    prop("bits", PropertyKind::Uint32, Value::Uint32(8)),
    prop("parity", PropertyKind::Enum, Value::Enum(PARITY_NONE)),
    prop("stopbits", PropertyKind::Uint32, Value::Uint32(1)),
    prop("send-delay", PropertyKind::Uint64, Value::Uint64(0)),
];

static SRIOV: &[PropertyDescriptor] = &[
    prop("total-vfs", PropertyKind::Uint32, Value::Uint32(0)),
    prop("vfs", PropertyKind::Vfs, Value::Vfs(Vec::new())),
    prop("autoprobe-drivers", PropertyKind::Enum, Value::Enum(-1)),
];

static TC: &[PropertyDescriptor] = &[
    prop("qdiscs", PropertyKind::Qdiscs, Value::Qdiscs(Vec::new())),
    prop("tfilters", PropertyKind::Tfilters, Value::Tfilters(Vec::new())),
];

static TEAM: &[PropertyDescriptor] = &[
    prop("config", PropertyKind::Str, Value::Str(None)),
    prop(
        "link-watchers",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop("notify-peers-count", PropertyKind::Int32, Value::Int32(0)),
    prop("mcast-rejoin-count", PropertyKind::Int32, Value::Int32(0)),
    prop("runner", PropertyKind::Str, Value::Str(None)),
    prop("runner-active", PropertyKind::Bool, Value::Bool(true)),
    prop("runner-fast-rate", PropertyKind::Bool, Value::Bool(false)),
    prop(
        "runner-tx-hash",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
];

static TEAM_PORT: &[PropertyDescriptor] = &[
    prop("config", PropertyKind::Str, Value::Str(None)),
    prop(
        "link-watchers",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop("queue-id", PropertyKind::Int32, Value::Int32(-1)),
    prop("prio", PropertyKind::Int32, Value::Int32(0)),
    prop("sticky", PropertyKind::Bool, Value::Bool(false)),
    prop("lacp-prio", PropertyKind::Int32, Value::Int32(255)),
    prop("lacp-key", PropertyKind::Int32, Value::Int32(0)),
];

static USER: &[PropertyDescriptor] = &[prop(
    "data",
    PropertyKind::StringMap,
    Value::StringMap(std::collections::BTreeMap::new()),
)];

static VLAN: &[PropertyDescriptor] = &[
    prop("parent", PropertyKind::Str, Value::Str(None)),
    prop("id", PropertyKind::Uint32, Value::Uint32(0)),
    prop("flags", PropertyKind::Flags, Value::Flags(1)),
    prop(
        "ingress-priority-map",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
    prop(
        "egress-priority-map",
        PropertyKind::StringList,
        Value::StringList(Vec::new()),
    ),
];

static VPN: &[PropertyDescriptor] = &[
    prop("service-type", PropertyKind::Str, Value::Str(None)),
    prop("user-name", PropertyKind::Str, Value::Str(None)),
    prop("persistent", PropertyKind::Bool, Value::Bool(false)),
    prop(
        "data",
        PropertyKind::StringMap,
        Value::StringMap(std::collections::BTreeMap::new()),
    ),
    secret(
        "secrets",
        PropertyKind::StringMap,
        Value::StringMap(std::collections::BTreeMap::new()),
    ),
    prop("timeout", PropertyKind::Uint32, Value::Uint32(0)),
];

static WIMAX: &[PropertyDescriptor] = &[
    prop("network-name", PropertyKind::Str, Value::Str(None)),
    prop("mac-address", PropertyKind::Str, Value::Str(None)),
];

/// All setting kinds, alphabetized by canonical name.
static CATALOG: &[SettingSchema] = &[
    SettingSchema {
        name: "802-11-wireless",
        properties: WIRELESS,
    },
    SettingSchema {
        name: "802-11-wireless-security",
        properties: WIRELESS_SECURITY,
    },
    SettingSchema {
        name: "802-1x",
        properties: EAP,
    },
    SettingSchema {
        name: "802-3-ethernet",
        properties: WIRED,
    },
    SettingSchema {
        name: "bluetooth",
        properties: BLUETOOTH,
    },
    SettingSchema {
        name: "bond",
        properties: BOND,
    },
    SettingSchema {
        name: "bridge",
        properties: BRIDGE,
    },
    SettingSchema {
        name: "connection",
        properties: CONNECTION,
    },
    SettingSchema {
        name: "gsm",
        properties: GSM,
    },
    SettingSchema {
        name: "infiniband",
        properties: INFINIBAND,
    },
    SettingSchema {
        name: "ipv4",
        properties: IP4,
    },
    SettingSchema {
        name: "ipv6",
        properties: IP6,
    },
    SettingSchema {
        name: "proxy",
        properties: PROXY,
    },
    SettingSchema {
        name: "serial",
        properties: SERIAL,
    },
    SettingSchema {
        name: "sriov",
        properties: SRIOV,
    },
    SettingSchema {
        name: "tc",
        properties: TC,
    },
    SettingSchema {
        name: "team",
        properties: TEAM,
    },
    SettingSchema {
        name: "team-port",
        properties: TEAM_PORT,
    },
    SettingSchema {
        name: "user",
        properties: USER,
    },
    SettingSchema {
        name: "vlan",
        properties: VLAN,
    },
    SettingSchema {
        name: "vpn",
        properties: VPN,
    },
    SettingSchema {
        name: "wimax",
        properties: WIMAX,
    },
];

/// Legacy short group names and their canonical setting names.
static ALIASES: &[(&str, &str)] = &[
    ("ethernet", "802-3-ethernet"),
    ("wifi", "802-11-wireless"),
    ("wifi-security", "802-11-wireless-security"),
];

/// All setting kinds known to the catalog.
pub fn catalog() -> &'static [SettingSchema] {
    CATALOG
}

/// Finds a setting kind by canonical name.
pub fn lookup(name: &str) -> Option<&'static SettingSchema> {
    CATALOG
        .binary_search_by(|schema| schema.name.cmp(&name))
        .ok()
        .map(|idx| &CATALOG[idx])
}

/// Resolves a legacy short group name to its canonical setting name.
pub fn setting_name_for_alias(alias: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(a, _)| *a == alias)
        .map(|(_, name)| *name)
}

/// Returns the legacy short name for a canonical setting name, if one
/// exists.
pub fn alias_for_setting_name(name: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(alias, _)| *alias)
}
