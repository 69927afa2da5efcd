//! The per-(setting, property) dispatch table.
//!
//! A statically compiled, lexicographically sorted table of overrides
//! for properties whose keyfile form differs from the type-directed
//! default. Lookup is a binary search on the setting followed by a
//! binary search on the property; the sort order is asserted in debug
//! builds and by a unit test.

use crate::settings::Setting;
use crate::settings::Value;

use super::cert;
use super::ip;
use super::reader::ReadContext;
use super::sriov;
use super::tc;
use super::values;
use super::writer::WriteContext;

/// Custom reader for one property.
pub(crate) type Reader = fn(&mut ReadContext<'_>, &mut Setting, &str);

/// Custom writer for one property.
pub(crate) type Writer = fn(&mut WriteContext<'_>, &Setting, &str, &Value);

/// Per-property dispatch record.
#[derive(Clone, Copy)]
pub(crate) struct PropertyInfo {
    /// Property name this record applies to
    pub property: &'static str,
    /// Reader override, if any
    pub reader: Option<Reader>,
    /// Writer override, if any
    pub writer: Option<Writer>,
    /// Skip the property entirely on read
    pub skip_read: bool,
    /// Skip the property entirely on write
    pub skip_write: bool,
    /// Suppress the exact-key existence check; needed for properties
    /// assembled from multiple keys
    pub no_check_key: bool,
    /// Write the property even when it equals its default
    pub persist_default: bool,
}

struct SettingInfo {
    setting: &'static str,
    properties: &'static [PropertyInfo],
}

const NONE: PropertyInfo = PropertyInfo {
    property: "",
    reader: None,
    writer: None,
    skip_read: false,
    skip_write: false,
    no_check_key: false,
    persist_default: false,
};

const SKIP_BOTH: PropertyInfo = PropertyInfo {
    skip_read: true,
    skip_write: true,
    ..NONE
};

static DISPATCH: &[SettingInfo] = &[
    SettingInfo {
        setting: "802-11-wireless",
        properties: &[
            PropertyInfo {
                property: "bssid",
                reader: Some(values::mac_address_parser_ether),
                ..NONE
            },
            PropertyInfo {
                property: "cloned-mac-address",
                reader: Some(values::mac_address_parser_ether_cloned),
                ..NONE
            },
            PropertyInfo {
                property: "mac-address",
                reader: Some(values::mac_address_parser_ether),
                ..NONE
            },
            PropertyInfo {
                property: "ssid",
                reader: Some(values::ssid_parser),
                writer: Some(values::ssid_writer),
                ..NONE
            },
        ],
    },
    SettingInfo {
        setting: "802-1x",
        properties: &[
            PropertyInfo {
                property: "ca-cert",
                reader: Some(cert::cert_parser),
                writer: Some(cert::cert_writer),
                ..NONE
            },
            PropertyInfo {
                property: "client-cert",
                reader: Some(cert::cert_parser),
                writer: Some(cert::cert_writer),
                ..NONE
            },
            PropertyInfo {
                property: "password-raw",
                reader: Some(values::password_raw_parser),
                writer: Some(values::password_raw_writer),
                ..NONE
            },
            PropertyInfo {
                property: "phase2-ca-cert",
                reader: Some(cert::cert_parser),
                writer: Some(cert::cert_writer),
                ..NONE
            },
            PropertyInfo {
                property: "phase2-client-cert",
                reader: Some(cert::cert_parser),
                writer: Some(cert::cert_writer),
                ..NONE
            },
            PropertyInfo {
                property: "phase2-private-key",
                reader: Some(cert::cert_parser),
                writer: Some(cert::cert_writer),
                ..NONE
            },
            PropertyInfo {
                property: "private-key",
                reader: Some(cert::cert_parser),
                writer: Some(cert::cert_writer),
                ..NONE
            },
        ],
    },
    SettingInfo {
        setting: "802-3-ethernet",
        properties: &[
            PropertyInfo {
                property: "cloned-mac-address",
                reader: Some(values::mac_address_parser_ether_cloned),
                ..NONE
            },
            PropertyInfo {
                property: "mac-address",
                reader: Some(values::mac_address_parser_ether),
                ..NONE
            },
        ],
    },
    SettingInfo {
        setting: "bluetooth",
        properties: &[PropertyInfo {
            property: "bdaddr",
            reader: Some(values::mac_address_parser_ether),
            ..NONE
        }],
    },
    SettingInfo {
        setting: "bond",
        properties: &[PropertyInfo {
            property: "options",
            no_check_key: true,
            ..NONE
        }],
    },
    SettingInfo {
        setting: "bridge",
        properties: &[PropertyInfo {
            property: "mac-address",
            reader: Some(values::mac_address_parser_ether),
            ..NONE
        }],
    },
    SettingInfo {
        setting: "connection",
        properties: &[
            PropertyInfo {
                property: "read-only",
                ..SKIP_BOTH
            },
            PropertyInfo {
                property: "type",
                reader: Some(values::setting_alias_parser),
                writer: Some(values::setting_alias_writer),
                ..NONE
            },
        ],
    },
    SettingInfo {
        setting: "infiniband",
        properties: &[PropertyInfo {
            property: "mac-address",
            reader: Some(values::mac_address_parser_infiniband),
            ..NONE
        }],
    },
    SettingInfo {
        setting: "ipv4",
        properties: &[
            PropertyInfo {
                property: "addresses",
                reader: Some(ip::ip_address_or_route_parser),
                writer: Some(ip::addr_writer),
                no_check_key: true,
                ..NONE
            },
            PropertyInfo {
                property: "dns",
                reader: Some(ip::ip_dns_parser),
                writer: Some(ip::dns_writer),
                no_check_key: true,
                ..NONE
            },
            PropertyInfo {
                property: "gateway",
                skip_write: true,
                ..NONE
            },
            PropertyInfo {
                property: "routes",
                reader: Some(ip::ip_address_or_route_parser),
                writer: Some(ip::route_writer),
                no_check_key: true,
                ..NONE
            },
        ],
    },
    SettingInfo {
        setting: "ipv6",
        properties: &[
            PropertyInfo {
                property: "addr-gen-mode",
                reader: Some(ip::ip6_addr_gen_mode_parser),
                writer: Some(ip::ip6_addr_gen_mode_writer),
                no_check_key: true,
                persist_default: true,
                ..NONE
            },
            PropertyInfo {
                property: "addresses",
                reader: Some(ip::ip_address_or_route_parser),
                writer: Some(ip::addr_writer),
                no_check_key: true,
                ..NONE
            },
            PropertyInfo {
                property: "dns",
                reader: Some(ip::ip_dns_parser),
                writer: Some(ip::dns_writer),
                no_check_key: true,
                ..NONE
            },
            PropertyInfo {
                property: "gateway",
                skip_write: true,
                ..NONE
            },
            PropertyInfo {
                property: "routes",
                reader: Some(ip::ip_address_or_route_parser),
                writer: Some(ip::route_writer),
                no_check_key: true,
                ..NONE
            },
        ],
    },
    SettingInfo {
        setting: "serial",
        properties: &[PropertyInfo {
            property: "parity",
            reader: Some(values::parity_parser),
            writer: Some(values::parity_writer),
            ..NONE
        }],
    },
    SettingInfo {
        setting: "sriov",
        properties: &[PropertyInfo {
            property: "vfs",
            reader: Some(sriov::sriov_vfs_parser),
            writer: Some(sriov::sriov_vfs_writer),
            no_check_key: true,
            ..NONE
        }],
    },
    SettingInfo {
        setting: "tc",
        properties: &[
            PropertyInfo {
                property: "qdiscs",
                reader: Some(tc::qdisc_parser),
                writer: Some(tc::qdisc_writer),
                no_check_key: true,
                ..NONE
            },
            PropertyInfo {
                property: "tfilters",
                reader: Some(tc::tfilter_parser),
                writer: Some(tc::tfilter_writer),
                no_check_key: true,
                ..NONE
            },
        ],
    },
    SettingInfo {
        setting: "team",
        properties: &[
            PropertyInfo {
                property: "config",
                reader: Some(values::team_config_parser),
                ..NONE
            },
            PropertyInfo {
                property: "link-watchers",
                ..SKIP_BOTH
            },
            PropertyInfo {
                property: "mcast-rejoin-count",
                ..SKIP_BOTH
            },
            PropertyInfo {
                property: "notify-peers-count",
                ..SKIP_BOTH
            },
            PropertyInfo {
                property: "runner",
                ..SKIP_BOTH
            },
            PropertyInfo {
                property: "runner-active",
                ..SKIP_BOTH
            },
            PropertyInfo {
                property: "runner-fast-rate",
                ..SKIP_BOTH
            },
            PropertyInfo {
                property: "runner-tx-hash",
                ..SKIP_BOTH
            },
        ],
    },
    SettingInfo {
        setting: "team-port",
        properties: &[
            PropertyInfo {
                property: "config",
                reader: Some(values::team_config_parser),
                ..NONE
            },
            PropertyInfo {
                property: "lacp-key",
                ..SKIP_BOTH
            },
            PropertyInfo {
                property: "lacp-prio",
                ..SKIP_BOTH
            },
            PropertyInfo {
                property: "link-watchers",
                ..SKIP_BOTH
            },
            PropertyInfo {
                property: "prio",
                ..SKIP_BOTH
            },
            PropertyInfo {
                property: "queue-id",
                ..SKIP_BOTH
            },
            PropertyInfo {
                property: "sticky",
                ..SKIP_BOTH
            },
        ],
    },
    SettingInfo {
        setting: "user",
        properties: &[PropertyInfo {
            property: "data",
            no_check_key: true,
            ..NONE
        }],
    },
    SettingInfo {
        setting: "vlan",
        properties: &[PropertyInfo {
            property: "flags",
            persist_default: true,
            ..NONE
        }],
    },
    SettingInfo {
        setting: "vpn",
        properties: &[
            PropertyInfo {
                property: "data",
                no_check_key: true,
                ..NONE
            },
            PropertyInfo {
                property: "persistent",
                no_check_key: true,
                ..NONE
            },
            PropertyInfo {
                property: "secrets",
                no_check_key: true,
                skip_read: true,
                ..NONE
            },
            PropertyInfo {
                property: "service-type",
                no_check_key: true,
                ..NONE
            },
            PropertyInfo {
                property: "timeout",
                no_check_key: true,
                ..NONE
            },
            PropertyInfo {
                property: "user-name",
                no_check_key: true,
                ..NONE
            },
        ],
    },
    SettingInfo {
        setting: "wimax",
        properties: &[PropertyInfo {
            property: "mac-address",
            reader: Some(values::mac_address_parser_ether),
            ..NONE
        }],
    },
];

fn table_is_sorted() -> bool {
    DISPATCH.windows(2).all(|w| w[0].setting < w[1].setting)
        && DISPATCH.iter().all(|info| {
            info.properties
                .windows(2)
                .all(|w| w[0].property < w[1].property)
        })
}

/// Looks up the dispatch record for `(setting, property)`.
pub(crate) fn lookup(setting: &str, property: &str) -> Option<&'static PropertyInfo> {
    debug_assert!(table_is_sorted());

    let info = DISPATCH
        .binary_search_by(|entry| entry.setting.cmp(&setting))
        .ok()
        .map(|idx| &DISPATCH[idx])?;
    info.properties
        .binary_search_by(|entry| entry.property.cmp(&property))
        .ok()
        .map(|idx| &info.properties[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_strictly_sorted() {
        assert!(table_is_sorted());
    }

    #[test]
    fn lookup_finds_entries() {
        let entry = lookup("802-11-wireless", "ssid").unwrap();
        assert!(entry.reader.is_some());
        assert!(entry.writer.is_some());

        let entry = lookup("ipv6", "addr-gen-mode").unwrap();
        assert!(entry.no_check_key);
        assert!(entry.persist_default);

        assert!(lookup("802-11-wireless", "mode").is_none());
        assert!(lookup("no-such-setting", "ssid").is_none());
    }

    #[test]
    fn vpn_properties_skip_key_check() {
        for property in [
            "data",
            "persistent",
            "secrets",
            "service-type",
            "timeout",
            "user-name",
        ] {
            let entry = lookup("vpn", property).unwrap();
            assert!(entry.no_check_key, "vpn.{property} must not require a key");
        }
    }
}
