//! Integration tests for the keyfile codec: reading, writing, legacy
//! acceptance and warning semantics through the public API.

use std::cell::RefCell;
use std::rc::Rc;

use netprofile::keyfile::{
    read_connection, write_connection, ReadOptions, Veto, WarnSeverity, Warning,
};
use netprofile::settings::{Connection, SecretFlags, Setting, Value};
use netprofile::store::KeyFile;
use netprofile::types::{CertValue, IpAddress, IpRoute, RouteAttr};

fn read_text(text: &str) -> (Connection, Vec<Warning>) {
    let store = KeyFile::parse(text).unwrap();
    let warnings = Rc::new(RefCell::new(Vec::new()));
    let warnings_ref = Rc::clone(&warnings);
    let mut collect = move |w: &Warning| {
        warnings_ref.borrow_mut().push(w.clone());
        Veto::Continue
    };
    let connection = read_connection(&store, &ReadOptions::default(), Some(&mut collect)).unwrap();
    let warnings = warnings.borrow().clone();
    (connection, warnings)
}

fn verifiable_connection(kind: &str) -> Connection {
    let mut base = Setting::by_name("connection").unwrap();
    base.set_string("id", "test").unwrap();
    base.set_string("uuid", "8f2b4c19-07a4-4c14-8003-0d5c2d0e0102")
        .unwrap();
    base.set_string("type", kind).unwrap();

    let mut connection = Connection::new();
    connection.add_setting(base);
    connection
}

mod reading {
    use super::*;

    #[test]
    fn ethernet_with_ipv4_address_and_gateway() {
        let (connection, warnings) = read_text(
            "[connection]\nid=x\ntype=802-3-ethernet\n\
             [ipv4]\nmethod=auto\naddress1=10.0.0.1/24,10.0.0.254\n",
        );

        let base = connection.setting("connection").unwrap();
        assert_eq!(base.string_value("id"), Some("x"));
        assert_eq!(base.string_value("type"), Some("802-3-ethernet"));

        let ip4 = connection.setting("ipv4").unwrap();
        assert_eq!(ip4.string_value("method"), Some("auto"));
        assert_eq!(
            ip4.get("addresses"),
            Some(&Value::Addresses(vec![IpAddress {
                address: "10.0.0.1".parse().unwrap(),
                prefix: 24,
            }]))
        );
        assert_eq!(ip4.string_value("gateway"), Some("10.0.0.254"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn legacy_group_aliases_resolve() {
        let (connection, _) = read_text("[ethernet]\nmtu=9000\n[wifi]\nhidden=true\n");

        assert_eq!(
            connection.setting("802-3-ethernet").unwrap().get("mtu"),
            Some(&Value::Uint32(9000))
        );
        assert_eq!(
            connection.setting("802-11-wireless").unwrap().get("hidden"),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn type_alias_is_normalized() {
        let (connection, _) = read_text("[connection]\nid=x\ntype=ethernet\n");

        assert_eq!(
            connection
                .setting("connection")
                .unwrap()
                .string_value("type"),
            Some("802-3-ethernet")
        );
    }

    #[test]
    fn trailing_semicolon_is_deprecated_but_accepted() {
        let (connection, warnings) = read_text("[ipv4]\naddresses=192.168.1.5/24;\n");

        assert_eq!(
            connection.setting("ipv4").unwrap().get("addresses"),
            Some(&Value::Addresses(vec![IpAddress {
                address: "192.168.1.5".parse().unwrap(),
                prefix: 24,
            }]))
        );
        let semicolon: Vec<_> = warnings
            .iter()
            .filter(|w| w.severity == WarnSeverity::Info)
            .collect();
        assert_eq!(semicolon.len(), 1);
        assert!(semicolon[0].message.contains("deprecated semicolon"));
    }

    #[test]
    fn indexed_keys_order_singular_before_plural() {
        let (connection, _) = read_text(
            "[ipv4]\naddress1=10.0.0.1/24\naddress=10.0.0.2/24\naddresses2=10.0.0.3/24\n",
        );

        let Some(Value::Addresses(addresses)) =
            connection.setting("ipv4").unwrap().get("addresses")
        else {
            panic!("addresses not decoded");
        };
        let order: Vec<String> = addresses.iter().map(|a| a.address.to_string()).collect();
        assert_eq!(order, vec!["10.0.0.2", "10.0.0.1", "10.0.0.3"]);
    }

    #[test]
    fn missing_prefix_defaults_with_warning() {
        let (connection, warnings) = read_text("[ipv6]\naddress1=fe80::1\n");

        assert_eq!(
            connection.setting("ipv6").unwrap().get("addresses"),
            Some(&Value::Addresses(vec![IpAddress {
                address: "fe80::1".parse().unwrap(),
                prefix: 64,
            }]))
        );
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("missing prefix length")));
    }

    #[test]
    fn route_gateway_recovery_for_broken_ipv6_writer() {
        let (connection, _) = read_text("[ipv6]\nroute1=fe80::1/64,50\n");

        assert_eq!(
            connection.setting("ipv6").unwrap().get("routes"),
            Some(&Value::Routes(vec![IpRoute::new(
                "fe80::1".parse().unwrap(),
                64,
                None,
                50
            )
            .unwrap()]))
        );
    }

    #[test]
    fn route_options_parse_into_attributes() {
        let (connection, _) = read_text(
            "[ipv4]\nroute1=192.168.5.0/24,192.168.0.1\nroute1_options=mtu=1400,unknown=1,onlink=true\n",
        );

        let Some(Value::Routes(routes)) = connection.setting("ipv4").unwrap().get("routes") else {
            panic!("routes not decoded");
        };
        assert_eq!(routes[0].attributes.get("mtu"), Some(&RouteAttr::Uint32(1400)));
        assert_eq!(
            routes[0].attributes.get("onlink"),
            Some(&RouteAttr::Bool(true))
        );
        assert!(!routes[0].attributes.contains_key("unknown"));
    }

    #[test]
    fn garbage_after_fields_discards_line() {
        let (connection, warnings) =
            read_text("[ipv4]\naddress1=10.0.0.1/24,10.0.0.254,77,extra\n");

        assert!(connection.setting("ipv4").unwrap().is_default("addresses"));
        assert!(warnings.iter().any(|w| w.message.contains("garbage")));
    }

    #[test]
    fn invalid_dns_entries_drop_with_warning() {
        let (connection, warnings) =
            read_text("[ipv4]\ndns=10.0.0.1;fe80::1;not-an-ip;10.0.0.2;\n");

        assert_eq!(
            connection.setting("ipv4").unwrap().get("dns"),
            Some(&Value::StringList(vec![
                "10.0.0.1".to_string(),
                "10.0.0.2".to_string()
            ]))
        );
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.message.contains("DNS"))
                .count(),
            2
        );
    }

    #[test]
    fn ssid_with_escaped_semicolon() {
        let (connection, _) = read_text("[wifi]\nssid=my\\;net\n");

        assert_eq!(
            connection.setting("802-11-wireless").unwrap().get("ssid"),
            Some(&Value::Bytes(Some(b"my;net".to_vec())))
        );
    }

    #[test]
    fn legacy_integer_list_ssid_and_mac() {
        let (connection, _) = read_text(
            "[wifi]\nssid=104;111;109;101;\nmac-address=0;17;34;51;68;85;\n",
        );

        let wifi = connection.setting("802-11-wireless").unwrap();
        assert_eq!(wifi.get("ssid"), Some(&Value::Bytes(Some(b"home".to_vec()))));
        assert_eq!(wifi.string_value("mac-address"), Some("00:11:22:33:44:55"));
    }

    #[test]
    fn mac_of_wrong_length_is_rejected() {
        let (connection, warnings) = read_text("[ethernet]\nmac-address=00:11:22\n");

        assert!(connection
            .setting("802-3-ethernet")
            .unwrap()
            .is_default("mac-address"));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("invalid MAC address")));
    }

    #[test]
    fn cloned_mac_special_token_passes_through() {
        let (connection, warnings) = read_text("[ethernet]\ncloned-mac-address=random\n");

        assert_eq!(
            connection
                .setting("802-3-ethernet")
                .unwrap()
                .string_value("cloned-mac-address"),
            Some("random")
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn serial_parity_accepts_code_and_character() {
        let (connection, _) = read_text("[serial]\nparity=69\n");
        assert_eq!(
            connection.setting("serial").unwrap().get("parity"),
            Some(&Value::Enum(netprofile::settings::PARITY_EVEN))
        );

        let (connection, _) = read_text("[serial]\nparity=o\n");
        assert_eq!(
            connection.setting("serial").unwrap().get("parity"),
            Some(&Value::Enum(netprofile::settings::PARITY_ODD))
        );
    }

    #[test]
    fn unknown_group_warns_and_skips() {
        let (connection, warnings) = read_text("[flux-capacitor]\npower=1.21\n");

        assert!(connection.setting("flux-capacitor").is_none());
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("invalid setting name")));
    }

    #[test]
    fn team_config_must_be_a_json_object() {
        let (connection, warnings) =
            read_text("[team]\nconfig=not json\n[team-port]\nconfig={\"prio\": 9}\n");

        assert!(connection.setting("team").unwrap().is_default("config"));
        assert_eq!(
            connection.setting("team-port").unwrap().string_value("config"),
            Some("{\"prio\": 9}")
        );
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("team configuration")));
    }

    #[test]
    fn addr_gen_mode_defaults_to_eui64_and_rejects_garbage() {
        let (connection, _) = read_text("[ipv6]\nmethod=auto\n");
        assert_eq!(
            connection.setting("ipv6").unwrap().get("addr-gen-mode"),
            Some(&Value::Enum(netprofile::settings::ADDR_GEN_MODE_EUI64))
        );

        let (connection, warnings) = read_text("[ipv6]\naddr-gen-mode=fancy\n");
        assert_eq!(
            connection.setting("ipv6").unwrap().get("addr-gen-mode"),
            Some(&Value::Enum(netprofile::settings::ADDR_GEN_MODE_EUI64))
        );
        assert!(warnings.iter().any(|w| w.message.contains("invalid option")));
    }

    #[test]
    fn sriov_vfs_collect_in_index_order() {
        let (connection, _) = read_text(
            "[sriov]\ntotal-vfs=4\nvf.2=mac=00:11:22:33:44:55\nvf.0=trust=true\nvf.bogus=x\n",
        );

        let Some(Value::Vfs(vfs)) = connection.setting("sriov").unwrap().get("vfs") else {
            panic!("vfs not decoded");
        };
        let indexes: Vec<u32> = vfs.iter().map(|vf| vf.index).collect();
        assert_eq!(indexes, vec![0, 2]);
        assert_eq!(vfs[1].mac.as_deref(), Some("00:11:22:33:44:55"));
    }

    #[test]
    fn qdisc_parent_synthesis() {
        let (connection, _) =
            read_text("[tc]\nqdisc.root=fq_codel\nqdisc.1234:=handle 1235: sfq\n");

        let Some(Value::Qdiscs(qdiscs)) = connection.setting("tc").unwrap().get("qdiscs") else {
            panic!("qdiscs not decoded");
        };
        assert_eq!(qdiscs.len(), 2);
        assert_eq!(qdiscs[0].kind, "fq_codel");
        assert_eq!(qdiscs[0].parent, netprofile::types::TC_HANDLE_ROOT);
        assert_eq!(qdiscs[1].kind, "sfq");
        assert_eq!(qdiscs[1].parent, 0x1234_0000);
        assert_eq!(qdiscs[1].handle, 0x1235_0000);
    }

    #[test]
    fn vpn_data_and_secrets_groups() {
        let (connection, _) = read_text(
            "[vpn]\nservice-type=org.foo\nfoo=bar\n[vpn-secrets]\npassword=s\n",
        );

        let vpn = connection.setting("vpn").unwrap();
        assert_eq!(vpn.string_value("service-type"), Some("org.foo"));

        let Some(Value::StringMap(data)) = vpn.get("data") else {
            panic!("vpn data not decoded");
        };
        assert_eq!(data.get("foo").map(String::as_str), Some("bar"));
        assert!(!data.contains_key("service-type"));

        let Some(Value::StringMap(secrets)) = vpn.get("secrets") else {
            panic!("vpn secrets not decoded");
        };
        assert_eq!(secrets.get("password").map(String::as_str), Some("s"));
    }

    #[test]
    fn bond_options_skip_reserved_interface_name() {
        let (connection, _) = read_text("[bond]\nmode=802.3ad\nmiimon=100\ninterface-name=bond0\n");

        let Some(Value::StringMap(options)) = connection.setting("bond").unwrap().get("options")
        else {
            panic!("bond options not decoded");
        };
        assert_eq!(options.get("mode").map(String::as_str), Some("802.3ad"));
        assert_eq!(options.get("miimon").map(String::as_str), Some("100"));
        assert!(!options.contains_key("interface-name"));
    }

    #[test]
    fn identity_synthesis_from_keyfile_name() {
        let store = KeyFile::parse("[ipv4]\nmethod=auto\n").unwrap();
        let options = ReadOptions {
            keyfile_name: Some("/etc/profiles/office".into()),
            base_dir: None,
        };
        let connection = read_connection(&store, &options, None).unwrap();
        let base = connection.setting("connection").unwrap();

        assert_eq!(base.string_value("id"), Some("office"));
        let uuid = base.string_value("uuid").unwrap().to_string();

        // the uuid must be reproducible for the same file name
        let connection = read_connection(&store, &options, None).unwrap();
        assert_eq!(
            connection
                .setting("connection")
                .unwrap()
                .string_value("uuid"),
            Some(uuid.as_str())
        );
    }

    #[test]
    fn interface_name_found_in_deprecated_location() {
        let (connection, _) = read_text(
            "[connection]\nid=x\ntype=802-3-ethernet\n[802-3-ethernet]\ninterface-name=eth3\n",
        );

        assert_eq!(
            connection
                .setting("connection")
                .unwrap()
                .string_value("interface-name"),
            Some("eth3")
        );
    }

    #[test]
    fn veto_aborts_the_read() {
        let store = KeyFile::parse("[ipv4]\naddresses=192.168.1.5/24;\n").unwrap();
        let mut veto_all = |_: &Warning| Veto::Abort;

        let result = read_connection(&store, &ReadOptions::default(), Some(&mut veto_all));
        assert!(result.is_err());
    }
}

mod certificates {
    use super::*;
    use std::fs;

    #[test]
    fn absolute_path_missing_file_warns_info() {
        let (connection, warnings) = read_text("[802-1x]\nca-cert=/etc/pki/no-such-ca.pem\n");

        assert_eq!(
            connection.setting("802-1x").unwrap().get("ca-cert"),
            Some(&Value::Cert(Some(CertValue::Path(
                "/etc/pki/no-such-ca.pem".into()
            ))))
        );
        assert!(warnings
            .iter()
            .any(|w| w.severity == WarnSeverity::InfoMissingFile));
    }

    #[test]
    fn bare_relative_path_resolves_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ca.pem"), "pem").unwrap();

        let store = KeyFile::parse("[802-1x]\nca-cert=ca.pem\n").unwrap();
        let options = ReadOptions {
            keyfile_name: None,
            base_dir: Some(dir.path().to_path_buf()),
        };
        let warnings = Rc::new(RefCell::new(Vec::new()));
        let warnings_ref = Rc::clone(&warnings);
        let mut collect = move |w: &Warning| {
            warnings_ref.borrow_mut().push(w.clone());
            Veto::Continue
        };
        let connection = read_connection(&store, &options, Some(&mut collect)).unwrap();

        assert_eq!(
            connection.setting("802-1x").unwrap().get("ca-cert"),
            Some(&Value::Cert(Some(CertValue::Path(dir.path().join("ca.pem")))))
        );
        assert!(warnings.borrow().is_empty());
    }

    #[test]
    fn bare_value_without_slash_or_extension_falls_back_to_blob() {
        let (connection, _) = read_text("[802-1x]\nca-cert=certificateblobdata\n");

        assert_eq!(
            connection.setting("802-1x").unwrap().get("ca-cert"),
            Some(&Value::Cert(Some(CertValue::Blob(
                b"certificateblobdata".to_vec()
            ))))
        );
    }

    #[test]
    fn base64_blob_scheme_decodes_strictly() {
        let (connection, _) = read_text("[802-1x]\nclient-cert=data:;base64,aGVsbG8=\n");
        assert_eq!(
            connection.setting("802-1x").unwrap().get("client-cert"),
            Some(&Value::Cert(Some(CertValue::Blob(b"hello".to_vec()))))
        );

        let (connection, warnings) = read_text("[802-1x]\nclient-cert=data:;base64,a GVsbG8=\n");
        assert!(connection.setting("802-1x").unwrap().is_default("client-cert"));
        assert!(warnings.iter().any(|w| w.message.contains("base64")));
    }

    #[test]
    fn pkcs11_uri_kept_verbatim() {
        let (connection, _) =
            read_text("[802-1x]\nprivate-key=pkcs11:token=sim;object=key\n");

        // the store treats the unescaped `;` as opaque string content
        assert_eq!(
            connection.setting("802-1x").unwrap().get("private-key"),
            Some(&Value::Cert(Some(CertValue::Pkcs11(
                "pkcs11:token=sim;object=key".to_string()
            ))))
        );
    }

    #[test]
    fn cert_write_emits_file_scheme() {
        let mut connection = verifiable_connection("802-3-ethernet");
        let mut eap = Setting::by_name("802-1x").unwrap();
        eap.set(
            "ca-cert",
            Value::Cert(Some(CertValue::Path("/etc/pki/ca.pem".into()))),
        )
        .unwrap();
        eap.set(
            "client-cert",
            Value::Cert(Some(CertValue::Blob(b"hello".to_vec()))),
        )
        .unwrap();
        connection.add_setting(eap);

        let store = write_connection(&connection, None).unwrap();
        assert_eq!(
            store.get_string("802-1x", "ca-cert").unwrap(),
            "file:///etc/pki/ca.pem"
        );
        assert_eq!(
            store.get_string("802-1x", "client-cert").unwrap(),
            "data:;base64,aGVsbG8="
        );
    }

    #[test]
    fn legacy_bare_path_normalizes_on_rewrite() {
        let (connection, _) = read_text("[connection]\nid=x\nuuid=u\ntype=802-1x\n[802-1x]\nca-cert=/etc/pki/ca.pem\n");

        let store = write_connection(&connection, None).unwrap();
        assert_eq!(
            store.get_string("802-1x", "ca-cert").unwrap(),
            "file:///etc/pki/ca.pem"
        );
    }
}

mod writing {
    use super::*;

    #[test]
    fn ipv6_route_with_metric_pads_gateway() {
        let mut connection = verifiable_connection("802-3-ethernet");
        let mut ip6 = Setting::by_name("ipv6").unwrap();
        ip6.set(
            "routes",
            Value::Routes(vec![IpRoute::new(
                "2001:db8::".parse().unwrap(),
                32,
                None,
                100,
            )
            .unwrap()]),
        )
        .unwrap();
        connection.add_setting(ip6);

        let store = write_connection(&connection, None).unwrap();
        assert_eq!(
            store.get_string("ipv6", "route1").unwrap(),
            "2001:db8::/32,::,100"
        );
    }

    #[test]
    fn first_address_carries_gateway() {
        let mut connection = verifiable_connection("802-3-ethernet");
        let mut ip4 = Setting::by_name("ipv4").unwrap();
        ip4.set_string("method", "manual").unwrap();
        ip4.set_string("gateway", "10.0.0.254").unwrap();
        ip4.set(
            "addresses",
            Value::Addresses(vec![
                IpAddress {
                    address: "10.0.0.1".parse().unwrap(),
                    prefix: 24,
                },
                IpAddress {
                    address: "10.0.0.2".parse().unwrap(),
                    prefix: 24,
                },
            ]),
        )
        .unwrap();
        connection.add_setting(ip4);

        let store = write_connection(&connection, None).unwrap();
        assert_eq!(
            store.get_string("ipv4", "address1").unwrap(),
            "10.0.0.1/24,10.0.0.254"
        );
        assert_eq!(store.get_string("ipv4", "address2").unwrap(), "10.0.0.2/24");
        // the gateway lives in the address line, not its own key
        assert!(!store.has_key("ipv4", "gateway").unwrap());
    }

    #[test]
    fn route_attributes_write_to_options_key() {
        let mut connection = verifiable_connection("802-3-ethernet");
        let mut ip4 = Setting::by_name("ipv4").unwrap();
        let mut route =
            IpRoute::new("192.168.5.0".parse().unwrap(), 24, None, -1).unwrap();
        route
            .attributes
            .insert("mtu".to_string(), RouteAttr::Uint32(1400));
        route
            .attributes
            .insert("onlink".to_string(), RouteAttr::Bool(true));
        ip4.set("routes", Value::Routes(vec![route])).unwrap();
        connection.add_setting(ip4);

        let store = write_connection(&connection, None).unwrap();
        assert_eq!(
            store.get_string("ipv4", "route1_options").unwrap(),
            "mtu=1400,onlink=true"
        );
    }

    #[test]
    fn defaults_are_not_written_except_persist_default() {
        let mut connection = verifiable_connection("802-3-ethernet");
        let mut ip6 = Setting::by_name("ipv6").unwrap();
        ip6.set_string("method", "auto").unwrap();
        connection.add_setting(ip6);
        let mut vlan = Setting::by_name("vlan").unwrap();
        vlan.set_string("parent", "eth0").unwrap();
        connection.add_setting(vlan);

        let store = write_connection(&connection, None).unwrap();
        // autoconnect is at its default (true): skipped
        assert!(!store.has_key("connection", "autoconnect").unwrap());
        // addr-gen-mode and vlan flags persist their defaults
        assert_eq!(store.get_string("ipv6", "addr-gen-mode").unwrap(), "eui64");
        assert_eq!(store.get_i32("vlan", "flags").unwrap(), 1);
    }

    #[test]
    fn secret_suppression_follows_storage_flags() {
        let mut connection = verifiable_connection("802-11-wireless");
        let mut security = Setting::by_name("802-11-wireless-security").unwrap();
        security.set_string("key-mgmt", "wpa-psk").unwrap();
        security.set_string("psk", "hunter2").unwrap();
        connection.add_setting(security.clone());

        let store = write_connection(&connection, None).unwrap();
        assert_eq!(
            store
                .get_string("802-11-wireless-security", "psk")
                .unwrap(),
            "hunter2"
        );

        security
            .set(
                "psk-flags",
                Value::Flags(SecretFlags::AGENT_OWNED.bits()),
            )
            .unwrap();
        connection.add_setting(security);
        let store = write_connection(&connection, None).unwrap();
        assert!(!store.has_key("802-11-wireless-security", "psk").unwrap());
    }

    #[test]
    fn vpn_secrets_write_to_reserved_group() {
        let mut connection = verifiable_connection("vpn");
        let mut vpn = Setting::by_name("vpn").unwrap();
        vpn.set_string("service-type", "org.foo").unwrap();
        vpn.insert_map_entry("data", "remote", "vpn.example.com")
            .unwrap();
        vpn.insert_map_entry("data", "agent-pass-flags", "1").unwrap();
        vpn.insert_map_entry("secrets", "password", "s").unwrap();
        vpn.insert_map_entry("secrets", "agent-pass", "t").unwrap();
        connection.add_setting(vpn);

        let store = write_connection(&connection, None).unwrap();
        assert_eq!(
            store.get_string("vpn", "remote").unwrap(),
            "vpn.example.com"
        );
        assert_eq!(store.get_string("vpn-secrets", "password").unwrap(), "s");
        // agent-owned secret stays out of the file
        assert!(!store.has_key("vpn-secrets", "agent-pass").unwrap());
    }

    #[test]
    fn type_written_as_short_alias() {
        let connection = verifiable_connection("802-3-ethernet");

        let store = write_connection(&connection, None).unwrap();
        assert_eq!(store.get_string("connection", "type").unwrap(), "ethernet");
    }

    #[test]
    fn parity_written_as_ascii_code() {
        let mut connection = verifiable_connection("802-3-ethernet");
        let mut serial = Setting::by_name("serial").unwrap();
        serial
            .set("parity", Value::Enum(netprofile::settings::PARITY_EVEN))
            .unwrap();
        connection.add_setting(serial);

        let store = write_connection(&connection, None).unwrap();
        assert_eq!(store.get_i32("serial", "parity").unwrap(), 69);
    }

    #[test]
    fn raw_password_written_as_integer_list() {
        let mut connection = verifiable_connection("802-3-ethernet");
        let mut eap = Setting::by_name("802-1x").unwrap();
        eap.set("password-raw", Value::Bytes(Some(b"pw".to_vec())))
            .unwrap();
        connection.add_setting(eap);

        let store = write_connection(&connection, None).unwrap();
        assert_eq!(store.get_value("802-1x", "password-raw").unwrap(), "112;119;");
    }

    #[test]
    fn unverified_connection_is_refused() {
        let connection = Connection::new();
        assert!(write_connection(&connection, None).is_err());
    }

    #[test]
    fn user_data_keys_are_escaped() {
        let mut connection = verifiable_connection("802-3-ethernet");
        let mut user = Setting::by_name("user").unwrap();
        user.insert_map_entry("data", "org.example/key.1", "v")
            .unwrap();
        connection.add_setting(user);

        let store = write_connection(&connection, None).unwrap();
        let keys = store.keys("user");
        assert_eq!(keys.len(), 1);
        assert_ne!(keys[0], "org.example/key.1");

        // and the escaped key decodes back on read
        let (reread, _) = super::read_text(&store.serialize());
        let Some(Value::StringMap(data)) = reread.setting("user").unwrap().get("data") else {
            panic!("user data not decoded");
        };
        assert_eq!(
            data.get("org.example/key.1").map(String::as_str),
            Some("v")
        );
    }
}

mod roundtrip {
    use super::*;

    fn assert_roundtrip(connection: &Connection) {
        let store = write_connection(connection, None).unwrap();
        let reread =
            read_connection(&store, &ReadOptions::default(), None).unwrap();
        assert_eq!(&reread, connection);
    }

    #[test]
    fn canonical_connection_roundtrips() {
        let mut connection = verifiable_connection("802-3-ethernet");
        let mut wired = Setting::by_name("802-3-ethernet").unwrap();
        wired.set_string("mac-address", "00:11:22:33:44:55").unwrap();
        wired.set("mtu", Value::Uint32(9000)).unwrap();
        connection.add_setting(wired);

        let mut ip4 = Setting::by_name("ipv4").unwrap();
        ip4.set_string("method", "manual").unwrap();
        ip4.set_string("gateway", "10.0.0.254").unwrap();
        ip4.set(
            "addresses",
            Value::Addresses(vec![IpAddress {
                address: "10.0.0.1".parse().unwrap(),
                prefix: 24,
            }]),
        )
        .unwrap();
        ip4.set(
            "dns",
            Value::StringList(vec!["10.0.0.53".to_string(), "10.0.0.54".to_string()]),
        )
        .unwrap();
        connection.add_setting(ip4);

        assert_roundtrip(&connection);
    }

    #[test]
    fn wifi_with_binary_ssid_roundtrips() {
        let mut connection = verifiable_connection("802-11-wireless");
        let mut wifi = Setting::by_name("802-11-wireless").unwrap();
        wifi.set("ssid", Value::Bytes(Some(vec![0x01, 0xff, 0x3b])))
            .unwrap();
        wifi.set_string("mode", "infrastructure").unwrap();
        connection.add_setting(wifi);

        assert_roundtrip(&connection);
    }

    #[test]
    fn printable_ssid_with_semicolon_roundtrips() {
        let mut connection = verifiable_connection("802-11-wireless");
        let mut wifi = Setting::by_name("802-11-wireless").unwrap();
        wifi.set("ssid", Value::Bytes(Some(b"my;net".to_vec())))
            .unwrap();
        connection.add_setting(wifi);

        assert_roundtrip(&connection);
    }

    #[test]
    fn routes_and_attributes_roundtrip() {
        let mut connection = verifiable_connection("802-3-ethernet");
        let mut ip6 = Setting::by_name("ipv6").unwrap();
        ip6.set_string("method", "auto").unwrap();
        let mut route = IpRoute::new(
            "2001:db8::".parse().unwrap(),
            32,
            Some("fe80::1".parse().unwrap()),
            100,
        )
        .unwrap();
        route
            .attributes
            .insert("mtu".to_string(), RouteAttr::Uint32(1280));
        ip6.set("routes", Value::Routes(vec![route])).unwrap();
        connection.add_setting(ip6);

        assert_roundtrip(&connection);
    }

    #[test]
    fn vpn_with_secrets_roundtrips() {
        let mut connection = verifiable_connection("vpn");
        let mut vpn = Setting::by_name("vpn").unwrap();
        vpn.set_string("service-type", "org.freedesktop.example")
            .unwrap();
        vpn.insert_map_entry("data", "remote", "host").unwrap();
        vpn.insert_map_entry("secrets", "password", "s").unwrap();
        connection.add_setting(vpn);

        assert_roundtrip(&connection);
    }

    #[test]
    fn sriov_and_tc_roundtrip() {
        let mut connection = verifiable_connection("802-3-ethernet");

        let mut sriov = Setting::by_name("sriov").unwrap();
        sriov.set("total-vfs", Value::Uint32(2)).unwrap();
        sriov
            .set(
                "vfs",
                Value::Vfs(vec![
                    netprofile::types::SriovVf::parse("0 trust=true vlans=10.2.q").unwrap(),
                    netprofile::types::SriovVf::parse("1 mac=AA:BB:CC:DD:EE:FF").unwrap(),
                ]),
            )
            .unwrap();
        connection.add_setting(sriov);

        let mut tc = Setting::by_name("tc").unwrap();
        tc.set(
            "qdiscs",
            Value::Qdiscs(vec![
                netprofile::types::TcQdisc::parse("root fq_codel").unwrap(),
                netprofile::types::TcQdisc::parse("parent 1234: handle 1235: sfq").unwrap(),
            ]),
        )
        .unwrap();
        tc.set(
            "tfilters",
            Value::Tfilters(vec![netprofile::types::TcTfilter::parse(
                "parent 1234: matchall action drop",
            )
            .unwrap()]),
        )
        .unwrap();
        connection.add_setting(tc);

        assert_roundtrip(&connection);
    }

    #[test]
    fn legacy_forms_reach_canonical_form_in_one_hop() {
        // legacy in: integer-list MAC, semicolon-terminated address
        let (connection, _) = read_text(
            "[connection]\nid=x\nuuid=u-1\ntype=ethernet\n\
             [ethernet]\nmac-address=0;17;34;51;68;85;\n\
             [ipv4]\nmethod=manual\naddresses=192.168.1.5/24;\n",
        );

        let store = write_connection(&connection, None).unwrap();
        // canonical out
        assert_eq!(
            store.get_string("802-3-ethernet", "mac-address").unwrap(),
            "00:11:22:33:44:55"
        );
        assert_eq!(
            store.get_string("ipv4", "address1").unwrap(),
            "192.168.1.5/24"
        );

        // canonical form reparses to the same connection
        let reread = read_connection(&store, &ReadOptions::default(), None).unwrap();
        assert_eq!(reread, connection);
    }

    #[test]
    fn gsm_and_bluetooth_scalars_roundtrip() {
        let mut connection = verifiable_connection("gsm");
        let mut gsm = Setting::by_name("gsm").unwrap();
        gsm.set_string("apn", "internet").unwrap();
        gsm.set_string("number", "*99#").unwrap();
        gsm.set("mtu", Value::Uint32(1430)).unwrap();
        connection.add_setting(gsm);

        let mut bt = Setting::by_name("bluetooth").unwrap();
        bt.set_string("bdaddr", "00:11:22:33:44:55").unwrap();
        bt.set_string("type", "panu").unwrap();
        connection.add_setting(bt);

        assert_roundtrip(&connection);
    }
}
