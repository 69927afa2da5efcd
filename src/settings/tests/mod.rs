//! Unit tests for the settings model.

use crate::settings::{
    Connection, PropertyKind, SecretFlags, Setting, SettingsError, Value, SETTING_CONNECTION,
    SETTING_VPN,
};

fn base_connection() -> Connection {
    let mut setting = Setting::by_name(SETTING_CONNECTION).unwrap();
    setting.set_string("id", "office").unwrap();
    setting
        .set_string("uuid", "3a2f5f1e-0000-4000-8000-0000000000aa")
        .unwrap();
    setting.set_string("type", "802-3-ethernet").unwrap();

    let mut connection = Connection::new();
    connection.add_setting(setting);
    connection
}

#[test]
fn fresh_setting_reports_defaults() {
    let setting = Setting::by_name(SETTING_CONNECTION).unwrap();

    assert_eq!(setting.get("autoconnect"), Some(&Value::Bool(true)));
    assert_eq!(setting.get("id"), Some(&Value::Str(None)));
    assert!(setting.get("no-such-property").is_none());
    assert!(setting.is_default("autoconnect"));
}

#[test]
fn set_enforces_declared_kind() {
    let mut setting = Setting::by_name(SETTING_CONNECTION).unwrap();

    setting.set("autoconnect", Value::Bool(false)).unwrap();
    assert!(!setting.is_default("autoconnect"));

    let err = setting.set("autoconnect", Value::Uint32(1)).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::KindMismatch {
            expected: PropertyKind::Bool,
            found: PropertyKind::Uint32,
            ..
        }
    ));
}

#[test]
fn unknown_setting_name_is_rejected() {
    assert!(matches!(
        Setting::by_name("flux-capacitor"),
        Err(SettingsError::UnknownSetting(_))
    ));
}

#[test]
fn secret_flags_resolve_companion_property() {
    let mut security = Setting::by_name("802-11-wireless-security").unwrap();
    assert_eq!(security.secret_flags("psk"), SecretFlags::NONE);

    security
        .set("psk-flags", Value::Flags(SecretFlags::AGENT_OWNED.bits()))
        .unwrap();
    assert_eq!(security.secret_flags("psk"), SecretFlags::AGENT_OWNED);
}

#[test]
fn vpn_secret_flags_come_from_data_map() {
    let mut vpn = Setting::by_name(SETTING_VPN).unwrap();
    vpn.insert_map_entry("data", "password-flags", "1").unwrap();
    vpn.insert_map_entry("secrets", "password", "hunter2")
        .unwrap();

    assert_eq!(vpn.secret_flags("password"), SecretFlags::AGENT_OWNED);
    assert_eq!(vpn.secret_flags("otp"), SecretFlags::NONE);
}

#[test]
fn add_setting_replaces_same_name() {
    let mut connection = base_connection();
    let mut replacement = Setting::by_name(SETTING_CONNECTION).unwrap();
    replacement.set_string("id", "home").unwrap();
    connection.add_setting(replacement);

    assert_eq!(connection.settings().count(), 1);
    assert_eq!(
        connection
            .setting(SETTING_CONNECTION)
            .unwrap()
            .string_value("id"),
        Some("home")
    );
}

#[test]
fn verify_requires_identity_fields() {
    assert!(base_connection().verify().is_ok());

    let mut missing_type = Connection::new();
    let mut setting = Setting::by_name(SETTING_CONNECTION).unwrap();
    setting.set_string("id", "x").unwrap();
    setting.set_string("uuid", "y").unwrap();
    missing_type.add_setting(setting);
    assert!(matches!(
        missing_type.verify(),
        Err(SettingsError::Verify { .. })
    ));

    let mut bad_type = base_connection();
    bad_type
        .setting_mut(SETTING_CONNECTION)
        .unwrap()
        .set_string("type", "warp-drive")
        .unwrap();
    assert!(matches!(bad_type.verify(), Err(SettingsError::Verify { .. })));
}
