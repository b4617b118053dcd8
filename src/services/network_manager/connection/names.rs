//! Setting names, well-known property keys and the table of secret-valued
//! properties for every setting the applet stores credentials for.

/// `connection` setting: identity and type of a profile.
pub const CONNECTION: &str = "connection";
/// `802-11-wireless` setting.
pub const WIRELESS: &str = "802-11-wireless";
/// `802-11-wireless-security` setting.
pub const WIRELESS_SECURITY: &str = "802-11-wireless-security";
/// `802-1x` setting.
pub const IEEE_8021X: &str = "802-1x";
/// `802-3-ethernet` setting.
pub const WIRED: &str = "802-3-ethernet";
/// `pppoe` setting.
pub const PPPOE: &str = "pppoe";
/// `vpn` setting.
pub const VPN: &str = "vpn";
/// `gsm` setting.
pub const GSM: &str = "gsm";
/// `cdma` setting.
pub const CDMA: &str = "cdma";

/// Applet-private tag holding the path of the 802.1x private key file.
pub const PATH_PRIVATE_KEY_TAG: &str = "nma-path-private-key";
/// Applet-private tag holding the path of the phase 2 private key file.
pub const PATH_PHASE2_PRIVATE_KEY_TAG: &str = "nma-path-phase2-private-key";
/// Keyring key under which a private key password is stored.
pub const PRIVATE_KEY_PASSWORD_TAG: &str = "nma-private-key-password";
/// Keyring key under which a phase 2 private key password is stored.
pub const PHASE2_PRIVATE_KEY_PASSWORD_TAG: &str = "nma-phase2-private-key-password";

/// A secret-valued property and the property holding its secret flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretProperty {
    /// Property holding the secret itself.
    pub key: &'static str,
    /// Property holding its `NMSettingSecretFlags`.
    pub flags_key: &'static str,
}

const fn secret(key: &'static str, flags_key: &'static str) -> SecretProperty {
    SecretProperty { key, flags_key }
}

const WIRELESS_SECURITY_SECRETS: &[SecretProperty] = &[
    secret("psk", "psk-flags"),
    secret("wep-key0", "wep-key-flags"),
    secret("wep-key1", "wep-key-flags"),
    secret("wep-key2", "wep-key-flags"),
    secret("wep-key3", "wep-key-flags"),
    secret("leap-password", "leap-password-flags"),
];

const IEEE_8021X_SECRETS: &[SecretProperty] = &[
    secret("password", "password-flags"),
    secret("password-raw", "password-raw-flags"),
    secret("pin", "pin-flags"),
    secret("private-key-password", "private-key-password-flags"),
    secret("phase2-private-key-password", "phase2-private-key-password-flags"),
];

const PPPOE_SECRETS: &[SecretProperty] = &[secret("password", "password-flags")];

const GSM_SECRETS: &[SecretProperty] = &[
    secret("password", "password-flags"),
    secret("pin", "pin-flags"),
];

const CDMA_SECRETS: &[SecretProperty] = &[secret("password", "password-flags")];

/// Secret-valued properties of a setting.
///
/// VPN secrets are not listed: they live in the `secrets` map of the `vpn`
/// setting and are keyed by the plugin.
pub fn secret_properties(setting: &str) -> &'static [SecretProperty] {
    match setting {
        WIRELESS_SECURITY => WIRELESS_SECURITY_SECRETS,
        IEEE_8021X => IEEE_8021X_SECRETS,
        PPPOE => PPPOE_SECRETS,
        GSM => GSM_SECRETS,
        CDMA => CDMA_SECRETS,
        _ => &[],
    }
}

/// Settings that may carry secrets for a connection type, primary first.
///
/// Wireless profiles also rely on their 802.1x sub-setting; wired ones on
/// PPPoE and 802.1x.
pub fn secret_settings_for_type(connection_type: &str) -> &'static [&'static str] {
    match connection_type {
        WIRELESS => &[WIRELESS_SECURITY, IEEE_8021X],
        WIRED => &[PPPOE, IEEE_8021X],
        PPPOE => &[PPPOE],
        GSM => &[GSM],
        CDMA => &[CDMA],
        VPN => &[VPN],
        _ => &[],
    }
}
