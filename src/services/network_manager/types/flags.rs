//! NetworkManager flag types.

use bitflags::bitflags;

bitflags! {
    /// Access point capability flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NM80211ApFlags: u32 {
        /// No flags.
        const NONE = 0x00000000;
        /// Access point supports privacy/encryption.
        const PRIVACY = 0x00000001;
        /// Access point supports Wi-Fi Protected Setup.
        const WPS = 0x00000002;
        /// Access point supports push-button WPS.
        const WPS_PBC = 0x00000004;
        /// Access point supports PIN-based WPS.
        const WPS_PIN = 0x00000008;
    }

    /// Access point security flags, reported separately for the WPA and RSN
    /// information elements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NM80211ApSecurityFlags: u32 {
        /// No security.
        const NONE = 0x00000000;
        /// Pairwise 40-bit WEP encryption.
        const PAIR_WEP40 = 0x00000001;
        /// Pairwise 104-bit WEP encryption.
        const PAIR_WEP104 = 0x00000002;
        /// Pairwise TKIP encryption.
        const PAIR_TKIP = 0x00000004;
        /// Pairwise CCMP encryption.
        const PAIR_CCMP = 0x00000008;
        /// Group 40-bit WEP encryption.
        const GROUP_WEP40 = 0x00000010;
        /// Group 104-bit WEP encryption.
        const GROUP_WEP104 = 0x00000020;
        /// Group TKIP encryption.
        const GROUP_TKIP = 0x00000040;
        /// Group CCMP encryption.
        const GROUP_CCMP = 0x00000080;
        /// Pre-shared key authentication.
        const KEY_MGMT_PSK = 0x00000100;
        /// 802.1X authentication.
        const KEY_MGMT_802_1X = 0x00000200;
        /// Simultaneous Authentication of Equals.
        const KEY_MGMT_SAE = 0x00000400;
        /// Opportunistic Wireless Encryption.
        const KEY_MGMT_OWE = 0x00000800;
        /// Opportunistic Wireless Encryption transition mode.
        const KEY_MGMT_OWE_TM = 0x00001000;
        /// EAP Suite B 192-bit authentication.
        const KEY_MGMT_EAP_SUITE_B_192 = 0x00002000;
    }

    /// Wi-Fi device capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NMDeviceWifiCapabilities: u32 {
        /// No capabilities.
        const NONE = 0x00000000;
        /// Device supports 40-bit WEP encryption.
        const CIPHER_WEP40 = 0x00000001;
        /// Device supports 104-bit WEP encryption.
        const CIPHER_WEP104 = 0x00000002;
        /// Device supports TKIP encryption.
        const CIPHER_TKIP = 0x00000004;
        /// Device supports AES/CCMP encryption.
        const CIPHER_CCMP = 0x00000008;
        /// Device supports WPA authentication.
        const WPA = 0x00000010;
        /// Device supports WPA2/RSN authentication.
        const RSN = 0x00000020;
        /// Device supports Access Point mode.
        const AP = 0x00000040;
        /// Device supports Ad-Hoc mode.
        const ADHOC = 0x00000080;
        /// Device reports valid frequency information.
        const FREQ_VALID = 0x00000100;
        /// Device supports 2.4GHz frequencies.
        const FREQ_2GHZ = 0x00000200;
        /// Device supports 5GHz frequencies.
        const FREQ_5GHZ = 0x00000400;
        /// Device supports mesh networking.
        const MESH = 0x00001000;
        /// Device supports WPA2/RSN in IBSS mode.
        const IBSS_RSN = 0x00002000;
    }

    /// Secret agent capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NMSecretAgentCapabilities: u32 {
        /// No capabilities.
        const NONE = 0x00000000;
        /// Agent supports VPN hints for authentication.
        const VPN_HINTS = 0x00000001;
    }

    /// Secret agent get secrets flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NMSecretAgentGetSecretsFlags: u32 {
        /// No special behavior.
        const NONE = 0x00000000;
        /// Allow user interaction to get secrets.
        const ALLOW_INTERACTION = 0x00000001;
        /// Request new secrets from the user.
        const REQUEST_NEW = 0x00000002;
        /// User initiated the secrets request.
        const USER_REQUESTED = 0x00000004;
        /// WPS push-button mode is active.
        const WPS_PBC_ACTIVE = 0x00000008;
        /// Only system secrets are requested.
        const ONLY_SYSTEM = 0x80000000;
        /// Suppress error messages.
        const NO_ERRORS = 0x40000000;
    }

    /// Per-secret storage flags, stored in a profile as `<key>-flags`.
    ///
    /// An empty set means the secret is owned by the system (stored by the
    /// daemon alongside the profile).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NMSettingSecretFlags: u32 {
        /// System-owned secret.
        const NONE = 0x00000000;
        /// A user secret agent stores this secret.
        const AGENT_OWNED = 0x00000001;
        /// The secret is never stored and must be asked for every time.
        const NOT_SAVED = 0x00000002;
        /// The secret is optional for activation.
        const NOT_REQUIRED = 0x00000004;
    }
}
