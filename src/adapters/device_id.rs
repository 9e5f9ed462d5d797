//! Device identity derived from the factory MAC address.
//!
//! Produces the advertising local name `LifeGuard-XXYY` (last 2 bytes of
//! the 6-byte MAC in uppercase hex), deterministic across reboots, so a
//! peer can tell nodes apart without pairing.

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Derive the advertising name from the last 2 MAC bytes.
/// Format: `LifeGuard-XXYY` (e.g., `LifeGuard-CAFE`).
pub fn advertising_name(mac: &MacAddress) -> heapless::String<24> {
    let mut name = heapless::String::<24>::new();
    use core::fmt::Write;
    let _ = write!(name, "LifeGuard-{:02X}{:02X}", mac[4], mac[5]);
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advertising_name_format() {
        let mac = [0x00, 0x11, 0x22, 0xAA, 0xBB, 0xCC];
        assert_eq!(advertising_name(&mac).as_str(), "LifeGuard-BBCC");
    }

    #[test]
    fn sim_mac_deterministic() {
        assert_eq!(read_mac(), read_mac());
        assert_eq!(advertising_name(&read_mac()).as_str(), "LifeGuard-CAFE");
    }
}
