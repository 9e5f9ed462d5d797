//! Attribute table and wire encoding for the LifeGuard link service.
//!
//! Every value the node exposes over the wireless link is an attribute:
//! independently readable, subscribable, or writable by the peer. Vector
//! attributes travel as flat little-endian float arrays; the inference
//! label travels as raw UTF-8.
//!
//! ## Service layout
//!
//! | Attribute       | Short id | Access        | Payload          |
//! |-----------------|----------|---------------|------------------|
//! | Version         | `1001`   | Read          | u32 LE           |
//! | Temperature     | `2001`   | Read          | f32 LE (°C)      |
//! | Humidity        | `3001`   | Read          | u32 LE (%RH)     |
//! | Pressure        | `4001`   | Read          | f32 LE (hPa)     |
//! | Accelerometer   | `5001`   | Read+Notify   | 3× f32 LE        |
//! | Gyroscope       | `6001`   | Read+Notify   | 3× f32 LE        |
//! | Quaternion      | `7001`   | Read+Notify   | 4× f32 LE (xyzw) |
//! | RgbLed          | `8001`   | Read+Write    | 3 bytes R,G,B    |
//! | Inference       | `8005`   | Read+Notify   | UTF-8, ≤16 bytes |
//! | Co2             | `9002`   | Read          | i32 LE (ppm)     |
//! | Gas             | `9003`   | Read          | u32 LE           |
//!
//! Short id `9001` is intentionally unassigned (was a proprietary
//! air-quality index on earlier hardware).

/// 128-bit base UUID; the per-attribute short id slots into the second
/// group: `19b10000-XXXX-537e-4f6c-d104768a1214`.
pub const SERVICE_UUID_BASE: u128 = 0x19b1_0000_0000_537e_4f6c_d104_768a_1214;

/// Short id of the service declaration itself.
pub const SERVICE_SHORT_ID: u16 = 0x0000;

/// Maximum bytes of a peer write accepted by the link layer (ATT default
/// MTU minus headers).
pub const MAX_WRITE_LEN: usize = 20;

/// Maximum bytes of the inference label attribute.
pub const MAX_LABEL_LEN: usize = 16;

/// Every attribute the node exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeId {
    Version,
    Temperature,
    Humidity,
    Pressure,
    Accelerometer,
    Gyroscope,
    Quaternion,
    RgbLed,
    Inference,
    Co2,
    Gas,
}

impl AttributeId {
    /// All attributes, in service-registration order.
    pub const ALL: [AttributeId; 11] = [
        Self::Version,
        Self::Temperature,
        Self::Humidity,
        Self::Pressure,
        Self::Accelerometer,
        Self::Gyroscope,
        Self::Quaternion,
        Self::RgbLed,
        Self::Inference,
        Self::Co2,
        Self::Gas,
    ];

    /// The attribute's short id (second UUID group).
    pub const fn short_id(self) -> u16 {
        match self {
            Self::Version => 0x1001,
            Self::Temperature => 0x2001,
            Self::Humidity => 0x3001,
            Self::Pressure => 0x4001,
            Self::Accelerometer => 0x5001,
            Self::Gyroscope => 0x6001,
            Self::Quaternion => 0x7001,
            Self::RgbLed => 0x8001,
            Self::Inference => 0x8005,
            Self::Co2 => 0x9002,
            Self::Gas => 0x9003,
        }
    }

    /// Full 128-bit UUID.
    pub const fn uuid(self) -> u128 {
        compose_uuid(self.short_id())
    }

    /// Whether a peer can subscribe to this attribute for notifications.
    pub const fn supports_notify(self) -> bool {
        matches!(
            self,
            Self::Accelerometer | Self::Gyroscope | Self::Quaternion | Self::Inference
        )
    }

    /// Whether a peer may write this attribute.
    pub const fn writable(self) -> bool {
        matches!(self, Self::RgbLed)
    }

    /// Look an attribute up by its short id (inbound GATT dispatch).
    pub fn from_short_id(short: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.short_id() == short)
    }
}

/// Compose a full UUID from a short id.
pub const fn compose_uuid(short: u16) -> u128 {
    SERVICE_UUID_BASE | ((short as u128) << 80)
}

// ---------------------------------------------------------------------------
// Wire encoding — little-endian flat layouts
// ---------------------------------------------------------------------------

/// Three-axis vector (angular rate, acceleration) as 12 LE bytes.
pub fn encode_vec3(v: [f32; 3]) -> [u8; 12] {
    let mut out = [0u8; 12];
    for (chunk, component) in out.chunks_exact_mut(4).zip(v) {
        chunk.copy_from_slice(&component.to_le_bytes());
    }
    out
}

/// Orientation quaternion (x, y, z, w) as 16 LE bytes.
pub fn encode_vec4(v: [f32; 4]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (chunk, component) in out.chunks_exact_mut(4).zip(v) {
        chunk.copy_from_slice(&component.to_le_bytes());
    }
    out
}

pub fn encode_f32(v: f32) -> [u8; 4] {
    v.to_le_bytes()
}

pub fn encode_u32(v: u32) -> [u8; 4] {
    v.to_le_bytes()
}

pub fn encode_i32(v: i32) -> [u8; 4] {
    v.to_le_bytes()
}

/// Decode a peer write to the RGB indicator attribute.
/// Exactly three bytes; anything else is rejected.
pub fn decode_rgb(payload: &[u8]) -> Option<[u8; 3]> {
    match payload {
        [r, g, b] => Some([*r, *g, *b]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_slots_short_id_into_second_group() {
        // 19b10000-5001-537e-4f6c-d104768a1214
        assert_eq!(
            AttributeId::Accelerometer.uuid(),
            0x19b1_0000_5001_537e_4f6c_d104_768a_1214
        );
        assert_eq!(compose_uuid(SERVICE_SHORT_ID), SERVICE_UUID_BASE);
    }

    #[test]
    fn short_ids_are_unique() {
        for (i, a) in AttributeId::ALL.iter().enumerate() {
            for b in &AttributeId::ALL[i + 1..] {
                assert_ne!(a.short_id(), b.short_id(), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn from_short_id_roundtrip() {
        for a in AttributeId::ALL {
            assert_eq!(AttributeId::from_short_id(a.short_id()), Some(a));
        }
        assert_eq!(AttributeId::from_short_id(0x9001), None);
    }

    #[test]
    fn vec3_is_little_endian_x_first() {
        let bytes = encode_vec3([1.0, -2.5, 0.0]);
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &(-2.5f32).to_le_bytes());
        assert_eq!(&bytes[8..12], &0.0f32.to_le_bytes());
    }

    #[test]
    fn vec4_carries_w_last() {
        let bytes = encode_vec4([0.1, 0.2, 0.3, 0.9]);
        assert_eq!(&bytes[12..16], &0.9f32.to_le_bytes());
    }

    #[test]
    fn rgb_decode_rejects_bad_lengths() {
        assert_eq!(decode_rgb(&[1, 2, 3]), Some([1, 2, 3]));
        assert_eq!(decode_rgb(&[1, 2]), None);
        assert_eq!(decode_rgb(&[1, 2, 3, 4]), None);
        assert_eq!(decode_rgb(&[]), None);
    }

    #[test]
    fn only_rgb_is_writable() {
        for a in AttributeId::ALL {
            assert_eq!(a.writable(), a == AttributeId::RgbLed);
        }
    }
}
