//! SHT31 temperature/humidity driver.
//!
//! Single-shot measurement with clock stretching, so no explicit wait is
//! needed between command and read — the sensor holds SCL until data is
//! ready (≤15ms, well within one tick).

use embedded_hal::i2c::I2c;

use crate::error::SensorError;
use crate::sensors::sensirion_crc;

pub const I2C_ADDR: u8 = 0x44;

/// Single shot, high repeatability, clock stretching enabled.
pub const CMD_MEASURE: [u8; 2] = [0x2C, 0x06];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumidityReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub struct HumiditySensor;

impl HumiditySensor {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&mut self, i2c: &mut impl I2c) -> Result<HumidityReading, SensorError> {
        let mut buf = [0u8; 6];
        i2c.write_read(I2C_ADDR, &CMD_MEASURE, &mut buf)
            .map_err(|_| SensorError::BusFault)?;

        if sensirion_crc(&buf[0..2]) != buf[2] || sensirion_crc(&buf[3..5]) != buf[5] {
            return Err(SensorError::CrcMismatch);
        }

        let t_raw = u16::from_be_bytes([buf[0], buf[1]]);
        let rh_raw = u16::from_be_bytes([buf[3], buf[4]]);

        Ok(HumidityReading {
            temperature_c: -45.0 + 175.0 * f32::from(t_raw) / 65535.0,
            humidity_pct: 100.0 * f32::from(rh_raw) / 65535.0,
        })
    }
}

impl Default for HumiditySensor {
    fn default() -> Self {
        Self::new()
    }
}
