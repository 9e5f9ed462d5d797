//! SGP30 air-quality driver (equivalent CO2 + total VOC).
//!
//! The sensor needs ~12ms between the measure command and the read, which
//! is spent in the injected delay. Its internal baseline takes ~15s after
//! power-up; during that period it reports the fixed defaults
//! (400 ppm / 0 ppb), which the node serves as-is.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::SensorError;
use crate::sensors::sensirion_crc;

pub const I2C_ADDR: u8 = 0x58;

pub const CMD_INIT_AIR_QUALITY: [u8; 2] = [0x20, 0x03];
pub const CMD_MEASURE_AIR_QUALITY: [u8; 2] = [0x20, 0x08];

const MEASURE_DELAY_MS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasReading {
    /// Equivalent CO2 (ppm).
    pub co2_ppm: u16,
    /// Total volatile organic compounds (ppb).
    pub tvoc_ppb: u16,
}

pub struct GasSensor;

impl GasSensor {
    pub fn new() -> Self {
        Self
    }

    /// Start the on-chip baseline algorithm.
    pub fn init(&mut self, i2c: &mut impl I2c) -> Result<(), SensorError> {
        i2c.write(I2C_ADDR, &CMD_INIT_AIR_QUALITY)
            .map_err(|_| SensorError::BusFault)
    }

    pub fn read(
        &mut self,
        i2c: &mut impl I2c,
        delay: &mut impl DelayNs,
    ) -> Result<GasReading, SensorError> {
        i2c.write(I2C_ADDR, &CMD_MEASURE_AIR_QUALITY)
            .map_err(|_| SensorError::BusFault)?;
        delay.delay_ms(MEASURE_DELAY_MS);

        let mut buf = [0u8; 6];
        i2c.read(I2C_ADDR, &mut buf)
            .map_err(|_| SensorError::BusFault)?;

        if sensirion_crc(&buf[0..2]) != buf[2] || sensirion_crc(&buf[3..5]) != buf[5] {
            return Err(SensorError::CrcMismatch);
        }

        Ok(GasReading {
            co2_ppm: u16::from_be_bytes([buf[0], buf[1]]),
            tvoc_ppb: u16::from_be_bytes([buf[3], buf[4]]),
        })
    }
}

impl Default for GasSensor {
    fn default() -> Self {
        Self::new()
    }
}
