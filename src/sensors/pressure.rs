//! LPS22HB barometric pressure driver.
//!
//! Continuous 10 Hz output with block data update; reads pull the latest
//! 24-bit sample from the output registers (4096 LSB per hPa).

use embedded_hal::i2c::I2c;

use crate::error::SensorError;

pub const I2C_ADDR: u8 = 0x5C;

const REG_WHO_AM_I: u8 = 0x0F;
const WHO_AM_I: u8 = 0xB1;
const REG_CTRL_REG1: u8 = 0x10;
pub const REG_PRESS_OUT_XL: u8 = 0x28;

/// ODR 10 Hz + block data update.
const CTRL_ODR_10HZ_BDU: u8 = 0x22;

const LSB_PER_HPA: f32 = 4096.0;

pub struct PressureSensor;

impl PressureSensor {
    pub fn new() -> Self {
        Self
    }

    pub fn init(&mut self, i2c: &mut impl I2c) -> Result<(), SensorError> {
        let mut id = [0u8; 1];
        i2c.write_read(I2C_ADDR, &[REG_WHO_AM_I], &mut id)
            .map_err(|_| SensorError::BusFault)?;
        if id[0] != WHO_AM_I {
            return Err(SensorError::WrongChipId);
        }
        i2c.write(I2C_ADDR, &[REG_CTRL_REG1, CTRL_ODR_10HZ_BDU])
            .map_err(|_| SensorError::BusFault)
    }

    /// Latest pressure in hPa.
    pub fn read(&mut self, i2c: &mut impl I2c) -> Result<f32, SensorError> {
        let mut buf = [0u8; 3];
        i2c.write_read(I2C_ADDR, &[REG_PRESS_OUT_XL], &mut buf)
            .map_err(|_| SensorError::BusFault)?;

        // Sign-extend the 24-bit two's-complement sample.
        let raw = i32::from_le_bytes([buf[0], buf[1], buf[2], 0]) << 8 >> 8;
        Ok(raw as f32 / LSB_PER_HPA)
    }
}

impl Default for PressureSensor {
    fn default() -> Self {
        Self::new()
    }
}
