//! BNO055 absolute-orientation IMU driver.
//!
//! The BNO055 runs its own sensor-fusion firmware, so the node reads
//! ready-made linear acceleration, angular rate, and orientation
//! quaternion registers over I2C — no fusion happens on this MCU.
//!
//! Scale factors (NDOF mode, default unit selection):
//! - acceleration: 100 LSB per m/s²
//! - angular rate: 16 LSB per °/s
//! - quaternion: 2^14 LSB per unit

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::SensorError;

/// Default device address (COM3 pin low).
pub const I2C_ADDR: u8 = 0x28;

const REG_CHIP_ID: u8 = 0x00;
const CHIP_ID: u8 = 0xA0;
const REG_OPR_MODE: u8 = 0x3D;
const REG_PWR_MODE: u8 = 0x3E;
pub const REG_ACC_DATA: u8 = 0x08;
pub const REG_GYR_DATA: u8 = 0x14;
pub const REG_QUA_DATA: u8 = 0x20;

const MODE_CONFIG: u8 = 0x00;
const MODE_NDOF: u8 = 0x0C;
const PWR_NORMAL: u8 = 0x00;

/// Mode-switch settling time from the datasheet (7ms config→operation,
/// rounded up).
const MODE_SWITCH_DELAY_MS: u32 = 20;

pub const ACC_LSB_PER_MS2: f32 = 100.0;
pub const QUA_LSB_PER_UNIT: f32 = 16384.0;

pub struct Imu {
    initialised: bool,
}

impl Imu {
    pub fn new() -> Self {
        Self { initialised: false }
    }

    /// Verify the chip identity and enter NDOF fusion mode.
    pub fn init(
        &mut self,
        i2c: &mut impl I2c,
        delay: &mut impl DelayNs,
    ) -> Result<(), SensorError> {
        let mut id = [0u8; 1];
        i2c.write_read(I2C_ADDR, &[REG_CHIP_ID], &mut id)
            .map_err(|_| SensorError::BusFault)?;
        if id[0] != CHIP_ID {
            return Err(SensorError::WrongChipId);
        }

        i2c.write(I2C_ADDR, &[REG_OPR_MODE, MODE_CONFIG])
            .map_err(|_| SensorError::BusFault)?;
        i2c.write(I2C_ADDR, &[REG_PWR_MODE, PWR_NORMAL])
            .map_err(|_| SensorError::BusFault)?;
        i2c.write(I2C_ADDR, &[REG_OPR_MODE, MODE_NDOF])
            .map_err(|_| SensorError::BusFault)?;
        delay.delay_ms(MODE_SWITCH_DELAY_MS);

        self.initialised = true;
        Ok(())
    }

    /// Raw acceleration LSBs (100 per m/s²).
    pub fn read_accel(&mut self, i2c: &mut impl I2c) -> Result<[i16; 3], SensorError> {
        self.read_vec3(i2c, REG_ACC_DATA)
    }

    /// Raw angular rate LSBs (16 per °/s).
    pub fn read_gyro(&mut self, i2c: &mut impl I2c) -> Result<[i16; 3], SensorError> {
        self.read_vec3(i2c, REG_GYR_DATA)
    }

    /// Unit quaternion in (x, y, z, w) order. The chip stores w first.
    pub fn read_quaternion(&mut self, i2c: &mut impl I2c) -> Result<[f32; 4], SensorError> {
        let mut buf = [0u8; 8];
        i2c.write_read(I2C_ADDR, &[REG_QUA_DATA], &mut buf)
            .map_err(|_| SensorError::BusFault)?;

        let w = i16::from_le_bytes([buf[0], buf[1]]);
        let x = i16::from_le_bytes([buf[2], buf[3]]);
        let y = i16::from_le_bytes([buf[4], buf[5]]);
        let z = i16::from_le_bytes([buf[6], buf[7]]);

        Ok([x, y, z, w].map(|c| f32::from(c) / QUA_LSB_PER_UNIT))
    }

    fn read_vec3(&mut self, i2c: &mut impl I2c, reg: u8) -> Result<[i16; 3], SensorError> {
        let mut buf = [0u8; 6];
        i2c.write_read(I2C_ADDR, &[reg], &mut buf)
            .map_err(|_| SensorError::BusFault)?;
        Ok([
            i16::from_le_bytes([buf[0], buf[1]]),
            i16::from_le_bytes([buf[2], buf[3]]),
            i16::from_le_bytes([buf[4], buf[5]]),
        ])
    }
}

impl Default for Imu {
    fn default() -> Self {
        Self::new()
    }
}
