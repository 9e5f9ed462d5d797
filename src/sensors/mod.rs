//! Sensor subsystem — individual I2C drivers and the aggregating [`SensorHub`].
//!
//! The hub owns the bus and every driver, and serves the motion accessors
//! and the on-demand [`EnvSnapshot`]. Drivers are written against
//! `embedded_hal::i2c::I2c`, so the whole subsystem runs on the host
//! against a scripted bus in tests.
//!
//! Every accessor returns the last known good value: an I2C fault is
//! logged and the previous reading is served until the sensor recovers.

pub mod gas;
pub mod humidity;
pub mod imu;
pub mod pressure;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::EnvSnapshot;
use crate::error::SensorError;

use gas::GasSensor;
use humidity::HumiditySensor;
use imu::Imu;
use pressure::PressureSensor;

/// Aggregates all sensor drivers behind last-known-value accessors.
pub struct SensorHub<I2C, D> {
    bus: I2C,
    delay: D,
    imu: Imu,
    humidity: HumiditySensor,
    pressure: PressureSensor,
    gas: GasSensor,

    accel: [f32; 3],
    gyro: [f32; 3],
    quat: [f32; 4],
    env: EnvSnapshot,
}

impl<I2C: I2c, D: DelayNs> SensorHub<I2C, D> {
    pub fn new(bus: I2C, delay: D) -> Self {
        Self {
            bus,
            delay,
            imu: Imu::new(),
            humidity: HumiditySensor::new(),
            pressure: PressureSensor::new(),
            gas: GasSensor::new(),
            accel: [0.0; 3],
            gyro: [0.0; 3],
            quat: [0.0, 0.0, 0.0, 1.0],
            env: EnvSnapshot::default(),
        }
    }

    /// Probe and configure every sensor. Called once at boot; a missing
    /// sensor is fatal here, not in the tick path.
    pub fn init(&mut self) -> Result<(), SensorError> {
        self.imu.init(&mut self.bus, &mut self.delay)?;
        self.pressure.init(&mut self.bus)?;
        self.gas.init(&mut self.bus)?;
        Ok(())
    }

    /// Linear acceleration, raw sensor units.
    pub fn accel(&mut self) -> [f32; 3] {
        match self.imu.read_accel(&mut self.bus) {
            Ok(raw) => self.accel = raw.map(f32::from),
            Err(e) => warn!("accel read failed: {e}"),
        }
        self.accel
    }

    /// Linear acceleration in m/s².
    pub fn accel_ms2(&mut self) -> [f32; 3] {
        self.accel().map(|lsb| lsb / imu::ACC_LSB_PER_MS2)
    }

    /// Angular rate, raw sensor units.
    pub fn gyro(&mut self) -> [f32; 3] {
        match self.imu.read_gyro(&mut self.bus) {
            Ok(raw) => self.gyro = raw.map(f32::from),
            Err(e) => warn!("gyro read failed: {e}"),
        }
        self.gyro
    }

    /// Orientation quaternion, unit-scaled, (x, y, z, w).
    pub fn quaternion(&mut self) -> [f32; 4] {
        match self.imu.read_quaternion(&mut self.bus) {
            Ok(q) => self.quat = q,
            Err(e) => warn!("quaternion read failed: {e}"),
        }
        self.quat
    }

    /// Environmental readings for on-demand attribute serves.
    pub fn env(&mut self) -> EnvSnapshot {
        match self.humidity.read(&mut self.bus) {
            Ok(r) => {
                self.env.temperature_c = r.temperature_c;
                self.env.humidity_pct = r.humidity_pct;
            }
            Err(e) => warn!("humidity read failed: {e}"),
        }
        match self.pressure.read(&mut self.bus) {
            Ok(hpa) => self.env.pressure_hpa = hpa,
            Err(e) => warn!("pressure read failed: {e}"),
        }
        match self.gas.read(&mut self.bus, &mut self.delay) {
            Ok(r) => {
                self.env.co2_ppm = i32::from(r.co2_ppm);
                self.env.tvoc_ppb = u32::from(r.tvoc_ppb);
            }
            Err(e) => warn!("gas read failed: {e}"),
        }
        self.env
    }
}

/// CRC-8 used by the Sensirion parts (poly 0x31, init 0xFF).
pub(crate) fn sensirion_crc(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

// ── Test support: scripted register-file bus ──────────────────
