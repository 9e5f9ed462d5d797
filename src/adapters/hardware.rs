//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the RGB LED driver, exposing them through
//! [`SensorPort`] and [`IndicatorPort`]. This is the only module in the
//! system that touches the sensor bus and the LED at the same time.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::ports::{EnvSnapshot, IndicatorPort, SensorPort};
use crate::drivers::rgb_led::RgbLed;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I2C, D> {
    hub: SensorHub<I2C, D>,
    led: RgbLed,
}

impl<I2C: I2c, D: DelayNs> HardwareAdapter<I2C, D> {
    pub fn new(hub: SensorHub<I2C, D>, led: RgbLed) -> Self {
        Self { hub, led }
    }

    pub fn led(&self) -> &RgbLed {
        &self.led
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I2C: I2c, D: DelayNs> SensorPort for HardwareAdapter<I2C, D> {
    fn gyro(&mut self) -> [f32; 3] {
        self.hub.gyro()
    }

    fn accel(&mut self) -> [f32; 3] {
        self.hub.accel()
    }

    fn accel_ms2(&mut self) -> [f32; 3] {
        self.hub.accel_ms2()
    }

    fn quaternion(&mut self) -> [f32; 4] {
        self.hub.quaternion()
    }

    fn env(&mut self) -> EnvSnapshot {
        self.hub.env()
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<I2C: I2c, D: DelayNs> IndicatorPort for HardwareAdapter<I2C, D> {
    fn set_rgb(&mut self, r: u8, g: u8, b: u8) {
        self.led.set_colour(r, g, b);
    }
}
