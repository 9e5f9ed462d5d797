//! RGB status LED driver.
//!
//! Three LEDC PWM channels drive a common-cathode RGB LED.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: scales each 0–255 component onto the LEDC duty range.
//! On host/test: tracks state in-memory only.

#[cfg(target_os = "espidf")]
use esp_idf_hal::ledc::LedcDriver;

pub struct RgbLed {
    #[cfg(target_os = "espidf")]
    r: LedcDriver<'static>,
    #[cfg(target_os = "espidf")]
    g: LedcDriver<'static>,
    #[cfg(target_os = "espidf")]
    b: LedcDriver<'static>,
    current: (u8, u8, u8),
}

#[cfg(target_os = "espidf")]
impl RgbLed {
    pub fn new(r: LedcDriver<'static>, g: LedcDriver<'static>, b: LedcDriver<'static>) -> Self {
        Self {
            r,
            g,
            b,
            current: (0, 0, 0),
        }
    }

    pub fn set_colour(&mut self, r: u8, g: u8, b: u8) {
        let max = self.r.get_max_duty();
        let _ = self.r.set_duty(u32::from(r) * max / 255);
        let _ = self.g.set_duty(u32::from(g) * max / 255);
        let _ = self.b.set_duty(u32::from(b) * max / 255);
        self.current = (r, g, b);
    }
}

#[cfg(not(target_os = "espidf"))]
impl RgbLed {
    pub fn new() -> Self {
        Self { current: (0, 0, 0) }
    }

    pub fn set_colour(&mut self, r: u8, g: u8, b: u8) {
        self.current = (r, g, b);
    }
}

impl RgbLed {
    pub fn off(&mut self) {
        self.set_colour(0, 0, 0);
    }

    pub fn current_colour(&self) -> (u8, u8, u8) {
        self.current
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for RgbLed {
    fn default() -> Self {
        Self::new()
    }
}
