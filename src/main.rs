//! LifeGuard Node Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single cooperative scheduler loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  BleLink          HardwareAdapter        EdgeClassifier        │
//! │  (LinkPort)       (Sensor+Indicator)     (ClassifierPort)      │
//! │  LogEventSink     MonotonicClock                               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              NodeService (pure logic)                  │    │
//! │  │  link FSM · feature window · classify · publish        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use anyhow::anyhow;
    use esp_idf_hal::delay::{Delay, FreeRtos};
    use esp_idf_hal::gpio::AnyIOPin;
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::units::Hertz;
    use log::info;

    use lifeguard_node::adapters::ble::BleLink;
    use lifeguard_node::adapters::classifier::EdgeClassifier;
    use lifeguard_node::adapters::device_id;
    use lifeguard_node::adapters::hardware::HardwareAdapter;
    use lifeguard_node::adapters::log_sink::LogEventSink;
    use lifeguard_node::adapters::time::MonotonicClock;
    use lifeguard_node::app::ports::IndicatorPort;
    use lifeguard_node::app::service::{LinkState, NodeService};
    use lifeguard_node::config::NodeConfig;
    use lifeguard_node::drivers::rgb_led::RgbLed;
    use lifeguard_node::pins;
    use lifeguard_node::sensors::SensorHub;

    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("LifeGuard node v{}", env!("CARGO_PKG_VERSION"));

    let config = NodeConfig::default();
    let peripherals = Peripherals::take()?;

    // ── 2. Sensor bus ─────────────────────────────────────────
    // SAFETY: pin numbers come from the board's pin map; each is claimed
    // exactly once here.
    let sda = unsafe { AnyIOPin::new(pins::I2C_SDA_GPIO) };
    let scl = unsafe { AnyIOPin::new(pins::I2C_SCL_GPIO) };
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        sda,
        scl,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ).into()),
    )?;

    let mut hub = SensorHub::new(i2c, Delay::new_default());
    hub.init()
        .map_err(|e| anyhow!("sensor bring-up failed: {e}"))?;

    // ── 3. Status LED ─────────────────────────────────────────
    let timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default().frequency(Hertz(pins::LED_PWM_FREQ_HZ).into()),
    )?;
    let led = RgbLed::new(
        LedcDriver::new(peripherals.ledc.channel0, &timer, unsafe {
            AnyIOPin::new(pins::LED_R_GPIO)
        })?,
        LedcDriver::new(peripherals.ledc.channel1, &timer, unsafe {
            AnyIOPin::new(pins::LED_G_GPIO)
        })?,
        LedcDriver::new(peripherals.ledc.channel2, &timer, unsafe {
            AnyIOPin::new(pins::LED_B_GPIO)
        })?,
    );

    let mut hw = HardwareAdapter::new(hub, led);
    hw.set_rgb(0, 255, 0); // boot indicator

    // ── 4. Link + identity ────────────────────────────────────
    let mac = device_id::read_mac();
    let name = device_id::advertising_name(&mac);
    info!("Device name: {}", name);

    let mut link = BleLink::new(name);
    link.start().map_err(|e| anyhow!("link bring-up failed: {e}"))?;

    // ── 5. Scheduler loop ─────────────────────────────────────
    let mut classifier = EdgeClassifier::new();
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();
    let mut service = NodeService::new(config.clone());

    info!("System ready. Entering scheduler loop.");

    loop {
        service.tick(
            &mut link,
            &mut hw,
            &mut classifier,
            &mut sink,
            clock.uptime_us(),
        );

        // Connected ticks run back-to-back; disconnected ones idle-poll
        // instead of spinning on the radio.
        if service.link_state() == LinkState::Disconnected {
            FreeRtos::delay_ms(config.idle_poll_interval_ms);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    anyhow::bail!("this binary targets ESP-IDF; on the host, use `cargo test`")
}
