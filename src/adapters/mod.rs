//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements       | Connects to                  |
//! |--------------|------------------|------------------------------|
//! | `ble`        | LinkPort         | Bluedroid GATT server        |
//! | `hardware`   | SensorPort       | I2C sensor hub               |
//! |              | IndicatorPort    | LEDC RGB LED                 |
//! | `classifier` | ClassifierPort   | Edge Impulse model (or stub) |
//! | `log_sink`   | EventSink        | Serial log output            |
//! | `time`       | —                | ESP32 system timer           |
//! | `device_id`  | —                | eFuse factory MAC            |

pub mod ble;
pub mod classifier;
pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod time;
