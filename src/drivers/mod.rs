//! Hardware drivers with dual-target (ESP-IDF / host) implementations.

pub mod rgb_led;
