fn main() {
    // Only the ESP-IDF build needs the esp-idf environment propagated;
    // host builds (tests) skip it.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
