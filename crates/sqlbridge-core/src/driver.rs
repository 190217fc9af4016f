//! Process-wide driver-name registry.
//!
//! The registry is the platform's standard list of driver names. Adapter
//! crates append their own name when reporting availability, so discovery
//! callers see every driver compiled into the process exactly once.

use std::sync::{Mutex, OnceLock};

fn registry() -> &'static Mutex<Vec<String>> {
    static REGISTRY: OnceLock<Mutex<Vec<String>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(Vec::new()))
}

/// Register a driver name. Registering an already-known name is a no-op.
pub fn register_driver(name: &str) {
    let mut names = registry().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    if !names.iter().any(|n| n == name) {
        tracing::trace!(driver = name, "registering driver");
        names.push(name.to_string());
    }
}

/// Snapshot of the registered driver names, in registration order.
pub fn available_drivers() -> Vec<String> {
    registry()
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone()
}
