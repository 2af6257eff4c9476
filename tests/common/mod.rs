//! Shared helpers for driving controllers against mock devices.

#![allow(dead_code)]

use serial_link::{
    ConnectionConfig, DeviceOpener, FramingMode, MockSerialPort, PortConfiguration, PortError,
    SerialPortAdapter,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Poll `condition` until it holds or five seconds pass.
pub fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Connection settings with short timeouts so tests shut down quickly.
pub fn fast_config(device: &str, mode: FramingMode) -> ConnectionConfig {
    ConnectionConfig::new(device, 115200)
        .with_mode(mode)
        .with_read_timeout(Duration::from_millis(20))
        .with_writer_poll(Duration::from_millis(20))
}

/// An opener that resolves device names to distinct mock ports.
pub fn multi_device_opener(ports: &[&MockSerialPort]) -> DeviceOpener {
    let ports: HashMap<String, MockSerialPort> = ports
        .iter()
        .map(|p| (p.name().to_string(), (*p).clone()))
        .collect();
    Arc::new(move |name: &str, _config: PortConfiguration| -> Result<Box<dyn SerialPortAdapter>, PortError> {
        ports
            .get(name)
            .map(|p| Box::new(p.clone()) as Box<dyn SerialPortAdapter>)
            .ok_or_else(|| PortError::not_found(name))
    })
}

/// Wrap `inner` so every open attempt is counted.
pub fn counting_opener(inner: DeviceOpener) -> (DeviceOpener, Arc<AtomicUsize>) {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let opener: DeviceOpener = Arc::new(
        move |name: &str, config: PortConfiguration| -> Result<Box<dyn SerialPortAdapter>, PortError> {
            counter.fetch_add(1, Ordering::SeqCst);
            inner(name, config)
        },
    );
    (opener, attempts)
}

/// An opener that reaches `port` but refuses it, as a device that vanishes
/// while being configured.
pub fn refusing_opener(port: &MockSerialPort) -> DeviceOpener {
    let inner = port.opener();
    Arc::new(move |name: &str, config: PortConfiguration| -> Result<Box<dyn SerialPortAdapter>, PortError> {
        drop(inner(name, config)?);
        Err(PortError::not_found(name))
    })
}
