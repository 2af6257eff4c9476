//! Host facade: polling, sending and reconnecting.

mod common;

use common::{fast_config, multi_device_opener, wait_until};
use serial_link::{FramingMode, LinkMonitor, MockSerialPort, Received};
use std::time::Duration;

#[test]
fn poll_delivers_lines_in_arrival_order() {
    let port = MockSerialPort::new("MOCK0");
    let mut monitor = LinkMonitor::start_with_opener(fast_config("MOCK0", FramingMode::Text), port.opener()).unwrap();
    assert!(wait_until(|| monitor.is_initialized()));

    port.enqueue_read(b"100\r\n99\r\n");
    assert!(wait_until(|| monitor.controller().is_some_and(|c| c.received_line_count() == 2)));

    let mut received = Vec::new();
    assert_eq!(monitor.poll(|item| received.push(item)), 2);
    assert_eq!(
        received,
        vec![Received::Line("100".into()), Received::Line("99".into())]
    );
    assert_eq!(monitor.poll(|_| {}), 0);

    monitor.shutdown();
}

#[test]
fn poll_delivers_bytes_in_binary_mode() {
    let port = MockSerialPort::new("MOCK0");
    let mut monitor =
        LinkMonitor::start_with_opener(fast_config("MOCK0", FramingMode::Binary), port.opener()).unwrap();

    port.enqueue_read(&[7, 8]);
    assert!(wait_until(|| monitor.controller().is_some_and(|c| c.received_byte_count() == 2)));

    let mut received = Vec::new();
    monitor.poll(|item| received.push(item));
    assert_eq!(received, vec![Received::Byte(7), Received::Byte(8)]);

    monitor.shutdown();
}

#[test]
fn send_reaches_the_device() {
    let port = MockSerialPort::new("MOCK0");
    let mut monitor = LinkMonitor::start_with_opener(fast_config("MOCK0", FramingMode::Text), port.opener()).unwrap();

    monitor.send("99");
    assert!(wait_until(|| port.write_count() == 3));
    assert_eq!(port.written_bytes(), b"99\n".to_vec());

    monitor.shutdown();
}

#[test]
fn reconnect_moves_to_the_new_device() {
    let first = MockSerialPort::new("MOCK0");
    let second = MockSerialPort::new("MOCK1");
    let opener = multi_device_opener(&[&first, &second]);

    let mut monitor = LinkMonitor::start_with_opener(fast_config("MOCK0", FramingMode::Text), opener)
        .unwrap()
        .with_reconnect_delay(Duration::from_millis(30));
    assert!(wait_until(|| monitor.is_initialized()));
    assert_eq!(monitor.device(), Some("MOCK0"));

    monitor.reconnect("MOCK1").unwrap();
    assert_eq!(monitor.device(), Some("MOCK1"));
    assert_eq!(
        monitor.controller().unwrap().config().startup_delay,
        Some(Duration::from_millis(30))
    );

    assert!(wait_until(|| monitor.is_initialized()));
    assert!(!monitor.is_closed());

    monitor.send("ping");
    assert!(wait_until(|| second.write_count() == 5));
    assert_eq!(first.write_count(), 0);

    monitor.shutdown();
    assert!(monitor.is_closed());
}

#[test]
fn reconnect_to_missing_device_reports_closed() {
    let first = MockSerialPort::new("MOCK0");
    let opener = multi_device_opener(&[&first]);

    let mut monitor = LinkMonitor::start_with_opener(fast_config("MOCK0", FramingMode::Text), opener)
        .unwrap()
        .with_reconnect_delay(Duration::ZERO);

    monitor.reconnect("COM42").unwrap();
    assert!(wait_until(|| monitor.is_initialized()));
    assert!(monitor.is_closed());
    assert_eq!(monitor.device(), Some("COM42"));
}
