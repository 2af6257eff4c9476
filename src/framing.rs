//! Receive-side framing: how raw bytes become items in an inbound queue.
//!
//! The framer is picked once from [`FramingMode`] when a controller is built
//! and never switched while the link is running.

use crate::queue::InboundQueue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Byte that ends a line, on both the receive and transmit side.
pub const LINE_FEED: u8 = b'\n';
/// Dropped on receive.
pub const CARRIAGE_RETURN: u8 = b'\r';

/// Selects the receive strategy and which inbound queue gets filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FramingMode {
    /// Every byte goes to the inbound byte queue.
    Binary,
    /// Newline-delimited text goes to the inbound line queue.
    #[default]
    Text,
}

impl std::str::FromStr for FramingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" => Ok(Self::Binary),
            "text" => Ok(Self::Text),
            other => Err(format!("unknown framing mode '{other}' (expected 'binary' or 'text')")),
        }
    }
}

/// Consumes the received stream one byte at a time.
pub trait Framer: Send {
    fn push(&mut self, byte: u8);
}

/// Passes every byte straight through.
#[derive(Debug)]
pub struct BinaryFramer {
    queue: Arc<InboundQueue<u8>>,
}

impl BinaryFramer {
    pub fn new(queue: Arc<InboundQueue<u8>>) -> Self {
        Self { queue }
    }
}

impl Framer for BinaryFramer {
    fn push(&mut self, byte: u8) {
        self.queue.push(byte);
    }
}

/// Splits the stream on `\n`, dropping `\r`.
///
/// Whatever is still buffered when the framer is dropped is discarded: a line
/// without its terminator is never delivered.
#[derive(Debug)]
pub struct LineFramer {
    queue: Arc<InboundQueue<String>>,
    line: String,
}

impl LineFramer {
    pub fn new(queue: Arc<InboundQueue<String>>) -> Self {
        Self {
            queue,
            line: String::with_capacity(128),
        }
    }

    /// Bytes of the line received so far.
    pub fn pending(&self) -> &str {
        &self.line
    }
}

impl Framer for LineFramer {
    fn push(&mut self, byte: u8) {
        match byte {
            CARRIAGE_RETURN => {}
            LINE_FEED => self.queue.push(std::mem::take(&mut self.line)),
            // One byte, one char.
            other => self.line.push(char::from(other)),
        }
    }
}

/// Encode a line for transmission: one byte per char plus the terminator.
///
/// Characters outside ASCII are sent as `?`.
pub fn encode_line(text: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = text
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect();
    bytes.push(LINE_FEED);
    bytes
}
