//! Host-side facade: keeps one live controller, drains it on the host's own
//! schedule and swaps it for a fresh one on reconnect.

use crate::controller::{ConnectionConfig, Controller};
use crate::error::LinkError;
use crate::framing::FramingMode;
use crate::port::{DeviceOpener, SyncSerialPort};
use std::time::Duration;
use tracing::{debug, info};

/// Settling time given to a device opened through [`LinkMonitor::reconnect`].
pub const RECONNECT_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// One item taken from an inbound queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Byte(u8),
    Line(String),
}

pub struct LinkMonitor {
    controller: Option<Controller>,
    template: ConnectionConfig,
    opener: DeviceOpener,
    reconnect_delay: Duration,
}

impl LinkMonitor {
    /// Launch a link to a hardware device.
    pub fn start(config: ConnectionConfig) -> Result<Self, LinkError> {
        Self::start_with_opener(config, SyncSerialPort::opener())
    }

    pub fn start_with_opener(config: ConnectionConfig, opener: DeviceOpener) -> Result<Self, LinkError> {
        let controller = Controller::with_opener(config.clone(), opener.clone());
        controller.launch()?;
        Ok(Self {
            controller: Some(controller),
            template: config,
            opener,
            reconnect_delay: RECONNECT_SETTLE_DELAY,
        })
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Hand every item received so far to `on_received`. Returns how many
    /// were delivered.
    pub fn poll(&mut self, mut on_received: impl FnMut(Received)) -> usize {
        let Some(link) = &self.controller else {
            return 0;
        };

        let mut delivered = 0;
        match link.mode() {
            FramingMode::Text => {
                while let Some(line) = link.try_recv_line() {
                    debug!(device = %link.device(), %line, "received line");
                    on_received(Received::Line(line));
                    delivered += 1;
                }
            }
            FramingMode::Binary => {
                while let Some(byte) = link.try_recv_byte() {
                    on_received(Received::Byte(byte));
                    delivered += 1;
                }
            }
        }
        delivered
    }

    /// Queue a line for the device. Dropped if no link is active.
    pub fn send(&self, text: &str) {
        if let Some(link) = &self.controller {
            debug!(device = %link.device(), %text, "sending line");
            link.send_line(text);
        }
    }

    pub fn send_byte(&self, byte: u8) {
        if let Some(link) = &self.controller {
            link.send_byte(byte);
        }
    }

    /// Stop the current link and launch a new one on `device`, after the
    /// reconnect settling delay. Other settings are kept.
    pub fn reconnect(&mut self, device: impl Into<String>) -> Result<(), LinkError> {
        self.shutdown();

        let mut config = self.template.clone();
        config.device = device.into();
        config.startup_delay = Some(self.reconnect_delay);
        info!(device = %config.device, "reconnecting serial link");

        let controller = Controller::with_opener(config.clone(), self.opener.clone());
        controller.launch()?;
        self.template = config;
        self.controller = Some(controller);
        Ok(())
    }

    /// Stop the current link, if any.
    pub fn shutdown(&mut self) {
        if let Some(link) = self.controller.take() {
            link.stop();
        }
    }

    pub fn controller(&self) -> Option<&Controller> {
        self.controller.as_ref()
    }

    pub fn device(&self) -> Option<&str> {
        self.controller.as_ref().map(Controller::device)
    }

    pub fn is_initialized(&self) -> bool {
        self.controller.as_ref().is_some_and(Controller::is_initialized)
    }

    /// A monitor without a link reports closed.
    pub fn is_closed(&self) -> bool {
        self.controller.as_ref().map_or(true, Controller::is_closed)
    }
}

impl std::fmt::Debug for LinkMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkMonitor")
            .field("controller", &self.controller)
            .field("reconnect_delay", &self.reconnect_delay)
            .finish()
    }
}
