//! Port abstraction layer for serial communication.
//!
//! Provides the device handle trait, the hardware implementation and a mock,
//! so the workers can be exercised without a device attached.

pub mod error;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use mock::MockSerialPort;
pub use sync_port::SyncSerialPort;
pub use traits::*;
