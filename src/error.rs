//! Controller-level errors and the fault record left behind by a worker.

use crate::config::ConfigError;
use crate::port::PortError;
use std::fmt;
use thiserror::Error;

/// Errors returned to the owner of a [`Controller`](crate::Controller).
#[derive(Debug, Error)]
pub enum LinkError {
    /// `launch` was called on a controller that had already been launched.
    #[error("serial link to '{0}' was already launched; build a new controller to reconnect")]
    AlreadyLaunched(String),

    /// The receive worker thread could not be spawned.
    #[error("failed to spawn serial worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Why a link ended, as observed by the worker that ended it.
///
/// Workers never return errors to the owner; they record one of these and set
/// `closed`. Read it with [`Controller::last_fault`](crate::Controller::last_fault).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFault {
    /// The device could not be opened.
    OpenFailure(String),
    /// A read failed with something other than a timeout.
    Read(String),
    /// A write failed.
    Write(String),
    /// The device reported end of stream.
    EndOfStream,
}

impl LinkFault {
    pub(crate) fn open(err: &PortError) -> Self {
        Self::OpenFailure(err.to_string())
    }

    pub(crate) fn read(err: &PortError) -> Self {
        Self::Read(err.to_string())
    }

    pub(crate) fn write(err: &PortError) -> Self {
        Self::Write(err.to_string())
    }
}

impl fmt::Display for LinkFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailure(e) => write!(f, "device could not be opened: {e}"),
            Self::Read(e) => write!(f, "read failed: {e}"),
            Self::Write(e) => write!(f, "write failed: {e}"),
            Self::EndOfStream => write!(f, "device closed the stream"),
        }
    }
}
