use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::sync::PoisonError;

use config::ConfigError;

use crate::storage::buffer::FrameId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Internal(String),
    Value(String),
    /// The frame id lies outside `[0, capacity)`.
    InvalidFrame {
        frame_id: FrameId,
        capacity: usize,
    },
    /// Attempt to remove a frame that is still marked non-evictable.
    RemovePinnedFrame(FrameId),
    Parse(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Internal(s) | Error::Value(s) | Error::Parse(s) => {
                write!(f, "{}", s)
            }
            Error::InvalidFrame { frame_id, capacity } => {
                write!(f, "invalid frame id {}, expect it in range [0, {})", frame_id, capacity)
            }
            Error::RemovePinnedFrame(frame_id) => {
                write!(f, "remove a non-evictable frame {}", frame_id)
            }
        }
    }
}

impl std::error::Error for Error {}

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<ParseIntError> for Error {
    fn from(err: ParseIntError) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<log::ParseLevelError> for Error {
    fn from(err: log::ParseLevelError) -> Self {
        Error::Value(err.to_string())
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        Error::Internal(err.to_string())
    }
}
