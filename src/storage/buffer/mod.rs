use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::{Error, Result};

pub mod clock;
pub mod replacer;

pub use clock::{Clock, LogicalClock, ManualClock, MonotonicClock, Timestamp};
pub use replacer::{KDistance, SyncLRUKReplacer};

/// Index of a frame in the buffer pool, valid in range `[0, capacity)`.
pub type FrameId = usize;

/// The kind of access reported to the replacer. It is carried
/// along for instrumentation only, the replacement policy
/// never looks at it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    #[default]
    Unknown,
    Lookup,
    Scan,
    Index,
}

impl Display for AccessType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AccessType::Unknown => "unknown",
            AccessType::Lookup => "lookup",
            AccessType::Scan => "scan",
            AccessType::Index => "index",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AccessType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "unknown" => Ok(AccessType::Unknown),
            "lookup" => Ok(AccessType::Lookup),
            "scan" => Ok(AccessType::Scan),
            "index" => Ok(AccessType::Index),
            other => Err(Error::Parse(format!("unknown access type {}", other))),
        }
    }
}

///  Replacer tracks page usage for replacement in case of buffer pool is full.
///
/// All the methods report contract violations(e.g., an out of range frame id)
/// as errors, while "nothing to do" outcomes are plain `Ok`s.
pub trait Replacer: Send + Sync {
    /// Record the event that the given frame id is accessed at current timestamp.
    /// Create a new entry for access history if frame id has not been seen before.
    fn record_access(&self, frame_id: FrameId, access_type: AccessType) -> Result<()>;

    /// Find the frame to evict with replace policy(e.g. backward k-distance). Only frames that
    /// are marked as evictable are candidates for eviction.
    ///
    /// Successful eviction of a frame should decrement the size of replacer and remove the frame's
    /// access history.
    ///
    /// Return the frame id if a frame is evicted successfully, None if no frames can be evicted.
    fn evict(&self) -> Result<Option<FrameId>>;

    /// Toggle whether a frame is evictable or non-evictable. this function also control replacer
    /// size. Note that size is equal to number of evictable entries.
    ///
    /// If a frame was previously evictable and is to be set to non-evictable, then size should
    /// decrement. If a frame was previously non-evictable and is to be set evictable, then size
    /// should increment. Unknown frames are left untouched.
    fn set_evictable(&self, frame_id: FrameId, evictable: bool) -> Result<()>;

    /// Check if a frame is evictable, None if the frame is not tracked.
    fn is_evictable(&self, frame_id: FrameId) -> Result<Option<bool>>;

    /// Remove an evictable frame from replacer, along with its access history. This function
    /// should also decrement the replacer size if removal is successful.
    ///
    /// Note that this is different from evicting a frame without check replacer policy.
    ///
    /// If remove is called on a non-evictable frame, return an error. If the specified frame is
    /// not found, do nothing without return any error.
    fn remove(&self, frame_id: FrameId) -> Result<()>;

    /// Number of evictable frames.
    fn size(&self) -> Result<usize>;
}
