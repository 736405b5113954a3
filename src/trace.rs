//! A line oriented script for driving a replacer deterministically, e.g.
//!
//! ```text
//! # two frames, frame 1 is hot
//! access 1
//! access 2 scan
//! access 1
//! unpin 1
//! unpin 2
//! evict
//! ```
//!
//! Time is simulated: every `access` moves the clock one tick forward
//! before it is recorded and `tick <n>` moves it `n` ticks.

use std::fmt::{Display, Formatter};
use std::io::Write;
use std::sync::Arc;

use log::debug;

use crate::error::{Error, Result};
use crate::storage::buffer::{AccessType, FrameId, ManualClock, Replacer, SyncLRUKReplacer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Access(FrameId, AccessType),
    /// Mark the frame as non-evictable.
    Pin(FrameId),
    /// Mark the frame as evictable.
    Unpin(FrameId),
    Evict,
    Remove(FrameId),
    Size,
    Tick(u64),
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Access(frame_id, AccessType::Unknown) => write!(f, "access {}", frame_id),
            Command::Access(frame_id, access_type) => {
                write!(f, "access {} {}", frame_id, access_type)
            }
            Command::Pin(frame_id) => write!(f, "pin {}", frame_id),
            Command::Unpin(frame_id) => write!(f, "unpin {}", frame_id),
            Command::Evict => write!(f, "evict"),
            Command::Remove(frame_id) => write!(f, "remove {}", frame_id),
            Command::Size => write!(f, "size"),
            Command::Tick(n) => write!(f, "tick {}", n),
        }
    }
}

/// Parse a whole script, blank lines and `#` comments are skipped.
pub fn parse(script: &str) -> Result<Vec<Command>> {
    let mut commands = vec![];
    for (i, line) in script.lines().enumerate() {
        let line = match line.split_once('#') {
            Some((before, _)) => before,
            None => line,
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        let cmd = parse_command(&tokens)
            .map_err(|e| Error::Parse(format!("line {}: {}", i + 1, e)))?;
        commands.push(cmd);
    }
    Ok(commands)
}

fn parse_command(tokens: &[&str]) -> Result<Command> {
    let cmd = match tokens {
        ["access", frame_id] => Command::Access(frame_id.parse()?, AccessType::Unknown),
        ["access", frame_id, access_type] => {
            Command::Access(frame_id.parse()?, access_type.parse()?)
        }
        ["pin", frame_id] => Command::Pin(frame_id.parse()?),
        ["unpin", frame_id] => Command::Unpin(frame_id.parse()?),
        ["evict"] => Command::Evict,
        ["remove", frame_id] => Command::Remove(frame_id.parse()?),
        ["size"] => Command::Size,
        ["tick", n] => Command::Tick(n.parse()?),
        _ => return Err(Error::Parse(format!("unexpected command: {}", tokens.join(" ")))),
    };
    Ok(cmd)
}

/// Replays commands against a replacer backed by a simulated clock.
pub struct Replay {
    replacer: SyncLRUKReplacer,
    clock: Arc<ManualClock>,
}

impl Replay {
    pub fn new(capacity: usize, k: usize) -> Result<Self> {
        let clock = Arc::new(ManualClock::new(0));
        let replacer = SyncLRUKReplacer::with_clock(capacity, k, clock.clone())?;
        Ok(Replay { replacer, clock })
    }

    pub fn replacer(&self) -> &SyncLRUKReplacer {
        &self.replacer
    }

    /// Apply the commands in order and write one line per command. Contract
    /// violations reported by the replacer are written out and the replay
    /// carries on, only I/O failures abort it.
    pub fn run<W: Write>(&mut self, commands: &[Command], out: &mut W) -> Result<()> {
        for cmd in commands {
            let outcome = match self.apply(cmd) {
                Ok(s) => s,
                Err(e @ Error::Internal(_)) => return Err(e),
                Err(e) => format!("error: {}", e),
            };
            debug!("{} -> {}", cmd, outcome);
            writeln!(out, "{} -> {}", cmd, outcome)?;
        }
        Ok(())
    }

    fn apply(&mut self, cmd: &Command) -> Result<String> {
        let outcome = match *cmd {
            Command::Access(frame_id, access_type) => {
                let now = self.clock.advance(1)?;
                self.replacer.record_access(frame_id, access_type)?;
                format!("ok @{}", now)
            }
            Command::Pin(frame_id) => {
                self.replacer.set_evictable(frame_id, false)?;
                "ok".to_string()
            }
            Command::Unpin(frame_id) => {
                self.replacer.set_evictable(frame_id, true)?;
                "ok".to_string()
            }
            Command::Evict => match self.replacer.evict()? {
                Some(frame_id) => frame_id.to_string(),
                None => "none".to_string(),
            },
            Command::Remove(frame_id) => {
                self.replacer.remove(frame_id)?;
                "ok".to_string()
            }
            Command::Size => self.replacer.size()?.to_string(),
            Command::Tick(n) => format!("@{}", self.clock.advance(n)?),
        };
        Ok(outcome)
    }
}
