#![warn(missing_docs)]
//! Test fixtures for the retention engine: simulated players, a
//! fault-injecting inventory and a JSONL outcome log.

mod faulty;
mod player;

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub use faulty::*;
pub use player::*;

use keepinv_core::ItemStack;

/// Plain stackable item.
pub fn stack(item_id: &str, quantity: u32) -> ItemStack {
    ItemStack::new(item_id, quantity)
}

/// Single damaged tool.
pub fn tool(item_id: &str, current: u32, max: u32) -> ItemStack {
    ItemStack::new(item_id, 1).with_durability(current, max)
}

/// One line of the outcome log.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a, T: Serialize> {
    /// Wall-clock time the record was written (RFC 3339).
    pub timestamp: String,
    /// Script step that produced the event.
    pub step: usize,
    /// Player name.
    pub player: &'a str,
    /// Event label (`death`, `respawn`, `command`).
    pub kind: &'a str,
    /// Hook outcome or command output.
    pub detail: &'a T,
}

impl<'a, T: Serialize> EventRecord<'a, T> {
    /// Record stamped with the current time.
    pub fn now(step: usize, player: &'a str, kind: &'a str, detail: &'a T) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            step,
            player,
            kind,
            detail,
        }
    }
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create event log {}", path.display()))?;
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write<T: Serialize>(&mut self, event: &EventRecord<'_, T>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}

/// Parse every line of a JSONL log.
pub fn read_jsonl<P: AsRef<Path>>(path: P) -> Result<Vec<serde_json::Value>> {
    let contents = fs::read_to_string(path.as_ref())?;
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).context("Malformed event line"))
        .collect()
}
