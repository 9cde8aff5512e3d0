//! Structured effect-event journal.
//!
//! Records cast and persistence lifecycle events for display and
//! post-run analysis. The caster and timeline each own one; the headless
//! runner merges and saves them.

use serde::Serialize;

/// A single entry in the effect log
#[derive(Debug, Clone, Serialize)]
pub struct FxLogEntry {
    /// Timestamp in simulation time (seconds since the owner's clock zero)
    pub timestamp: f32,
    /// The type of event
    pub event_type: FxLogEventType,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of effect log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FxLogEventType {
    /// A cast was dispatched
    Cast,
    /// A cast's instance ran to completion
    CastComplete,
    /// A cast was stopped before completing
    CastStopped,
    /// A timeline event was scheduled
    Scheduled,
    /// A round/event execution dispatched scheduled casts
    EventExecuted,
    /// A scheduled event was cancelled
    EventCancelled,
    /// A persistent effect was materialized
    PersistentCreated,
    /// A persistent effect expired by its duration rule
    PersistentExpired,
    /// A persistent effect was explicitly removed
    PersistentRemoved,
    /// A caster's concentration effects were broken
    ConcentrationBroken,
}

/// The effect log storing all events in chronological order
#[derive(Debug, Default)]
pub struct FxLog {
    pub entries: Vec<FxLogEntry>,
    /// Current simulation time, advanced by the owner's tick
    pub sim_time: f32,
}

impl FxLog {
    /// Clear the log for a new run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sim_time = 0.0;
    }

    /// Add a new entry stamped with the current simulation time
    pub fn log(&mut self, event_type: FxLogEventType, message: String) {
        self.entries.push(FxLogEntry {
            timestamp: self.sim_time,
            event_type,
            message,
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: FxLogEventType) -> Vec<&FxLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Count of entries of one type
    pub fn count(&self, event_type: FxLogEventType) -> usize {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&FxLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Append another log's entries (used when merging caster and
    /// timeline journals for output). Entries keep their own stamps.
    pub fn extend_from(&mut self, other: &FxLog) {
        self.entries.extend(other.entries.iter().cloned());
        self.entries
            .sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    }

    /// Save all entries as JSON
    pub fn save_to_file(&self, path: &str) -> Result<(), crate::error::FxError> {
        let json =
            serde_json::to_string_pretty(&self.entries).map_err(|e| crate::error::FxError::Io {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        std::fs::write(path, json).map_err(|e| crate::error::FxError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}
