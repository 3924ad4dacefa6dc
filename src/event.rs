use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Event IDs reported in log and alert lines. The file-event and anomaly
/// values are a fixed contract shared with downstream log parsers.
pub const EVENT_ID_CREATED: u32 = 1001;
pub const EVENT_ID_DELETED: u32 = 1002;
pub const EVENT_ID_MOVED: u32 = 1003;
pub const EVENT_ID_MODIFIED: u32 = 1004;
pub const EVENT_ID_NETWORK_CONNECTION: u32 = 2001;
pub const EVENT_ID_PROCESS_START: u32 = 3001;
pub const EVENT_ID_ANOMALY: u32 = 9001;

/// Timestamp format used in every log and alert line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileEventKind {
    Created,
    Deleted,
    Moved,
    Modified,
}

impl FileEventKind {
    pub fn event_id(&self) -> u32 {
        match self {
            FileEventKind::Created => EVENT_ID_CREATED,
            FileEventKind::Deleted => EVENT_ID_DELETED,
            FileEventKind::Moved => EVENT_ID_MOVED,
            FileEventKind::Modified => EVENT_ID_MODIFIED,
        }
    }

    /// Upper-case action name as it appears in the `Action=` log field.
    pub fn action(&self) -> &'static str {
        match self {
            FileEventKind::Created => "CREATED",
            FileEventKind::Deleted => "DELETED",
            FileEventKind::Moved => "MOVED",
            FileEventKind::Modified => "MODIFIED",
        }
    }
}

impl std::fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.action())
    }
}

/// A raw filesystem notification as delivered by the watch source. For moved
/// events only the origin path is reported.
#[derive(Debug, Clone)]
pub struct RawFsEvent {
    pub kind: FileEventKind,
    pub path: PathBuf,
}

/// A canonical filesystem event, immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEvent {
    pub timestamp: DateTime<Local>,
    pub kind: FileEventKind,
    pub file_name: String,
    pub full_path: String,
}

impl FileEvent {
    /// Render the durable log line for this event. Field layout is fixed.
    pub fn log_line(&self) -> String {
        format!(
            "[{}] [FILE EVENT] EventID={} | Action={} | File={} | Path={}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.kind.event_id(),
            self.kind.action(),
            self.file_name,
            self.full_path,
        )
    }
}

/// Numeric summary of one event, consumed once by the anomaly detector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeatureVector {
    pub event_id: u32,
    pub file_size: u64,
}

/// Raised by the detector when event volume inside the trailing window
/// reaches the configured threshold. Delivered to alert sinks and discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalySignal {
    pub timestamp: DateTime<Local>,
    pub count: usize,
    pub threshold: usize,
}

impl AnomalySignal {
    pub const REASON: &'static str = "event-rate-exceeded";

    /// Render the alert line. The marker and EventID 9001 are contract.
    pub fn alert_line(&self) -> String {
        format!(
            "⚠️  [{}] [ANOMALY ALERT] EventID={} | Unusual file activity detected!",
            self.timestamp.format(TIMESTAMP_FORMAT),
            EVENT_ID_ANOMALY,
        )
    }
}
