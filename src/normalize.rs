use crate::event::{FeatureVector, FileEvent, RawFsEvent};
use chrono::Local;

/// Convert a raw notification into the canonical event record plus its
/// feature vector.
///
/// The size lookup races against the filesystem: for deleted or moved files
/// the path is usually already gone, which is normal and yields size 0
/// rather than an error. Never fails.
pub fn normalize(raw: &RawFsEvent) -> (FileEvent, FeatureVector) {
    let full_path = raw.path.to_string_lossy().to_string();
    let file_name = raw
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| full_path.clone());

    let file_size = std::fs::metadata(&raw.path).map(|m| m.len()).unwrap_or(0);

    let event = FileEvent {
        timestamp: Local::now(),
        kind: raw.kind,
        file_name,
        full_path,
    };
    let features = FeatureVector {
        event_id: raw.kind.event_id(),
        file_size,
    };

    (event, features)
}
