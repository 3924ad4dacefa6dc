use crate::error::{HostsentryError, Result, WatchError};
use crate::event::{FileEventKind, RawFsEvent};
use crate::watch::handler::EventRouter;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Create the filesystem watcher and spawn the worker that drives it.
///
/// Watcher creation and root registration happen before the task is
/// spawned: an inaccessible root or an exhausted OS watch limit is fatal to
/// the session and surfaces as the error of this call, not a background
/// panic.
pub(crate) fn spawn_fs_worker(
    watch_paths: &[PathBuf],
    router: Arc<EventRouter>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<JoinHandle<()>> {
    let (tx, mut rx) = mpsc::channel::<notify::Result<Event>>(256);

    let mut watcher: RecommendedWatcher = notify::recommended_watcher(move |res| {
        let _ = tx.blocking_send(res);
    })
    .map_err(|e| HostsentryError::Watch(WatchError::Init(e)))?;

    for path in watch_paths {
        watcher
            .watch(path, RecursiveMode::Recursive)
            .map_err(|e| {
                HostsentryError::Watch(WatchError::WatchPath {
                    path: path.clone(),
                    source: e,
                })
            })?;
        log::info!("Watching {} recursively", path.display());
    }

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                event_result = rx.recv() => {
                    match event_result {
                        Some(Ok(event)) => {
                            if let Some(raw) = convert_notify_event(event) {
                                router.handle(raw).await;
                            }
                        }
                        Some(Err(e)) => {
                            log::error!("Watch error: {}", e);
                        }
                        None => break,
                    }
                }
                _ = shutdown.changed() => {
                    log::debug!("Filesystem worker shutting down");
                    break;
                }
            }
        }
        drop(watcher);
    });

    Ok(handle)
}

/// Map a notify event onto the canonical kinds. Access notifications and
/// catch-all kinds are dropped.
///
/// Moved events report the origin path only. Backends that split one rename
/// into separate From/To notifications would otherwise double-count it in
/// the detector window and report the destination as the origin, so a bare
/// `To` notification is dropped; `From` and `Both` carry the origin as
/// their first path.
fn convert_notify_event(event: Event) -> Option<RawFsEvent> {
    use notify::event::{ModifyKind, RenameMode};

    let kind = match event.kind {
        EventKind::Create(_) => FileEventKind::Created,
        EventKind::Remove(_) => FileEventKind::Deleted,
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From | RenameMode::Both | RenameMode::Any => FileEventKind::Moved,
            RenameMode::To | RenameMode::Other => return None,
        },
        EventKind::Modify(_) => FileEventKind::Modified,
        _ => return None,
    };

    let path = event.paths.first()?.clone();

    Some(RawFsEvent { kind, path })
}
