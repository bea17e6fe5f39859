//! File watcher wiring for shader hot reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, channel};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

/// Watches `assets/shaders/` and forwards changed paths. Returns `None` for
/// the watcher when the platform backend is unavailable; the game runs fine
/// without hot reload.
pub fn watch_shaders(assets_root: &Path) -> (Option<RecommendedWatcher>, Receiver<PathBuf>) {
    let (tx, rx) = channel::<PathBuf>();
    let dir = crate::assets::shaders_dir(assets_root);

    let watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        }
    });

    match watcher {
        Ok(mut w) => {
            if let Err(e) = w.watch(&dir, RecursiveMode::NonRecursive) {
                log::warn!("cannot watch {}: {e}", dir.display());
                return (None, rx);
            }
            (Some(w), rx)
        }
        Err(e) => {
            log::warn!("shader watcher unavailable: {e}");
            (None, rx)
        }
    }
}
