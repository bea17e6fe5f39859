//! JSON save blob persistence. Unavailable or corrupt storage degrades to a
//! logged warning, never a crash.

use std::path::Path;

use tarn_actors::SaveState;

pub fn load(path: &Path) -> Option<SaveState> {
    if !path.exists() {
        return None;
    }
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            log::warn!("could not read save file {}: {e}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(state) => {
            log::info!("loaded saved game from {}", path.display());
            Some(state)
        }
        Err(e) => {
            log::warn!("save file {} is not readable: {e}", path.display());
            None
        }
    }
}

pub fn write(path: &Path, state: &SaveState) {
    let blob = match serde_json::to_string_pretty(state) {
        Ok(b) => b,
        Err(e) => {
            log::warn!("could not serialize save state: {e}");
            return;
        }
    };
    match std::fs::write(path, blob) {
        Ok(()) => log::info!("game saved to {}", path.display()),
        Err(e) => log::warn!("could not write save file {}: {e}", path.display()),
    }
}
