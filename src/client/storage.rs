use std::path::Path;

use super::ClientError;
use crate::core::state::AppState;

/// Load saved state. A missing or unreadable file yields an empty list.
pub fn load_state(path: &Path) -> AppState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::error!("Failed to load saved state {}: {}", path.display(), e);
            AppState::default()
        }),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::error!("Failed to read {}: {}", path.display(), e);
            }
            AppState::default()
        }
    }
}

pub fn save_state(path: &Path, state: &AppState) -> Result<(), ClientError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    // Replace atomically via a sibling temp file
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
