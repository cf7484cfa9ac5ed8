use std::path::Path;

use crate::error::StoreError;
use crate::model::Workspace;

/// Save a workspace to a JSON file, creating parent directories.
pub fn save_workspace(workspace: &Workspace, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(workspace)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a workspace from a JSON file.
pub fn load_workspace(path: &Path) -> Result<Workspace, StoreError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
