//! bootstrap: create a fresh, zero-filled claim file of the exact expected size.

use std::fs::OpenOptions;
use std::path::Path;

use log::info;

use crate::consts::CLAIM_FILE_SIZE;
use crate::error::StoreResult;

/// Create a new claim file. Fails if the path already exists.
pub fn create_claim_file(path: &Path) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let f = OpenOptions::new().create_new(true).write(true).open(path)?;
    // set_len zero-fills
    f.set_len(CLAIM_FILE_SIZE)?;
    f.sync_all()?;
    info!("created claim file {} ({} B)", path.display(), CLAIM_FILE_SIZE);
    Ok(())
}

/// Create the claim file if missing. Returns true when a file was created.
pub fn ensure_claim_file(path: &Path) -> StoreResult<bool> {
    if path.exists() {
        return Ok(false);
    }
    create_claim_file(path)?;
    Ok(true)
}
