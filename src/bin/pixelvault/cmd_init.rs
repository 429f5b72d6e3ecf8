use anyhow::{Context, Result};
use std::path::PathBuf;

use PixelVault::bootstrap::create_claim_file;
use PixelVault::consts::CLAIM_FILE_SIZE;

pub fn exec(path: PathBuf) -> Result<()> {
    if path.exists() {
        println!("claim file already exists at {}", path.display());
        return Ok(());
    }
    create_claim_file(&path).with_context(|| format!("create {}", path.display()))?;
    println!("Initialized claim file at {} ({} B)", path.display(), CLAIM_FILE_SIZE);
    Ok(())
}
