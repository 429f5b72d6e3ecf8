use anyhow::Result;
use std::path::PathBuf;

use PixelVault::store::ClaimStore;

pub fn exec(path: PathBuf, x: i64, y: i64, username: String, content: String, id: f64) -> Result<()> {
    let mut store = ClaimStore::open(&path)?;
    if let Some(prev) = store.get_claim(x, y) {
        eprintln!("warning: ({}, {}) was claimed by '{}', overwriting", x, y, prev.username);
    }
    // close() writes the full buffer, no background flush needed
    store.save_claim_memory_only(x, y, &username, &content, id)?;
    store.close()?;
    println!(
        "OK put: ({}, {}) username='{}' ({} B), content={} B, id={}",
        x,
        y,
        username,
        username.len(),
        content.len(),
        id
    );
    Ok(())
}
