use anyhow::Result;
use std::path::PathBuf;

use PixelVault::consts::{GRID_CAPACITY, GRID_HEIGHT, GRID_WIDTH, SLOT_SIZE};
use PixelVault::render::reveal_mask;
use PixelVault::store::ClaimStore;
use PixelVault::StoreBuilder;

pub fn exec(path: PathBuf, json: bool) -> Result<()> {
    let store = StoreBuilder::new().read_only(true).open(&path)?;
    let claimed = reveal_mask(&store).iter().filter(|&&m| m != 0).count();
    let usernames = store.claim_count();
    let buf_len = store.file_buffer_len();
    let expected = ClaimStore::expected_file_buffer_len();
    let cfg = store.config().clone();
    store.close()?;

    if json {
        let obj = serde_json::json!({
            "path": path.display().to_string(),
            "grid": { "width": GRID_WIDTH, "height": GRID_HEIGHT, "slot_size": SLOT_SIZE },
            "file_size": buf_len,
            "expected_file_size": expected,
            "claimed_pixels": claimed,
            "usernames": usernames,
            "flush_mode": cfg.flush_mode.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    println!("path:         {}", path.display());
    println!("grid:         {}x{} slots of {} B", GRID_WIDTH, GRID_HEIGHT, SLOT_SIZE);
    println!("file size:    {} B (expected {} B)", buf_len, expected);
    println!(
        "claimed:      {} / {} pixels ({:.3}%)",
        claimed,
        GRID_CAPACITY,
        claimed as f64 * 100.0 / GRID_CAPACITY as f64
    );
    println!("usernames:    {}", usernames);
    println!("config:       {}", cfg);
    Ok(())
}
