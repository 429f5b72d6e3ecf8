use anyhow::{anyhow, Result};
use std::path::PathBuf;

use PixelVault::slot::to_index;
use PixelVault::util::hex_dump;
use PixelVault::StoreBuilder;

pub fn exec(path: PathBuf, x: i64, y: i64, json: bool, raw: bool) -> Result<()> {
    let store = StoreBuilder::new().read_only(true).open(&path)?;
    let claim = store.get_claim(x, y);
    let slot = store.raw_slot(x, y);
    store.close()?;

    if json {
        let obj = match &claim {
            Some(c) => serde_json::json!({ "available": false, "tweetData": c }),
            None => serde_json::json!({ "available": true }),
        };
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    match &claim {
        Some(c) => {
            println!("CLAIMED ({}, {}) slot #{}", x, y, to_index(x, y).unwrap_or_default());
            println!("username: {}", c.username);
            println!("content:  {}", c.content);
            println!("id:       {}", c.id);
        }
        None => println!("AVAILABLE ({}, {})", x, y),
    }
    if raw {
        let slot = slot.ok_or_else(|| anyhow!("({}, {}) is outside the grid", x, y))?;
        println!("slot:\n{}", hex_dump(&slot));
    }
    Ok(())
}
