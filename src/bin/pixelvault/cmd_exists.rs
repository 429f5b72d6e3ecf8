use anyhow::Result;
use std::path::PathBuf;

use PixelVault::StoreBuilder;

pub fn exec(path: PathBuf, username: String) -> Result<()> {
    let store = StoreBuilder::new().read_only(true).open(&path)?;
    let found = store.tweet_exists(&username);
    store.close()?;
    if found {
        println!("EXISTS '{}'", username);
    } else {
        println!("NOT FOUND '{}'", username);
    }
    Ok(())
}
