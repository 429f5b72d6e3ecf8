use anyhow::Result;
use std::path::PathBuf;

use PixelVault::render::render_reveal_png;
use PixelVault::StoreBuilder;

pub fn exec(path: PathBuf, secret: PathBuf, cover: Option<PathBuf>, out: PathBuf) -> Result<()> {
    let store = StoreBuilder::new().read_only(true).open(&path)?;
    let stats = render_reveal_png(&store, &secret, cover.as_deref(), &out)?;
    store.close()?;
    println!(
        "rendered {}: {}/{} pixels revealed ({:.2}%)",
        out.display(),
        stats.revealed,
        stats.total,
        stats.revealed as f64 * 100.0 / stats.total as f64
    );
    Ok(())
}
