//! render/reveal: paint the secret image through the claims.
//!
//! The mask has one byte per pixel (row-major): 255 where a claim exists, else 0.
//! Revealed pixels take the secret image; hidden ones take the cover image
//! (or opaque black without one).

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::info;

use crate::consts::{GRID_CAPACITY, GRID_HEIGHT, GRID_WIDTH};
use crate::store::ClaimStore;
use crate::util::write_file_atomic;

use super::png::{decode_rgba, encode_rgba, RgbaImage};

pub const MASK_REVEALED: u8 = 255;
pub const MASK_HIDDEN: u8 = 0;
pub const HIDDEN_PIXEL: [u8; 4] = [0, 0, 0, 255];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub revealed: usize,
    pub total: usize,
}

/// One `get_claim` per grid coordinate.
pub fn reveal_mask(store: &ClaimStore) -> Vec<u8> {
    let mut mask = Vec::with_capacity(GRID_CAPACITY);
    for y in 0..GRID_HEIGHT as i64 {
        for x in 0..GRID_WIDTH as i64 {
            mask.push(if store.get_claim(x, y).is_some() {
                MASK_REVEALED
            } else {
                MASK_HIDDEN
            });
        }
    }
    mask
}

/// Composite RGBA buffers of GRID_WIDTH x GRID_HEIGHT.
pub fn composite(secret: &[u8], cover: Option<&[u8]>, mask: &[u8]) -> Result<Vec<u8>> {
    if mask.len() != GRID_CAPACITY {
        return Err(anyhow!("mask is {} px, expected {}", mask.len(), GRID_CAPACITY));
    }
    if secret.len() != GRID_CAPACITY * 4 {
        return Err(anyhow!("secret image is {} B, expected {}", secret.len(), GRID_CAPACITY * 4));
    }
    if let Some(c) = cover {
        if c.len() != GRID_CAPACITY * 4 {
            return Err(anyhow!("cover image is {} B, expected {}", c.len(), GRID_CAPACITY * 4));
        }
    }

    let mut out = Vec::with_capacity(GRID_CAPACITY * 4);
    for (i, &m) in mask.iter().enumerate() {
        let px = i * 4;
        if m != MASK_HIDDEN {
            out.extend_from_slice(&secret[px..px + 4]);
        } else if let Some(c) = cover {
            out.extend_from_slice(&c[px..px + 4]);
        } else {
            out.extend_from_slice(&HIDDEN_PIXEL);
        }
    }
    Ok(out)
}

fn load_grid_png(path: &Path) -> Result<RgbaImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let img = decode_rgba(&bytes).with_context(|| format!("decode {}", path.display()))?;
    if img.width as usize != GRID_WIDTH || img.height as usize != GRID_HEIGHT {
        return Err(anyhow!(
            "{} is {}x{}, expected {}x{}",
            path.display(),
            img.width,
            img.height,
            GRID_WIDTH,
            GRID_HEIGHT
        ));
    }
    Ok(img)
}

/// Render the partially revealed image to `out` (tmp + rename).
pub fn render_reveal_png(
    store: &ClaimStore,
    secret_png: &Path,
    cover_png: Option<&Path>,
    out: &Path,
) -> Result<RenderStats> {
    let secret = load_grid_png(secret_png)?;
    let cover = cover_png.map(load_grid_png).transpose()?;

    let mask = reveal_mask(store);
    let revealed = mask.iter().filter(|&&m| m != MASK_HIDDEN).count();
    let rgba = composite(
        &secret.pixels,
        cover.as_ref().map(|c| c.pixels.as_slice()),
        &mask,
    )?;
    let png = encode_rgba(GRID_WIDTH as u32, GRID_HEIGHT as u32, &rgba)?;
    write_file_atomic(out, &png).with_context(|| format!("write {}", out.display()))?;

    info!(
        "rendered {} ({} of {} pixels revealed)",
        out.display(),
        revealed,
        GRID_CAPACITY
    );
    Ok(RenderStats {
        revealed,
        total: GRID_CAPACITY,
    })
}
