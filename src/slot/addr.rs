//! slot/addr: mapping of pixel coordinates to slots.
//!
//! Origin (0, 0) is the top-left pixel; slots are laid out row-major.

use crate::consts::{GRID_HEIGHT, GRID_WIDTH, SLOT_SIZE};

#[inline]
pub fn in_bounds(x: i64, y: i64) -> bool {
    x >= 0 && y >= 0 && (x as u64) < GRID_WIDTH as u64 && (y as u64) < GRID_HEIGHT as u64
}

/// Linear slot index of (x, y), or None when outside the grid.
#[inline]
pub fn to_index(x: i64, y: i64) -> Option<usize> {
    if !in_bounds(x, y) {
        return None;
    }
    Some(GRID_WIDTH * y as usize + x as usize)
}

/// Byte offset of a slot. The index must already be validated.
#[inline]
pub fn to_byte_offset(index: usize) -> usize {
    SLOT_SIZE * index
}
