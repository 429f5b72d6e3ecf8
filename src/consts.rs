//! Constants of the claim file format (grid, slot layout, file size).
//!
//! The file has no header, footer or version field. It is a row-major array of
//! `GRID_WIDTH * GRID_HEIGHT` slots, each `SLOT_SIZE` bytes:
//!
//! [content 560 B, UTF-8, zero-padded][username 60 B, UTF-8, zero-padded][id f64 LE]

// -------- Grid --------
pub const GRID_WIDTH: usize = 640;
pub const GRID_HEIGHT: usize = 480;
pub const GRID_CAPACITY: usize = GRID_WIDTH * GRID_HEIGHT;

// -------- Field widths --------
pub const MAX_CONTENT_BYTES: usize = 560;
pub const MAX_USERNAME_BYTES: usize = 60;
pub const ID_BYTES: usize = 8;

// -------- Slot --------
pub const SLOT_SIZE: usize = MAX_CONTENT_BYTES + MAX_USERNAME_BYTES + ID_BYTES; // 628

/// Offset of content inside a slot.
pub const SLOT_OFF_CONTENT: usize = 0;
/// Offset of username inside a slot.
pub const SLOT_OFF_USERNAME: usize = SLOT_OFF_CONTENT + MAX_CONTENT_BYTES; // 560
/// Offset of the id (f64 LE) inside a slot.
pub const SLOT_OFF_ID: usize = SLOT_OFF_USERNAME + MAX_USERNAME_BYTES; // 620

// -------- File --------
pub const CLAIM_FILE_SIZE: u64 = (SLOT_SIZE * GRID_CAPACITY) as u64;

/// Default claim file name used by the binaries.
pub const CLAIM_FILE: &str = "claims.bin";
