//! slot: addressing and encoding of fixed 628-byte claim slots.
//!
//! - addr.rs : (x, y) -> slot index -> byte offset, bounds checks
//! - codec.rs: Claim <-> slot bytes

pub mod addr;
pub mod codec;

pub use addr::{in_bounds, to_byte_offset, to_index};
pub use codec::{decode_slot, encode_slot, encode_slot_into};
