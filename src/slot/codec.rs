//! slot/codec: encode/decode of one claim slot.
//!
//! Text fields are zero-padded UTF-8. Decoding cuts each field at its first NUL,
//! so a claim with an embedded NUL comes back truncated. The id is an f64 LE.

use byteorder::{ByteOrder, LittleEndian};

use crate::claim::Claim;
use crate::consts::{
    MAX_CONTENT_BYTES, MAX_USERNAME_BYTES, SLOT_OFF_CONTENT, SLOT_OFF_ID, SLOT_OFF_USERNAME,
    SLOT_SIZE,
};
use crate::error::{StoreError, StoreResult};

/// Encode into an existing slot region (`out.len() == SLOT_SIZE`).
/// The whole region is rewritten, so stale bytes of a previous occupant vanish.
/// Oversized fields are rejected, never truncated.
pub fn encode_slot_into(out: &mut [u8], username: &str, content: &str, id: f64) -> StoreResult<()> {
    debug_assert_eq!(out.len(), SLOT_SIZE);
    let c = content.as_bytes();
    let u = username.as_bytes();
    if u.len() > MAX_USERNAME_BYTES {
        return Err(StoreError::UsernameTooLong { len: u.len() });
    }
    if c.len() > MAX_CONTENT_BYTES {
        return Err(StoreError::ContentTooLong { len: c.len() });
    }

    out.fill(0);
    out[SLOT_OFF_CONTENT..SLOT_OFF_CONTENT + c.len()].copy_from_slice(c);
    out[SLOT_OFF_USERNAME..SLOT_OFF_USERNAME + u.len()].copy_from_slice(u);
    LittleEndian::write_f64(&mut out[SLOT_OFF_ID..SLOT_OFF_ID + 8], id);
    Ok(())
}

pub fn encode_slot(claim: &Claim) -> StoreResult<[u8; SLOT_SIZE]> {
    let mut slot = [0u8; SLOT_SIZE];
    encode_slot_into(&mut slot, &claim.username, &claim.content, claim.id)?;
    Ok(slot)
}

/// Decode a slot. Returns None for an empty slot (all fields at zero value).
/// Never fails: invalid UTF-8 is replaced with U+FFFD.
pub fn decode_slot(slot: &[u8]) -> Option<Claim> {
    debug_assert_eq!(slot.len(), SLOT_SIZE);
    let content = read_padded_str(&slot[SLOT_OFF_CONTENT..SLOT_OFF_USERNAME]);
    let username = read_padded_str(&slot[SLOT_OFF_USERNAME..SLOT_OFF_ID]);
    let id = LittleEndian::read_f64(&slot[SLOT_OFF_ID..SLOT_OFF_ID + 8]);

    let claim = Claim {
        username,
        content,
        id,
    };
    if claim.is_zero() {
        None
    } else {
        Some(claim)
    }
}

// A zero byte never occurs inside a multi-byte UTF-8 sequence, so cutting at the
// first zero byte equals cutting at the first NUL code point.
fn read_padded_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
