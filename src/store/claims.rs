//! store/claims: get_claim / save_claim / tweet_exists.
//!
//! save_claim validates in a fixed order and fails on the first violation:
//! coordinates, username length, content length, id, duplicate username.
//! A rejected save leaves buffer and index untouched.
//!
//! Coordinates may be overwritten by a different username; the previous occupant
//! loses its claim and its username is released.

use log::debug;

use crate::claim::Claim;
use crate::consts::{MAX_CONTENT_BYTES, MAX_USERNAME_BYTES, SLOT_SIZE};
use crate::error::{StoreError, StoreResult};
use crate::metrics::{record_claim_rejected, record_claim_saved};
use crate::slot::{decode_slot, encode_slot_into, to_byte_offset, to_index};
use crate::util::{read, write};

use super::core::{ClaimStore, SaveMode};

impl ClaimStore {
    /// Claim at (x, y), or None when out of bounds or empty.
    /// Returns an owned copy; never touches disk.
    pub fn get_claim(&self, x: i64, y: i64) -> Option<Claim> {
        let idx = to_index(x, y)?;
        let off = to_byte_offset(idx);
        let buf = read(&self.buffer);
        decode_slot(&buf[off..off + SLOT_SIZE])
    }

    /// Copy of the 628 stored bytes at (x, y), exactly as they sit in the buffer.
    /// None only when out of bounds; an empty slot comes back as zeros.
    pub fn raw_slot(&self, x: i64, y: i64) -> Option<[u8; SLOT_SIZE]> {
        let off = to_byte_offset(to_index(x, y)?);
        let buf = read(&self.buffer);
        let mut slot = [0u8; SLOT_SIZE];
        slot.copy_from_slice(&buf[off..off + SLOT_SIZE]);
        Some(slot)
    }

    /// Save and schedule a background flush.
    pub fn save_claim(
        &mut self,
        x: i64,
        y: i64,
        username: &str,
        content: &str,
        id: f64,
    ) -> StoreResult<()> {
        self.save_claim_with_mode(x, y, username, content, id, SaveMode::Persist)
    }

    /// Save without scheduling a flush (bulk loading).
    pub fn save_claim_memory_only(
        &mut self,
        x: i64,
        y: i64,
        username: &str,
        content: &str,
        id: f64,
    ) -> StoreResult<()> {
        self.save_claim_with_mode(x, y, username, content, id, SaveMode::MemoryOnly)
    }

    pub fn save_claim_with_mode(
        &mut self,
        x: i64,
        y: i64,
        username: &str,
        content: &str,
        id: f64,
        mode: SaveMode,
    ) -> StoreResult<()> {
        if self.cfg.read_only {
            record_claim_rejected();
            return Err(StoreError::ReadOnly(self.path.clone()));
        }
        let idx = match self.validate(x, y, username, content, id) {
            Ok(idx) => idx,
            Err(e) => {
                record_claim_rejected();
                debug!("rejected claim at ({}, {}) by '{}': {}", x, y, username, e);
                return Err(e);
            }
        };

        let off = to_byte_offset(idx);
        let previous = {
            let mut buf = write(&self.buffer);
            let slot = &mut buf[off..off + SLOT_SIZE];
            let previous = decode_slot(slot);
            encode_slot_into(slot, username, content, id)?;
            previous
        };

        if let Some(prev) = previous {
            debug!("({}, {}) overwritten: '{}' -> '{}'", x, y, prev.username, username);
            self.index.remove(&prev.username);
        }
        self.index.insert(username);
        record_claim_saved(mode == SaveMode::MemoryOnly);

        if mode == SaveMode::Persist {
            self.flusher.enqueue(idx);
        }
        Ok(())
    }

    /// O(1) check whether `username` already holds a claim.
    pub fn tweet_exists(&self, username: &str) -> bool {
        self.index.contains(username)
    }

    fn validate(
        &self,
        x: i64,
        y: i64,
        username: &str,
        content: &str,
        id: f64,
    ) -> StoreResult<usize> {
        let idx = to_index(x, y).ok_or(StoreError::InvalidCoordinates { x, y })?;
        if username.len() > MAX_USERNAME_BYTES {
            return Err(StoreError::UsernameTooLong {
                len: username.len(),
            });
        }
        if content.len() > MAX_CONTENT_BYTES {
            return Err(StoreError::ContentTooLong { len: content.len() });
        }
        if !id.is_finite() || id < 0.0 {
            return Err(StoreError::InvalidId(id));
        }
        if self.index.contains(username) {
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }
        Ok(idx)
    }
}
