//! store/index: username -> present.
//!
//! Derived from the slots, never persisted. Rebuilt with one row-major scan on open
//! and kept in step with every save.

use std::collections::HashSet;

use crate::consts::{GRID_HEIGHT, GRID_WIDTH, SLOT_SIZE};
use crate::slot::{decode_slot, to_byte_offset};

#[derive(Debug, Default)]
pub struct UsernameIndex {
    names: HashSet<String>,
}

impl UsernameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a full claim buffer (y outer, x inner).
    pub fn rebuild(buffer: &[u8]) -> Self {
        let mut idx = Self::new();
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                let off = to_byte_offset(GRID_WIDTH * y + x);
                if let Some(claim) = decode_slot(&buffer[off..off + SLOT_SIZE]) {
                    idx.names.insert(claim.username);
                }
            }
        }
        idx
    }

    #[inline]
    pub fn contains(&self, username: &str) -> bool {
        self.names.contains(username)
    }

    #[inline]
    pub fn insert(&mut self, username: &str) -> bool {
        self.names.insert(username.to_string())
    }

    #[inline]
    pub fn remove(&mut self, username: &str) -> bool {
        self.names.remove(username)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
