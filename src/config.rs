//! Centralized configuration and builder for the claim store.
//!
//! - StoreConfig::from_env() reads PV_* environment variables.
//! - StoreBuilder (ClaimStore::builder()) starts from env and allows overrides.
//!
//! Defaults:
//! - flush_mode = slots (write only slots dirtied since the previous flush)
//! - data_fsync = false (no fsync after background flushes; close always writes the full buffer)
//! - lock_file = true (exclusive advisory lock on the claim file; shared when read_only)
//! - read_only = false (read-only handle, saves rejected, close writes nothing)

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

/// What a background flush writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushMode {
    /// Rewrite the whole buffer at offset 0.
    Full,
    /// Rewrite only the slots touched since the last flush.
    Slots,
}

impl FromStr for FlushMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(FlushMode::Full),
            "slots" | "slot" => Ok(FlushMode::Slots),
            other => Err(anyhow!("unknown flush mode '{}' (expected full|slots)", other)),
        }
    }
}

impl fmt::Display for FlushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushMode::Full => f.write_str("full"),
            FlushMode::Slots => f.write_str("slots"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Env: PV_FLUSH_MODE = full|slots (default slots)
    pub flush_mode: FlushMode,

    /// fsync the claim file after each background flush and on close.
    /// Env: PV_DATA_FSYNC (default false; "1|true|on|yes" => true)
    pub data_fsync: bool,

    /// Hold an exclusive fs2 lock on the claim file while open.
    /// Env: PV_LOCK_FILE (default true)
    pub lock_file: bool,

    /// Open the file without write access. Saves fail with ReadOnly and
    /// close releases the handle without rewriting the file.
    /// Env: PV_READ_ONLY (default false)
    pub read_only: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            flush_mode: FlushMode::Slots,
            data_fsync: false,
            lock_file: true,
            read_only: false,
        }
    }
}

fn parse_bool(v: &str) -> bool {
    let s = v.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "on" || s == "yes"
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("PV_FLUSH_MODE") {
            match v.parse::<FlushMode>() {
                Ok(m) => cfg.flush_mode = m,
                Err(e) => log::warn!("ignoring PV_FLUSH_MODE: {}", e),
            }
        }

        if let Ok(v) = std::env::var("PV_DATA_FSYNC") {
            cfg.data_fsync = parse_bool(&v);
        }

        if let Ok(v) = std::env::var("PV_LOCK_FILE") {
            cfg.lock_file = parse_bool(&v);
        }

        if let Ok(v) = std::env::var("PV_READ_ONLY") {
            cfg.read_only = parse_bool(&v);
        }

        cfg
    }
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoreConfig {{ flush_mode: {}, data_fsync: {}, lock_file: {}, read_only: {} }}",
            self.flush_mode, self.data_fsync, self.lock_file, self.read_only,
        )
    }
}

/// Builder that produces a StoreConfig and opens the store with it.
#[derive(Clone, Debug)]
pub struct StoreBuilder {
    cfg: StoreConfig,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self {
            cfg: StoreConfig::from_env(),
        }
    }
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a clean default (without reading env).
    pub fn from_default() -> Self {
        Self {
            cfg: StoreConfig::default(),
        }
    }

    pub fn flush_mode(mut self, mode: FlushMode) -> Self {
        self.cfg.flush_mode = mode;
        self
    }

    pub fn data_fsync(mut self, on: bool) -> Self {
        self.cfg.data_fsync = on;
        self
    }

    pub fn lock_file(mut self, on: bool) -> Self {
        self.cfg.lock_file = on;
        self
    }

    pub fn read_only(mut self, on: bool) -> Self {
        self.cfg.read_only = on;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.cfg
    }
}
