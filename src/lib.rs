#![allow(non_snake_case)]

// Format
pub mod consts;
pub mod slot;   // src/slot/{mod,addr,codec}.rs
pub mod claim;
pub mod error;

// Store
pub mod config;
pub mod store;  // src/store/{mod,core,index,open,claims,close}.rs
mod flush;
pub mod bootstrap;
pub mod metrics;

// Reveal image output
pub mod render; // src/render/{mod,png,reveal}.rs

// HTTP handlers (transport-free)
pub mod serve;

pub mod util;

pub use bootstrap::{create_claim_file, ensure_claim_file};
pub use claim::Claim;
pub use config::{FlushMode, StoreBuilder, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use store::{ClaimStore, SaveMode};
