//! store: in-memory mirror of the claim file.
//!
//! - core.rs  : ClaimStore, SaveMode, accessors, Drop
//! - index.rs : username index (derived cache, rebuilt on open)
//! - open.rs  : open/open_with_config, size checks, lock, index rebuild
//! - claims.rs: get_claim / save_claim / tweet_exists
//! - close.rs : final synchronous full write + handle release

pub mod claims;
pub mod close;
pub mod core;
pub mod index;
pub mod open;

pub use self::core::{ClaimStore, SaveMode};
pub use self::index::UsernameIndex;
