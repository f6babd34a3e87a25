//! Utility modules for block sealing

pub mod hashing;

pub use hashing::{abridged, merkle_root, serialize_block_header, sha256, transaction_hash};
