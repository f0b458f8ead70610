//! Persistence boundary for board snapshots.
//!
//! # Responsibility
//! - Define the key-value contract the editor saves into.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - Stores hold encoded text only; encoding/decoding lives in `codec`.

pub mod board_store;
