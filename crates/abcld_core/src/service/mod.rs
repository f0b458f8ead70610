//! Board use-case services.
//!
//! # Responsibility
//! - Own the live board and apply invariant-preserving mutations.
//! - Drive load/flush of board snapshots against a store.

pub mod autosave;
pub mod board_service;
