//! Board domain model.
//!
//! # Responsibility
//! - Define the board aggregate (title, weeks, cards) and card vocabularies.
//! - Issue opaque ids for newly created weeks and cards.
//!
//! # Invariants
//! - The board exclusively owns its weeks and cards; cards point back to
//!   weeks by id only.

pub mod board;
pub mod id;
