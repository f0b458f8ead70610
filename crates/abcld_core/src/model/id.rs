//! Opaque identifier generation for weeks and cards.
//!
//! # Invariants
//! - Ids have the shape `id_{base36 unix millis}_{9 base36 chars}`.
//! - One generator never returns the same id twice, including ids it was
//!   told about through [`IdGenerator::reserve`].

use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

const ID_PREFIX: &str = "id_";
const RANDOM_SUFFIX_LEN: usize = 9;
const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Process-local id source owned by the board service.
#[derive(Debug, Default)]
pub struct IdGenerator {
    issued: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh id not previously issued or reserved.
    pub fn next_id(&mut self) -> String {
        loop {
            let candidate = format!(
                "{ID_PREFIX}{}_{}",
                to_base36(u128::from(unix_millis())),
                random_suffix()
            );
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Marks externally created ids (e.g. from an imported board) as taken.
    pub fn reserve<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.issued.extend(ids.into_iter().map(str::to_string));
    }

    /// Number of ids issued or reserved so far.
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}

fn unix_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

fn random_suffix() -> String {
    let encoded = to_base36(Uuid::new_v4().as_u128());
    let mut suffix = encoded
        .chars()
        .rev()
        .take(RANDOM_SUFFIX_LEN)
        .collect::<String>();
    while suffix.len() < RANDOM_SUFFIX_LEN {
        suffix.push('0');
    }
    suffix
}

fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
