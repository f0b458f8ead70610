//! Periodic and on-demand board persistence.
//!
//! # Responsibility
//! - Load the saved board at startup, degrading to "nothing saved".
//! - Flush board snapshots to a [`BoardStore`] on demand, when the
//!   autosave interval has elapsed with unsaved edits, and on exit.
//!
//! # Invariants
//! - Flushing never mutates board content; it only refreshes
//!   `last_modified_at`.
//! - A failed flush leaves the in-memory board intact.

use crate::codec::{decode, encode};
use crate::config::EditorConfig;
use crate::model::board::Board;
use crate::repo::board_store::{BoardStore, StoreError, StoreResult};
use crate::service::board_service::BoardService;
use chrono::Utc;
use log::{error, info, warn};
use std::time::{Duration, Instant};

/// Autosave driver bound to one store and storage key.
pub struct Autosave<S: BoardStore> {
    store: S,
    key: String,
    interval: Duration,
    last_flush: Option<Instant>,
    dirty: bool,
}

impl<S: BoardStore> Autosave<S> {
    pub fn new(store: S, config: &EditorConfig) -> Self {
        Self {
            store,
            key: config.storage_key.clone(),
            interval: config.autosave_interval,
            last_flush: None,
            dirty: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the saved board.
    ///
    /// Store failures and undecodable snapshots are logged and reported as
    /// `None` so the caller starts from a default board.
    pub fn load_board(&self) -> Option<Board> {
        let text = match self.store.load(&self.key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                info!("event=board_load module=autosave status=empty");
                return None;
            }
            Err(err) => {
                warn!("event=board_load module=autosave status=error error={err}");
                return None;
            }
        };

        match decode(&text) {
            Ok(board) => {
                info!(
                    "event=board_load module=autosave status=ok weeks={} cards={}",
                    board.weeks.len(),
                    board.cards.len()
                );
                Some(board)
            }
            Err(err) => {
                warn!("event=board_load module=autosave status=corrupt error={err}");
                None
            }
        }
    }

    /// Writes the current board now.
    pub fn flush(&mut self, service: &mut BoardService) -> StoreResult<()> {
        self.flush_at(service, Instant::now())
    }

    /// Records that the board changed since the last flush.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether there are edits not yet written.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes the board when it has unsaved edits and the autosave interval
    /// has elapsed since the last flush. Returns whether it wrote.
    pub fn flush_if_due(&mut self, service: &mut BoardService, now: Instant) -> StoreResult<bool> {
        let due = self
            .last_flush
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if !due || !self.dirty {
            return Ok(false);
        }
        self.flush_at(service, now)?;
        Ok(true)
    }

    /// Final write before the session ends, skipped when nothing changed.
    pub fn flush_on_exit(&mut self, service: &mut BoardService) -> StoreResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.flush(service)?;
        Ok(true)
    }

    /// Instant of the last successful flush.
    pub fn last_flush(&self) -> Option<Instant> {
        self.last_flush
    }

    fn flush_at(&mut self, service: &mut BoardService, now: Instant) -> StoreResult<()> {
        service.touch(Utc::now());
        let result = encode(service.board())
            .map_err(StoreError::from)
            .and_then(|text| self.store.save(&self.key, &text));

        match &result {
            Ok(()) => {
                self.last_flush = Some(now);
                self.dirty = false;
                info!("event=board_flush module=autosave status=ok");
            }
            Err(err) => error!("event=board_flush module=autosave status=error error={err}"),
        }
        result
    }
}
