//! Board editing use-case service.
//!
//! # Responsibility
//! - Own the in-memory board and expose every week/card mutation.
//! - Report each mutation as a [`BoardChange`] and notify observers, so the
//!   presentation layer decides when to repaint and persist.
//!
//! # Invariants
//! - Operations are all-or-nothing: an `Err` leaves the board untouched.
//! - Deleting a week deletes its cards and renumbers week orders to `1..=N`.
//! - Card orders are count-based and may collide after deletes or moves;
//!   `normalize_card_order` is the explicit repair step.

use crate::config::EditorConfig;
use crate::model::board::{
    Board, CardFields, CardId, ValidationError, Week, WeekId, DEFAULT_BOARD_TITLE,
};
use crate::model::id::IdGenerator;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BoardResult<T> = Result<T, BoardError>;

/// Which kind of entity an id was expected to reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    Week(WeekId),
    Card(CardId),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Week(id) => write!(f, "week {id}"),
            Self::Card(id) => write!(f, "activity {id}"),
        }
    }
}

/// Errors from board mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Referenced week or card does not exist.
    NotFound(EntityRef),
    /// Submitted fields failed required-field checks.
    Validation(ValidationError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<ValidationError> for BoardError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Column move direction for [`BoardService::move_week`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Left,
    Right,
}

impl MoveDirection {
    /// Maps `-1`/`+1` offsets; any other value is rejected.
    pub fn from_offset(offset: i32) -> Option<Self> {
        match offset {
            -1 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }

    fn offset(self) -> isize {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// Description of what one operation changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardChange {
    /// Operation was a no-op; nothing needs repainting.
    Unchanged,
    TitleChanged,
    WeekAdded {
        week_id: WeekId,
    },
    WeekUpdated {
        week_id: WeekId,
    },
    WeekDeleted {
        week_id: WeekId,
        removed_cards: Vec<CardId>,
    },
    WeeksSwapped {
        moved: WeekId,
        displaced: WeekId,
    },
    CardAdded {
        card_id: CardId,
        week_id: WeekId,
    },
    CardUpdated {
        card_id: CardId,
    },
    CardDeleted {
        card_id: CardId,
        week_id: WeekId,
    },
    CardMoved {
        card_id: CardId,
        from_week: WeekId,
        to_week: WeekId,
        order: i64,
    },
    CardsRenumbered {
        week_id: WeekId,
    },
    BoardReplaced,
}

impl BoardChange {
    /// Whether the board should be repainted and flushed.
    pub fn requires_render(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    fn op_name(&self) -> &'static str {
        match self {
            Self::Unchanged => "noop",
            Self::TitleChanged => "set_title",
            Self::WeekAdded { .. } => "add_week",
            Self::WeekUpdated { .. } => "update_week",
            Self::WeekDeleted { .. } => "delete_week",
            Self::WeeksSwapped { .. } => "move_week",
            Self::CardAdded { .. } => "add_card",
            Self::CardUpdated { .. } => "update_card",
            Self::CardDeleted { .. } => "delete_card",
            Self::CardMoved { .. } => "move_card",
            Self::CardsRenumbered { .. } => "normalize_card_order",
            Self::BoardReplaced => "replace_board",
        }
    }
}

/// Subscriber notified after every successful, non-noop mutation.
pub trait BoardObserver {
    fn board_changed(&mut self, board: &Board, change: &BoardChange);
}

/// Owner of the live board document.
pub struct BoardService {
    board: Board,
    ids: IdGenerator,
    default_title: String,
    observers: Vec<Box<dyn BoardObserver>>,
}

impl BoardService {
    /// Wraps an existing board, reserving its ids.
    pub fn new(board: Board) -> Self {
        let mut ids = IdGenerator::new();
        reserve_board_ids(&mut ids, &board);
        Self {
            board,
            ids,
            default_title: DEFAULT_BOARD_TITLE.to_string(),
            observers: Vec::new(),
        }
    }

    /// Creates a board with the configured default weeks.
    pub fn with_default_board(config: &EditorConfig) -> Self {
        let mut ids = IdGenerator::new();
        let board = Board::with_default_weeks(
            config.default_board_title.as_str(),
            config.default_week_count,
            &mut ids,
        );
        Self {
            board,
            ids,
            default_title: config.default_board_title.clone(),
            observers: Vec::new(),
        }
    }

    /// Uses a previously saved board when present, else the default board.
    pub fn from_saved_or_default(saved: Option<Board>, config: &EditorConfig) -> Self {
        match saved {
            Some(board) => {
                let mut service = Self::new(board);
                service.default_title = config.default_board_title.clone();
                service
            }
            None => Self::with_default_board(config),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn subscribe(&mut self, observer: Box<dyn BoardObserver>) {
        self.observers.push(observer);
    }

    /// Refreshes `last_modified_at` without notifying observers.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.board.touch(now);
    }

    /// Sets the board title; a blank title falls back to the default.
    pub fn set_title(&mut self, title: impl Into<String>) -> BoardChange {
        let title = title.into();
        let title = if title.trim().is_empty() {
            self.default_title.clone()
        } else {
            title
        };
        if self.board.title == title {
            return BoardChange::Unchanged;
        }
        self.board.title = title;
        self.commit(BoardChange::TitleChanged)
    }

    /// Appends `Week {n+1}` at the end of the board.
    pub fn add_week(&mut self) -> BoardChange {
        let order = self.board.weeks.len() as i64 + 1;
        let week_id = self.ids.next_id();
        self.board.weeks.push(Week::numbered(week_id.clone(), order));
        self.commit(BoardChange::WeekAdded { week_id })
    }

    /// Overwrites title and start date of one week. Order is kept.
    pub fn update_week(
        &mut self,
        week_id: &str,
        title: impl Into<String>,
        start_date: Option<NaiveDate>,
    ) -> BoardResult<BoardChange> {
        let week = self
            .board
            .week_mut(week_id)
            .ok_or_else(|| BoardError::NotFound(EntityRef::Week(week_id.to_string())))?;
        week.title = title.into();
        week.start_date = start_date;
        Ok(self.commit(BoardChange::WeekUpdated {
            week_id: week_id.to_string(),
        }))
    }

    /// Deletes a week with all of its cards, then renumbers the remaining
    /// weeks `1..=N` in their previous order.
    pub fn delete_week(&mut self, week_id: &str) -> BoardResult<BoardChange> {
        if self.board.week(week_id).is_none() {
            return Err(BoardError::NotFound(EntityRef::Week(week_id.to_string())));
        }

        let removed_cards = self
            .board
            .cards
            .iter()
            .filter(|card| card.week_id == week_id)
            .map(|card| card.id.clone())
            .collect::<Vec<_>>();
        self.board.cards.retain(|card| card.week_id != week_id);
        self.board.weeks.retain(|week| week.id != week_id);
        renumber_weeks(&mut self.board);

        debug!(
            "event=week_cascade module=service removed_cards={}",
            removed_cards.len()
        );
        Ok(self.commit(BoardChange::WeekDeleted {
            week_id: week_id.to_string(),
            removed_cards,
        }))
    }

    /// Swaps the order value of a week with its neighbour in sort order.
    ///
    /// Moving past either end is a no-op.
    pub fn move_week(
        &mut self,
        week_id: &str,
        direction: MoveDirection,
    ) -> BoardResult<BoardChange> {
        let sorted = sorted_week_indices(&self.board);
        let position = sorted
            .iter()
            .position(|&index| self.board.weeks[index].id == week_id)
            .ok_or_else(|| BoardError::NotFound(EntityRef::Week(week_id.to_string())))?;

        let Some(target) = position
            .checked_add_signed(direction.offset())
            .filter(|&target| target < sorted.len())
        else {
            return Ok(BoardChange::Unchanged);
        };

        let moved = sorted[position];
        let displaced = sorted[target];
        let moved_order = self.board.weeks[moved].order;
        let displaced_order = self.board.weeks[displaced].order;
        if moved_order == displaced_order {
            return Ok(BoardChange::Unchanged);
        }
        self.board.weeks[moved].order = displaced_order;
        self.board.weeks[displaced].order = moved_order;

        Ok(self.commit(BoardChange::WeeksSwapped {
            moved: self.board.weeks[moved].id.clone(),
            displaced: self.board.weeks[displaced].id.clone(),
        }))
    }

    /// Adds a card at the end of a week (`order = count + 1`).
    pub fn add_card(&mut self, week_id: &str, fields: CardFields) -> BoardResult<BoardChange> {
        let fields = fields.normalized()?;
        if self.board.week(week_id).is_none() {
            return Err(BoardError::NotFound(EntityRef::Week(week_id.to_string())));
        }

        let order = self.board.card_count_in_week(week_id) as i64 + 1;
        let card_id = self.ids.next_id();
        self.board
            .push_card(card_id.clone(), week_id.to_string(), order, fields);
        Ok(self.commit(BoardChange::CardAdded {
            card_id,
            week_id: week_id.to_string(),
        }))
    }

    /// Replaces every editable field of a card. Week and order are kept.
    pub fn update_card(&mut self, card_id: &str, fields: CardFields) -> BoardResult<BoardChange> {
        if self.board.card(card_id).is_none() {
            return Err(BoardError::NotFound(EntityRef::Card(card_id.to_string())));
        }
        let fields = fields.normalized()?;
        self.board.overwrite_card(card_id, fields);
        Ok(self.commit(BoardChange::CardUpdated {
            card_id: card_id.to_string(),
        }))
    }

    /// Removes one card. Sibling orders are left as they are.
    pub fn delete_card(&mut self, card_id: &str) -> BoardResult<BoardChange> {
        let index = self
            .board
            .cards
            .iter()
            .position(|card| card.id == card_id)
            .ok_or_else(|| BoardError::NotFound(EntityRef::Card(card_id.to_string())))?;
        let card = self.board.cards.remove(index);
        Ok(self.commit(BoardChange::CardDeleted {
            card_id: card.id,
            week_id: card.week_id,
        }))
    }

    /// Moves a card to the end of another week.
    ///
    /// The new order is the number of cards in the destination before the
    /// move, counting the card itself when it is dropped onto its own week.
    /// It can repeat an existing order value. An unknown destination is a
    /// silent no-op.
    pub fn move_card_to_week(
        &mut self,
        card_id: &str,
        new_week_id: &str,
    ) -> BoardResult<BoardChange> {
        let from_week = self
            .board
            .card(card_id)
            .map(|card| card.week_id.clone())
            .ok_or_else(|| BoardError::NotFound(EntityRef::Card(card_id.to_string())))?;

        if self.board.week(new_week_id).is_none() {
            debug!("event=card_move module=service status=skipped reason=unknown_destination");
            return Ok(BoardChange::Unchanged);
        }

        let order = self.board.card_count_in_week(new_week_id) as i64;
        if let Some(card) = self.board.card_mut(card_id) {
            card.week_id = new_week_id.to_string();
            card.order = order;
        }
        Ok(self.commit(BoardChange::CardMoved {
            card_id: card_id.to_string(),
            from_week,
            to_week: new_week_id.to_string(),
            order,
        }))
    }

    /// Renumbers the cards of one week `1..=N` in their current sort order.
    pub fn normalize_card_order(&mut self, week_id: &str) -> BoardResult<BoardChange> {
        if self.board.week(week_id).is_none() {
            return Err(BoardError::NotFound(EntityRef::Week(week_id.to_string())));
        }

        let mut indices = self
            .board
            .cards
            .iter()
            .enumerate()
            .filter(|(_, card)| card.week_id == week_id)
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        indices.sort_by_key(|&index| self.board.cards[index].order);

        let mut changed = false;
        for (position, index) in indices.into_iter().enumerate() {
            let order = position as i64 + 1;
            if self.board.cards[index].order != order {
                self.board.cards[index].order = order;
                changed = true;
            }
        }

        if !changed {
            return Ok(BoardChange::Unchanged);
        }
        Ok(self.commit(BoardChange::CardsRenumbered {
            week_id: week_id.to_string(),
        }))
    }

    /// Replaces the whole document, e.g. after a successful import.
    pub fn replace_board(&mut self, board: Board) -> BoardChange {
        reserve_board_ids(&mut self.ids, &board);
        self.board = board;
        if self.board.title.trim().is_empty() {
            self.board.title = self.default_title.clone();
        }
        self.commit(BoardChange::BoardReplaced)
    }

    fn commit(&mut self, change: BoardChange) -> BoardChange {
        info!(
            "event=board_mutation module=service op={} status=ok weeks={} cards={}",
            change.op_name(),
            self.board.weeks.len(),
            self.board.cards.len()
        );
        for observer in &mut self.observers {
            observer.board_changed(&self.board, &change);
        }
        change
    }
}

fn reserve_board_ids(ids: &mut IdGenerator, board: &Board) {
    ids.reserve(board.weeks.iter().map(|week| week.id.as_str()));
    ids.reserve(board.cards.iter().map(|card| card.id.as_str()));
}

/// Indices into `board.weeks`, stable-sorted by order.
fn sorted_week_indices(board: &Board) -> Vec<usize> {
    let mut indices = (0..board.weeks.len()).collect::<Vec<_>>();
    indices.sort_by_key(|&index| board.weeks[index].order);
    indices
}

fn renumber_weeks(board: &mut Board) {
    for (position, index) in sorted_week_indices(board).into_iter().enumerate() {
        board.weeks[index].order = position as i64 + 1;
    }
}
