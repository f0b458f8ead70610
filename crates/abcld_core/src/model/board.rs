//! Board aggregate: weeks, cards and their tag vocabularies.
//!
//! # Responsibility
//! - Define the canonical document shape shared by service, codec and view.
//! - Keep wire naming (`camelCase`) aligned with the board file format.
//!
//! # Invariants
//! - Every `Card::week_id` should reference a `Week::id` in the same board.
//!   This is enforced by service operations, not by decoding.
//! - `Week::order` is contiguous from 1 after any week deletion.
//! - Card `order` is only a relative sort key inside one week.
//! - Decoding a week or card object never fails on field content: ids and
//!   orders accept numbers or strings, and unparseable tags or dates read
//!   as absent.

use crate::model::id::IdGenerator;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Title used when a board has no usable title.
pub const DEFAULT_BOARD_TITLE: &str = "My Learning Design";
/// Number of weeks on a freshly created board.
pub const DEFAULT_WEEK_COUNT: usize = 8;

/// Opaque week identifier issued by [`IdGenerator`].
pub type WeekId = String;
/// Opaque card identifier issued by [`IdGenerator`].
pub type CardId = String;

/// Error returned when a tag string is not part of its vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub vocabulary: &'static str,
    pub value: String,
}

impl Display for UnknownVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {}: `{}`", self.vocabulary, self.value)
    }
}

impl Error for UnknownVariant {}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($variant:ident => $wire:literal, $display:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every variant in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Wire/storage spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Human-readable label for rendering.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $display,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        vocabulary: $label,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// Pedagogical category from the ABC learning design card set.
    LearningType, "learning type" {
        Acquisition => "acquisition", "Acquisition";
        Collaboration => "collaboration", "Collaboration";
        Discussion => "discussion", "Discussion";
        Investigation => "investigation", "Investigation";
        Practice => "practice", "Practice";
        Production => "production", "Production";
    }
}

vocabulary! {
    /// Delivery modality of one activity.
    DeliveryStyle, "delivery style" {
        Lecture => "lecture", "Lecture";
        Tutorial => "tutorial", "Tutorial";
        Lab => "lab", "Lab";
        Remote => "remote", "Remote";
        Blended => "blended", "Blended";
        Assessment => "assessment", "Assessment";
    }
}

vocabulary! {
    /// Assessment flavour for assessed activities.
    AssessmentType, "assessment type" {
        Formative => "formative", "Formative";
        Summative => "summative", "Summative";
    }
}

/// Validation failures for card field input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Card title is empty after trimming.
    EmptyCardTitle,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCardTitle => write!(f, "activity title must not be blank"),
        }
    }
}

impl Error for ValidationError {}

/// One column of the board, usually a teaching week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: WeekId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    /// Unset dates are stored as `""` by older board files.
    #[serde(default, deserialize_with = "lenient_parse")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_order")]
    pub order: i64,
}

impl Week {
    /// Creates a week titled `Week {order}`.
    pub fn numbered(id: WeekId, order: i64) -> Self {
        Self {
            id,
            title: format!("Week {order}"),
            start_date: None,
            order,
        }
    }
}

/// One learning activity placed in a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: CardId,
    #[serde(default, deserialize_with = "lenient_id")]
    pub week_id: WeekId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_text")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub delivered_by: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_set")]
    pub learning_types: BTreeSet<LearningType>,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub delivery_style: Option<DeliveryStyle>,
    #[serde(default, deserialize_with = "lenient_parse")]
    pub assessment_type: Option<AssessmentType>,
    #[serde(default, deserialize_with = "optional_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_order")]
    pub order: i64,
}

impl Card {
    /// Builds a card from already-normalized fields.
    fn from_fields(id: CardId, week_id: WeekId, order: i64, fields: CardFields) -> Self {
        let mut card = Self {
            id,
            week_id,
            title: String::new(),
            delivery_date: None,
            duration: None,
            delivered_by: None,
            description: None,
            learning_types: BTreeSet::new(),
            delivery_style: None,
            assessment_type: None,
            notes: None,
            order,
        };
        card.apply_fields(fields);
        card
    }

    /// Overwrites every user-editable field. `week_id` and `order` are kept.
    fn apply_fields(&mut self, fields: CardFields) {
        self.title = fields.title;
        self.delivery_date = fields.delivery_date;
        self.duration = fields.duration;
        self.delivered_by = fields.delivered_by;
        self.description = fields.description;
        self.learning_types = fields.learning_types;
        self.delivery_style = fields.delivery_style;
        self.assessment_type = fields.assessment_type;
        self.notes = fields.notes;
    }

    /// Returns the editable field set of this card.
    pub fn fields(&self) -> CardFields {
        CardFields {
            title: self.title.clone(),
            delivery_date: self.delivery_date,
            duration: self.duration.clone(),
            delivered_by: self.delivered_by.clone(),
            description: self.description.clone(),
            learning_types: self.learning_types.clone(),
            delivery_style: self.delivery_style,
            assessment_type: self.assessment_type,
            notes: self.notes.clone(),
        }
    }
}

/// User-editable card fields, as submitted by the activity form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFields {
    pub title: String,
    pub delivery_date: Option<NaiveDate>,
    pub duration: Option<String>,
    pub delivered_by: Option<String>,
    pub description: Option<String>,
    pub learning_types: BTreeSet<LearningType>,
    pub delivery_style: Option<DeliveryStyle>,
    pub assessment_type: Option<AssessmentType>,
    pub notes: Option<String>,
}

impl CardFields {
    /// Field set with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Trims text input and rejects a blank title.
    ///
    /// Blank optional text collapses to `None` so that stored cards never
    /// carry empty strings.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyCardTitle);
        }

        Ok(Self {
            title: title.to_string(),
            duration: trimmed(self.duration),
            delivered_by: trimmed(self.delivered_by),
            description: trimmed(self.description),
            notes: trimmed(self.notes),
            ..self
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Root aggregate holding every week and card of one learning design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub title: String,
    pub weeks: Vec<Week>,
    pub cards: Vec<Card>,
    #[serde(alias = "lastModified")]
    pub last_modified_at: DateTime<Utc>,
}

impl Board {
    /// Creates an empty board with no weeks.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            weeks: Vec::new(),
            cards: Vec::new(),
            last_modified_at: Utc::now(),
        }
    }

    /// Creates a board with `count` sequential weeks `Week 1..Week count`.
    pub fn with_default_weeks(
        title: impl Into<String>,
        count: usize,
        ids: &mut IdGenerator,
    ) -> Self {
        let mut board = Self::new(title);
        board.weeks = (1..=count)
            .map(|order| Week::numbered(ids.next_id(), order as i64))
            .collect();
        board
    }

    /// Title for display, falling back to the default when blank.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_BOARD_TITLE
        } else {
            self.title.as_str()
        }
    }

    pub fn week(&self, id: &str) -> Option<&Week> {
        self.weeks.iter().find(|week| week.id == id)
    }

    pub(crate) fn week_mut(&mut self, id: &str) -> Option<&mut Week> {
        self.weeks.iter_mut().find(|week| week.id == id)
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub(crate) fn card_mut(&mut self, id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|card| card.id == id)
    }

    /// Weeks sorted by `order`; equal orders keep insertion order.
    pub fn sorted_weeks(&self) -> Vec<&Week> {
        let mut weeks = self.weeks.iter().collect::<Vec<_>>();
        weeks.sort_by_key(|week| week.order);
        weeks
    }

    /// Cards of one week sorted by `order`; equal orders keep insertion order.
    pub fn cards_in_week(&self, week_id: &str) -> Vec<&Card> {
        let mut cards = self
            .cards
            .iter()
            .filter(|card| card.week_id == week_id)
            .collect::<Vec<_>>();
        cards.sort_by_key(|card| card.order);
        cards
    }

    pub fn card_count_in_week(&self, week_id: &str) -> usize {
        self.cards
            .iter()
            .filter(|card| card.week_id == week_id)
            .count()
    }

    /// Cards whose `week_id` does not match any week.
    ///
    /// Only imported documents can contain these; service operations never
    /// create them.
    pub fn dangling_cards(&self) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|card| self.week(&card.week_id).is_none())
            .collect()
    }

    /// Refreshes the modification timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified_at = now;
    }

    pub(crate) fn push_card(
        &mut self,
        id: CardId,
        week_id: WeekId,
        order: i64,
        fields: CardFields,
    ) {
        self.cards.push(Card::from_fields(id, week_id, order, fields));
    }

    pub(crate) fn overwrite_card(&mut self, id: &str, fields: CardFields) -> bool {
        match self.card_mut(id) {
            Some(card) => {
                card.apply_fields(fields);
                true
            }
            None => false,
        }
    }
}

/// Strings are kept as-is, numbers are rendered; anything else is empty.
fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Blank or non-scalar values read as `None`.
fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).filter(|text| !text.trim().is_empty()))
}

/// Integer, float or numeric string; anything else sorts as `0`.
fn lenient_order<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let order = match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|value| value as i64)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().map(|value| value as i64))
        }
        _ => None,
    };
    Ok(order.unwrap_or_default())
}

/// Parses a string with `FromStr`. Blank, unknown or non-string values read
/// as `None`.
fn lenient_parse<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) => raw.trim().parse::<T>().ok(),
        _ => None,
    })
}

/// Keeps the recognised string entries of an array; `null` or any
/// non-array is empty.
fn lenient_set<'de, D, T>(deserializer: D) -> Result<BTreeSet<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Ord,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|raw| raw.parse::<T>().ok())
            .collect(),
        _ => BTreeSet::new(),
    })
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
