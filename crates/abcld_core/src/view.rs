//! Display projection of a board for the presentation layer.
//!
//! # Responsibility
//! - Produce an ordered, label-resolved view of weeks and cards.
//! - Render a plain-text board for terminal front ends.
//!
//! # Invariants
//! - Weeks appear in `order`; cards appear in `order` within their week.
//! - Cards whose week is missing are not shown.

use crate::model::board::{Board, Card, Week};
use chrono::NaiveDate;
use std::fmt::Write as _;

/// `dd/mm/yyyy`, as shown on week headers and cards.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub title: String,
    pub weeks: Vec<WeekView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekView {
    pub id: String,
    pub title: String,
    pub start_date: Option<String>,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: String,
    pub title: String,
    pub delivery_date: Option<String>,
    pub duration: Option<String>,
    pub delivered_by: Option<String>,
    pub description: Option<String>,
    pub learning_types: Vec<&'static str>,
    pub delivery_style: Option<&'static str>,
    pub assessment: Option<&'static str>,
    pub notes: Option<String>,
}

impl BoardView {
    pub fn project(board: &Board) -> Self {
        Self {
            title: board.display_title().to_string(),
            weeks: board
                .sorted_weeks()
                .into_iter()
                .map(|week| WeekView::project(board, week))
                .collect(),
        }
    }

    pub fn card_count(&self) -> usize {
        self.weeks.iter().map(|week| week.cards.len()).sum()
    }

    /// Renders one block per week, cards indented beneath it.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        for week in &self.weeks {
            let _ = write!(out, "\n{} [{}]", week.title, week.id);
            if let Some(date) = &week.start_date {
                let _ = write!(out, " ({date})");
            }
            out.push('\n');
            if week.cards.is_empty() {
                out.push_str("  (no activities)\n");
            }
            for card in &week.cards {
                card.render_text(&mut out);
            }
        }
        out
    }
}

impl WeekView {
    fn project(board: &Board, week: &Week) -> Self {
        Self {
            id: week.id.clone(),
            title: week.title.clone(),
            start_date: week.start_date.map(format_date),
            cards: board
                .cards_in_week(&week.id)
                .into_iter()
                .map(CardView::project)
                .collect(),
        }
    }
}

impl CardView {
    fn project(card: &Card) -> Self {
        Self {
            id: card.id.clone(),
            title: card.title.clone(),
            delivery_date: card.delivery_date.map(format_date),
            duration: card.duration.clone(),
            delivered_by: card.delivered_by.clone(),
            description: card.description.clone(),
            learning_types: card.learning_types.iter().map(|kind| kind.label()).collect(),
            delivery_style: card.delivery_style.map(|style| style.label()),
            assessment: card.assessment_type.map(|kind| kind.label()),
            notes: card.notes.clone(),
        }
    }

    fn render_text(&self, out: &mut String) {
        let _ = write!(out, "  - {} [{}]", self.title, self.id);
        if let Some(style) = self.delivery_style {
            let _ = write!(out, " <{style}>");
        }
        out.push('\n');

        let meta = [
            self.delivery_date.as_deref(),
            self.duration.as_deref(),
            self.delivered_by.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();
        if !meta.is_empty() {
            let _ = writeln!(out, "      {}", meta.join(" | "));
        }
        if let Some(description) = &self.description {
            let _ = writeln!(out, "      {description}");
        }
        if !self.learning_types.is_empty() {
            let _ = writeln!(out, "      types: {}", self.learning_types.join(", "));
        }
        if let Some(assessment) = self.assessment {
            let _ = writeln!(out, "      assessment: {assessment}");
        }
        if let Some(notes) = &self.notes {
            let _ = writeln!(out, "      notes: {notes}");
        }
    }
}

/// Confirmation text shown before deleting a week.
pub fn delete_week_prompt(board: &Board, week_id: &str) -> Option<String> {
    let week = board.week(week_id)?;
    let card_count = board.card_count_in_week(week_id);
    Some(if card_count > 0 {
        format!("Delete \"{}\" and its {card_count} activities?", week.title)
    } else {
        format!("Delete \"{}\"?", week.title)
    })
}
