//! Kanban board drag-and-drop
//!
//! Columns hold cards. A drop lands in front of a card (or at the end of a
//! column), chosen from the pointer position among the drop indicators.

use serde::{Deserialize, Serialize};

use crate::errors::ConsoleError;

/// Distance below an indicator's top edge still counted as above the pointer
pub const DISTANCE_OFFSET: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card<T> {
    pub id: String,
    pub content: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column<T> {
    pub column_id: String,
    pub title: String,
    pub items: Vec<Card<T>>,
}

impl<T> Column<T> {
    pub fn new(column_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            title: title.into(),
            items: Vec::new(),
        }
    }

    fn position(&self, card_id: &str) -> Option<usize> {
        self.items.iter().position(|c| c.id == card_id)
    }
}

/// Where a dragged card or column is dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropTarget {
    /// In front of the card or column with this id
    Before(String),

    /// At the end
    End,
}

/// Vertical geometry of a drop indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBox {
    pub top: f64,
    pub target: DropTarget,
}

/// Move a card, possibly into another column
///
/// Returns `Ok(None)` when the drop puts the card back where it was.
pub fn transfer_card<T: Clone>(
    columns: &[Column<T>],
    card_id: &str,
    source_column_id: &str,
    target_column_id: &str,
    drop: &DropTarget,
) -> Result<Option<Vec<Column<T>>>, ConsoleError> {
    if source_column_id == target_column_id {
        if let DropTarget::Before(before) = drop {
            if before == card_id {
                return Ok(None);
            }
        }
    }

    let source = find_column(columns, source_column_id)?;
    let target = find_column(columns, target_column_id)?;
    let from = columns[source]
        .position(card_id)
        .ok_or_else(|| ConsoleError::UnknownCard(card_id.to_string()))?;

    let mut result = columns.to_vec();
    let card = result[source].items.remove(from);

    let items = &mut result[target].items;
    let at = match drop {
        DropTarget::End => items.len(),
        DropTarget::Before(before) => items
            .iter()
            .position(|c| &c.id == before)
            .ok_or_else(|| ConsoleError::UnknownCard(before.clone()))?,
    };
    items.insert(at, card);
    Ok(Some(result))
}

/// Move a whole column
///
/// Returns `Ok(None)` when the column is dropped in front of itself.
pub fn move_column<T: Clone>(
    columns: &[Column<T>],
    column_id: &str,
    drop: &DropTarget,
) -> Result<Option<Vec<Column<T>>>, ConsoleError> {
    if matches!(drop, DropTarget::Before(before) if before == column_id) {
        return Ok(None);
    }

    let from = find_column(columns, column_id)?;
    let mut result = columns.to_vec();
    let column = result.remove(from);

    let at = match drop {
        DropTarget::End => result.len(),
        DropTarget::Before(before) => result
            .iter()
            .position(|c| &c.column_id == before)
            .ok_or_else(|| ConsoleError::UnknownColumn(before.clone()))?,
    };
    result.insert(at, column);
    Ok(Some(result))
}

/// Indicator a drop at `pointer_y` goes to
///
/// The closest indicator whose top edge, pushed down by [`DISTANCE_OFFSET`],
/// is still below the pointer. Falls back to the last indicator.
pub fn nearest_indicator(pointer_y: f64, indicators: &[IndicatorBox]) -> Option<&IndicatorBox> {
    indicators
        .iter()
        .filter_map(|indicator| {
            let offset = pointer_y - (indicator.top + DISTANCE_OFFSET);
            (offset < 0.0).then_some((offset, indicator))
        })
        .fold(None, |closest: Option<(f64, &IndicatorBox)>, (offset, indicator)| {
            match closest {
                Some((best, _)) if best >= offset => closest,
                _ => Some((offset, indicator)),
            }
        })
        .map(|(_, indicator)| indicator)
        .or_else(|| indicators.last())
}

fn find_column<T>(columns: &[Column<T>], column_id: &str) -> Result<usize, ConsoleError> {
    columns
        .iter()
        .position(|c| c.column_id == column_id)
        .ok_or_else(|| ConsoleError::UnknownColumn(column_id.to_string()))
}
