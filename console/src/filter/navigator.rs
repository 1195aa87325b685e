//! Drill-down navigation over the hierarchical filter
//!
//! A navigator owns the stack of levels a filter menu renders. Every
//! operation that fetches computes its result off to the side and commits only
//! once the fetch resolved, so dropping a pending `select` or `restore` future
//! leaves the navigator exactly as it was.

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::ConsoleError;
use crate::filter::resolver::{get_next_filter_level, target_type_level, FilterContext, TargetSource};
use crate::filter::state::{
    FilterLevel, FilterLevelItem, FilterLevelKey, HierarchicalFilterState, ALL_ID,
};
use crate::filter::target_type::{humanize, TargetScope};

/// Result of picking an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// A deeper level is now current
    Descended(FilterLevel),

    /// Nothing left to pick; the menu can close
    Completed,
}

/// Hierarchical filter navigator
pub struct FilterNavigator<S: TargetSource + ?Sized> {
    source: Arc<S>,
    context: FilterContext,
    state: HierarchicalFilterState,
    stack: Vec<FilterLevel>,
    picks: Vec<FilterLevelItem>,
    level: usize,
}

impl<S: TargetSource + ?Sized> FilterNavigator<S> {
    /// Create a navigator positioned on the target type level
    pub fn new(source: Arc<S>, context: FilterContext) -> Self {
        Self {
            source,
            context,
            state: HierarchicalFilterState::default(),
            stack: vec![target_type_level()],
            picks: Vec::new(),
            level: 0,
        }
    }

    /// Current selection
    pub fn state(&self) -> &HierarchicalFilterState {
        &self.state
    }

    /// Level the menu shows
    pub fn current_level(&self) -> &FilterLevel {
        &self.stack[self.level]
    }

    /// Index of the current level, zero at the root
    pub fn depth(&self) -> usize {
        self.level
    }

    /// Every level resolved so far
    pub fn stack(&self) -> &[FilterLevel] {
        &self.stack
    }

    /// Labels of the picks made so far
    pub fn breadcrumb(&self) -> Vec<String> {
        self.state.breadcrumb()
    }

    /// Pick the item with `item_id` on the current level
    pub async fn select(&mut self, item_id: &str) -> Result<NavigationOutcome, ConsoleError> {
        let current = self.current_level();
        let key = current.key;
        let item = current
            .items
            .iter()
            .find(|i| i.id == item_id)
            .cloned()
            .ok_or_else(|| {
                ConsoleError::InvalidSelection(format!(
                    "{} is not offered at {}",
                    item_id,
                    key.as_str()
                ))
            })?;

        // Same pick as before: reuse what is already resolved below it
        if self.picks.get(self.level) == Some(&item) {
            if self.stack.len() > self.level + 1 {
                self.level += 1;
                return Ok(NavigationOutcome::Descended(self.current_level().clone()));
            }
            return Ok(NavigationOutcome::Completed);
        }

        if key == FilterLevelKey::TargetType && item.id == ALL_ID {
            info!("Target type filter cleared");
            self.clear();
            return Ok(NavigationOutcome::Completed);
        }

        let next_state = self.state.with_selection(key, &item)?;
        let next_level = get_next_filter_level(&next_state, &self.context, self.source.as_ref()).await;

        debug!("Selected {} at {}", item.id, key.as_str());
        self.state = next_state;
        self.stack.truncate(self.level + 1);
        self.picks.truncate(self.level);
        self.picks.push(item);

        match next_level {
            Some(level) => {
                self.stack.push(level.clone());
                self.level += 1;
                Ok(NavigationOutcome::Descended(level))
            }
            None => Ok(NavigationOutcome::Completed),
        }
    }

    /// Step one level up, keeping the selection; false at the root
    pub fn back(&mut self) -> bool {
        if self.level == 0 {
            return false;
        }
        self.level -= 1;
        true
    }

    /// Drop the selection and return to the root level
    pub fn clear(&mut self) {
        self.state = HierarchicalFilterState::default();
        self.stack.truncate(1);
        self.picks.clear();
        self.level = 0;
    }

    /// Rebuild the navigation stack for a saved selection, one level at a time
    ///
    /// Fields set out of hierarchy order are ignored from the first gap on.
    pub async fn restore(&mut self, saved: &HierarchicalFilterState) -> Result<(), ConsoleError> {
        let mut state = HierarchicalFilterState::default();
        let mut stack = vec![target_type_level()];
        let mut picks = Vec::new();

        for (key, mut item) in hierarchy_picks(saved) {
            // Saved state may carry bare ids; the level just fetched knows the names
            if let Some(known) = stack
                .last()
                .and_then(|level| level.items.iter().find(|i| i.id == item.id))
                .filter(|known| !known.label.is_empty())
            {
                item.label = known.label.clone();
            }
            state = state.with_selection(key, &item)?;
            picks.push(item);
            match get_next_filter_level(&state, &self.context, self.source.as_ref()).await {
                Some(level) => stack.push(level),
                None => break,
            }
        }

        info!("Restored filter navigation at depth {}", stack.len() - 1);
        self.level = stack.len() - 1;
        self.state = state;
        self.stack = stack;
        self.picks = picks;
        Ok(())
    }
}

/// The picks a state encodes, outermost first, up to the first missing field
fn hierarchy_picks(state: &HierarchicalFilterState) -> Vec<(FilterLevelKey, FilterLevelItem)> {
    let Some(target_type) = state.target_type else {
        return Vec::new();
    };

    let item = |id: &Option<String>, name: &Option<String>| {
        id.as_ref().map(|id| {
            FilterLevelItem::new(id.clone(), name.clone().unwrap_or_else(|| id.clone()))
        })
    };

    let project = (FilterLevelKey::ProjectId, item(&state.project_id, &state.project_name));
    let environment = (
        FilterLevelKey::EnvironmentId,
        item(&state.environment_id, &state.environment_name),
    );
    let target = (FilterLevelKey::TargetId, item(&state.target_id, &state.target_name));

    let rest = match TargetScope::of(target_type) {
        TargetScope::ServiceScoped => vec![project, environment, target],
        TargetScope::EnvironmentScoped => vec![project, target],
        TargetScope::Flat => vec![target],
    };

    let root = FilterLevelItem::new(target_type.as_str(), humanize(target_type.as_str()));
    std::iter::once((FilterLevelKey::TargetType, root))
        .chain(
            rest.into_iter()
                .map_while(|(key, item)| item.map(|item| (key, item))),
        )
        .collect()
}
