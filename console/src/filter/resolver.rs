//! Resolves the next navigation level of the hierarchical filter

use async_trait::async_trait;
use openapi_client::models::{
    OrganizationEventTarget, OrganizationEventTargetType, TargetFetchLevel,
};
use tracing::{debug, warn};

use crate::errors::ConsoleError;
use crate::filter::state::{FilterLevel, FilterLevelItem, FilterLevelKey, HierarchicalFilterState};
use crate::filter::target_type::{humanize, TargetScope};
use crate::http::events::EventTargetsQuery;

/// Source of event targets, one list per navigation level
#[async_trait]
pub trait TargetSource: Send + Sync {
    async fn fetch_targets(
        &self,
        query: &EventTargetsQuery,
    ) -> Result<Vec<OrganizationEventTarget>, ConsoleError>;
}

/// Event query parameters shared by every level fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterContext {
    pub organization_id: String,
    pub from_timestamp: Option<String>,
    pub to_timestamp: Option<String>,
    pub event_type: Option<String>,
    pub triggered_by: Option<String>,
    pub origin: Option<String>,
}

impl FilterContext {
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            ..Default::default()
        }
    }

    fn query(
        &self,
        target_type: OrganizationEventTargetType,
        project_id: Option<&str>,
        environment_id: Option<&str>,
        target_fetch_level: Option<TargetFetchLevel>,
    ) -> EventTargetsQuery {
        EventTargetsQuery {
            organization_id: self.organization_id.clone(),
            from_timestamp: self.from_timestamp.clone(),
            to_timestamp: self.to_timestamp.clone(),
            event_type: self.event_type.clone(),
            target_type,
            triggered_by: self.triggered_by.clone(),
            origin: self.origin.clone(),
            project_id: project_id.map(str::to_string),
            environment_id: environment_id.map(str::to_string),
            target_fetch_level,
        }
    }
}

/// The first level: every target type, after the synthetic `ALL` option
pub fn target_type_level() -> FilterLevel {
    let items = std::iter::once(FilterLevelItem::all())
        .chain(
            OrganizationEventTargetType::ALL
                .iter()
                .map(|t| FilterLevelItem::new(t.as_str(), humanize(t.as_str()))),
        )
        .collect();

    FilterLevel {
        key: FilterLevelKey::TargetType,
        title: "Select Target Type".to_string(),
        items,
        has_search: true,
    }
}

/// Fetch one level's items; failures degrade to an empty list
async fn fetch_items<S: TargetSource + ?Sized>(
    source: &S,
    query: &EventTargetsQuery,
) -> Vec<FilterLevelItem> {
    match source.fetch_targets(query).await {
        Ok(targets) => {
            debug!(
                "Fetched {} {} targets (fetch level {:?})",
                targets.len(),
                query.target_type,
                query.target_fetch_level
            );
            targets
                .into_iter()
                .map(|target| FilterLevelItem {
                    id: target.id.unwrap_or_default(),
                    label: target.name.unwrap_or_default(),
                })
                .collect()
        }
        Err(e) => {
            warn!("Error fetching {} targets: {}", query.target_type, e);
            Vec::new()
        }
    }
}

fn level(key: FilterLevelKey, title: impl Into<String>, items: Vec<FilterLevelItem>) -> FilterLevel {
    FilterLevel {
        key,
        title: title.into(),
        items,
        has_search: true,
    }
}

/// Decide what to present next for `state`, or `None` once the selection is complete
pub async fn get_next_filter_level<S: TargetSource + ?Sized>(
    state: &HierarchicalFilterState,
    context: &FilterContext,
    source: &S,
) -> Option<FilterLevel> {
    let Some(target_type) = state.target_type else {
        return Some(target_type_level());
    };

    let project_id = state.project_id.as_deref();
    let environment_id = state.environment_id.as_deref();
    let type_title = format!("Select {}", humanize(target_type.as_str()));

    match TargetScope::of(target_type) {
        TargetScope::ServiceScoped => match (project_id, environment_id, &state.target_id) {
            (None, _, _) => {
                let query = context.query(target_type, None, None, Some(TargetFetchLevel::Project));
                let items = fetch_items(source, &query).await;
                Some(level(FilterLevelKey::ProjectId, "Select Project", items))
            }
            (Some(project), None, _) => {
                let query = context.query(
                    target_type,
                    Some(project),
                    None,
                    Some(TargetFetchLevel::Environment),
                );
                let items = fetch_items(source, &query).await;
                Some(level(FilterLevelKey::EnvironmentId, "Select Environment", items))
            }
            (Some(project), Some(environment), None) => {
                let query = context.query(target_type, Some(project), Some(environment), None);
                let items = fetch_items(source, &query).await;
                Some(level(FilterLevelKey::TargetId, type_title, items))
            }
            (Some(_), Some(_), Some(_)) => None,
        },
        TargetScope::EnvironmentScoped => match (project_id, &state.target_id) {
            (None, _) => {
                let query = context.query(target_type, None, None, Some(TargetFetchLevel::Project));
                let items = fetch_items(source, &query).await;
                Some(level(FilterLevelKey::ProjectId, "Select Project", items))
            }
            (Some(project), None) => {
                let query = context.query(target_type, Some(project), None, None);
                let items = fetch_items(source, &query).await;
                Some(level(FilterLevelKey::TargetId, "Select Environment", items))
            }
            (Some(_), Some(_)) => None,
        },
        TargetScope::Flat => match &state.target_id {
            None => {
                let query = context.query(target_type, None, None, None);
                let items = fetch_items(source, &query).await;
                Some(level(FilterLevelKey::TargetId, type_title, items))
            }
            Some(_) => None,
        },
    }
}
