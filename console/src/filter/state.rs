//! Hierarchical filter state and navigation levels

use std::collections::{BTreeMap, HashMap};

use openapi_client::models::OrganizationEventTargetType;
use serde::{Deserialize, Serialize};

use crate::errors::ConsoleError;
use crate::filter::target_type::{humanize, TargetScope};

/// Identifier of the synthetic "no filter" option
pub const ALL_ID: &str = "ALL";

/// What a navigation level selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterLevelKey {
    TargetType,
    ProjectId,
    EnvironmentId,
    TargetId,
}

impl FilterLevelKey {
    /// Query parameter name for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterLevelKey::TargetType => "targetType",
            FilterLevelKey::ProjectId => "projectId",
            FilterLevelKey::EnvironmentId => "environmentId",
            FilterLevelKey::TargetId => "targetId",
        }
    }
}

/// One selectable option at a navigation level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterLevelItem {
    pub id: String,
    pub label: String,
}

impl FilterLevelItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// The synthetic first option of the target type level
    pub fn all() -> Self {
        Self::new(ALL_ID, "All")
    }
}

/// What the user is currently choosing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterLevel {
    pub key: FilterLevelKey,
    pub title: String,
    pub items: Vec<FilterLevelItem>,
    pub has_search: bool,
}

/// The cumulative selection of the hierarchical filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchicalFilterState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<OrganizationEventTargetType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
}

impl HierarchicalFilterState {
    /// Whether the selection reached a leaf of its hierarchy
    pub fn is_final_selection(&self) -> bool {
        let Some(target_type) = self.target_type else {
            return false;
        };

        match TargetScope::of(target_type) {
            TargetScope::ServiceScoped => {
                self.project_id.is_some() && self.environment_id.is_some() && self.target_id.is_some()
            }
            TargetScope::EnvironmentScoped => self.project_id.is_some() && self.target_id.is_some(),
            TargetScope::Flat => self.target_id.is_some(),
        }
    }

    /// New state with `item` picked at `key`; every deeper field is cleared
    pub fn with_selection(
        &self,
        key: FilterLevelKey,
        item: &FilterLevelItem,
    ) -> Result<Self, ConsoleError> {
        let id = Some(item.id.clone());
        let name = Some(item.label.clone());

        let next = match key {
            FilterLevelKey::TargetType => {
                if item.id == ALL_ID {
                    return Ok(Self::default());
                }
                let target_type = item
                    .id
                    .parse::<OrganizationEventTargetType>()
                    .map_err(ConsoleError::InvalidSelection)?;
                Self {
                    target_type: Some(target_type),
                    ..Self::default()
                }
            }
            FilterLevelKey::ProjectId => {
                self.require_target_type(key)?;
                Self {
                    target_type: self.target_type,
                    project_id: id,
                    project_name: name,
                    ..Self::default()
                }
            }
            FilterLevelKey::EnvironmentId => {
                if self.project_id.is_none() {
                    return Err(ConsoleError::InvalidSelection(
                        "an environment needs a project first".to_string(),
                    ));
                }
                Self {
                    environment_id: id,
                    environment_name: name,
                    target_id: None,
                    target_name: None,
                    ..self.clone()
                }
            }
            FilterLevelKey::TargetId => {
                self.require_target_type(key)?;
                Self {
                    target_id: id,
                    target_name: name,
                    ..self.clone()
                }
            }
        };

        Ok(next)
    }

    fn require_target_type(&self, key: FilterLevelKey) -> Result<(), ConsoleError> {
        if self.target_type.is_none() {
            return Err(ConsoleError::InvalidSelection(format!(
                "{} needs a target type first",
                key.as_str()
            )));
        }
        Ok(())
    }

    /// Query parameters for the current selection, unset fields omitted
    pub fn to_query_params(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        if let Some(target_type) = self.target_type {
            params.insert(
                FilterLevelKey::TargetType.as_str(),
                target_type.as_str().to_string(),
            );
        }
        let fields = [
            (FilterLevelKey::TargetId, &self.target_id),
            (FilterLevelKey::ProjectId, &self.project_id),
            (FilterLevelKey::EnvironmentId, &self.environment_id),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                params.insert(key.as_str(), value.clone());
            }
        }
        params
    }

    /// Rebuild a state from query parameters; names are left unset
    pub fn from_query_params(params: &HashMap<String, String>) -> Result<Self, ConsoleError> {
        let target_type = match params.get(FilterLevelKey::TargetType.as_str()) {
            None => None,
            Some(value) if value == ALL_ID => None,
            Some(value) => Some(
                value
                    .parse::<OrganizationEventTargetType>()
                    .map_err(ConsoleError::InvalidSelection)?,
            ),
        };

        if target_type.is_none() {
            return Ok(Self::default());
        }

        let get = |key: FilterLevelKey| params.get(key.as_str()).filter(|v| !v.is_empty()).cloned();

        Ok(Self {
            target_type,
            project_id: get(FilterLevelKey::ProjectId),
            environment_id: get(FilterLevelKey::EnvironmentId),
            target_id: get(FilterLevelKey::TargetId),
            ..Self::default()
        })
    }

    /// Labels of the picks made so far, outermost first
    pub fn breadcrumb(&self) -> Vec<String> {
        let Some(target_type) = self.target_type else {
            return Vec::new();
        };

        let mut crumbs = vec![humanize(target_type.as_str())];
        let picks = [
            (&self.project_id, &self.project_name),
            (&self.environment_id, &self.environment_name),
            (&self.target_id, &self.target_name),
        ];
        for (id, name) in picks {
            if let Some(id) = id {
                crumbs.push(name.clone().unwrap_or_else(|| id.clone()));
            }
        }
        crumbs
    }
}
