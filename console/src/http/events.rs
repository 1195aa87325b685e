//! Organization event targets API client

use async_trait::async_trait;
use openapi_client::models::{
    OrganizationEventTarget, OrganizationEventTargetResponseList, OrganizationEventTargetType,
    TargetFetchLevel,
};

use crate::errors::ConsoleError;
use crate::filter::resolver::TargetSource;
use crate::http::client::HttpClient;

/// Query for the organization event targets endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTargetsQuery {
    pub organization_id: String,
    pub from_timestamp: Option<String>,
    pub to_timestamp: Option<String>,
    pub event_type: Option<String>,
    pub target_type: OrganizationEventTargetType,
    pub triggered_by: Option<String>,
    pub origin: Option<String>,
    pub project_id: Option<String>,
    pub environment_id: Option<String>,
    pub target_fetch_level: Option<TargetFetchLevel>,
}

impl EventTargetsQuery {
    /// Query string pairs, unset parameters omitted
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let optional = [
            ("fromTimestamp", &self.from_timestamp),
            ("toTimestamp", &self.to_timestamp),
            ("eventType", &self.event_type),
            ("triggeredBy", &self.triggered_by),
            ("origin", &self.origin),
            ("projectId", &self.project_id),
            ("environmentId", &self.environment_id),
        ];

        let mut pairs: Vec<(&'static str, String)> = optional
            .into_iter()
            .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
            .collect();

        pairs.push(("targetType", self.target_type.as_str().to_string()));
        if let Some(level) = self.target_fetch_level {
            pairs.push(("targetFetchLevel", level.as_str().to_string()));
        }

        pairs
    }
}

impl HttpClient {
    /// List the targets events were emitted for
    pub async fn get_organization_event_targets(
        &self,
        query: &EventTargetsQuery,
    ) -> Result<OrganizationEventTargetResponseList, ConsoleError> {
        let path = format!("/organization/{}/targets", query.organization_id);
        self.get(&path, &query.to_query_pairs()).await
    }
}

#[async_trait]
impl TargetSource for HttpClient {
    async fn fetch_targets(
        &self,
        query: &EventTargetsQuery,
    ) -> Result<Vec<OrganizationEventTarget>, ConsoleError> {
        let response = self.get_organization_event_targets(query).await?;
        Ok(response.targets.unwrap_or_default())
    }
}
