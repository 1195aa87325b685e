//! API models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of entity an organization event is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationEventTargetType {
    Application,
    Cluster,
    Container,
    ContainerRegistry,
    Database,
    EnterpriseConnection,
    Environment,
    Helm,
    HelmRepository,
    Job,
    MembersAndRoles,
    Organization,
    Project,
    Terraform,
    Webhook,
}

impl OrganizationEventTargetType {
    /// Every target type, in the order the API enumerates them
    pub const ALL: [OrganizationEventTargetType; 15] = [
        OrganizationEventTargetType::Application,
        OrganizationEventTargetType::Cluster,
        OrganizationEventTargetType::Container,
        OrganizationEventTargetType::ContainerRegistry,
        OrganizationEventTargetType::Database,
        OrganizationEventTargetType::EnterpriseConnection,
        OrganizationEventTargetType::Environment,
        OrganizationEventTargetType::Helm,
        OrganizationEventTargetType::HelmRepository,
        OrganizationEventTargetType::Job,
        OrganizationEventTargetType::MembersAndRoles,
        OrganizationEventTargetType::Organization,
        OrganizationEventTargetType::Project,
        OrganizationEventTargetType::Terraform,
        OrganizationEventTargetType::Webhook,
    ];

    /// Wire value of the target type
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationEventTargetType::Application => "APPLICATION",
            OrganizationEventTargetType::Cluster => "CLUSTER",
            OrganizationEventTargetType::Container => "CONTAINER",
            OrganizationEventTargetType::ContainerRegistry => "CONTAINER_REGISTRY",
            OrganizationEventTargetType::Database => "DATABASE",
            OrganizationEventTargetType::EnterpriseConnection => "ENTERPRISE_CONNECTION",
            OrganizationEventTargetType::Environment => "ENVIRONMENT",
            OrganizationEventTargetType::Helm => "HELM",
            OrganizationEventTargetType::HelmRepository => "HELM_REPOSITORY",
            OrganizationEventTargetType::Job => "JOB",
            OrganizationEventTargetType::MembersAndRoles => "MEMBERS_AND_ROLES",
            OrganizationEventTargetType::Organization => "ORGANIZATION",
            OrganizationEventTargetType::Project => "PROJECT",
            OrganizationEventTargetType::Terraform => "TERRAFORM",
            OrganizationEventTargetType::Webhook => "WEBHOOK",
        }
    }
}

impl fmt::Display for OrganizationEventTargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrganizationEventTargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid target type: {}", s))
    }
}

/// Depth at which event targets are aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetFetchLevel {
    Project,
    Environment,
}

impl TargetFetchLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFetchLevel::Project => "PROJECT",
            TargetFetchLevel::Environment => "ENVIRONMENT",
        }
    }
}

/// Organization event target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationEventTarget {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Event targets response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationEventTargetResponseList {
    #[serde(default)]
    pub targets: Option<Vec<OrganizationEventTarget>>,
}

/// Service attached to a deployment stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStageServiceResponse {
    pub id: String,
    pub service_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
}

/// Deployment stage of an environment pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStageResponse {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub deployment_order: i32,
    #[serde(default)]
    pub services: Vec<DeploymentStageServiceResponse>,
}

/// Body of a deployment stage create or edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStageRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DeploymentStageRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Deployment stage list response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentStageResponseList {
    #[serde(default)]
    pub results: Vec<DeploymentStageResponse>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}
