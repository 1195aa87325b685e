//! Target type classification

use openapi_client::models::OrganizationEventTargetType;

/// How much context a target type needs before its targets can be listed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetScope {
    /// Project, then environment, then the service itself
    ServiceScoped,

    /// Project, then the environment as the target
    EnvironmentScoped,

    /// The target is listed directly
    Flat,
}

impl TargetScope {
    /// Classify a target type
    pub fn of(target_type: OrganizationEventTargetType) -> Self {
        use OrganizationEventTargetType::*;

        match target_type {
            Application | Database | Container | Helm | Job | Terraform => {
                TargetScope::ServiceScoped
            }
            Environment => TargetScope::EnvironmentScoped,
            Cluster | ContainerRegistry | EnterpriseConnection | HelmRepository
            | MembersAndRoles | Organization | Project | Webhook => TargetScope::Flat,
        }
    }
}

/// True when the target type lives under a project and an environment
pub fn is_service_type(target_type: Option<OrganizationEventTargetType>) -> bool {
    matches!(target_type.map(TargetScope::of), Some(TargetScope::ServiceScoped))
}

/// True when the target type is an environment
pub fn is_environment_type(target_type: Option<OrganizationEventTargetType>) -> bool {
    matches!(
        target_type.map(TargetScope::of),
        Some(TargetScope::EnvironmentScoped)
    )
}

/// Display label for an enum-style value: `CONTAINER_REGISTRY` becomes `Container registry`
pub fn humanize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .map(|c| if c == '_' { ' ' } else { c })
            .collect(),
        None => String::new(),
    }
}
