//! Deployment stage API client

use async_trait::async_trait;
use openapi_client::models::{
    DeploymentStageRequest, DeploymentStageResponse, DeploymentStageResponseList,
};
use tracing::info;

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;
use crate::pipeline::editor::{Placement, StageMutator, StageRequest};

impl HttpClient {
    /// List the deployment stages of an environment, in pipeline order
    pub async fn list_environment_deployment_stages(
        &self,
        environment_id: &str,
    ) -> Result<Vec<DeploymentStageResponse>, ConsoleError> {
        let path = format!("/environment/{}/deploymentStage", environment_id);
        let response: DeploymentStageResponseList = self.get(&path, &[]).await?;
        Ok(response.results)
    }

    /// Create a deployment stage at the end of an environment's pipeline
    pub async fn create_environment_deployment_stage(
        &self,
        environment_id: &str,
        request: &DeploymentStageRequest,
    ) -> Result<DeploymentStageResponse, ConsoleError> {
        let path = format!("/environment/{}/deploymentStage", environment_id);
        let stage: DeploymentStageResponse = self.post(&path, request).await?;
        info!("Created deployment stage {} ({})", stage.name, stage.id);
        Ok(stage)
    }

    /// Rename or redescribe a deployment stage
    pub async fn edit_deployment_stage(
        &self,
        stage_id: &str,
        request: &DeploymentStageRequest,
    ) -> Result<DeploymentStageResponse, ConsoleError> {
        let path = format!("/deploymentStage/{}", stage_id);
        self.put(&path, Some(request)).await
    }

    /// Delete a deployment stage
    pub async fn delete_deployment_stage(&self, stage_id: &str) -> Result<(), ConsoleError> {
        self.delete(&format!("/deploymentStage/{}", stage_id)).await?;
        info!("Deleted deployment stage {}", stage_id);
        Ok(())
    }

    /// Attach a service to a deployment stage
    pub async fn attach_service_to_deployment_stage(
        &self,
        stage_id: &str,
        service_id: &str,
    ) -> Result<Vec<DeploymentStageResponse>, ConsoleError> {
        let path = format!("/deploymentStage/{}/service/{}", stage_id, service_id);
        let response: DeploymentStageResponseList =
            self.put::<_, serde_json::Value>(&path, None).await?;
        Ok(response.results)
    }

    /// Move a deployment stage before or after another one
    pub async fn move_deployment_stage(
        &self,
        stage_id: &str,
        target_stage_id: &str,
        placement: Placement,
    ) -> Result<Vec<DeploymentStageResponse>, ConsoleError> {
        let verb = match placement {
            Placement::Before => "moveBefore",
            Placement::After => "moveAfter",
        };
        let path = format!("/deploymentStage/{}/{}/{}", stage_id, verb, target_stage_id);
        let response: DeploymentStageResponseList =
            self.put::<_, serde_json::Value>(&path, None).await?;
        Ok(response.results)
    }
}

#[async_trait]
impl StageMutator for HttpClient {
    async fn list(
        &self,
        environment_id: &str,
    ) -> Result<Vec<DeploymentStageResponse>, ConsoleError> {
        self.list_environment_deployment_stages(environment_id)
            .await
    }

    async fn submit(
        &self,
        request: &StageRequest,
    ) -> Result<Vec<DeploymentStageResponse>, ConsoleError> {
        match request {
            StageRequest::AttachService {
                stage_id,
                service_id,
            } => {
                self.attach_service_to_deployment_stage(stage_id, service_id)
                    .await
            }
            StageRequest::MoveStage {
                stage_id,
                target_stage_id,
                placement,
            } => {
                self.move_deployment_stage(stage_id, target_stage_id, *placement)
                    .await
            }
        }
    }
}
