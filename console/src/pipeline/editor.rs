//! Optimistic editing of an environment's deployment pipeline
//!
//! A change is applied in two phases. [`PipelineEditor::stage`] computes the
//! new arrangement, makes it the visible one and keeps the previous list.
//! [`PipelineEditor::reconcile`] submits the matching request and either adopts
//! the backend's answer or restores the previous list.

use std::sync::Arc;

use async_trait::async_trait;
use openapi_client::models::DeploymentStageResponse;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConsoleError;
use crate::pipeline::fsm::{ChangeEvent, ChangeFsm, ChangeState};
use crate::pipeline::reorder::{move_service, reorder_service, reorder_stage, DraggableLocation};

/// Side of the anchor stage a moved stage lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Before,
    After,
}

/// Request persisting a pipeline change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageRequest {
    /// Attach a service to a stage, detaching it from its current one
    AttachService { stage_id: String, service_id: String },

    /// Move a stage next to another one
    MoveStage {
        stage_id: String,
        target_stage_id: String,
        placement: Placement,
    },
}

/// Backend side of the deployment pipeline
#[async_trait]
pub trait StageMutator: Send + Sync {
    /// Current stages of an environment
    async fn list(&self, environment_id: &str)
        -> Result<Vec<DeploymentStageResponse>, ConsoleError>;

    /// Persist a change; returns the environment's stages afterwards
    async fn submit(
        &self,
        request: &StageRequest,
    ) -> Result<Vec<DeploymentStageResponse>, ConsoleError>;
}

/// A drag-and-drop result to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineChange {
    /// Reorder services inside one stage
    ReorderService {
        stage_index: usize,
        start_index: usize,
        end_index: usize,
    },

    /// Move a service to another stage
    MoveService {
        source: DraggableLocation,
        destination: DraggableLocation,
    },

    /// Reorder the stages themselves
    ReorderStage {
        source_index: usize,
        destination_index: usize,
    },
}

/// A change applied locally and not yet reconciled
#[derive(Debug)]
#[must_use = "a staged change must be reconciled or abandoned"]
pub struct PendingChange {
    request: Option<StageRequest>,
}

impl PendingChange {
    /// Request that will persist the change; `None` when it stays local
    pub fn request(&self) -> Option<&StageRequest> {
        self.request.as_ref()
    }
}

/// Pipeline editor
pub struct PipelineEditor<M: StageMutator + ?Sized> {
    mutator: Arc<M>,
    stages: Vec<DeploymentStageResponse>,
    /// Stages as they were before the pending change
    previous: Option<Vec<DeploymentStageResponse>>,
    fsm: ChangeFsm,
}

/// Rolls the pending change back unless disarmed; covers a dropped reconcile
struct RollbackOnDrop<'a, M: StageMutator + ?Sized> {
    editor: &'a mut PipelineEditor<M>,
    armed: bool,
}

impl<M: StageMutator + ?Sized> Drop for RollbackOnDrop<'_, M> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Pipeline change cancelled before the backend answered, rolling back");
            if let Err(e) = self.editor.roll_back("change cancelled".to_string()) {
                warn!("Rollback of cancelled change failed: {}", e);
            }
        }
    }
}

impl<M: StageMutator + ?Sized> PipelineEditor<M> {
    /// Create an editor over an already fetched stage list
    pub fn new(mutator: Arc<M>, stages: Vec<DeploymentStageResponse>) -> Self {
        Self {
            mutator,
            stages,
            previous: None,
            fsm: ChangeFsm::new(),
        }
    }

    /// Create an editor over the current stages of an environment
    pub async fn load(mutator: Arc<M>, environment_id: &str) -> Result<Self, ConsoleError> {
        let stages = mutator.list(environment_id).await?;
        info!(
            "Loaded {} deployment stages for environment {}",
            stages.len(),
            environment_id
        );
        Ok(Self::new(mutator, stages))
    }

    /// Stages as currently shown
    pub fn stages(&self) -> &[DeploymentStageResponse] {
        &self.stages
    }

    /// State of the last change
    pub fn change_state(&self) -> &ChangeState {
        self.fsm.state()
    }

    /// Error of the last rolled back change
    pub fn last_error(&self) -> Option<&str> {
        self.fsm.error()
    }

    /// Changes rolled back since the editor was created
    pub fn rollback_count(&self) -> u32 {
        self.fsm.rollback_count()
    }

    /// Phase one: apply `change` locally
    ///
    /// Returns `Ok(None)` when the change does not apply (unknown droppable
    /// ids); the visible stages are then left as they are.
    pub fn stage(&mut self, change: &PipelineChange) -> Result<Option<PendingChange>, ConsoleError> {
        if self.fsm.is_pending() {
            return Err(ConsoleError::InvalidTransition(
                "a pipeline change is already pending".to_string(),
            ));
        }

        let (stages, request) = match change {
            PipelineChange::ReorderService {
                stage_index,
                start_index,
                end_index,
            } => (
                reorder_service(&self.stages, *stage_index, *start_index, *end_index)?,
                None,
            ),
            PipelineChange::MoveService {
                source,
                destination,
            } => {
                let Some(stages) = move_service(&self.stages, source, destination)? else {
                    debug!("Ignoring move between unknown stages");
                    return Ok(None);
                };
                (stages, self.attach_request(source, destination))
            }
            PipelineChange::ReorderStage {
                source_index,
                destination_index,
            } => {
                let stages = reorder_stage(&self.stages, *source_index, *destination_index)?;
                let request = move_stage_request(&stages, *destination_index)
                    .filter(|_| source_index != destination_index);
                (stages, request)
            }
        };

        self.fsm.process(ChangeEvent::Stage)?;
        self.previous = Some(std::mem::replace(&mut self.stages, stages));
        Ok(Some(PendingChange { request }))
    }

    /// Request for a service moved across stages, taken from the stages before the move
    fn attach_request(
        &self,
        source: &DraggableLocation,
        destination: &DraggableLocation,
    ) -> Option<StageRequest> {
        let source_stage = source.stage_index(self.stages.len())?;
        let destination_stage = destination.stage_index(self.stages.len())?;
        if source_stage == destination_stage {
            return None;
        }

        let service = self.stages[source_stage].services.get(source.index)?;
        Some(StageRequest::AttachService {
            stage_id: self.stages[destination_stage].id.clone(),
            service_id: service.service_id.clone(),
        })
    }

    /// Phase two: persist a staged change, or restore the previous stages if that fails
    ///
    /// Dropping the returned future before it resolves also restores the
    /// previous stages.
    pub async fn reconcile(&mut self, pending: PendingChange) -> Result<(), ConsoleError> {
        let Some(request) = pending.request else {
            self.previous = None;
            return self.fsm.process(ChangeEvent::Confirm);
        };

        let mutator = self.mutator.clone();
        let mut guard = RollbackOnDrop {
            editor: self,
            armed: true,
        };
        let outcome = mutator.submit(&request).await;
        guard.armed = false;

        match outcome {
            Ok(stages) => {
                debug!("Pipeline change confirmed: {:?}", request);
                guard.editor.previous = None;
                guard.editor.stages = stages;
                guard.editor.fsm.process(ChangeEvent::Confirm)
            }
            Err(e) => {
                warn!("Pipeline change rejected, rolling back: {}", e);
                guard.editor.roll_back(e.to_string())?;
                Err(e)
            }
        }
    }

    /// Give up on a staged change and restore the previous stages
    pub fn abandon(&mut self, pending: PendingChange) -> Result<(), ConsoleError> {
        debug!("Abandoning pipeline change: {:?}", pending.request);
        self.rollback_pending()
    }

    /// Restore the stages from before the pending change
    pub fn rollback_pending(&mut self) -> Result<(), ConsoleError> {
        if !self.fsm.is_pending() {
            return Err(ConsoleError::InvalidTransition(
                "no pipeline change is pending".to_string(),
            ));
        }
        self.roll_back("change abandoned".to_string())
    }

    fn roll_back(&mut self, reason: String) -> Result<(), ConsoleError> {
        if let Some(previous) = self.previous.take() {
            self.stages = previous;
        }
        self.fsm.process(ChangeEvent::Reject(reason))
    }

    /// Refetch the stages and forget the outcome of the last change
    pub async fn reload(&mut self, environment_id: &str) -> Result<(), ConsoleError> {
        if self.fsm.is_pending() {
            return Err(ConsoleError::InvalidTransition(
                "cannot reload while a pipeline change is pending".to_string(),
            ));
        }

        self.stages = self.mutator.list(environment_id).await?;
        if *self.fsm.state() != ChangeState::Idle {
            self.fsm.process(ChangeEvent::Reset)?;
        }
        Ok(())
    }

    /// Both phases in one call; false when the change did not apply
    pub async fn apply(&mut self, change: &PipelineChange) -> Result<bool, ConsoleError> {
        match self.stage(change)? {
            Some(pending) => {
                self.reconcile(pending).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Anchor a stage that now sits at `index`: after its predecessor, or before
/// its successor when it became first
fn move_stage_request(stages: &[DeploymentStageResponse], index: usize) -> Option<StageRequest> {
    let stage_id = stages.get(index)?.id.clone();
    let (target, placement) = match index {
        0 => (stages.get(1)?, Placement::Before),
        _ => (stages.get(index - 1)?, Placement::After),
    };

    Some(StageRequest::MoveStage {
        stage_id,
        target_stage_id: target.id.clone(),
        placement,
    })
}
