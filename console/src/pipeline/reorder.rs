//! Drag-and-drop reordering of deployment stages and their services
//!
//! Every function takes the current stage list by reference and returns a new
//! list; the input is never mutated, so callers can keep it to diff against or
//! to roll back to.

use openapi_client::models::DeploymentStageResponse;
use serde::{Deserialize, Serialize};

use crate::errors::ConsoleError;

/// Position reported by the drag-and-drop layer
///
/// `droppable_id` is the stringified index of the stage the service sits in,
/// `index` its position inside that stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraggableLocation {
    pub droppable_id: String,
    pub index: usize,
}

impl DraggableLocation {
    pub fn new(stage_index: usize, index: usize) -> Self {
        Self {
            droppable_id: stage_index.to_string(),
            index,
        }
    }

    /// Stage index encoded in the droppable id, if it names one of `len` stages
    pub fn stage_index(&self, len: usize) -> Option<usize> {
        self.droppable_id
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|i| *i < len)
    }
}

/// Move the service at `start_index` to `end_index` inside one stage
pub fn reorder_service(
    stages: &[DeploymentStageResponse],
    destination_index: usize,
    start_index: usize,
    end_index: usize,
) -> Result<Vec<DeploymentStageResponse>, ConsoleError> {
    ConsoleError::check_index("stages", destination_index, stages.len())?;
    let services = &stages[destination_index].services;
    ConsoleError::check_index("services", start_index, services.len())?;
    ConsoleError::check_index("services", end_index, services.len())?;

    let mut result = stages.to_vec();
    let services = &mut result[destination_index].services;
    let service = services.remove(start_index);
    services.insert(end_index, service);
    Ok(result)
}

/// Move a service from one stage to another
///
/// Returns `Ok(None)` when either droppable id does not name a stage. The
/// destination index may equal the destination stage length to append.
pub fn move_service(
    stages: &[DeploymentStageResponse],
    source: &DraggableLocation,
    destination: &DraggableLocation,
) -> Result<Option<Vec<DeploymentStageResponse>>, ConsoleError> {
    let (Some(source_stage), Some(destination_stage)) = (
        source.stage_index(stages.len()),
        destination.stage_index(stages.len()),
    ) else {
        return Ok(None);
    };

    if source_stage == destination_stage {
        return reorder_service(stages, source_stage, source.index, destination.index).map(Some);
    }

    ConsoleError::check_index("services", source.index, stages[source_stage].services.len())?;
    ConsoleError::check_index(
        "services",
        destination.index,
        stages[destination_stage].services.len() + 1,
    )?;

    let mut result = stages.to_vec();
    let service = result[source_stage].services.remove(source.index);
    result[destination_stage]
        .services
        .insert(destination.index, service);
    Ok(Some(result))
}

/// Move the stage at `source_index` to `destination_index`
///
/// Deployment orders are renumbered to follow the new positions.
pub fn reorder_stage(
    stages: &[DeploymentStageResponse],
    source_index: usize,
    destination_index: usize,
) -> Result<Vec<DeploymentStageResponse>, ConsoleError> {
    ConsoleError::check_index("stages", source_index, stages.len())?;
    ConsoleError::check_index("stages", destination_index, stages.len())?;

    let mut result = stages.to_vec();
    let stage = result.remove(source_index);
    result.insert(destination_index, stage);
    for (order, stage) in result.iter_mut().enumerate() {
        stage.deployment_order = order as i32;
    }
    Ok(result)
}

/// Total number of services across all stages
pub fn service_count(stages: &[DeploymentStageResponse]) -> usize {
    stages.iter().map(|s| s.services.len()).sum()
}

/// Index of the stage holding `service_id` and its position in that stage
pub fn locate_service(
    stages: &[DeploymentStageResponse],
    service_id: &str,
) -> Option<DraggableLocation> {
    stages.iter().enumerate().find_map(|(stage_index, stage)| {
        stage
            .services
            .iter()
            .position(|s| s.service_id == service_id)
            .map(|index| DraggableLocation::new(stage_index, index))
    })
}
