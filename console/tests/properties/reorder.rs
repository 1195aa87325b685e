//! Property tests for stage and service reordering.

use proptest::prelude::*;

use openapi_client::models::{DeploymentStageResponse, DeploymentStageServiceResponse};
use stagehand::errors::ConsoleError;
use stagehand::pipeline::reorder::{
    move_service, reorder_service, reorder_stage, service_count, DraggableLocation,
};

fn pipeline(sizes: &[usize]) -> Vec<DeploymentStageResponse> {
    sizes
        .iter()
        .enumerate()
        .map(|(s, size)| DeploymentStageResponse {
            id: format!("stage-{}", s),
            name: format!("Stage {}", s),
            description: None,
            deployment_order: s as i32,
            services: (0..*size)
                .map(|i| DeploymentStageServiceResponse {
                    id: format!("link-{}-{}", s, i),
                    service_id: format!("svc-{}-{}", s, i),
                    service_type: None,
                })
                .collect(),
        })
        .collect()
}

fn service_ids(stages: &[DeploymentStageResponse]) -> Vec<String> {
    let mut ids: Vec<_> = stages
        .iter()
        .flat_map(|s| s.services.iter().map(|svc| svc.service_id.clone()))
        .collect();
    ids.sort();
    ids
}

fn stage_sizes() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0usize..=5, 1..=5)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: moving a service keeps the same set of services and leaves the input alone.
    #[test]
    fn property_move_service_preserves_services(
        sizes in stage_sizes(),
        from in (0usize..6, 0usize..6),
        to in (0usize..6, 0usize..7),
    ) {
        let stages = pipeline(&sizes);
        let snapshot = stages.clone();

        let result = move_service(
            &stages,
            &DraggableLocation::new(from.0, from.1),
            &DraggableLocation::new(to.0, to.1),
        );

        prop_assert_eq!(&stages, &snapshot);
        match result {
            Ok(Some(moved)) => {
                prop_assert_eq!(moved.len(), stages.len());
                prop_assert_eq!(service_ids(&moved), service_ids(&stages));
            }
            Ok(None) => prop_assert!(from.0 >= sizes.len() || to.0 >= sizes.len()),
            Err(e) => prop_assert!(
                matches!(e, ConsoleError::IndexOutOfRange { .. }),
                "unexpected error: {}",
                e
            ),
        }
    }

    /// PROPERTY: reordering inside a stage only permutes that stage.
    #[test]
    fn property_reorder_service_is_local(
        sizes in stage_sizes(),
        stage in 0usize..6,
        start in 0usize..6,
        end in 0usize..6,
    ) {
        let stages = pipeline(&sizes);

        if let Ok(result) = reorder_service(&stages, stage, start, end) {
            for (i, (before, after)) in stages.iter().zip(&result).enumerate() {
                if i != stage {
                    prop_assert_eq!(before, after);
                }
            }
            prop_assert_eq!(service_ids(&result), service_ids(&stages));
            prop_assert_eq!(
                &result[stage].services[end].service_id,
                &stages[stage].services[start].service_id
            );
        }
    }

    /// PROPERTY: reordering stages keeps every stage and numbers them by position.
    #[test]
    fn property_reorder_stage_renumbers(
        sizes in stage_sizes(),
        source in 0usize..5,
        destination in 0usize..5,
    ) {
        let stages = pipeline(&sizes);

        match reorder_stage(&stages, source, destination) {
            Ok(result) => {
                prop_assert_eq!(service_count(&result), service_count(&stages));
                prop_assert_eq!(&result[destination].id, &stages[source].id);
                for (order, stage) in result.iter().enumerate() {
                    prop_assert_eq!(stage.deployment_order, order as i32);
                }
            }
            Err(_) => prop_assert!(source >= stages.len() || destination >= stages.len()),
        }
    }
}
