//! Hierarchical event filter: target type, project, environment, target

pub mod navigator;
pub mod resolver;
pub mod state;
pub mod target_type;
