//! Deployment pipeline: stage and service reordering

pub mod editor;
pub mod fsm;
pub mod reorder;
