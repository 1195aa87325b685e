//! Backend REST client

pub mod client;
pub mod deployment_stages;
pub mod events;
