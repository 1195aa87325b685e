//! Stagehand
//!
//! Event target filtering and deployment pipeline editing against the
//! deployment console's REST API.

pub mod board;
pub mod errors;
pub mod filesys;
pub mod filter;
pub mod http;
pub mod logs;
pub mod pipeline;
pub mod storage;
pub mod utils;
