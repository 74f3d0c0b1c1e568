pub mod assistant;
pub mod catalog;
pub mod config;
pub mod conversation;
pub mod error;
pub mod intent;
pub mod mcp_api;
pub mod model;
pub mod pricing;
pub mod ranker;
pub mod recommend;
