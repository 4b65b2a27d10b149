pub mod audit;
pub mod config;
pub mod errors;
pub mod evaluation;
pub mod explain;
pub mod logging;
pub mod pipeline;
pub mod ranking;
pub mod retrieval;
