// Trendscope: daily topic trend reports from public forum posts
//
// This is the library root. Each module corresponds to a stage or
// collaborator of the report pipeline.

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod sources;
pub mod status;
pub mod topics;
