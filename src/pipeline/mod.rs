// Pipelines: end-to-end runs composed from the stage modules.

pub mod daily;
