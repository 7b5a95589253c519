// Document sources: where a run's posts come from.

pub mod rate_limiter;
pub mod reddit;
pub mod traits;
