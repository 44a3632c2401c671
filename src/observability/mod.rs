// Observability: metrics recording and export

pub mod metrics;
