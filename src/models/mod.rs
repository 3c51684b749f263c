/// ML модели

pub mod clustering;
pub mod correlation;
pub mod forecasting;
pub mod insights;

pub use clustering::{ClusteringEngine, KMeans};
pub use correlation::CorrelationEngine;
pub use forecasting::{ForecastingModel, LinearTrend};
pub use insights::InsightGenerator;
