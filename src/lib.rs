//! Business Insights ML - аналитическое ядро
//!
//! Очистка табличных месячных метрик, кластеризация k-means по (sales, profit),
//! линейный прогноз тренда, корреляции Пирсона и выводы по порогам.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod sample;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{AnalysisConfig, PeriodNaming};
pub use error::AnalyticsError;
pub use models::*;
pub use pipeline::{analyze, analyze_with_config};
pub use preprocessing::*;
pub use types::*;
