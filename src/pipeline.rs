//! Полный прогон анализа: очистка -> модели -> выводы

use rand::Rng;

use crate::config::AnalysisConfig;
use crate::error::{AnalyticsError, Result};
use crate::models::insights::MIN_RECORDS;
use crate::models::{ClusteringEngine, CorrelationEngine, ForecastingModel, InsightGenerator};
use crate::preprocessing::RecordSanitizer;
use crate::types::{AnalysisReport, RawRow};

pub fn analyze<R: Rng + ?Sized>(rows: &[RawRow], config: &AnalysisConfig, rng: &mut R) -> Result<AnalysisReport> {
    let records = RecordSanitizer::sanitize(rows)?;
    AnalyticsError::require("analysis", MIN_RECORDS, records.len())?;

    tracing::info!(
        "Analyzing {} records (k={}, max_k={}, {} periods ahead)",
        records.len(),
        config.clusters,
        config.max_k,
        config.periods_ahead
    );

    let clusters = ClusteringEngine::cluster(&records, config.clusters, rng)?;
    let elbow = ClusteringEngine::elbow(&records, config.max_k, rng)?;
    let forecast = ForecastingModel::forecast(
        &records,
        config.forecast_metric,
        config.periods_ahead,
        &config.period_naming,
    )?;
    let correlations = CorrelationEngine::correlate(&records)?;
    let insights = InsightGenerator::generate(&records, &clusters)?;

    Ok(AnalysisReport {
        records,
        clusters,
        elbow,
        forecast,
        correlations,
        insights,
    })
}

/// То же, но генератор берётся из `config.seed`
pub fn analyze_with_config(rows: &[RawRow], config: &AnalysisConfig) -> Result<AnalysisReport> {
    let mut rng = config.rng();
    analyze(rows, config, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: &[(&str, f64)]) -> Vec<RawRow> {
        values
            .iter()
            .map(|(period, sales)| {
                serde_json::from_value(json!({
                    "month": period,
                    "sales": sales,
                    "expenses": sales * 0.6,
                    "profit": sales * 0.4,
                    "customers": 10,
                    "marketing_spend": 100
                }))
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_requires_three_records() {
        let config = AnalysisConfig {
            seed: Some(1),
            ..AnalysisConfig::default()
        };
        let err = analyze_with_config(&rows(&[("a", 1.0), ("b", 2.0)]), &config).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::InsufficientData {
                operation: "analysis",
                required: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_small_dataset() {
        let config = AnalysisConfig {
            seed: Some(1),
            ..AnalysisConfig::default()
        };
        let report = analyze_with_config(&rows(&[("a", 100.0), ("b", 200.0), ("c", 300.0)]), &config).unwrap();

        assert_eq!(report.records.len(), 3);
        assert_eq!(report.clusters.len(), 3);
        // max_k урезается до числа записей
        assert_eq!(report.elbow.len(), 3);
        assert_eq!(report.forecast.points.len(), 3 + 6);
        assert_eq!(
            report.insights.last().map(|i| i.title.as_str()),
            Some("Performance Patterns Detected")
        );
    }
}
