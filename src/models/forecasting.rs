//! Модель прогнозирования тренда метрики

use ndarray::Array1;

use crate::config::PeriodNaming;
use crate::error::{AnalyticsError, Result};
use crate::preprocessing::FeatureEngineer;
use crate::types::{BusinessRecord, ForecastOutput, ForecastPoint, MetricField, RegressionFit};

/// Одномерная регрессия МНК в замкнутой форме
pub struct LinearTrend;

impl LinearTrend {
    pub fn fit(x: &Array1<f64>, y: &Array1<f64>) -> Result<RegressionFit> {
        let n_samples = x.len();
        AnalyticsError::require("regression", 2, n_samples)?;
        if y.len() != n_samples {
            return Err(AnalyticsError::Validation(format!(
                "x and y lengths differ: {} vs {}",
                n_samples,
                y.len()
            )));
        }

        let n = n_samples as f64;
        let sum_x = x.sum();
        let sum_y = y.sum();
        let sum_xy = x.dot(y);
        let sum_x2 = x.dot(x);

        // Порог относителен к масштабу x: малый, но ненулевой разброс допустим
        let denominator = n * sum_x2 - sum_x * sum_x;
        if denominator <= n * f64::EPSILON * (n * sum_x2) {
            return Err(AnalyticsError::DegenerateInput(
                "regressor has zero variance".to_string(),
            ));
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let mean_y = sum_y / n;
        let intercept = mean_y - slope * (sum_x / n);

        // R² = 1 - SSres/SStot, SStot = 0 даёт 0; отрицательное значение обрезается
        let ss_tot: f64 = y.iter().map(|v| (v - mean_y).powi(2)).sum();
        let ss_res: f64 = x
            .iter()
            .zip(y.iter())
            .map(|(xi, yi)| (yi - (intercept + slope * xi)).powi(2))
            .sum();
        let r_squared = if ss_tot == 0.0 {
            0.0
        } else {
            let raw = 1.0 - ss_res / ss_tot;
            if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 }
        };

        tracing::debug!(
            "Linear trend fitted: slope={:.4}, intercept={:.4}, r2={:.4}",
            slope,
            intercept,
            r_squared
        );

        Ok(RegressionFit {
            slope,
            intercept,
            r_squared,
        })
    }
}

pub struct ForecastingModel;

impl ForecastingModel {
    /// История с прогнозом на тех же индексах плюс `periods_ahead` будущих точек
    pub fn forecast(
        records: &[BusinessRecord],
        metric: MetricField,
        periods_ahead: usize,
        naming: &PeriodNaming,
    ) -> Result<ForecastOutput> {
        let (x, y) = FeatureEngineer::metric_series(records, metric);
        let fit = LinearTrend::fit(&x, &y)?;

        let mut points: Vec<ForecastPoint> = records
            .iter()
            .enumerate()
            .map(|(i, record)| ForecastPoint {
                period: record.period.clone(),
                actual: Some(metric.value(record)),
                predicted: fit.predict(i as f64),
            })
            .collect();

        let last_label = records.last().map(|r| r.period.as_str());
        let labels = naming.future_labels(last_label, records.len(), periods_ahead);
        points.extend(labels.into_iter().enumerate().map(|(offset, period)| ForecastPoint {
            period,
            actual: None,
            predicted: fit.predict((records.len() + offset) as f64),
        }));

        Ok(ForecastOutput {
            metric,
            points,
            quality: fit.quality(),
            fit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FitQuality;

    fn records_from(values: &[f64]) -> Vec<BusinessRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| BusinessRecord {
                period: format!("P{}", i + 1),
                sales: v,
                expenses: v / 2.0,
                profit: v / 2.0,
                customers: 1.0,
                marketing_spend: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_perfect_line() {
        let x = Array1::from(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = Array1::from(vec![5.0, 7.0, 9.0, 11.0, 13.0, 15.0]);
        let fit = LinearTrend::fit(&x, &y).unwrap();

        assert!((fit.slope - 2.0).abs() < 1e-6);
        assert!((fit.intercept - 5.0).abs() < 1e-6);
        assert!((fit.r_squared - 1.0).abs() < 1e-6);
        assert_eq!(fit.quality(), FitQuality::Strong);
    }

    #[test]
    fn test_constant_series_has_zero_r_squared() {
        let x = Array1::from(vec![0.0, 1.0, 2.0]);
        let y = Array1::from(vec![4.0, 4.0, 4.0]);
        let fit = LinearTrend::fit(&x, &y).unwrap();

        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 4.0);
        assert_eq!(fit.r_squared, 0.0);
        assert_eq!(fit.quality(), FitQuality::Weak);
    }

    #[test]
    fn test_degenerate_and_insufficient() {
        let single = LinearTrend::fit(&Array1::from(vec![0.0]), &Array1::from(vec![1.0]));
        assert_eq!(single.unwrap_err().kind(), "insufficient_data");

        let same_x = LinearTrend::fit(&Array1::from(vec![2.0, 2.0]), &Array1::from(vec![1.0, 3.0]));
        assert_eq!(same_x.unwrap_err().kind(), "degenerate_input");
    }

    #[test]
    fn test_tiny_regressor_spread_is_not_degenerate() {
        let x = Array1::from(vec![0.0, 1e-9]);
        let y = Array1::from(vec![0.0, 1.0]);
        let fit = LinearTrend::fit(&x, &y).unwrap();
        assert!((fit.slope - 1e9).abs() <= 1e9 * 1e-9);
        assert!(fit.intercept.abs() < 1e-6);
        assert!(fit.r_squared > 0.999);
    }

    #[test]
    fn test_r_squared_in_unit_interval() {
        let x = Array1::from(vec![0.0, 1.0, 2.0, 3.0]);
        let y = Array1::from(vec![10.0, -3.0, 8.0, -1.0]);
        let fit = LinearTrend::fit(&x, &y).unwrap();
        assert!((0.0..=1.0).contains(&fit.r_squared));
    }

    #[test]
    fn test_forecast_points() {
        let records = records_from(&[5.0, 7.0, 9.0]);
        let output = ForecastingModel::forecast(&records, MetricField::Sales, 2, &PeriodNaming::Index).unwrap();

        assert_eq!(output.points.len(), 5);
        assert_eq!(output.points[0].period, "P1");
        assert_eq!(output.points[2].actual, Some(9.0));
        assert!((output.points[2].predicted - 9.0).abs() < 1e-9);

        assert_eq!(output.points[3].period, "Month 4");
        assert_eq!(output.points[3].actual, None);
        assert!((output.points[3].predicted - 11.0).abs() < 1e-9);
        assert_eq!(output.points[4].period, "Month 5");
        assert!((output.points[4].predicted - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_forecast_other_metric() {
        let records = records_from(&[10.0, 20.0, 30.0]);
        let output = ForecastingModel::forecast(&records, MetricField::Profit, 1, &PeriodNaming::Index).unwrap();
        assert_eq!(output.metric, MetricField::Profit);
        assert!((output.fit.slope - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_forecast_is_bit_identical() {
        let records = records_from(&[3.0, 8.0, 4.0, 9.0, 12.0]);
        let a = ForecastingModel::forecast(&records, MetricField::Sales, 3, &PeriodNaming::Index).unwrap();
        let b = ForecastingModel::forecast(&records, MetricField::Sales, 3, &PeriodNaming::Index).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_forecast_needs_two_records() {
        let records = records_from(&[3.0]);
        assert!(ForecastingModel::forecast(&records, MetricField::Sales, 1, &PeriodNaming::Index).is_err());
    }
}
