//! Попарная корреляция Пирсона по числовым полям

use ndarray::{Array2, ArrayView1};

use crate::error::{AnalyticsError, Result};
use crate::preprocessing::FeatureEngineer;
use crate::types::{BusinessRecord, CorrelationMatrix, MetricField};

pub struct CorrelationEngine;

impl CorrelationEngine {
    /// Полная матрица 5x5. Диагональ всегда 1, постоянное поле даёт 0 вне диагонали.
    pub fn correlate(records: &[BusinessRecord]) -> Result<CorrelationMatrix> {
        if records.is_empty() {
            return Err(AnalyticsError::Validation("no records to correlate".to_string()));
        }

        let matrix = FeatureEngineer::metric_matrix(records);
        let n_fields = MetricField::ALL.len();
        let mut coefficients = Array2::zeros((n_fields, n_fields));

        for i in 0..n_fields {
            for j in 0..n_fields {
                coefficients[[i, j]] = if i == j {
                    1.0
                } else {
                    pearson(matrix.column(i), matrix.column(j))
                };
            }
        }

        Ok(CorrelationMatrix {
            fields: MetricField::ALL.to_vec(),
            coefficients,
        })
    }
}

pub fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = x.len() as f64;
    let sum_x = x.sum();
    let sum_y = y.sum();
    let sum_xy = x.dot(&y);
    let sum_x2 = x.dot(&x);
    let sum_y2 = y.dot(&y);

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (numerator / denominator).clamp(-1.0, 1.0)
}
