//! Feature engineering для ML моделей

use ndarray::{Array1, Array2};

use crate::types::{BusinessRecord, MetricField};

pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Точки (sales, profit) для кластеризации, n x 2
    pub fn sales_profit_points(records: &[BusinessRecord]) -> Array2<f64> {
        let mut points = Array2::zeros((records.len(), 2));
        for (i, record) in records.iter().enumerate() {
            points[[i, 0]] = record.sales;
            points[[i, 1]] = record.profit;
        }
        points
    }

    /// Временной ряд метрики: x - порядковый индекс (не дата), y - значение
    pub fn metric_series(records: &[BusinessRecord], field: MetricField) -> (Array1<f64>, Array1<f64>) {
        let x = Array1::from_iter((0..records.len()).map(|i| i as f64));
        let y = Array1::from_iter(records.iter().map(|r| field.value(r)));
        (x, y)
    }

    /// Матрица всех числовых полей, колонки в порядке `MetricField::ALL`
    pub fn metric_matrix(records: &[BusinessRecord]) -> Array2<f64> {
        let mut matrix = Array2::zeros((records.len(), MetricField::ALL.len()));
        for (i, record) in records.iter().enumerate() {
            for field in MetricField::ALL {
                matrix[[i, field.index()]] = field.value(record);
            }
        }
        matrix
    }
}
