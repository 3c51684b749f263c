//! Очистка входных строк и импутация пропусков средним по колонке

use crate::error::{AnalyticsError, Result};
use crate::types::{BusinessRecord, MetricField, RawRow};

/// Ключи колонки с меткой периода
const PERIOD_KEYS: [&str; 2] = ["period", "month"];

pub struct RecordSanitizer;

impl RecordSanitizer {
    /// Превращает сырые строки в типизированные записи.
    ///
    /// Строки без метки периода отбрасываются. Числовое поле, которое не
    /// разбирается в конечное ненулевое число, заменяется средним по колонке.
    /// Легитимный ноль тоже заменяется: ноль и пропуск здесь неразличимы.
    pub fn sanitize(rows: &[RawRow]) -> Result<Vec<BusinessRecord>> {
        let means = Self::column_means(rows);

        let mut imputed = 0usize;
        let records: Vec<BusinessRecord> = rows
            .iter()
            .filter_map(|row| {
                let period = period_label(row)?;
                let mut values = [0.0; 5];
                for field in MetricField::ALL {
                    values[field.index()] = match parse_number(row.get(field.key())) {
                        Some(v) if v != 0.0 => v,
                        _ => {
                            imputed += 1;
                            means[field.index()]
                        }
                    };
                }
                Some(BusinessRecord {
                    period,
                    sales: values[MetricField::Sales.index()],
                    expenses: values[MetricField::Expenses.index()],
                    profit: values[MetricField::Profit.index()],
                    customers: values[MetricField::Customers.index()],
                    marketing_spend: values[MetricField::MarketingSpend.index()],
                })
            })
            .collect();

        let dropped = rows.len() - records.len();
        if dropped > 0 {
            tracing::warn!("Dropped {} rows without a period label", dropped);
        }
        if imputed > 0 {
            tracing::warn!("Imputed {} numeric cells with column means", imputed);
        }

        if records.is_empty() {
            return Err(AnalyticsError::Validation(
                "no usable rows after sanitization".to_string(),
            ));
        }

        Ok(records)
    }

    /// Средние по каждой колонке только по конечным значениям.
    /// Колонка без единого числа даёт 0.
    pub fn column_means(rows: &[RawRow]) -> [f64; 5] {
        let mut means = [0.0; 5];
        for field in MetricField::ALL {
            let (sum, count) = rows
                .iter()
                .filter_map(|row| parse_number(row.get(field.key())))
                .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
            if count > 0 {
                means[field.index()] = sum / count as f64;
            }
        }
        means
    }
}

/// Первый непустой ключ из `PERIOD_KEYS`: пустой `period` не скрывает `month`
fn period_label(row: &RawRow) -> Option<String> {
    PERIOD_KEYS
        .iter()
        .filter_map(|key| row.get(*key))
        .find_map(|value| {
            let label = match value {
                serde_json::Value::String(s) => s.trim().to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                _ => return None,
            };
            (!label.is_empty()).then_some(label)
        })
}

fn parse_number(value: Option<&serde_json::Value>) -> Option<f64> {
    let parsed = match value? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}
