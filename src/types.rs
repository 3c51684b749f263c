/// Типы данных аналитического ядра

use std::collections::HashMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Строка после CSV-парсера: имя поля -> произвольное скалярное значение
pub type RawRow = HashMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub period: String,
    pub sales: f64,
    pub expenses: f64,
    pub profit: f64,
    pub customers: f64,
    pub marketing_spend: f64,
}

/// Числовые поля записи
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    Sales,
    Expenses,
    Profit,
    Customers,
    MarketingSpend,
}

impl MetricField {
    pub const ALL: [MetricField; 5] = [
        MetricField::Sales,
        MetricField::Expenses,
        MetricField::Profit,
        MetricField::Customers,
        MetricField::MarketingSpend,
    ];

    /// Ключ колонки во входных строках
    pub fn key(self) -> &'static str {
        match self {
            MetricField::Sales => "sales",
            MetricField::Expenses => "expenses",
            MetricField::Profit => "profit",
            MetricField::Customers => "customers",
            MetricField::MarketingSpend => "marketing_spend",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricField::Sales => "Sales",
            MetricField::Expenses => "Expenses",
            MetricField::Profit => "Profit",
            MetricField::Customers => "Customers",
            MetricField::MarketingSpend => "Marketing",
        }
    }

    pub fn value(self, record: &BusinessRecord) -> f64 {
        match self {
            MetricField::Sales => record.sales,
            MetricField::Expenses => record.expenses,
            MetricField::Profit => record.profit,
            MetricField::Customers => record.customers,
            MetricField::MarketingSpend => record.marketing_spend,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            MetricField::Sales => 0,
            MetricField::Expenses => 1,
            MetricField::Profit => 2,
            MetricField::Customers => 3,
            MetricField::MarketingSpend => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub cluster_id: usize,
    pub sales: f64,
    pub profit: f64,
    pub centroid_sales: f64,
    pub centroid_profit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElbowPoint {
    pub k: usize,
    pub inertia: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl RegressionFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    pub fn quality(&self) -> FitQuality {
        if self.r_squared >= 0.7 {
            FitQuality::Strong
        } else if self.r_squared >= 0.4 {
            FitQuality::Moderate
        } else {
            FitQuality::Weak
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitQuality {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>, // только для исторических точек
    pub predicted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutput {
    pub metric: MetricField,
    pub points: Vec<ForecastPoint>,
    pub fit: RegressionFit,
    pub quality: FitQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Positive,
    Warning,
    Informational,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub severity: Severity,
    pub title: String,
    pub detail: String,
}

/// Полная симметричная матрица корреляций Пирсона
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub fields: Vec<MetricField>,
    pub coefficients: Array2<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: MetricField, b: MetricField) -> f64 {
        self.coefficients[[a.index(), b.index()]]
    }

    /// Внедиагональные пары (без повторов), по убыванию |r|
    pub fn strongest_pairs(&self) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for (i, &a) in self.fields.iter().enumerate() {
            for &b in &self.fields[i + 1..] {
                let coefficient = self.get(a, b);
                pairs.push(CorrelationPair {
                    first: a,
                    second: b,
                    coefficient,
                    strength: CorrelationStrength::classify(coefficient),
                });
            }
        }
        pairs.sort_by(|x, y| {
            y.coefficient
                .abs()
                .partial_cmp(&x.coefficient.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub first: MetricField,
    pub second: MetricField,
    pub coefficient: f64,
    pub strength: CorrelationStrength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub fn classify(coefficient: f64) -> Self {
        let abs = coefficient.abs();
        if abs > 0.7 {
            CorrelationStrength::Strong
        } else if abs > 0.4 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }
}

/// Результат полного прогона анализа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub records: Vec<BusinessRecord>,
    pub clusters: Vec<ClusterAssignment>,
    pub elbow: Vec<ElbowPoint>,
    pub forecast: ForecastOutput,
    pub correlations: CorrelationMatrix,
    pub insights: Vec<Insight>,
}
