//! Генератор выводов по фиксированным порогам

use crate::error::{AnalyticsError, Result};
use crate::models::clustering::ClusteringEngine;
use crate::types::{BusinessRecord, ClusterAssignment, Insight, Severity};

pub const MIN_RECORDS: usize = 3;
/// Окно сравнения "последние N против первых N"
const TREND_WINDOW: usize = 3;

/// Агрегаты, по которым срабатывают правила
#[derive(Debug, Clone, PartialEq)]
pub struct InsightStats {
    pub avg_profit_margin: f64,
    pub avg_expense_ratio: f64,
    pub recent_profit: f64,
    pub older_profit: f64,
    pub cluster_count: usize,
}

impl InsightStats {
    pub fn compute(records: &[BusinessRecord], clusters: &[ClusterAssignment]) -> Result<Self> {
        AnalyticsError::require("insights", MIN_RECORDS, records.len())?;

        let window_mean = |window: &[BusinessRecord]| {
            window.iter().map(|r| r.profit).sum::<f64>() / window.len() as f64
        };

        Ok(Self {
            avg_profit_margin: mean_ratio(records, |r| r.profit),
            avg_expense_ratio: mean_ratio(records, |r| r.expenses),
            recent_profit: window_mean(&records[records.len() - TREND_WINDOW..]),
            older_profit: window_mean(&records[..TREND_WINDOW]),
            cluster_count: ClusteringEngine::distinct_clusters(clusters),
        })
    }
}

/// Среднее value/sales*100; записи с нулевыми продажами не участвуют
fn mean_ratio(records: &[BusinessRecord], value: impl Fn(&BusinessRecord) -> f64) -> f64 {
    let ratios: Vec<f64> = records
        .iter()
        .filter(|r| r.sales != 0.0)
        .map(|r| value(r) / r.sales * 100.0)
        .filter(|v| v.is_finite())
        .collect();
    if ratios.is_empty() {
        return 0.0;
    }
    ratios.iter().sum::<f64>() / ratios.len() as f64
}

struct Rule {
    applies: fn(&InsightStats) -> bool,
    build: fn(&InsightStats) -> Insight,
}

fn insight(severity: Severity, title: &str, detail: String) -> Insight {
    Insight {
        severity,
        title: title.to_string(),
        detail,
    }
}

/// Правила независимы и проверяются в этом порядке
const RULES: &[Rule] = &[
    Rule {
        applies: |s| s.avg_profit_margin > 20.0,
        build: |s| insight(
            Severity::Positive,
            "Healthy Profit Margin",
            format!("Your average profit margin of {:.1}% indicates strong financial health.", s.avg_profit_margin),
        ),
    },
    Rule {
        applies: |s| s.avg_profit_margin < 10.0,
        build: |s| insight(
            Severity::Warning,
            "Low Profit Margin",
            format!(
                "Your average profit margin of {:.1}% is below industry standards. Consider cost optimization.",
                s.avg_profit_margin
            ),
        ),
    },
    Rule {
        applies: |s| s.avg_expense_ratio > 70.0,
        build: |s| insight(
            Severity::Warning,
            "High Operating Expenses",
            format!(
                "Expenses represent {:.1}% of sales. Look for cost-saving opportunities.",
                s.avg_expense_ratio
            ),
        ),
    },
    Rule {
        applies: |s| s.avg_expense_ratio < 50.0,
        build: |s| insight(
            Severity::Positive,
            "Efficient Operations",
            format!(
                "Well-controlled expenses at {:.1}% of sales demonstrate operational efficiency.",
                s.avg_expense_ratio
            ),
        ),
    },
    Rule {
        applies: |s| s.recent_profit > s.older_profit * 1.2,
        build: |_| insight(
            Severity::Positive,
            "Positive Growth Trend",
            "Your recent performance shows strong improvement compared to earlier periods.".to_string(),
        ),
    },
    Rule {
        applies: |s| s.recent_profit < s.older_profit * 0.8,
        build: |_| insight(
            Severity::Warning,
            "Declining Performance",
            "Recent data shows a downward trend. Review your strategy and market conditions.".to_string(),
        ),
    },
    Rule {
        applies: |_| true,
        build: |s| insight(
            Severity::Informational,
            "Performance Patterns Detected",
            format!("AI identified {} distinct performance patterns in your business data.", s.cluster_count),
        ),
    },
];

pub struct InsightGenerator;

impl InsightGenerator {
    pub fn generate(records: &[BusinessRecord], clusters: &[ClusterAssignment]) -> Result<Vec<Insight>> {
        let stats = InsightStats::compute(records, clusters)?;
        Ok(Self::evaluate(&stats))
    }

    pub fn evaluate(stats: &InsightStats) -> Vec<Insight> {
        RULES
            .iter()
            .filter(|rule| (rule.applies)(stats))
            .map(|rule| (rule.build)(stats))
            .collect()
    }
}
