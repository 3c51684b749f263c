//! Настройки анализа и сервиса

use std::net::SocketAddr;

use chrono::{Months, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::types::MetricField;

pub const ADDR_ENV: &str = "INSIGHTS_ML_ADDR";
const DEFAULT_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_clusters")]
    pub clusters: usize,
    #[serde(default = "default_max_k")]
    pub max_k: usize,
    #[serde(default = "default_forecast_metric")]
    pub forecast_metric: MetricField,
    #[serde(default = "default_periods_ahead")]
    pub periods_ahead: usize,
    /// Фиксированное зерно для воспроизводимой кластеризации
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub period_naming: PeriodNaming,
}

fn default_clusters() -> usize { 3 }
fn default_max_k() -> usize { 8 }
fn default_forecast_metric() -> MetricField { MetricField::Sales }
fn default_periods_ahead() -> usize { 6 }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            clusters: default_clusters(),
            max_k: default_max_k(),
            forecast_metric: default_forecast_metric(),
            periods_ahead: default_periods_ahead(),
            seed: None,
            period_naming: PeriodNaming::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn rng(&self) -> StdRng {
        seeded_rng(self.seed)
    }
}

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Как называть прогнозные периоды
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum PeriodNaming {
    /// "Month N", N - сквозной номер с единицы
    #[default]
    Index,
    /// Продолжение последовательности "Jan 2024", "Feb 2024", ...
    Calendar,
    Explicit { labels: Vec<String> },
}

impl PeriodNaming {
    /// Метки для `count` будущих периодов после `history_len` исторических
    pub fn future_labels(&self, last_label: Option<&str>, history_len: usize, count: usize) -> Vec<String> {
        let index_label = |offset: usize| format!("Month {}", history_len + offset + 1);

        match self {
            PeriodNaming::Index => (0..count).map(index_label).collect(),
            PeriodNaming::Calendar => match last_label.and_then(parse_month_label) {
                Some(last) => (0..count)
                    .map(|offset| {
                        last.checked_add_months(Months::new(offset as u32 + 1))
                            .map(|date| date.format("%b %Y").to_string())
                            .unwrap_or_else(|| index_label(offset))
                    })
                    .collect(),
                None => {
                    tracing::debug!("Period label {:?} is not a month, using index naming", last_label);
                    (0..count).map(index_label).collect()
                }
            },
            PeriodNaming::Explicit { labels } => (0..count)
                .map(|offset| labels.get(offset).cloned().unwrap_or_else(|| index_label(offset)))
                .collect(),
        }
    }
}

fn parse_month_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("01 {}", label.trim()), "%d %b %Y").ok()
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let raw = std::env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
        let addr = raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {}={}: {}", ADDR_ENV, raw, e))?;
        Ok(Self { addr })
    }
}
