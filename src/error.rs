//! Ошибки аналитического ядра

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// Пустой или непригодный вход после очистки
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient data for {operation}: need at least {required} records, got {actual}")]
    InsufficientData {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    /// Нулевая дисперсия ломает знаменатель замкнутой формулы
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
}

impl AnalyticsError {
    /// Короткий машинный код ошибки (для API)
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyticsError::Validation(_) => "validation",
            AnalyticsError::InsufficientData { .. } => "insufficient_data",
            AnalyticsError::DegenerateInput(_) => "degenerate_input",
        }
    }

    pub(crate) fn require(
        operation: &'static str,
        required: usize,
        actual: usize,
    ) -> Result<()> {
        if actual < required {
            return Err(AnalyticsError::InsufficientData {
                operation,
                required,
                actual,
            });
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
