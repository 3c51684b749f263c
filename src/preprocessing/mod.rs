/// Модуль предобработки данных

pub mod feature_engineering;
pub mod sanitizer;

pub use feature_engineering::FeatureEngineer;
pub use sanitizer::RecordSanitizer;
