//! Привязка для браузера (feature = "wasm")

use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::config::AnalysisConfig;
use crate::pipeline;
use crate::types::RawRow;

#[derive(Deserialize)]
struct AnalyzeInput {
    rows: Vec<RawRow>,
    #[serde(default)]
    config: AnalysisConfig,
}

/// JSON `{ rows, config? }` -> JSON `AnalysisReport`
#[wasm_bindgen(js_name = analyzeJson)]
pub fn analyze_json(input: &str) -> Result<String, JsValue> {
    let mut input: AnalyzeInput =
        serde_json::from_str(input).map_err(|e| JsValue::from_str(&format!("Invalid input: {}", e)))?;

    // from_entropy в браузере недоступен без getrandom/js
    if input.config.seed.is_none() {
        input.config.seed = Some((js_sys::Math::random() * u64::MAX as f64) as u64);
    }

    let report = pipeline::analyze_with_config(&input.rows, &input.config)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&report).map_err(|e| JsValue::from_str(&e.to_string()))
}
