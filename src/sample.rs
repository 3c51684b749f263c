/// Встроенный пример данных за 12 месяцев

use serde_json::json;

use crate::types::RawRow;

pub const SAMPLE_HEADER: [&str; 6] = ["month", "sales", "expenses", "profit", "customers", "marketing_spend"];

// month, sales, expenses, profit, customers, marketing_spend
const SAMPLE_DATA: [(&str, u32, u32, u32, u32, u32); 12] = [
    ("Jan 2024", 45000, 28000, 17000, 120, 5000),
    ("Feb 2024", 48000, 29000, 19000, 135, 5200),
    ("Mar 2024", 52000, 30000, 22000, 145, 5500),
    ("Apr 2024", 49000, 28500, 20500, 140, 5300),
    ("May 2024", 55000, 31000, 24000, 160, 6000),
    ("Jun 2024", 58000, 32000, 26000, 175, 6200),
    ("Jul 2024", 61000, 33000, 28000, 190, 6500),
    ("Aug 2024", 59000, 32500, 26500, 185, 6300),
    ("Sep 2024", 64000, 34000, 30000, 200, 6800),
    ("Oct 2024", 67000, 35000, 32000, 215, 7000),
    ("Nov 2024", 70000, 36000, 34000, 230, 7200),
    ("Dec 2024", 75000, 37000, 38000, 250, 7500),
];

/// Строки в том виде, в каком их отдаёт CSV-парсер (все значения - строки)
pub fn sample_rows() -> Vec<RawRow> {
    SAMPLE_DATA
        .iter()
        .map(|&(month, sales, expenses, profit, customers, marketing)| {
            let mut row = RawRow::new();
            row.insert("month".to_string(), json!(month));
            row.insert("sales".to_string(), json!(sales.to_string()));
            row.insert("expenses".to_string(), json!(expenses.to_string()));
            row.insert("profit".to_string(), json!(profit.to_string()));
            row.insert("customers".to_string(), json!(customers.to_string()));
            row.insert("marketing_spend".to_string(), json!(marketing.to_string()));
            row
        })
        .collect()
}

pub fn sample_csv() -> String {
    let mut lines = vec![SAMPLE_HEADER.join(",")];
    lines.extend(SAMPLE_DATA.iter().map(|(month, sales, expenses, profit, customers, marketing)| {
        format!("{},{},{},{},{},{}", month, sales, expenses, profit, customers, marketing)
    }));
    lines.join("\n")
}
