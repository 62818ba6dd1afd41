use serde::{Deserialize, Serialize};

use crate::expenses::repo::Expense;

/// JSON amount field. Clients send either a number or a numeric string;
/// both go through the same positive-number validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Number(f64),
    Text(String),
}

/// Request body for create and update. Optional fields so missing values
/// hit the handler's validation instead of a 422 from the extractor.
#[derive(Debug, Deserialize)]
pub struct ExpenseRequest {
    pub category: Option<String>,
    pub amount: Option<AmountField>,
    pub comments: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub message: String,
    pub expense: Expense,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// One row of the per-category aggregate.
#[derive(Debug, PartialEq, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub total: f64,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub stats: Vec<CategoryStat>,
    pub total_expenses: f64,
}
