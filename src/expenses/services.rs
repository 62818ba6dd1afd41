use crate::error::ApiError;
use crate::expenses::dto::{AmountField, CategoryStat, ExpenseRequest, StatsResponse};
use crate::expenses::repo::CategoryTotal;

/// Validated create/update input.
#[derive(Debug, PartialEq)]
pub struct ExpenseInput {
    pub category: String,
    pub amount: f64,
    pub comments: Option<String>,
}

/// Checks presence, parses the amount, trims free text. Shared by create
/// and update, which carry identical validation rules.
pub fn validate_expense_input(payload: ExpenseRequest) -> Result<ExpenseInput, ApiError> {
    let category = payload
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    // A blank string amount counts as missing, like a blank category.
    let amount = match payload.amount {
        Some(AmountField::Text(ref s)) if s.trim().is_empty() => None,
        other => other,
    };

    let (Some(category), Some(amount)) = (category, amount) else {
        return Err(ApiError::validation("Category and amount are required"));
    };

    let amount = match amount {
        AmountField::Number(n) => n,
        AmountField::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ApiError::validation("Amount must be a positive number"))?,
    };

    if !amount.is_finite() || amount <= 0.0 {
        return Err(ApiError::validation("Amount must be a positive number"));
    }

    let comments = payload
        .comments
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    Ok(ExpenseInput {
        category: category.to_string(),
        amount,
        comments,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Turns the GROUP BY rows into the stats payload: grand total plus each
/// category's share of it, rounded to two decimal places. With no expenses
/// the list is empty and the total is zero.
pub fn compute_stats(rows: Vec<CategoryTotal>) -> StatsResponse {
    let total_expenses: f64 = rows.iter().map(|r| r.total).sum();

    let stats = rows
        .into_iter()
        .map(|r| CategoryStat {
            percentage: if total_expenses > 0.0 {
                round2(r.total / total_expenses * 100.0)
            } else {
                0.0
            },
            category: r.category,
            total: r.total,
            count: r.count,
        })
        .collect();

    StatsResponse {
        stats,
        total_expenses,
    }
}
