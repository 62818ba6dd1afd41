use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    expenses::{
        dto::{ExpenseRequest, ExpenseResponse, MessageResponse, StatsResponse},
        repo::Expense,
        services::{compute_stats, validate_expense_input},
    },
    state::AppState,
};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/stats", get(expense_stats))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
}

#[instrument(skip(state))]
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let expenses = Expense::list_by_user(&state.db, user_id).await?;
    Ok(Json(expenses))
}

#[instrument(skip(state, payload))]
pub async fn create_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseResponse>), ApiError> {
    let input = validate_expense_input(payload)?;

    let expense = Expense::create(
        &state.db,
        user_id,
        &input.category,
        input.amount,
        input.comments.as_deref(),
    )
    .await?;

    info!(user_id = %user_id, expense_id = %expense.id, category = %expense.category, "expense added");
    Ok((
        StatusCode::CREATED,
        Json(ExpenseResponse {
            message: "Expense added successfully".into(),
            expense,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseRequest>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let input = validate_expense_input(payload)?;

    // Missing id and foreign-owned id are indistinguishable here.
    let expense = Expense::update(
        &state.db,
        user_id,
        id,
        &input.category,
        input.amount,
        input.comments.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        warn!(user_id = %user_id, expense_id = %id, "update on missing expense");
        ApiError::not_found("Expense not found")
    })?;

    info!(user_id = %user_id, expense_id = %expense.id, "expense updated");
    Ok(Json(ExpenseResponse {
        message: "Expense updated successfully".into(),
        expense,
    }))
}

#[instrument(skip(state))]
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = Expense::delete(&state.db, user_id, id).await?;
    if !deleted {
        warn!(user_id = %user_id, expense_id = %id, "delete on missing expense");
        return Err(ApiError::not_found("Expense not found"));
    }

    info!(user_id = %user_id, expense_id = %id, "expense deleted");
    Ok(Json(MessageResponse {
        message: "Expense deleted successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn expense_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let rows = Expense::stats_by_user(&state.db, user_id).await?;
    Ok(Json(compute_stats(rows)))
}
