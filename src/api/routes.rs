//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name                  | Description                            | Return Type         |
// |-----------------------|----------------------------------------|---------------------|
// | health                | Health check endpoint                  | Response            |
// | create_order          | Submit a new order                     | ApiResult<Response> |
// | list_orders           | List one side in priority order        | ApiResult<Response> |
// | get_order             | Get details of a resting order         | ApiResult<Response> |
// | modify_order          | Change quantity and/or price           | ApiResult<Response> |
// | cancel_order          | Cancel a resting order                 | ApiResult<Response> |
// | get_summary           | Aggregated book state                  | ApiResult<Response> |
// | get_trades            | Tail of the trade log                  | ApiResult<Response> |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::{
    ApiResult, AppState, CreateOrderRequest, ModifyOrderRequest, SubmitResponse, SummaryResponse,
    TradesQuery,
};
use crate::types::Side;

const DEFAULT_TRADE_TAIL: usize = 20;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

/// Submit a new order: match it against the book and rest any limit residual
pub async fn create_order(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<Response> {
    let mut book = state.book.write().await;
    let result = book.submit(req.into_new_order())?;

    let response = SubmitResponse::from(result);
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// List all resting orders of one side, best price first, FIFO within a level
pub async fn list_orders(
    Extension(state): Extension<Arc<AppState>>,
    Path(side): Path<Side>,
) -> ApiResult<Response> {
    let book = state.book.read().await;
    let orders = book.list(side);

    Ok((StatusCode::OK, Json(orders)).into_response())
}

/// Get details of a resting order
pub async fn get_order(
    Extension(state): Extension<Arc<AppState>>,
    Path((side, order_id)): Path<(Side, u64)>,
) -> ApiResult<Response> {
    let book = state.book.read().await;
    let order = book.get(side, order_id)?;

    Ok((StatusCode::OK, Json(order)).into_response())
}

/// Modify the quantity and/or price of a resting order
pub async fn modify_order(
    Extension(state): Extension<Arc<AppState>>,
    Path((side, order_id)): Path<(Side, u64)>,
    Json(req): Json<ModifyOrderRequest>,
) -> ApiResult<Response> {
    let mut book = state.book.write().await;
    let order = book.modify(side, order_id, req.quantity, req.price)?;

    Ok((StatusCode::OK, Json(order)).into_response())
}

/// Cancel a resting order
pub async fn cancel_order(
    Extension(state): Extension<Arc<AppState>>,
    Path((side, order_id)): Path<(Side, u64)>,
) -> ApiResult<Response> {
    let mut book = state.book.write().await;
    book.cancel(side, order_id)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Get the aggregated book state
pub async fn get_summary(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Response> {
    let book = state.book.read().await;
    let response = SummaryResponse::from(book.summary());

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Get the most recent trades, oldest first
pub async fn get_trades(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<TradesQuery>,
) -> ApiResult<Response> {
    let limit = params.limit.unwrap_or(DEFAULT_TRADE_TAIL);

    let book = state.book.read().await;
    let trades = book.trades().tail(limit).to_vec();

    Ok((StatusCode::OK, Json(trades)).into_response())
}
