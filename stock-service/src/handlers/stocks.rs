use crate::dtos::DateRangeParams;
use crate::models::StockRecord;
use crate::services::record_lookup;
use crate::startup::AppState;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use service_core::error::AppError;

/// `GET /api/stocks/:company`
///
/// 200 with every stored record for the company, 404 when there are none, 500
/// when the store is not ready or the query fails. Malformed path segments or
/// query strings are 400s with the usual JSON body.
pub async fn get_company_stocks(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<DateRangeParams>, QueryRejection>,
) -> Result<Json<Vec<StockRecord>>, AppError> {
    if !state.readiness.is_ready() {
        record_lookup("not_ready");
        return Err(AppError::NotReady);
    }

    let Path(company) = path.map_err(|rejection| bad_request(rejection.body_text()))?;
    let Query(params) = query.map_err(|rejection| bad_request(rejection.body_text()))?;

    let range = params.into_range().map_err(|e| {
        record_lookup("bad_request");
        e
    })?;

    let records = state.store.find_by_company(&company).await.map_err(|e| {
        record_lookup("error");
        e
    })?;

    let records = range.apply(records);

    if records.is_empty() {
        tracing::info!(company = %company, "No stock data found");
        record_lookup("not_found");
        return Err(AppError::NotFound(format!("No data found for {}", company)));
    }

    tracing::info!(company = %company, count = records.len(), "Stock data retrieved");
    record_lookup("found");
    Ok(Json(records))
}

fn bad_request(message: String) -> AppError {
    record_lookup("bad_request");
    AppError::BadRequest(message)
}
