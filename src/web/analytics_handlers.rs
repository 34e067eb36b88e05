// src/web/analytics_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::attendance::{DailyAbsences, ForecastPoint, SlotBreakdown},
    services::{analytics_service::forecast_absences, store::today},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    days: Option<u32>,
    horizon: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    history: Vec<DailyAbsences>,
    forecast: Vec<ForecastPoint>,
}

// GET /api/analytics/forecast?days=14&horizon=7
pub async fn forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<Json<ForecastResponse>> {
    let days = query.days.unwrap_or(14);
    let horizon = query.horizon.unwrap_or(7);
    if days == 0 || days > 366 || horizon > 90 {
        return Err(AppError::BadRequest("days must be 1..=366 and horizon at most 90".into()));
    }
    let history = state.store.lock().await.daily_absences(days, today());
    let forecast = forecast_absences(&history, horizon);
    Ok(Json(ForecastResponse { history, forecast }))
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    date: Option<NaiveDate>,
}

// GET /api/analytics/timeslots?date=
pub async fn timeslots(
    State(state): State<AppState>,
    Query(query): Query<SlotQuery>,
) -> Json<Vec<SlotBreakdown>> {
    let date = query.date.unwrap_or_else(today);
    Json(state.store.lock().await.timeslot_breakdown(date))
}
