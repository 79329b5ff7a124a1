use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Category, Policy, PolicyScope, Service};
use crate::services::policy::generate_booking_policy;
use crate::services::slots;
use crate::state::AppState;

// GET /api/business/:business_url/services
#[derive(Serialize)]
pub struct CatalogResponse {
    services: Vec<Service>,
    categories: Vec<Category>,
}

pub async fn get_catalog(
    State(state): State<Arc<AppState>>,
    Path(business_url): Path<String>,
) -> Result<Json<CatalogResponse>, AppError> {
    let (services, categories) = tokio::try_join!(
        state.api.list_services(&business_url),
        state.api.list_categories(&business_url),
    )?;
    Ok(Json(CatalogResponse {
        services,
        categories,
    }))
}

// GET /api/business/:business_url/policies?type=all
#[derive(Deserialize)]
pub struct PolicyQuery {
    #[serde(rename = "type", default)]
    pub scope: PolicyScope,
}

pub async fn get_policies(
    State(state): State<Arc<AppState>>,
    Path(business_url): Path<String>,
    Query(query): Query<PolicyQuery>,
) -> Result<Json<Vec<Policy>>, AppError> {
    let settings = state.api.get_booking_settings(&business_url).await?;
    Ok(Json(generate_booking_policy(&settings, query.scope)))
}

// GET /api/business/:business_url/slots?date=2024-06-10&duration=60
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
    pub duration: u32,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub date: NaiveDate,
    pub slots: Vec<u32>,
}

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path(business_url): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    let (settings, booked) = tokio::try_join!(
        state.api.get_booking_settings(&business_url),
        state.api.list_booked_intervals(&business_url, query.date),
    )?;
    let slots = slots::available_slots(query.date, &settings, query.duration, &booked, state.now());
    tracing::debug!(business_url, date = %query.date, count = slots.len(), "resolved slots");
    Ok(Json(SlotsResponse {
        date: query.date,
        slots,
    }))
}

// GET /api/business/:business_url/dates
#[derive(Serialize)]
pub struct DatesResponse {
    pub dates: Vec<NaiveDate>,
}

pub async fn get_dates(
    State(state): State<Arc<AppState>>,
    Path(business_url): Path<String>,
) -> Result<Json<DatesResponse>, AppError> {
    let settings = state.api.get_booking_settings(&business_url).await?;
    Ok(Json(DatesResponse {
        dates: slots::selectable_dates(&settings, state.now()),
    }))
}
