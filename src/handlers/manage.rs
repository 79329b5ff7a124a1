use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, ToastedError};
use crate::models::BookingDetails;
use crate::services::manage::ManageError;
use crate::services::manage::{self, ManagedBooking};
use crate::services::notify::{Toast, ToastBuffer};
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingActionResponse {
    pub booking: BookingDetails,
    pub toasts: Vec<Toast>,
}

/// Answers with the buffered toasts on success and failure alike.
fn respond(
    result: Result<BookingDetails, ManageError>,
    toasts: ToastBuffer,
) -> Result<Json<BookingActionResponse>, ToastedError> {
    match result {
        Ok(booking) => Ok(Json(BookingActionResponse {
            booking,
            toasts: toasts.drain(),
        })),
        Err(err) => Err(ToastedError::new(err, toasts.drain())),
    }
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ManagedBooking>, AppError> {
    let managed = manage::load_managed_booking(&*state.api, &id).await?;
    Ok(Json(managed))
}

// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookingActionResponse>, ToastedError> {
    let toasts = ToastBuffer::new();
    let result = async {
        let booking = state.api.get_booking(&id).await?;
        manage::cancel(&*state.api, &toasts, &booking).await
    }
    .await;
    respond(result, toasts)
}

// POST /api/bookings/:id/reschedule
#[derive(Deserialize)]
pub struct RescheduleRequest {
    pub event_date: NaiveDate,
    pub event_time: u32,
}

pub async fn reschedule_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<RescheduleRequest>,
) -> Result<Json<BookingActionResponse>, ToastedError> {
    let toasts = ToastBuffer::new();
    let result = async {
        let booking = state.api.get_booking(&id).await?;
        manage::reschedule(
            &*state.api,
            &toasts,
            &booking,
            body.event_date,
            body.event_time,
        )
        .await
    }
    .await;
    respond(result, toasts)
}

// POST /api/bookings/:id/no-show
pub async fn mark_no_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookingActionResponse>, ToastedError> {
    let toasts = ToastBuffer::new();
    let result = async {
        let booking = state.api.get_booking(&id).await?;
        manage::mark_no_show(&*state.api, &toasts, &booking).await
    }
    .await;
    respond(result, toasts)
}
