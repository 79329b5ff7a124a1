use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{BookedInterval, BookingSettings, ContactDetails};
use crate::services::api::ApiError;
use crate::services::notify::{Notifier, Toast, ToastBuffer, ToastLevel};
use crate::services::wizard::{
    BookingWizard, DayAvailability, Navigation, SubmitOutcome, WizardError, WizardView,
};
use crate::state::AppState;

#[derive(Serialize)]
pub struct WizardResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub wizard: WizardView,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub toasts: Vec<Toast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<Navigation>,
}

impl WizardResponse {
    fn new(id: Uuid, wizard: WizardView) -> Self {
        Self {
            id,
            wizard,
            toasts: Vec::new(),
            navigation: None,
        }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("booking session {id}"))
}

/// Applies `f` and returns the resulting view.
fn update<F>(state: &AppState, id: Uuid, f: F) -> Result<Json<WizardResponse>, AppError>
where
    F: FnOnce(&mut BookingWizard) -> Result<(), WizardError>,
{
    let view = state
        .with_wizard(id, |wizard| f(wizard).map(|_| wizard.view()))
        .ok_or_else(|| not_found(id))??;
    Ok(Json(WizardResponse::new(id, view)))
}

fn business_url_of(state: &AppState, id: Uuid) -> Result<String, AppError> {
    state
        .with_wizard(id, |w| w.business_url().to_string())
        .ok_or_else(|| not_found(id))
}

/// Booking settings plus the bookings already taken on `date`, fetched
/// concurrently. No date means no bookings to look up.
async fn fetch_day(
    state: &AppState,
    business_url: &str,
    date: Option<NaiveDate>,
) -> Result<(BookingSettings, Vec<BookedInterval>), ApiError> {
    let booked = async {
        match date {
            Some(date) => state.api.list_booked_intervals(business_url, date).await,
            None => Ok(Vec::new()),
        }
    };
    tokio::try_join!(state.api.get_booking_settings(business_url), booked)
}

// POST /api/business/:business_url/wizard
#[derive(Deserialize, Default)]
pub struct CreateWizardRequest {
    /// The page location the customer arrived on, deep-link parameters included.
    pub location: Option<String>,
    pub time_zone: Option<String>,
}

pub async fn create_wizard(
    State(state): State<Arc<AppState>>,
    Path(business_url): Path<String>,
    body: Option<Json<CreateWizardRequest>>,
) -> Result<Json<WizardResponse>, AppError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let time_zone = body
        .time_zone
        .unwrap_or_else(|| state.config.client_time_zone.clone());
    let mut wizard = BookingWizard::new(business_url.clone(), time_zone);

    let mut navigation = None;
    if let Some(raw) = body.location.as_deref() {
        let location =
            Url::parse(raw).map_err(|e| AppError::BadRequest(format!("location: {e}")))?;
        let catalog = state.api.list_services(&business_url).await?;
        navigation = wizard.restore_from_location(&location, &catalog);

        if let Some(date) = wizard.store().date_time().date {
            let (settings, booked) = fetch_day(&state, &business_url, Some(date)).await?;
            wizard.drop_unbookable_selection(&DayAvailability {
                settings: &settings,
                booked: &booked,
                now: state.now(),
            });
        }
    }

    let view = wizard.view();
    let id = state.insert_wizard(wizard);
    tracing::info!(%id, business_url, "booking session started");

    Ok(Json(WizardResponse {
        navigation,
        ..WizardResponse::new(id, view)
    }))
}

// GET /api/wizard/:id
pub async fn get_wizard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardResponse>, AppError> {
    let view = state
        .with_wizard(id, |w| w.view())
        .ok_or_else(|| not_found(id))?;
    Ok(Json(WizardResponse::new(id, view)))
}

// POST /api/wizard/:id/services
#[derive(Deserialize)]
pub struct AddServicesRequest {
    pub service_ids: Vec<i64>,
}

pub async fn add_services(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddServicesRequest>,
) -> Result<Json<WizardResponse>, AppError> {
    let business_url = business_url_of(&state, id)?;
    let catalog = state.api.list_services(&business_url).await?;
    update(&state, id, |w| w.add_services(&body.service_ids, &catalog).map(|_| ()))
}

// DELETE /api/wizard/:id/services/:service_id
pub async fn remove_service(
    State(state): State<Arc<AppState>>,
    Path((id, service_id)): Path<(Uuid, i64)>,
) -> Result<Json<WizardResponse>, AppError> {
    update(&state, id, |w| w.remove_service(service_id).map(|_| ()))
}

// POST /api/wizard/:id/confirm-services
pub async fn confirm_services(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardResponse>, AppError> {
    update(&state, id, |w| w.confirm_services())
}

// POST /api/wizard/:id/back
pub async fn back_to_services(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardResponse>, AppError> {
    update(&state, id, |w| w.back_to_services())
}

// PUT /api/wizard/:id/datetime
#[derive(Deserialize)]
pub struct DateTimeRequest {
    pub event_date: Option<NaiveDate>,
    pub event_time: Option<u32>,
}

pub async fn select_date_time(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<DateTimeRequest>,
) -> Result<Json<WizardResponse>, AppError> {
    let business_url = business_url_of(&state, id)?;
    let (settings, booked) = fetch_day(&state, &business_url, body.event_date).await?;
    let day = DayAvailability {
        settings: &settings,
        booked: &booked,
        now: state.now(),
    };
    update(&state, id, |w| w.select_date_time(body.event_date, body.event_time, &day))
}

// GET /api/wizard/:id/slots
#[derive(Serialize)]
pub struct WizardSlotsResponse {
    pub event_date: Option<NaiveDate>,
    pub slots: Vec<u32>,
}

pub async fn get_wizard_slots(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardSlotsResponse>, AppError> {
    let wizard = state
        .with_wizard(id, |w| w.clone())
        .ok_or_else(|| not_found(id))?;
    let Some(date) = wizard.store().date_time().date else {
        return Ok(Json(WizardSlotsResponse {
            event_date: None,
            slots: Vec::new(),
        }));
    };

    let (settings, booked) = fetch_day(&state, wizard.business_url(), Some(date)).await?;
    let day = DayAvailability {
        settings: &settings,
        booked: &booked,
        now: state.now(),
    };

    Ok(Json(WizardSlotsResponse {
        event_date: Some(date),
        slots: wizard.available_slots(&day),
    }))
}

// POST /api/wizard/:id/contact
pub async fn open_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardResponse>, AppError> {
    let (business_url, date) = state
        .with_wizard(id, |w| (w.business_url().to_string(), w.store().date_time().date))
        .ok_or_else(|| not_found(id))?;
    let (settings, booked) = fetch_day(&state, &business_url, date).await?;
    let day = DayAvailability {
        settings: &settings,
        booked: &booked,
        now: state.now(),
    };
    update(&state, id, |w| w.open_contact_modal(&day))
}

// DELETE /api/wizard/:id/contact
pub async fn close_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardResponse>, AppError> {
    update(&state, id, |w| w.close_contact_modal())
}

// POST /api/wizard/:id/submit
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(contact): Json<ContactDetails>,
) -> Result<Json<WizardResponse>, AppError> {
    let pending = state
        .with_wizard(id, |w| w.begin_submission(contact))
        .ok_or_else(|| not_found(id))??;

    let toasts = ToastBuffer::new();
    toasts.notify(ToastLevel::Loading, "Creating your booking...");
    // No lock is held while the backend works; a reset in the meantime
    // makes this response stale.
    let result = state
        .api
        .submit_booking(&pending.business_url, &pending.request)
        .await;

    let (outcome, view) = state
        .with_wizard(id, |w| {
            let outcome = w.complete_submission(pending.generation, result, &toasts);
            (outcome, w.view())
        })
        .ok_or_else(|| not_found(id))?;

    let navigation = match outcome {
        SubmitOutcome::Redirect(nav) => {
            state.remove_wizard(id);
            Some(nav)
        }
        SubmitOutcome::Failed { navigation, .. } => navigation,
        SubmitOutcome::Discarded => None,
    };

    Ok(Json(WizardResponse {
        toasts: toasts.drain(),
        navigation,
        ..WizardResponse::new(id, view)
    }))
}

// POST /api/wizard/:id/reset
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardResponse>, AppError> {
    update(&state, id, |w| {
        w.reset();
        Ok(())
    })
}
