use std::future::Future;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{BookingDetails, Policy, PolicyScope, LAST_MINUTE};
use crate::services::api::{ApiError, BookingApi};
use crate::services::notify::{Notifier, ToastLevel};
use crate::services::policy::generate_booking_policy;

/// A booking together with the policies that govern changing it.
#[derive(Debug, Clone, Serialize)]
pub struct ManagedBooking {
    pub booking: BookingDetails,
    pub policies: Vec<Policy>,
}

#[derive(Debug, thiserror::Error)]
pub enum ManageError {
    #[error("this booking is {0} and can no longer be changed")]
    Closed(&'static str),

    #[error("time out of range: {0}")]
    TimeOutOfRange(u32),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Loads the booking and its policy settings concurrently. Either failing
/// fails the whole load.
pub async fn load_managed_booking(api: &dyn BookingApi, id: &str) -> Result<ManagedBooking, ApiError> {
    let (booking, settings) = tokio::try_join!(api.get_booking(id), api.get_booking_policy(id))?;
    Ok(ManagedBooking {
        booking,
        policies: generate_booking_policy(&settings, PolicyScope::All),
    })
}

async fn with_toasts<F>(
    notifier: &dyn Notifier,
    loading: &str,
    success: &str,
    call: F,
) -> Result<BookingDetails, ManageError>
where
    F: Future<Output = Result<BookingDetails, ApiError>>,
{
    notifier.notify(ToastLevel::Loading, loading);
    match call.await {
        Ok(booking) => {
            notifier.notify(ToastLevel::Success, success);
            Ok(booking)
        }
        Err(err) => {
            notifier.notify(ToastLevel::Error, &err.first_message());
            Err(err.into())
        }
    }
}

fn ensure_open(booking: &BookingDetails, notifier: &dyn Notifier) -> Result<(), ManageError> {
    if booking.status.is_open() {
        return Ok(());
    }
    let err = ManageError::Closed(booking.status.as_str());
    notifier.notify(ToastLevel::Error, &err.to_string());
    Err(err)
}

pub async fn cancel(
    api: &dyn BookingApi,
    notifier: &dyn Notifier,
    booking: &BookingDetails,
) -> Result<BookingDetails, ManageError> {
    ensure_open(booking, notifier)?;
    tracing::info!(booking_id = %booking.id, "cancelling booking");
    with_toasts(
        notifier,
        "Cancelling your booking...",
        "Your booking has been cancelled.",
        api.cancel_booking(&booking.id),
    )
    .await
}

pub async fn reschedule(
    api: &dyn BookingApi,
    notifier: &dyn Notifier,
    booking: &BookingDetails,
    date: NaiveDate,
    time: u32,
) -> Result<BookingDetails, ManageError> {
    ensure_open(booking, notifier)?;
    if time > LAST_MINUTE {
        let err = ManageError::TimeOutOfRange(time);
        notifier.notify(ToastLevel::Error, &err.to_string());
        return Err(err);
    }
    tracing::info!(booking_id = %booking.id, %date, time, "rescheduling booking");
    with_toasts(
        notifier,
        "Rescheduling your booking...",
        "Your booking has been rescheduled.",
        api.reschedule_booking(&booking.id, date, time),
    )
    .await
}

pub async fn mark_no_show(
    api: &dyn BookingApi,
    notifier: &dyn Notifier,
    booking: &BookingDetails,
) -> Result<BookingDetails, ManageError> {
    ensure_open(booking, notifier)?;
    tracing::info!(booking_id = %booking.id, "marking booking as no-show");
    with_toasts(
        notifier,
        "Updating booking...",
        "Booking marked as no-show.",
        api.mark_no_show(&booking.id),
    )
    .await
}
