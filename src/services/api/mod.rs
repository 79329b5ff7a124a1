pub mod http;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use chrono::NaiveDate;
use crate::models::{
    BookedInterval, BookingCreated, BookingDetails, BookingRequest, BookingSettings, Category,
    Service,
};

pub use crate::models::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid backend url: {0}")]
    InvalidUrl(String),

    #[error("session expired, please log in again")]
    Unauthorized,

    #[error("business setup is incomplete")]
    SetupIncomplete,

    #[error("request rejected with status {status}")]
    Rejected { status: u16, errors: Vec<FieldError> },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The message shown to the customer: the first structured error when
    /// the backend sent any, otherwise the error itself.
    pub fn first_message(&self) -> String {
        match self {
            ApiError::Rejected { errors, .. } => errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| self.to_string()),
            _ => self.to_string(),
        }
    }

    /// Where the front-end must go after this error, if anywhere.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            ApiError::Unauthorized => Some("/login"),
            ApiError::SetupIncomplete => Some("/onboarding"),
            _ => None,
        }
    }
}

/// The external booking backend.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn list_services(&self, business_url: &str) -> Result<Vec<Service>, ApiError>;

    async fn list_categories(&self, business_url: &str) -> Result<Vec<Category>, ApiError>;

    async fn get_booking_settings(&self, business_url: &str) -> Result<BookingSettings, ApiError>;

    async fn list_booked_intervals(
        &self,
        business_url: &str,
        date: NaiveDate,
    ) -> Result<Vec<BookedInterval>, ApiError>;

    async fn submit_booking(
        &self,
        business_url: &str,
        request: &BookingRequest,
    ) -> Result<BookingCreated, ApiError>;

    async fn get_booking(&self, id: &str) -> Result<BookingDetails, ApiError>;

    /// Settings that were in force for this booking.
    async fn get_booking_policy(&self, id: &str) -> Result<BookingSettings, ApiError>;

    async fn cancel_booking(&self, id: &str) -> Result<BookingDetails, ApiError>;

    async fn reschedule_booking(
        &self,
        id: &str,
        date: NaiveDate,
        time: u32,
    ) -> Result<BookingDetails, ApiError>;

    async fn mark_no_show(&self, id: &str) -> Result<BookingDetails, ApiError>;
}
