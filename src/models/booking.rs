use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Last valid minute-of-day.
pub const LAST_MINUTE: u32 = 1439;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DateTimeSelection {
    pub date: Option<NaiveDate>,
    /// Minutes from midnight.
    pub time: Option<u32>,
}

impl DateTimeSelection {
    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.time.is_some()
    }
}

/// An existing booking as the slot resolver sees it: `[start, start + duration)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookedInterval {
    pub date: NaiveDate,
    pub start: u32,
    pub duration: u32,
}

impl BookedInterval {
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.duration)
    }

    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        self.start < end && start < self.end()
    }
}

/// A problem with one input field, as the backend reports it and as the
/// contact form shows it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldError {
    #[serde(default)]
    pub field: Option<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: Some(field.to_string()),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ContactDetails {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.first_name.trim().is_empty() {
            errors.push(FieldError::new("first_name", "First name is required"));
        }
        if self.last_name.trim().is_empty() {
            errors.push(FieldError::new("last_name", "Last name is required"));
        }
        let email = self.email.trim();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
        if !valid_email {
            errors.push(FieldError::new("email", "Enter a valid email address"));
        }
        if self.phone.chars().filter(|c| c.is_ascii_digit()).count() < 7 {
            errors.push(FieldError::new("phone", "Enter a valid phone number"));
        }
        errors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookedService {
    pub service_id: i64,
    pub duration: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRequest {
    pub customer: ContactDetails,
    pub services: Vec<BookedService>,
    pub event_date: NaiveDate,
    pub event_time: u32,
    pub total_duration: u32,
    pub time_zone: String,
}

/// Where the backend wants the customer sent to pay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingCreated {
    pub url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Rescheduled,
    NoShow,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Rescheduled => "rescheduled",
            BookingStatus::NoShow => "no_show",
            BookingStatus::Completed => "completed",
        }
    }

    /// Whether the customer may still cancel or move it.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Rescheduled
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingDetails {
    pub id: String,
    pub business_url: String,
    pub services: Vec<BookedService>,
    pub event_date: NaiveDate,
    pub event_time: u32,
    pub total_duration: u32,
    pub status: BookingStatus,
}
