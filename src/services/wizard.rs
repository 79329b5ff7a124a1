use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use reqwest::Url;
use serde::Serialize;

use crate::models::{
    BookedInterval, BookedService, BookingCreated, BookingRequest, BookingSettings,
    ContactDetails, FieldError, Service, LAST_MINUTE,
};
use crate::services::api::{ApiError, BookingApi};
use crate::services::notify::{Notifier, ToastLevel};
use crate::services::selection::SelectionStore;
use crate::services::slots;

/// Businesses with this url are demo accounts; nothing is ever submitted for them.
pub const DEMO_BUSINESS_URL: &str = "sample";

const SERVICE_IDS_PARAM: &str = "service_ids";
const EVENT_DATE_PARAM: &str = "event_date";
const EVENT_TIME_PARAM: &str = "event_time";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Services,
    #[serde(rename = "datetime")]
    DateTime,
    /// Contact-details modal open over the date/time page.
    Contact,
    Submitting,
    Redirecting,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Services => "services",
            WizardStep::DateTime => "datetime",
            WizardStep::Contact => "contact",
            WizardStep::Submitting => "submitting",
            WizardStep::Redirecting => "redirecting",
        }
    }

    /// 1-based page number. Everything past service selection happens on
    /// the date/time page.
    pub fn index(&self) -> u8 {
        match self {
            WizardStep::Services => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A browser location change the front-end has to perform.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "url", rename_all = "lowercase")]
pub enum Navigation {
    /// Rewrite the current history entry.
    Replace(String),
    /// Full page navigation.
    Assign(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("bookings cannot be made for the demo business")]
    DemoAccount,

    #[error("select at least one service")]
    NoServicesSelected,

    #[error("choose a date and time first")]
    DateTimeIncomplete,

    #[error("not available from the {0} step")]
    InvalidStep(WizardStep),

    #[error("unknown service: {0}")]
    UnknownService(i64),

    #[error("time out of range: {0}")]
    TimeOutOfRange(u32),

    #[error("{date} at minute {time} is not available")]
    SlotUnavailable { date: NaiveDate, time: u32 },

    #[error("please check your contact details")]
    InvalidContact(Vec<FieldError>),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A booking request that has been handed out for sending. The generation
/// ties the eventual response back to the attempt that produced it.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub generation: u64,
    pub business_url: String,
    pub request: BookingRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Booking created; send the customer to checkout.
    Redirect(Navigation),
    /// Backend refused or the call failed. Selections are kept.
    Failed {
        message: String,
        navigation: Option<Navigation>,
    },
    /// A response for an attempt that is no longer current.
    Discarded,
}

#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub business_url: String,
    pub step: WizardStep,
    pub step_index: u8,
    pub services: Vec<Service>,
    pub total_price: f64,
    pub total_duration: u32,
    pub event_date: Option<NaiveDate>,
    pub event_time: Option<u32>,
    pub contact: Option<ContactDetails>,
    pub last_error: Option<String>,
}

/// What a chosen date/time is checked against: business settings, the
/// bookings already taken on that date, and the current instant.
#[derive(Debug, Clone, Copy)]
pub struct DayAvailability<'a> {
    pub settings: &'a BookingSettings,
    pub booked: &'a [BookedInterval],
    pub now: DateTime<Utc>,
}

/// Per-customer booking flow: services, then date and time, then contact
/// details and submission.
#[derive(Debug, Clone)]
pub struct BookingWizard {
    business_url: String,
    client_time_zone: String,
    store: SelectionStore,
    step: WizardStep,
    contact: Option<ContactDetails>,
    deep_link_consumed: bool,
    generation: u64,
    last_error: Option<String>,
}

impl BookingWizard {
    pub fn new(business_url: impl Into<String>, client_time_zone: impl Into<String>) -> Self {
        Self {
            business_url: business_url.into(),
            client_time_zone: client_time_zone.into(),
            store: SelectionStore::new(),
            step: WizardStep::Services,
            contact: None,
            deep_link_consumed: false,
            generation: 0,
            last_error: None,
        }
    }

    pub fn business_url(&self) -> &str {
        &self.business_url
    }

    pub fn is_demo(&self) -> bool {
        self.business_url == DEMO_BUSINESS_URL
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn contact(&self) -> Option<&ContactDetails> {
        self.contact.as_ref()
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            business_url: self.business_url.clone(),
            step: self.step,
            step_index: self.step.index(),
            services: self.store.services().to_vec(),
            total_price: self.store.total_price(),
            total_duration: self.store.total_duration(),
            event_date: self.store.date_time().date,
            event_time: self.store.date_time().time,
            contact: self.contact.clone(),
            last_error: self.last_error.clone(),
        }
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        match self.step {
            WizardStep::Submitting | WizardStep::Redirecting => {
                Err(WizardError::InvalidStep(self.step))
            }
            _ => Ok(()),
        }
    }

    /// Adds catalog services by id. Ids already selected are skipped.
    pub fn add_services(&mut self, ids: &[i64], catalog: &[Service]) -> Result<usize, WizardError> {
        self.ensure_editable()?;
        let mut picked = Vec::with_capacity(ids.len());
        for id in ids {
            let service = catalog
                .iter()
                .find(|s| s.id == *id)
                .ok_or(WizardError::UnknownService(*id))?;
            picked.push(service.clone());
        }
        Ok(self.store.add_services(picked))
    }

    pub fn remove_service(&mut self, id: i64) -> Result<bool, WizardError> {
        self.ensure_editable()?;
        Ok(self.store.remove_service(id))
    }

    pub fn confirm_services(&mut self) -> Result<(), WizardError> {
        match self.step {
            WizardStep::Services | WizardStep::DateTime => {}
            other => return Err(WizardError::InvalidStep(other)),
        }
        if self.store.is_empty() {
            return Err(WizardError::NoServicesSelected);
        }
        self.step = WizardStep::DateTime;
        Ok(())
    }

    pub fn back_to_services(&mut self) -> Result<(), WizardError> {
        match self.step {
            WizardStep::DateTime | WizardStep::Services => {
                self.step = WizardStep::Services;
                Ok(())
            }
            other => Err(WizardError::InvalidStep(other)),
        }
    }

    /// Records the chosen date and time. A time is only accepted when it is
    /// one of the slots the resolver offers for `date` and the current
    /// selection; `day` must describe that date.
    pub fn select_date_time(
        &mut self,
        date: Option<NaiveDate>,
        time: Option<u32>,
        day: &DayAvailability<'_>,
    ) -> Result<(), WizardError> {
        if self.step != WizardStep::DateTime {
            return Err(WizardError::InvalidStep(self.step));
        }
        if let Some(t) = time.filter(|t| *t > LAST_MINUTE) {
            return Err(WizardError::TimeOutOfRange(t));
        }
        if let Some(time) = time {
            let date = date.ok_or(WizardError::DateTimeIncomplete)?;
            self.ensure_bookable(date, time, day)?;
        }
        self.store.set_date(date);
        self.store.set_time(time);
        Ok(())
    }

    /// Opens the contact modal once the selection is complete and still
    /// bookable.
    pub fn open_contact_modal(&mut self, day: &DayAvailability<'_>) -> Result<(), WizardError> {
        if self.step != WizardStep::DateTime {
            return Err(WizardError::InvalidStep(self.step));
        }
        if self.store.is_empty() {
            return Err(WizardError::NoServicesSelected);
        }
        let (Some(date), Some(time)) = (self.store.date_time().date, self.store.date_time().time)
        else {
            return Err(WizardError::DateTimeIncomplete);
        };
        self.ensure_bookable(date, time, day)?;
        self.step = WizardStep::Contact;
        Ok(())
    }

    pub fn close_contact_modal(&mut self) -> Result<(), WizardError> {
        if self.step != WizardStep::Contact {
            return Err(WizardError::InvalidStep(self.step));
        }
        self.step = WizardStep::DateTime;
        Ok(())
    }

    /// Slots for the chosen date given the current selection. Empty when no
    /// date is chosen or a selected service is not offered on that weekday.
    pub fn available_slots(&self, day: &DayAvailability<'_>) -> Vec<u32> {
        match self.store.date_time().date {
            Some(date) => self.slots_on(date, day),
            None => Vec::new(),
        }
    }

    /// Clears a restored date/time that cannot be booked: the time when it
    /// is not an offered slot, and the date too when nothing is offered on
    /// it. Returns whether anything was cleared.
    pub fn drop_unbookable_selection(&mut self, day: &DayAvailability<'_>) -> bool {
        let Some(date) = self.store.date_time().date else {
            return false;
        };
        let slots = self.slots_on(date, day);
        if slots.is_empty() {
            tracing::info!(business_url = %self.business_url, %date, "restored date has no slots");
            self.store.set_date(None);
            return true;
        }
        match self.store.date_time().time {
            Some(time) if !slots.contains(&time) => {
                tracing::info!(business_url = %self.business_url, %date, time, "restored time not bookable");
                self.store.set_time(None);
                true
            }
            _ => false,
        }
    }

    fn slots_on(&self, date: NaiveDate, day: &DayAvailability<'_>) -> Vec<u32> {
        let weekday = date.weekday();
        if self.store.services().iter().any(|s| !s.is_available_on(weekday)) {
            return Vec::new();
        }
        slots::available_slots(
            date,
            day.settings,
            self.store.total_duration(),
            day.booked,
            day.now,
        )
    }

    fn ensure_bookable(
        &self,
        date: NaiveDate,
        time: u32,
        day: &DayAvailability<'_>,
    ) -> Result<(), WizardError> {
        if self.slots_on(date, day).contains(&time) {
            Ok(())
        } else {
            Err(WizardError::SlotUnavailable { date, time })
        }
    }

    /// Consumes deep-link parameters from the page location, once.
    ///
    /// Known `service_ids` are selected and the wizard moves to the date/time
    /// page; `event_date`/`event_time` are applied alongside them. Whenever
    /// any of the three parameters was present the caller gets a
    /// `Navigation::Replace` to the same location without them.
    pub fn restore_from_location(&mut self, location: &Url, catalog: &[Service]) -> Option<Navigation> {
        if self.deep_link_consumed {
            return None;
        }
        self.deep_link_consumed = true;

        let (link, kept): (Vec<(String, String)>, Vec<(String, String)>) = location
            .query_pairs()
            .into_owned()
            .partition(|(k, _)| is_deep_link_param(k));
        if link.is_empty() {
            return None;
        }

        let param = |name: &str| {
            link.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };

        let ids = param(SERVICE_IDS_PARAM).map(parse_service_ids).unwrap_or_default();
        let restored = self.store.add_services(
            ids.iter()
                .filter_map(|id| catalog.iter().find(|s| s.id == *id).cloned()),
        );

        if !self.store.is_empty() {
            self.step = WizardStep::DateTime;
            if let Some(date) = param(EVENT_DATE_PARAM).and_then(parse_event_date) {
                self.store.set_date(Some(date));
                if let Some(time) = param(EVENT_TIME_PARAM).and_then(parse_event_time) {
                    self.store.set_time(Some(time));
                }
            }
        }

        tracing::info!(
            business_url = %self.business_url,
            requested = ids.len(),
            restored,
            "restored booking deep link"
        );

        let mut stripped = location.clone();
        if kept.is_empty() {
            stripped.set_query(None);
        } else {
            stripped.query_pairs_mut().clear().extend_pairs(kept);
        }
        Some(Navigation::Replace(stripped.to_string()))
    }

    /// Validates the wizard and hands out the request to send. Moves to
    /// `Submitting`.
    pub fn begin_submission(&mut self, contact: ContactDetails) -> Result<PendingSubmission, WizardError> {
        if self.is_demo() {
            return Err(WizardError::DemoAccount);
        }
        if self.step != WizardStep::Contact {
            return Err(WizardError::InvalidStep(self.step));
        }
        if self.store.is_empty() {
            return Err(WizardError::NoServicesSelected);
        }
        let (Some(event_date), Some(event_time)) =
            (self.store.date_time().date, self.store.date_time().time)
        else {
            return Err(WizardError::DateTimeIncomplete);
        };
        let invalid = contact.validate();
        if !invalid.is_empty() {
            return Err(WizardError::InvalidContact(invalid));
        }

        let request = BookingRequest {
            customer: contact.clone(),
            services: self
                .store
                .services()
                .iter()
                .map(|s| BookedService {
                    service_id: s.id,
                    duration: s.duration,
                })
                .collect(),
            event_date,
            event_time,
            total_duration: self.store.total_duration(),
            time_zone: self.client_time_zone.clone(),
        };

        self.contact = Some(contact);
        self.last_error = None;
        self.generation += 1;
        self.step = WizardStep::Submitting;

        Ok(PendingSubmission {
            generation: self.generation,
            business_url: self.business_url.clone(),
            request,
        })
    }

    /// Applies the backend's answer to the submission `generation`.
    pub fn complete_submission(
        &mut self,
        generation: u64,
        result: Result<BookingCreated, ApiError>,
        notifier: &dyn Notifier,
    ) -> SubmitOutcome {
        if generation != self.generation || self.step != WizardStep::Submitting {
            tracing::debug!(generation, current = self.generation, "discarding stale booking response");
            return SubmitOutcome::Discarded;
        }

        match result {
            Ok(created) => {
                self.store.reset_booking();
                self.contact = None;
                self.step = WizardStep::Redirecting;
                notifier.notify(ToastLevel::Success, "Booking created, redirecting to payment...");
                tracing::info!(business_url = %self.business_url, "booking created");
                SubmitOutcome::Redirect(Navigation::Assign(created.url))
            }
            Err(err) => {
                let message = err.first_message();
                self.step = WizardStep::DateTime;
                self.last_error = Some(message.clone());
                notifier.notify(ToastLevel::Error, &message);
                tracing::warn!(business_url = %self.business_url, error = %err, "booking submission failed");
                SubmitOutcome::Failed {
                    message,
                    navigation: err.redirect().map(|path| Navigation::Assign(path.to_string())),
                }
            }
        }
    }

    /// Single-owner submission: exactly one backend call when the wizard is
    /// ready, none otherwise.
    pub async fn submit(
        &mut self,
        api: &dyn BookingApi,
        notifier: &dyn Notifier,
        contact: ContactDetails,
    ) -> Result<SubmitOutcome, WizardError> {
        let pending = match self.begin_submission(contact) {
            Ok(pending) => pending,
            Err(err) => {
                notifier.notify(ToastLevel::Error, &err.to_string());
                return Err(err);
            }
        };

        notifier.notify(ToastLevel::Loading, "Creating your booking...");
        let result = api
            .submit_booking(&pending.business_url, &pending.request)
            .await;
        Ok(self.complete_submission(pending.generation, result, notifier))
    }

    /// Abandons the flow. Any submission still in flight becomes stale.
    pub fn reset(&mut self) {
        self.store.reset_booking();
        self.contact = None;
        self.last_error = None;
        self.generation += 1;
        self.step = WizardStep::Services;
    }
}

fn is_deep_link_param(name: &str) -> bool {
    matches!(name, SERVICE_IDS_PARAM | EVENT_DATE_PARAM | EVENT_TIME_PARAM)
}

fn parse_service_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|id| id.trim().parse().ok())
        .collect()
}

fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw.trim())
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn parse_event_time(raw: &str) -> Option<u32> {
    raw.trim().parse().ok().filter(|t| *t <= LAST_MINUTE)
}
