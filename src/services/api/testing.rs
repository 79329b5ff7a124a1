use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{ApiError, BookingApi};
use crate::models::{
    BookedInterval, BookedService, BookingCreated, BookingDetails, BookingRequest,
    BookingSettings, BookingStatus, Category, Service,
};

/// In-memory backend for unit tests.
pub struct MockBookingApi {
    services: Vec<Service>,
    settings: BookingSettings,
    booking: Mutex<BookingDetails>,
    submit_failures: Mutex<Vec<ApiError>>,
    requests: Mutex<Vec<BookingRequest>>,
    policy_unavailable: AtomicBool,
}

impl MockBookingApi {
    pub fn new(services: Vec<Service>) -> Self {
        Self {
            services,
            settings: BookingSettings::default(),
            booking: Mutex::new(BookingDetails {
                id: "bk_1".to_string(),
                business_url: "lash-studio".to_string(),
                services: vec![BookedService {
                    service_id: 1,
                    duration: 30,
                }],
                event_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                event_time: 600,
                total_duration: 30,
                status: BookingStatus::Confirmed,
            }),
            submit_failures: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            policy_unavailable: AtomicBool::new(false),
        }
    }

    pub fn with_settings(mut self, settings: BookingSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn fail_next_submit(&self, err: ApiError) {
        self.submit_failures.lock().unwrap().push(err);
    }

    pub fn fail_policy(&self) {
        self.policy_unavailable.store(true, Ordering::SeqCst);
    }

    pub fn submit_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<BookingRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn booking_for(&self, id: &str) -> Result<BookingDetails, ApiError> {
        let booking = self.booking.lock().unwrap();
        if booking.id != id {
            return Err(ApiError::Rejected {
                status: 404,
                errors: vec![],
            });
        }
        Ok(booking.clone())
    }

    fn update(&self, id: &str, apply: impl FnOnce(&mut BookingDetails)) -> Result<BookingDetails, ApiError> {
        self.booking_for(id)?;
        let mut booking = self.booking.lock().unwrap();
        apply(&mut booking);
        Ok(booking.clone())
    }
}

#[async_trait]
impl BookingApi for MockBookingApi {
    async fn list_services(&self, _business_url: &str) -> Result<Vec<Service>, ApiError> {
        Ok(self.services.clone())
    }

    async fn list_categories(&self, _business_url: &str) -> Result<Vec<Category>, ApiError> {
        Ok(vec![])
    }

    async fn get_booking_settings(&self, _business_url: &str) -> Result<BookingSettings, ApiError> {
        Ok(self.settings.clone())
    }

    async fn list_booked_intervals(
        &self,
        _business_url: &str,
        _date: NaiveDate,
    ) -> Result<Vec<BookedInterval>, ApiError> {
        Ok(vec![])
    }

    async fn submit_booking(
        &self,
        _business_url: &str,
        request: &BookingRequest,
    ) -> Result<BookingCreated, ApiError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        if let Some(err) = self.submit_failures.lock().unwrap().pop() {
            return Err(err);
        }
        Ok(BookingCreated {
            url: format!("https://checkout.example.com/session/{}", requests.len()),
        })
    }

    async fn get_booking(&self, id: &str) -> Result<BookingDetails, ApiError> {
        self.booking_for(id)
    }

    async fn get_booking_policy(&self, id: &str) -> Result<BookingSettings, ApiError> {
        if self.policy_unavailable.load(Ordering::SeqCst) {
            return Err(ApiError::Decode("policy unavailable".to_string()));
        }
        self.booking_for(id)?;
        Ok(self.settings.clone())
    }

    async fn cancel_booking(&self, id: &str) -> Result<BookingDetails, ApiError> {
        self.update(id, |b| b.status = BookingStatus::Cancelled)
    }

    async fn reschedule_booking(
        &self,
        id: &str,
        date: NaiveDate,
        time: u32,
    ) -> Result<BookingDetails, ApiError> {
        self.update(id, |b| {
            b.event_date = date;
            b.event_time = time;
            b.status = BookingStatus::Rescheduled;
        })
    }

    async fn mark_no_show(&self, id: &str) -> Result<BookingDetails, ApiError> {
        self.update(id, |b| b.status = BookingStatus::NoShow)
    }
}
