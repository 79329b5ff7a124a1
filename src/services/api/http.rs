use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ApiError, BookingApi, FieldError};
use crate::models::{
    BookedInterval, BookingCreated, BookingDetails, BookingRequest, BookingSettings, Category,
    Service,
};

const CSRF_HEADER: &str = "x-csrf-token";
const SETUP_INCOMPLETE_CODE: &str = "setup_incomplete";

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

#[derive(Deserialize)]
struct CsrfResponse {
    csrf_token: String,
}

/// REST client for the booking backend. The session lives in the cookie
/// store; the CSRF token is fetched lazily and sent on every mutating call.
pub struct HttpBookingApi {
    base_url: Url,
    client: reqwest::Client,
    csrf_token: Mutex<Option<String>>,
}

impl HttpBookingApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            base_url,
            client,
            csrf_token: Mutex::new(None),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn cached_csrf_token(&self) -> Option<String> {
        self.csrf_token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn store_csrf_token(&self, token: Option<String>) {
        *self
            .csrf_token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    pub async fn fetch_csrf_token(&self) -> Result<String, ApiError> {
        if let Some(token) = self.cached_csrf_token() {
            return Ok(token);
        }

        let resp = self
            .client
            .get(self.endpoint(&["csrf-token"])?)
            .send()
            .await?;
        let body: CsrfResponse = self.read(resp).await?;
        self.store_csrf_token(Some(body.csrf_token.clone()));
        tracing::debug!("fetched csrf token");
        Ok(body.csrf_token)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let resp = self.client.get(url).send().await?;
        self.read(resp).await
    }

    async fn send_json<B, T>(&self, method: Method, url: Url, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let token = self.fetch_csrf_token().await?;
        let resp = self
            .client
            .request(method, url)
            .header(CSRF_HEADER, token)
            .json(body)
            .send()
            .await?;
        self.read(resp).await
    }

    async fn read<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        let url = resp.url().clone();
        let bytes = resp.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()));
        }

        let err = classify_error(status, &bytes);
        if matches!(err, ApiError::Unauthorized) {
            self.store_csrf_token(None);
        }
        tracing::warn!(%status, %url, error = %err, "backend request failed");
        Err(err)
    }
}

/// Maps a non-2xx response onto the client's error taxonomy.
fn classify_error(status: StatusCode, body: &[u8]) -> ApiError {
    if status == StatusCode::UNAUTHORIZED {
        return ApiError::Unauthorized;
    }

    let body: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let setup_incomplete = body.code.as_deref() == Some(SETUP_INCOMPLETE_CODE)
        || body
            .errors
            .iter()
            .any(|e| e.message.to_lowercase().contains("setup incomplete"));
    if status == StatusCode::BAD_REQUEST && setup_incomplete {
        return ApiError::SetupIncomplete;
    }

    ApiError::Rejected {
        status: status.as_u16(),
        errors: body.errors,
    }
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn list_services(&self, business_url: &str) -> Result<Vec<Service>, ApiError> {
        self.get_json(self.endpoint(&["business", business_url, "services"])?)
            .await
    }

    async fn list_categories(&self, business_url: &str) -> Result<Vec<Category>, ApiError> {
        self.get_json(self.endpoint(&["business", business_url, "categories"])?)
            .await
    }

    async fn get_booking_settings(&self, business_url: &str) -> Result<BookingSettings, ApiError> {
        self.get_json(self.endpoint(&["business", business_url, "booking-settings"])?)
            .await
    }

    async fn list_booked_intervals(
        &self,
        business_url: &str,
        date: NaiveDate,
    ) -> Result<Vec<BookedInterval>, ApiError> {
        let mut url = self.endpoint(&["business", business_url, "bookings"])?;
        url.query_pairs_mut()
            .append_pair("date", &date.format("%Y-%m-%d").to_string());
        self.get_json(url).await
    }

    async fn submit_booking(
        &self,
        business_url: &str,
        request: &BookingRequest,
    ) -> Result<BookingCreated, ApiError> {
        let url = self.endpoint(&["business", business_url, "booking"])?;
        tracing::info!(
            business_url,
            services = request.services.len(),
            event_date = %request.event_date,
            event_time = request.event_time,
            "submitting booking"
        );
        self.send_json(Method::POST, url, request).await
    }

    async fn get_booking(&self, id: &str) -> Result<BookingDetails, ApiError> {
        self.get_json(self.endpoint(&["bookings", id])?).await
    }

    async fn get_booking_policy(&self, id: &str) -> Result<BookingSettings, ApiError> {
        self.get_json(self.endpoint(&["bookings", id, "policy"])?)
            .await
    }

    async fn cancel_booking(&self, id: &str) -> Result<BookingDetails, ApiError> {
        let url = self.endpoint(&["bookings", id, "cancel"])?;
        self.send_json(Method::POST, url, &json!({})).await
    }

    async fn reschedule_booking(
        &self,
        id: &str,
        date: NaiveDate,
        time: u32,
    ) -> Result<BookingDetails, ApiError> {
        let url = self.endpoint(&["bookings", id, "reschedule"])?;
        let body = json!({ "event_date": date, "event_time": time });
        self.send_json(Method::POST, url, &body).await
    }

    async fn mark_no_show(&self, id: &str) -> Result<BookingDetails, ApiError> {
        let url = self.endpoint(&["bookings", id, "no-show"])?;
        self.send_json(Method::POST, url, &json!({})).await
    }
}
