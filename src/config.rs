use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub api_base_url: String,
    /// Sent with bookings when the browser does not report its own zone.
    pub client_time_zone: String,
    pub cors_allow_any_origin: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
            client_time_zone: env::var("CLIENT_TIME_ZONE").unwrap_or_else(|_| "UTC".to_string()),
            cors_allow_any_origin: env::var("CORS_ALLOW_ANY_ORIGIN")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}
