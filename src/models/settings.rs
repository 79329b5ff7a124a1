use chrono::{DateTime, Duration, Months, TimeZone, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Business-level booking configuration, read-only on this side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingSettings {
    #[serde(default)]
    pub minimum_notice: Notice,
    #[serde(default = "default_maximum_notice")]
    pub maximum_notice: Notice,
    #[serde(default)]
    pub business_hours: WeeklyHours,
    /// Stride between slot starts, in minutes.
    #[serde(default = "default_slot_duration")]
    pub time_slot_duration: u32,
    #[serde(default)]
    pub allow_deposits: bool,
    #[serde(default)]
    pub deposit_amount: f64,
    #[serde(default = "default_true")]
    pub cancellation_allowed: bool,
    #[serde(default)]
    pub cancellation_notice_hours: u32,
    #[serde(default)]
    pub cancellation_fee_percent: u32,
    #[serde(default = "default_true")]
    pub reschedule_allowed: bool,
    #[serde(default)]
    pub reschedule_notice_hours: u32,
    #[serde(default)]
    pub reschedule_fee_percent: u32,
    #[serde(default)]
    pub no_show_fee_percent: u32,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

fn default_true() -> bool {
    true
}

fn default_slot_duration() -> u32 {
    30
}

fn default_maximum_notice() -> Notice {
    Notice {
        value: 30,
        unit: NoticeUnit::Days,
    }
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            minimum_notice: Notice::default(),
            maximum_notice: default_maximum_notice(),
            business_hours: WeeklyHours::default(),
            time_slot_duration: default_slot_duration(),
            allow_deposits: false,
            deposit_amount: 0.0,
            cancellation_allowed: true,
            cancellation_notice_hours: 0,
            cancellation_fee_percent: 0,
            reschedule_allowed: true,
            reschedule_notice_hours: 0,
            reschedule_fee_percent: 0,
            no_show_fee_percent: 0,
            time_zone: default_time_zone(),
        }
    }
}

impl BookingSettings {
    /// The business time zone. Unknown names fall back to UTC.
    pub fn tz(&self) -> Tz {
        self.time_zone.parse().unwrap_or_else(|_| {
            tracing::warn!(time_zone = %self.time_zone, "unknown business time zone, using UTC");
            chrono_tz::UTC
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub value: u32,
    pub unit: NoticeUnit,
}

impl Default for Notice {
    fn default() -> Self {
        Self {
            value: 0,
            unit: NoticeUnit::Hours,
        }
    }
}

impl Notice {
    /// `from` shifted forward by this notice. Calendar months are added as
    /// calendar months, everything else as a fixed duration.
    pub fn after<T: TimeZone>(&self, from: DateTime<T>) -> Option<DateTime<T>> {
        let value = i64::from(self.value);
        match self.unit {
            NoticeUnit::Minutes => from.checked_add_signed(Duration::minutes(value)),
            NoticeUnit::Hours => from.checked_add_signed(Duration::hours(value)),
            NoticeUnit::Days => from.checked_add_signed(Duration::days(value)),
            NoticeUnit::Weeks => from.checked_add_signed(Duration::weeks(value)),
            NoticeUnit::Months => from.checked_add_months(Months::new(self.value)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayHours {
    pub enabled: bool,
    /// Minutes from midnight.
    pub open: u32,
    /// Minutes from midnight.
    pub close: u32,
}

impl DayHours {
    pub const CLOSED: DayHours = DayHours {
        enabled: false,
        open: 0,
        close: 0,
    };

    pub fn open(open: u32, close: u32) -> Self {
        Self {
            enabled: true,
            open,
            close,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklyHours {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl Default for WeeklyHours {
    /// Monday to Friday, 09:00-17:00.
    fn default() -> Self {
        let weekday = DayHours::open(540, 1020);
        Self {
            monday: weekday,
            tuesday: weekday,
            wednesday: weekday,
            thursday: weekday,
            friday: weekday,
            saturday: DayHours::CLOSED,
            sunday: DayHours::CLOSED,
        }
    }
}

impl WeeklyHours {
    pub fn for_weekday(&self, weekday: Weekday) -> &DayHours {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let json = r#"{"allow_deposits":true,"deposit_amount":25.0,"time_zone":"Europe/London"}"#;
        let settings: BookingSettings = serde_json::from_str(json).unwrap();
        assert!(settings.allow_deposits);
        assert!(settings.cancellation_allowed);
        assert_eq!(settings.time_slot_duration, 30);
        assert_eq!(settings.maximum_notice.unit, NoticeUnit::Days);
        assert_eq!(settings.tz(), chrono_tz::Europe::London);
    }

    #[test]
    fn test_unknown_time_zone_falls_back_to_utc() {
        let settings = BookingSettings {
            time_zone: "Mars/Olympus_Mons".to_string(),
            ..BookingSettings::default()
        };
        assert_eq!(settings.tz(), chrono_tz::UTC);
    }

    #[test]
    fn test_notice_after_units() {
        let from = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        let hours = Notice { value: 2, unit: NoticeUnit::Hours };
        let weeks = Notice { value: 1, unit: NoticeUnit::Weeks };
        let months = Notice { value: 1, unit: NoticeUnit::Months };

        assert_eq!(
            hours.after(from).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 31, 14, 0, 0).unwrap()
        );
        assert_eq!(
            weeks.after(from).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 7, 12, 0, 0).unwrap()
        );
        // clamps to the end of February
        assert_eq!(
            months.after(from).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_default_week_closed_on_weekend() {
        let hours = WeeklyHours::default();
        assert!(hours.for_weekday(Weekday::Fri).enabled);
        assert!(!hours.for_weekday(Weekday::Sat).enabled);
        assert_eq!(hours.for_weekday(Weekday::Mon).open, 540);
    }
}
