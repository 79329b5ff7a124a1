use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    pub price: f64,
    /// Minutes.
    pub duration: u32,
    #[serde(default)]
    pub available_days: WeekdayFlags,
}

impl Service {
    pub fn is_available_on(&self, weekday: Weekday) -> bool {
        self.available_days.is_set(weekday)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeekdayFlags {
    #[serde(default = "default_true")]
    pub monday: bool,
    #[serde(default = "default_true")]
    pub tuesday: bool,
    #[serde(default = "default_true")]
    pub wednesday: bool,
    #[serde(default = "default_true")]
    pub thursday: bool,
    #[serde(default = "default_true")]
    pub friday: bool,
    #[serde(default = "default_true")]
    pub saturday: bool,
    #[serde(default = "default_true")]
    pub sunday: bool,
}

fn default_true() -> bool {
    true
}

impl Default for WeekdayFlags {
    fn default() -> Self {
        Self {
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: true,
            sunday: true,
        }
    }
}

impl WeekdayFlags {
    pub fn is_set(&self, weekday: Weekday) -> bool {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}
