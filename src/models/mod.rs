pub mod booking;
pub mod policy;
pub mod service;
pub mod settings;

pub use booking::{
    BookedInterval, BookedService, BookingCreated, BookingDetails, BookingRequest, BookingStatus,
    ContactDetails, DateTimeSelection, FieldError, LAST_MINUTE,
};
pub use policy::{Policy, PolicyScope, PolicyType};
pub use service::{Category, Service, WeekdayFlags};
pub use settings::{BookingSettings, DayHours, Notice, NoticeUnit, WeeklyHours};
