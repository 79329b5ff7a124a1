use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::{BookedInterval, BookingSettings, LAST_MINUTE};

const MINUTES_PER_DAY: u32 = 1440;

/// Upper bound on how many days the date picker will walk forward.
const MAX_CALENDAR_DAYS: i64 = 730;

/// Bookable start times (minutes from midnight, ascending) for `date`.
///
/// Pure: `now` is injected, so the same inputs always give the same slots.
/// A slot is kept when:
/// - the weekday is enabled and `[start, start + requested_duration)` fits
///   inside its opening hours,
/// - it does not overlap any booked interval on the same date,
/// - it starts no earlier than `now + minimum_notice` and no later than
///   `now + maximum_notice`, measured in the business time zone.
pub fn available_slots(
    date: NaiveDate,
    settings: &BookingSettings,
    requested_duration: u32,
    booked: &[BookedInterval],
    now: DateTime<Utc>,
) -> Vec<u32> {
    let hours = settings.business_hours.for_weekday(date.weekday());
    if !hours.enabled {
        return Vec::new();
    }

    let stride = settings.time_slot_duration;
    let open = hours.open;
    let close = hours.close.min(MINUTES_PER_DAY);
    if stride == 0 || requested_duration == 0 || close <= open {
        return Vec::new();
    }
    if requested_duration > close - open {
        return Vec::new();
    }

    let window = NoticeWindow::new(settings, now);
    let booked_today: Vec<&BookedInterval> = booked.iter().filter(|b| b.date == date).collect();

    let mut slots = Vec::new();
    let mut start = open;
    while start <= LAST_MINUTE {
        let Some(end) = start.checked_add(requested_duration).filter(|end| *end <= close) else {
            break;
        };
        let free = !booked_today.iter().any(|b| b.overlaps(start, end));
        if free && window.allows(date, start) {
            slots.push(start);
        }
        // stride is backend-supplied and unbounded
        match start.checked_add(stride) {
            Some(next) => start = next,
            None => break,
        }
    }

    slots.dedup();
    slots
}

/// Dates between the notice bounds that fall on an enabled weekday.
pub fn selectable_dates(settings: &BookingSettings, now: DateTime<Utc>) -> Vec<NaiveDate> {
    let window = NoticeWindow::new(settings, now);
    let Some(earliest) = window.earliest else {
        return Vec::new();
    };

    let first = earliest.date_naive();
    let last = window
        .latest
        .map(|l| l.date_naive())
        .unwrap_or(first + Duration::days(MAX_CALENDAR_DAYS))
        .min(first + Duration::days(MAX_CALENDAR_DAYS));

    first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| settings.business_hours.for_weekday(d.weekday()).enabled)
        .collect()
}

struct NoticeWindow {
    tz: Tz,
    earliest: Option<DateTime<Tz>>,
    latest: Option<DateTime<Tz>>,
}

impl NoticeWindow {
    fn new(settings: &BookingSettings, now: DateTime<Utc>) -> Self {
        let tz = settings.tz();
        let now_local = now.with_timezone(&tz);
        Self {
            tz,
            earliest: settings.minimum_notice.after(now_local),
            latest: settings.maximum_notice.after(now_local),
        }
    }

    fn allows(&self, date: NaiveDate, minute: u32) -> bool {
        let Some(naive) = date.and_hms_opt(minute / 60, minute % 60, 0) else {
            return false;
        };
        // Nonexistent local times (DST gap) have no earliest instant.
        let Some(local) = self.tz.from_local_datetime(&naive).earliest() else {
            return false;
        };

        let after_minimum = self.earliest.as_ref().is_some_and(|e| local >= *e);
        let before_maximum = self.latest.as_ref().map_or(true, |l| local <= *l);
        after_minimum && before_maximum
    }
}
