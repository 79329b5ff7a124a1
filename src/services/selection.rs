use chrono::NaiveDate;

use crate::models::{DateTimeSelection, Service};

/// The customer's in-progress choice: services plus a date and start time.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    services: Vec<Service>,
    date_time: DateTimeSelection,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.services.iter().any(|s| s.id == id)
    }

    /// Returns false when a service with the same id is already selected.
    pub fn add_service(&mut self, service: Service) -> bool {
        if self.contains(service.id) {
            return false;
        }
        self.services.push(service);
        true
    }

    pub fn add_services<I>(&mut self, services: I) -> usize
    where
        I: IntoIterator<Item = Service>,
    {
        services
            .into_iter()
            .filter(|s| self.add_service(s.clone()))
            .count()
    }

    pub fn remove_service(&mut self, id: i64) -> bool {
        let before = self.services.len();
        self.services.retain(|s| s.id != id);
        self.services.len() != before
    }

    pub fn total_duration(&self) -> u32 {
        self.services.iter().map(|s| s.duration).sum()
    }

    pub fn total_price(&self) -> f64 {
        self.services.iter().map(|s| s.price).sum()
    }

    pub fn date_time(&self) -> &DateTimeSelection {
        &self.date_time
    }

    /// Picking a new date invalidates the chosen time.
    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        if self.date_time.date != date {
            self.date_time.time = None;
        }
        self.date_time.date = date;
    }

    pub fn set_time(&mut self, time: Option<u32>) {
        self.date_time.time = time;
    }

    pub fn reset_booking(&mut self) {
        self.services.clear();
        self.date_time = DateTimeSelection::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeekdayFlags;

    fn service(id: i64, price: f64, duration: u32) -> Service {
        Service {
            id,
            name: format!("Service {id}"),
            category_id: None,
            price,
            duration,
            available_days: WeekdayFlags::default(),
        }
    }

    #[test]
    fn test_add_same_service_twice_is_noop() {
        let mut store = SelectionStore::new();
        assert!(store.add_service(service(1, 30.0, 45)));
        assert!(!store.add_service(service(1, 30.0, 45)));
        assert_eq!(store.services().len(), 1);
    }

    #[test]
    fn test_totals_sum_distinct_services() {
        let mut store = SelectionStore::new();
        let added = store.add_services(vec![
            service(1, 30.0, 45),
            service(2, 12.5, 15),
            service(1, 30.0, 45),
        ]);
        assert_eq!(added, 2);
        assert_eq!(store.total_price(), 42.5);
        assert_eq!(store.total_duration(), 60);
    }

    #[test]
    fn test_remove_service() {
        let mut store = SelectionStore::new();
        store.add_services(vec![service(1, 10.0, 10), service(2, 20.0, 20)]);
        assert!(store.remove_service(1));
        assert!(!store.remove_service(1));
        assert_eq!(store.services()[0].id, 2);
        assert_eq!(store.total_price(), 20.0);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut store = SelectionStore::new();
        store.add_services(vec![service(3, 1.0, 1), service(1, 1.0, 1), service(2, 1.0, 1)]);
        let ids: Vec<i64> = store.services().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_changing_date_clears_time() {
        let mut store = SelectionStore::new();
        let monday = NaiveDate::from_ymd_opt(2024, 6, 10);
        store.set_date(monday);
        store.set_time(Some(600));
        store.set_date(monday);
        assert_eq!(store.date_time().time, Some(600));
        store.set_date(NaiveDate::from_ymd_opt(2024, 6, 11));
        assert_eq!(store.date_time().time, None);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = SelectionStore::new();
        store.add_service(service(1, 10.0, 10));
        store.set_date(NaiveDate::from_ymd_opt(2024, 6, 10));
        store.set_time(Some(540));
        store.reset_booking();
        assert!(store.is_empty());
        assert!(!store.date_time().is_complete());
        assert_eq!(store.total_price(), 0.0);
    }
}
