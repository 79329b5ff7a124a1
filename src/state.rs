use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::services::api::BookingApi;
use crate::services::wizard::BookingWizard;

/// Wizards untouched for this long are dropped.
const WIZARD_IDLE_HOURS: i64 = 2;

pub struct WizardSession {
    pub wizard: BookingWizard,
    pub touched_at: DateTime<Utc>,
}

pub struct AppState {
    pub config: AppConfig,
    pub api: Box<dyn BookingApi>,
    pub wizards: Mutex<HashMap<Uuid, WizardSession>>,
    pub clock: fn() -> DateTime<Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, api: Box<dyn BookingApi>) -> Self {
        Self {
            config,
            api,
            wizards: Mutex::new(HashMap::new()),
            clock: Utc::now,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn wizards(&self) -> MutexGuard<'_, HashMap<Uuid, WizardSession>> {
        self.wizards
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stores a new wizard, dropping idle ones first.
    pub fn insert_wizard(&self, wizard: BookingWizard) -> Uuid {
        let now = self.now();
        let cutoff = now - Duration::hours(WIZARD_IDLE_HOURS);
        let id = Uuid::new_v4();

        let mut wizards = self.wizards();
        let before = wizards.len();
        wizards.retain(|_, s| s.touched_at >= cutoff);
        if wizards.len() < before {
            tracing::debug!(expired = before - wizards.len(), "dropped idle wizards");
        }
        wizards.insert(
            id,
            WizardSession {
                wizard,
                touched_at: now,
            },
        );
        id
    }

    /// Runs `f` against a live wizard and marks it as used.
    pub fn with_wizard<T>(&self, id: Uuid, f: impl FnOnce(&mut BookingWizard) -> T) -> Option<T> {
        let now = self.now();
        let mut wizards = self.wizards();
        let session = wizards.get_mut(&id)?;
        session.touched_at = now;
        Some(f(&mut session.wizard))
    }

    pub fn remove_wizard(&self, id: Uuid) {
        self.wizards().remove(&id);
    }
}
