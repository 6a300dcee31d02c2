//! Event records and the day → event calendar.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ConfigError;

/// Code of the fallback record used for days without a calendar entry.
pub const ORDINARY_CODE: &str = "ORDINARY";

/// What happens on a given day, and how it biases prices.
///
/// `price_effect` is an additive bias on the day's return (0.15 = +15%).
/// `product_effects` overrides it for individual products by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price_effect: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub product_effects: BTreeMap<String, f64>,
}

impl EventRecord {
    /// The neutral record for a regular school day.
    pub fn ordinary() -> Self {
        Self {
            code: ORDINARY_CODE.into(),
            title: "Regular school day".into(),
            description: String::new(),
            price_effect: 0.0,
            product_effects: BTreeMap::new(),
        }
    }

    /// Return bias for `product` on this day.
    pub fn effect_for(&self, product: &str) -> f64 {
        self.product_effects.get(product).copied().unwrap_or(self.price_effect)
    }

    pub fn is_ordinary(&self) -> bool {
        self.code == ORDINARY_CODE
    }
}

/// One calendar entry in serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub day: u32,
    pub event: EventRecord,
}

/// Sparse day → event mapping. Days without an entry resolve to the ordinary
/// record.
///
/// Serializes as a list of [`ScheduledEvent`] so TOML files can use
/// `[[events]]` tables; duplicate days are rejected on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ScheduledEvent>", into = "Vec<ScheduledEvent>")]
pub struct EventCalendar {
    entries: BTreeMap<u32, EventRecord>,
    ordinary: EventRecord,
}

impl Default for EventCalendar {
    fn default() -> Self {
        Self { entries: BTreeMap::new(), ordinary: EventRecord::ordinary() }
    }
}

impl EventCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` on `day`, replacing any existing entry.
    pub fn insert(&mut self, day: u32, event: EventRecord) -> Option<EventRecord> {
        self.entries.insert(day, event)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, day: u32, event: EventRecord) -> Self {
        self.insert(day, event);
        self
    }

    /// The event for `day`, or the ordinary record if none is scheduled.
    pub fn event_for(&self, day: u32) -> &EventRecord {
        self.entries.get(&day).unwrap_or(&self.ordinary)
    }

    /// The explicitly scheduled event for `day`, if any.
    pub fn scheduled(&self, day: u32) -> Option<&EventRecord> {
        self.entries.get(&day)
    }

    /// Scheduled entries in day order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &EventRecord)> {
        self.entries.iter().map(|(day, event)| (*day, event))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<ScheduledEvent>> for EventCalendar {
    type Error = ConfigError;

    fn try_from(list: Vec<ScheduledEvent>) -> Result<Self, Self::Error> {
        let mut calendar = Self::new();
        for ScheduledEvent { day, event } in list {
            if calendar.insert(day, event).is_some() {
                return Err(ConfigError::DuplicateEventDay(day));
            }
        }
        Ok(calendar)
    }
}

impl From<EventCalendar> for Vec<ScheduledEvent> {
    fn from(calendar: EventCalendar) -> Self {
        calendar
            .entries
            .into_iter()
            .map(|(day, event)| ScheduledEvent { day, event })
            .collect()
    }
}
