//! Market configuration: product catalog, event calendar, and generator knobs.
//!
//! The configuration is plain serde data, loadable from TOML. Every field is
//! checked by [`MarketConfig::validate`] before a simulator will accept it, so
//! generation itself never fails.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog;
use crate::domain::{ConfigHash, EventCalendar, Product};

/// Default minimum price. Closes are clamped to this value.
pub const DEFAULT_PRICE_FLOOR: f64 = 1.0;

/// Default maximum intraday wick beyond the open/close range (fraction of price).
pub const DEFAULT_WICK_BAND: f64 = 0.015;

/// Largest accepted event effect magnitude, as a fraction of price (±10,000%).
pub const MAX_EVENT_EFFECT: f64 = 100.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("simulation horizon must be at least one day")]
    ZeroDays,

    #[error("product catalog is empty")]
    NoProducts,

    #[error("product name must not be empty")]
    EmptyProductName,

    #[error("duplicate product {0:?}")]
    DuplicateProduct(String),

    #[error("product {name:?} has non-positive baseline price {price}")]
    NonPositiveBaseline { name: String, price: f64 },

    #[error("product {name:?} baseline {price} is below the price floor {floor}")]
    BaselineBelowFloor { name: String, price: f64, floor: f64 },

    #[error("price floor must be positive and finite, got {0}")]
    InvalidPriceFloor(f64),

    #[error("wick band must be non-negative and finite, got {0}")]
    InvalidWickBand(f64),

    #[error("event on day {day} is outside the horizon 1..={days}")]
    EventOutOfRange { day: u32, days: u32 },

    #[error("more than one event scheduled on day {0}")]
    DuplicateEventDay(u32),

    #[error("event on day {day} has price effect {effect} outside ±{MAX_EVENT_EFFECT}")]
    EffectOutOfRange { day: u32, effect: f64 },

    #[error("serialize config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("event on day {day} overrides unknown product {product:?}")]
    UnknownEventProduct { day: u32, product: String },
}

fn default_price_floor() -> f64 {
    DEFAULT_PRICE_FLOOR
}

fn default_wick_band() -> f64 {
    DEFAULT_WICK_BAND
}

/// Complete, serializable configuration of one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Number of simulated trading days.
    pub days: u32,

    /// Strictly positive minimum price.
    #[serde(default = "default_price_floor")]
    pub price_floor: f64,

    /// Maximum intraday wick beyond the open/close range.
    #[serde(default = "default_wick_band")]
    pub wick_band: f64,

    /// Product catalog, in display order.
    pub products: Vec<Product>,

    /// Sparse event calendar.
    #[serde(default)]
    pub events: EventCalendar,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self::school_default()
    }
}

impl MarketConfig {
    /// Minimal config: `days`, `products`, no events, default knobs.
    pub fn new(days: u32, products: Vec<Product>) -> Self {
        Self {
            days,
            price_floor: DEFAULT_PRICE_FLOOR,
            wick_band: DEFAULT_WICK_BAND,
            products,
            events: EventCalendar::new(),
        }
    }

    /// The built-in school-shop market: [`catalog::PRODUCTS`],
    /// [`catalog::EVENTS`], [`catalog::DAYS`].
    pub fn school_default() -> Self {
        Self {
            days: catalog::DAYS,
            price_floor: DEFAULT_PRICE_FLOOR,
            wick_band: DEFAULT_WICK_BAND,
            products: catalog::products(),
            events: catalog::event_calendar(),
        }
    }

    pub fn with_events(mut self, events: EventCalendar) -> Self {
        self.events = events;
        self
    }

    pub fn with_price_floor(mut self, price_floor: f64) -> Self {
        self.price_floor = price_floor;
        self
    }

    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn product(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }

    /// Content hash over the canonical JSON form.
    pub fn config_hash(&self) -> Result<ConfigHash, ConfigError> {
        // All maps are BTreeMaps, so the JSON is deterministic.
        let json = serde_json::to_string(self)?;
        Ok(ConfigHash::from_bytes(json.as_bytes()))
    }

    /// Reject configurations that would produce meaningless price paths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 {
            return Err(ConfigError::ZeroDays);
        }
        if self.products.is_empty() {
            return Err(ConfigError::NoProducts);
        }
        if !(self.price_floor.is_finite() && self.price_floor > 0.0) {
            return Err(ConfigError::InvalidPriceFloor(self.price_floor));
        }
        if !(self.wick_band.is_finite() && self.wick_band >= 0.0) {
            return Err(ConfigError::InvalidWickBand(self.wick_band));
        }

        let mut names = HashSet::with_capacity(self.products.len());
        for product in &self.products {
            if product.name.trim().is_empty() {
                return Err(ConfigError::EmptyProductName);
            }
            if !names.insert(product.name.as_str()) {
                return Err(ConfigError::DuplicateProduct(product.name.clone()));
            }
            if !(product.baseline_price.is_finite() && product.baseline_price > 0.0) {
                return Err(ConfigError::NonPositiveBaseline {
                    name: product.name.clone(),
                    price: product.baseline_price,
                });
            }
            if product.baseline_price < self.price_floor {
                return Err(ConfigError::BaselineBelowFloor {
                    name: product.name.clone(),
                    price: product.baseline_price,
                    floor: self.price_floor,
                });
            }
        }

        for (day, event) in self.events.iter() {
            if day == 0 || day > self.days {
                return Err(ConfigError::EventOutOfRange { day, days: self.days });
            }
            check_effect(day, event.price_effect)?;
            for (product, effect) in &event.product_effects {
                if !names.contains(product.as_str()) {
                    return Err(ConfigError::UnknownEventProduct { day, product: product.clone() });
                }
                check_effect(day, *effect)?;
            }
        }

        Ok(())
    }
}

fn check_effect(day: u32, effect: f64) -> Result<(), ConfigError> {
    // NaN fails the comparison too.
    if effect.abs() <= MAX_EVENT_EFFECT {
        Ok(())
    } else {
        Err(ConfigError::EffectOutOfRange { day, effect })
    }
}
