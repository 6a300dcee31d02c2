//! Built-in school-shop catalog and event calendar.
//!
//! These are the static tables the trading front-end enumerates: the tradeable
//! products, the day → event schedule, and the horizon length. They are plain
//! constants; [`crate::MarketConfig::school_default`] turns them into an owned,
//! injectable configuration.
//!
//! # Event effects
//!
//! Each [`EventKind`] maps to a fixed additive bias on the day's return:
//!
//! | kind        | default | overrides              |
//! |-------------|---------|------------------------|
//! | ordinary    |   0%    |                        |
//! | exam        |  -6%    | Energy Drink +8%       |
//! | field trip  | -10%    | Triangle Kimbap +5%    |
//! | sports day  |  +5%    | Energy Drink +10%      |
//! | festival    | +15%    |                        |

use std::collections::BTreeMap;

use crate::domain::{EventCalendar, EventRecord, Product, VolatilityClass, ORDINARY_CODE};

/// Simulated horizon in trading days.
pub const DAYS: u32 = 30;

pub const TRIANGLE_KIMBAP: &str = "Triangle Kimbap";
pub const CUP_RAMEN: &str = "Cup Ramen";
pub const CHOCOLATE_MILK: &str = "Chocolate Milk";
pub const POTATO_CHIPS: &str = "Potato Chips";
pub const ENERGY_DRINK: &str = "Energy Drink";

/// Static product definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductDef {
    pub name: &'static str,
    pub baseline_price: f64,
    pub volatility: VolatilityClass,
}

impl ProductDef {
    const fn new(name: &'static str, baseline_price: f64, volatility: VolatilityClass) -> Self {
        Self { name, baseline_price, volatility }
    }

    pub fn to_product(&self) -> Product {
        Product::new(self.name, self.baseline_price, self.volatility)
    }
}

/// Tradeable products, in display order. Prices are in won.
pub const PRODUCTS: [ProductDef; 5] = [
    ProductDef::new(TRIANGLE_KIMBAP, 1200.0, VolatilityClass::Stable),
    ProductDef::new(CUP_RAMEN, 1500.0, VolatilityClass::Normal),
    ProductDef::new(CHOCOLATE_MILK, 900.0, VolatilityClass::Stable),
    ProductDef::new(POTATO_CHIPS, 1700.0, VolatilityClass::Volatile),
    ProductDef::new(ENERGY_DRINK, 1100.0, VolatilityClass::Volatile),
];

/// Scenario tag of a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ordinary,
    Exam,
    FieldTrip,
    SportsDay,
    Festival,
}

impl EventKind {
    pub const ALL: [EventKind; 5] =
        [Self::Ordinary, Self::Exam, Self::FieldTrip, Self::SportsDay, Self::Festival];

    pub fn code(self) -> &'static str {
        match self {
            Self::Ordinary => ORDINARY_CODE,
            Self::Exam => "EXAM",
            Self::FieldTrip => "FIELD_TRIP",
            Self::SportsDay => "SPORTS_DAY",
            Self::Festival => "FESTIVAL",
        }
    }

    /// Additive bias on every product's daily return.
    pub fn price_effect(self) -> f64 {
        match self {
            Self::Ordinary => 0.0,
            Self::Exam => -0.06,
            Self::FieldTrip => -0.10,
            Self::SportsDay => 0.05,
            Self::Festival => 0.15,
        }
    }

    /// Per-product biases that replace [`price_effect`](Self::price_effect).
    pub fn product_effects(self) -> &'static [(&'static str, f64)] {
        match self {
            Self::Exam => &[(ENERGY_DRINK, 0.08)],
            Self::FieldTrip => &[(TRIANGLE_KIMBAP, 0.05)],
            Self::SportsDay => &[(ENERGY_DRINK, 0.10)],
            Self::Ordinary | Self::Festival => &[],
        }
    }

    pub fn record(self) -> EventRecord {
        let (title, description) = match self {
            Self::Ordinary => return EventRecord::ordinary(),
            Self::Exam => (
                "Exam day",
                "Students stay in the library. Snack demand drops, but energy drinks sell out.",
            ),
            Self::FieldTrip => (
                "Field trip",
                "Half the school is away. Only packed-lunch kimbap keeps moving.",
            ),
            Self::SportsDay => (
                "Sports day",
                "Everyone is outside and thirsty. Drinks are in demand.",
            ),
            Self::Festival => (
                "School festival",
                "Crowds and visitors all day. Every shelf empties fast.",
            ),
        };
        EventRecord {
            code: self.code().into(),
            title: title.into(),
            description: description.into(),
            price_effect: self.price_effect(),
            product_effects: self
                .product_effects()
                .iter()
                .map(|(name, effect)| (name.to_string(), *effect))
                .collect::<BTreeMap<_, _>>(),
        }
    }
}

/// Scheduled days. Days not listed are ordinary.
pub const EVENTS: &[(u32, EventKind)] = &[
    (6, EventKind::FieldTrip),
    (11, EventKind::Exam),
    (12, EventKind::Exam),
    (13, EventKind::Exam),
    (17, EventKind::SportsDay),
    (23, EventKind::Exam),
    (24, EventKind::Exam),
    (29, EventKind::Festival),
    (30, EventKind::Festival),
];

/// Owned copies of [`PRODUCTS`].
pub fn products() -> Vec<Product> {
    PRODUCTS.iter().map(ProductDef::to_product).collect()
}

/// [`EVENTS`] as an [`EventCalendar`].
pub fn event_calendar() -> EventCalendar {
    EVENTS
        .iter()
        .fold(EventCalendar::new(), |calendar, (day, kind)| calendar.with(*day, kind.record()))
}
