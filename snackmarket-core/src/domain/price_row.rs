//! PriceRow and PriceTable: the simulator's output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One (day, product) price observation.
///
/// `price_start` is the open and `price_end` the close; `high`/`low` bound both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub day: u32,
    pub product: String,
    pub price_start: f64,
    pub high: f64,
    pub low: f64,
    pub price_end: f64,
}

impl PriceRow {
    /// Close-over-open return for the day.
    pub fn daily_return(&self) -> f64 {
        self.price_end / self.price_start - 1.0
    }

    /// Basic sanity: strictly positive prices, high/low enclose open and close.
    pub fn is_sane(&self) -> bool {
        self.price_start > 0.0
            && self.price_end > 0.0
            && self.low > 0.0
            && self.high >= self.price_start.max(self.price_end)
            && self.low <= self.price_start.min(self.price_end)
    }
}

/// Full `days × products` price table from one simulation run.
///
/// Rows are ordered day-major; within a day they follow catalog order.
/// The table is read-only once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    seed: u64,
    days: u32,
    products: Vec<String>,
    rows: Vec<PriceRow>,
}

impl PriceTable {
    /// Interleave per-product series (each ordered by day) into a day-major table.
    pub(crate) fn from_series(seed: u64, days: u32, series: Vec<(String, Vec<PriceRow>)>) -> Self {
        let products: Vec<String> = series.iter().map(|(name, _)| name.clone()).collect();
        let mut iters: Vec<_> = series.into_iter().map(|(_, rows)| rows.into_iter()).collect();
        let mut rows = Vec::with_capacity(days as usize * products.len());
        for _ in 0..days {
            for it in iters.iter_mut() {
                if let Some(row) = it.next() {
                    rows.push(row);
                }
            }
        }
        Self { seed, days, products, rows }
    }

    /// Master seed that reproduces this table via `run_with_seed`.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Product names in catalog order.
    pub fn products(&self) -> &[String] {
        &self.products
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows for `day`, in catalog order.
    pub fn day(&self, day: u32) -> impl Iterator<Item = &PriceRow> {
        self.rows.iter().filter(move |r| r.day == day)
    }

    /// The row for `(day, product)`.
    pub fn row(&self, day: u32, product: &str) -> Option<&PriceRow> {
        let idx = self.products.iter().position(|p| p == product)?;
        let n = self.products.len();
        let at = (day as usize).checked_sub(1)? * n + idx;
        match self.rows.get(at) {
            Some(r) if r.day == day && r.product == product => Some(r),
            // Tables loaded from disk are not guaranteed to keep the layout.
            _ => self.rows.iter().find(|r| r.day == day && r.product == product),
        }
    }

    /// Closing price per product on `day`.
    pub fn closing_prices(&self, day: u32) -> BTreeMap<&str, f64> {
        self.day(day).map(|r| (r.product.as_str(), r.price_end)).collect()
    }

    /// One product's path, ordered by day.
    pub fn series(&self, product: &str) -> Vec<&PriceRow> {
        self.rows.iter().filter(|r| r.product == product).collect()
    }
}
