//! Price-path simulator.
//!
//! Each product follows an independent multiplicative random walk. The daily
//! return is the sum of three terms:
//!
//! ```text
//! r = class.drift + U(-class.noise_band, +class.noise_band) + event.effect_for(product)
//! ```
//!
//! and the close is `max(open * (1 + r), price_floor)`, saturating at
//! `f64::MAX` on overflow. Intraday high/low wick out from the open/close range
//! by `U(0, wick_band)`.
//!
//! A run owns all of its randomness: the master seed is expanded per product
//! through [`RngHierarchy`], and nothing survives between calls. Concurrent runs
//! therefore never observe each other.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, MarketConfig};
use crate::domain::{EventCalendar, PriceRow, PriceTable, Product};
use crate::rng::RngHierarchy;

/// Price-path generator over a validated [`MarketConfig`].
#[derive(Debug, Clone)]
pub struct PriceSimulator {
    config: MarketConfig,
}

impl Default for PriceSimulator {
    /// Simulator over the built-in catalog, which is checked by unit tests.
    fn default() -> Self {
        Self { config: MarketConfig::school_default() }
    }
}

impl PriceSimulator {
    /// Validate `config` and wrap it. Fails fast on malformed configuration.
    pub fn new(config: MarketConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn days(&self) -> u32 {
        self.config.days
    }

    pub fn products(&self) -> &[Product] {
        &self.config.products
    }

    pub fn events(&self) -> &EventCalendar {
        &self.config.events
    }

    /// Fresh, independently seeded run. The seed is recorded on the table.
    pub fn run(&self) -> PriceTable {
        self.run_with_rng(&mut rand::thread_rng())
    }

    /// Draw the master seed from a caller-supplied random source.
    pub fn run_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> PriceTable {
        self.run_with_seed(rng.gen())
    }

    /// Deterministic run: the same seed always yields the same table.
    pub fn run_with_seed(&self, seed: u64) -> PriceTable {
        let hierarchy = RngHierarchy::new(seed);
        let series = self
            .config
            .products
            .iter()
            .map(|product| {
                let mut rng = hierarchy.rng_for_product(&product.name);
                (product.name.clone(), self.simulate_product(product, &mut rng))
            })
            .collect();

        let table = PriceTable::from_series(seed, self.config.days, series);
        info!(seed, days = self.config.days, rows = table.len(), "simulation complete");
        table
    }

    /// One product's path over days `1..=days`.
    fn simulate_product(&self, product: &Product, rng: &mut StdRng) -> Vec<PriceRow> {
        let MarketConfig { days, price_floor, wick_band, .. } = self.config;
        let drift = product.volatility.drift();
        let band = product.volatility.noise_band();

        let mut rows = Vec::with_capacity(days as usize);
        let mut price_start = product.baseline_price;
        let mut floor_hits = 0u32;

        for day in 1..=days {
            let event = self.config.events.event_for(day);

            // Fixed draw count per day keeps seeded streams aligned across configs.
            let noise = rng.gen_range(-band..=band);
            let up_wick = rng.gen_range(0.0..=wick_band);
            let down_wick = rng.gen_range(0.0..=wick_band);

            let daily_return = drift + noise + event.effect_for(&product.name);
            let raw_end = price_start * (1.0 + daily_return);
            // Overflow saturates at f64::MAX; only a fall reaches the floor.
            let price_end = if raw_end > price_floor {
                raw_end.min(f64::MAX)
            } else {
                floor_hits += 1;
                price_floor
            };

            let high = (price_start.max(price_end) * (1.0 + up_wick)).min(f64::MAX);
            let low = (price_start.min(price_end) * (1.0 - down_wick)).max(price_floor);

            rows.push(PriceRow {
                day,
                product: product.name.clone(),
                price_start,
                high,
                low,
                price_end,
            });
            price_start = price_end;
        }

        if floor_hits > 0 {
            warn!(product = %product.name, floor_hits, price_floor, "price clamped to floor");
        }
        debug!(product = %product.name, close = price_start, "product path generated");
        rows
    }
}

/// Run the built-in school-shop market once, unseeded.
pub fn run_simulation() -> PriceTable {
    PriceSimulator::default().run()
}
