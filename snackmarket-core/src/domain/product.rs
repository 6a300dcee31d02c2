//! Product: a tradeable shop item with a baseline price.

use serde::{Deserialize, Serialize};

/// Volatility/trend class of a product.
///
/// Each class fixes the mean daily drift and the half-width of the uniform
/// noise band that the ordinary-day return is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityClass {
    /// Staples: slight upward drift, narrow band.
    Stable,
    /// No drift, medium band.
    Normal,
    /// Impulse buys: slight downward drift, wide band.
    Volatile,
}

impl VolatilityClass {
    /// Mean daily return as a fraction of the current price.
    pub fn drift(self) -> f64 {
        match self {
            Self::Stable => 0.002,
            Self::Normal => 0.0,
            Self::Volatile => -0.002,
        }
    }

    /// Half-width of the uniform noise band, as a fraction of the current price.
    pub fn noise_band(self) -> f64 {
        match self {
            Self::Stable => 0.02,
            Self::Normal => 0.04,
            Self::Volatile => 0.07,
        }
    }
}

impl std::fmt::Display for VolatilityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Stable => "stable",
            Self::Normal => "normal",
            Self::Volatile => "volatile",
        };
        f.pad(name)
    }
}

/// A product in the catalog. `name` is the unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub baseline_price: f64,
    pub volatility: VolatilityClass,
}

impl Product {
    pub fn new(name: impl Into<String>, baseline_price: f64, volatility: VolatilityClass) -> Self {
        Self { name: name.into(), baseline_price, volatility }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wider_band_for_more_volatile_classes() {
        assert!(VolatilityClass::Stable.noise_band() < VolatilityClass::Normal.noise_band());
        assert!(VolatilityClass::Normal.noise_band() < VolatilityClass::Volatile.noise_band());
    }

    #[test]
    fn volatility_class_serializes_snake_case() {
        let json = serde_json::to_string(&VolatilityClass::Volatile).unwrap();
        assert_eq!(json, "\"volatile\"");
    }
}
