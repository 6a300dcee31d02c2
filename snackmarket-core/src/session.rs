//! Paper-trading session: an explicit state machine over one price table.
//!
//! States are [`Phase::Trading`] (with the current day) and [`Phase::Finished`].
//! Transitions are the four [`Action`]s. Buys and sells both execute at the
//! current day's closing price; there is no spread and no commission.
//!
//! Invariant: cash and holdings never go negative. Every rejected action
//! leaves the state untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::info;

use crate::domain::{EventRecord, PriceTable};
use crate::simulator::PriceSimulator;

/// Starting cash of a new or reset session, in won.
pub const INITIAL_CASH: f64 = 1_000_000.0;

/// Largest quantity accepted in a single order.
pub const MAX_ORDER_QTY: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Trading { day: u32 },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        })
    }
}

/// A state transition request.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Buy { product: String, qty: u32 },
    Sell { product: String, qty: u32 },
    AdvanceDay,
    /// Regenerate prices and restart. `None` draws a fresh seed.
    Reset { seed: Option<u64> },
}

/// What a successful action did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Filled(TradeRecord),
    Advanced { day: u32 },
    Finished,
    Reset { seed: u64 },
}

/// One executed order in the trade log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub day: u32,
    pub product: String,
    pub side: Side,
    pub qty: u32,
    pub price: f64,
    pub amount: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("unknown product {0:?}")]
    UnknownProduct(String),

    #[error("order quantity must be between 1 and {max}, got {qty}")]
    InvalidQuantity { qty: u32, max: u32 },

    #[error("insufficient cash: need {needed:.2}, have {available:.2}")]
    InsufficientCash { needed: f64, available: f64 },

    #[error("insufficient holdings of {product:?}: requested {requested}, held {held}")]
    InsufficientHoldings { product: String, requested: u64, held: u64 },

    #[error("the session has finished; reset to play again")]
    Finished,
}

/// Per-product quote in a [`SessionView`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub product: String,
    pub price: f64,
    pub holding: u64,
    pub market_value: f64,
}

/// Rendering-independent snapshot of the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub day: u32,
    pub days: u32,
    pub finished: bool,
    pub event: EventRecord,
    pub quotes: Vec<Quote>,
    pub cash: f64,
    pub portfolio_value: f64,
    pub total_value: f64,
}

/// Ledger and position in time for one player.
///
/// Owns its price table; two sessions share nothing but the (immutable)
/// simulator configuration.
#[derive(Debug, Clone)]
pub struct SessionState {
    simulator: PriceSimulator,
    table: PriceTable,
    phase: Phase,
    cash: f64,
    holdings: BTreeMap<String, u64>,
    history: Vec<TradeRecord>,
}

impl SessionState {
    /// Start a session on a fresh, unseeded run.
    pub fn new(simulator: PriceSimulator) -> Self {
        let table = simulator.run();
        Self::with_table(simulator, table)
    }

    /// Start a session on a deterministic run.
    pub fn with_seed(simulator: PriceSimulator, seed: u64) -> Self {
        let table = simulator.run_with_seed(seed);
        Self::with_table(simulator, table)
    }

    fn with_table(simulator: PriceSimulator, table: PriceTable) -> Self {
        let holdings = simulator.products().iter().map(|p| (p.name.clone(), 0)).collect();
        Self {
            simulator,
            table,
            phase: Phase::Trading { day: 1 },
            cash: INITIAL_CASH,
            holdings,
            history: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current day; the last day once finished.
    pub fn day(&self) -> u32 {
        match self.phase {
            Phase::Trading { day } => day,
            Phase::Finished => self.table.days(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn holding(&self, product: &str) -> u64 {
        self.holdings.get(product).copied().unwrap_or(0)
    }

    pub fn holdings(&self) -> &BTreeMap<String, u64> {
        &self.holdings
    }

    pub fn history(&self) -> &[TradeRecord] {
        &self.history
    }

    pub fn table(&self) -> &PriceTable {
        &self.table
    }

    pub fn simulator(&self) -> &PriceSimulator {
        &self.simulator
    }

    /// Closing price of `product` on the current day.
    pub fn price(&self, product: &str) -> Option<f64> {
        self.table.row(self.day(), product).map(|r| r.price_end)
    }

    /// Holdings marked at today's close.
    pub fn portfolio_value(&self) -> f64 {
        self.holdings
            .iter()
            .map(|(product, qty)| self.price(product).unwrap_or(0.0) * *qty as f64)
            .sum()
    }

    pub fn total_value(&self) -> f64 {
        self.cash + self.portfolio_value()
    }

    pub fn event(&self) -> &EventRecord {
        self.simulator.events().event_for(self.day())
    }

    /// Apply one transition. On error the state is unchanged.
    pub fn apply(&mut self, action: Action) -> Result<Outcome, SessionError> {
        match action {
            Action::Buy { product, qty } => self.trade(Side::Buy, product, qty),
            Action::Sell { product, qty } => self.trade(Side::Sell, product, qty),
            Action::AdvanceDay => self.advance(),
            Action::Reset { seed } => Ok(self.reset(seed)),
        }
    }

    fn trading_day(&self) -> Result<u32, SessionError> {
        match self.phase {
            Phase::Trading { day } => Ok(day),
            Phase::Finished => Err(SessionError::Finished),
        }
    }

    fn trade(&mut self, side: Side, product: String, qty: u32) -> Result<Outcome, SessionError> {
        let day = self.trading_day()?;
        if qty == 0 || qty > MAX_ORDER_QTY {
            return Err(SessionError::InvalidQuantity { qty, max: MAX_ORDER_QTY });
        }
        let price = self
            .table
            .row(day, &product)
            .map(|r| r.price_end)
            .ok_or_else(|| SessionError::UnknownProduct(product.clone()))?;
        let amount = price * f64::from(qty);
        let held = self.holding(&product);

        match side {
            Side::Buy => {
                if amount > self.cash {
                    return Err(SessionError::InsufficientCash {
                        needed: amount,
                        available: self.cash,
                    });
                }
                self.cash -= amount;
                self.holdings.insert(product.clone(), held + u64::from(qty));
            }
            Side::Sell => {
                if u64::from(qty) > held {
                    return Err(SessionError::InsufficientHoldings {
                        product,
                        requested: u64::from(qty),
                        held,
                    });
                }
                self.cash += amount;
                self.holdings.insert(product.clone(), held - u64::from(qty));
            }
        }

        let record = TradeRecord { day, product, side, qty, price, amount };
        info!(day, product = %record.product, side = %side, qty, price, "order filled");
        self.history.push(record.clone());
        Ok(Outcome::Filled(record))
    }

    fn advance(&mut self) -> Result<Outcome, SessionError> {
        let day = self.trading_day()?;
        if day >= self.table.days() {
            self.phase = Phase::Finished;
            info!(total_value = self.total_value(), "session finished");
            return Ok(Outcome::Finished);
        }
        let next = day + 1;
        self.phase = Phase::Trading { day: next };
        info!(day = next, event = %self.event().code, "advanced day");
        Ok(Outcome::Advanced { day: next })
    }

    fn reset(&mut self, seed: Option<u64>) -> Outcome {
        let table = match seed {
            Some(seed) => self.simulator.run_with_seed(seed),
            None => self.simulator.run(),
        };
        let seed = table.seed();
        *self = Self::with_table(self.simulator.clone(), table);
        info!(seed, "session reset");
        Outcome::Reset { seed }
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> SessionView {
        let day = self.day();
        let quotes: Vec<Quote> = self
            .simulator
            .products()
            .iter()
            .map(|p| {
                let price = self.price(&p.name).unwrap_or(0.0);
                let holding = self.holding(&p.name);
                Quote {
                    product: p.name.clone(),
                    price,
                    holding,
                    market_value: price * holding as f64,
                }
            })
            .collect();
        let portfolio_value = quotes.iter().map(|q| q.market_value).sum();
        SessionView {
            day,
            days: self.table.days(),
            finished: self.is_finished(),
            event: self.event().clone(),
            quotes,
            cash: self.cash,
            portfolio_value,
            total_value: self.cash + portfolio_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketConfig;
    use crate::domain::{Product, VolatilityClass};

    fn small_session() -> SessionState {
        let config = MarketConfig::new(
            3,
            vec![
                Product::new("A", 1000.0, VolatilityClass::Stable),
                Product::new("B", 500.0, VolatilityClass::Volatile),
            ],
        );
        SessionState::with_seed(PriceSimulator::new(config).unwrap(), 7)
    }

    fn buy(product: &str, qty: u32) -> Action {
        Action::Buy { product: product.into(), qty }
    }

    fn sell(product: &str, qty: u32) -> Action {
        Action::Sell { product: product.into(), qty }
    }

    #[test]
    fn starts_on_day_one_with_initial_cash() {
        let s = small_session();
        assert_eq!(s.phase(), Phase::Trading { day: 1 });
        assert_eq!(s.cash(), INITIAL_CASH);
        assert_eq!(s.holding("A"), 0);
        assert_eq!(s.total_value(), INITIAL_CASH);
    }

    #[test]
    fn buy_executes_at_todays_close() {
        let mut s = small_session();
        let close = s.table().row(1, "A").unwrap().price_end;
        let outcome = s.apply(buy("A", 3)).unwrap();
        let Outcome::Filled(record) = outcome else { panic!("expected fill") };
        assert_eq!(record.price, close);
        assert_eq!(record.amount, close * 3.0);
        assert_eq!(s.holding("A"), 3);
        assert_eq!(s.cash(), INITIAL_CASH - close * 3.0);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn total_value_is_unchanged_by_same_day_trade() {
        let mut s = small_session();
        s.apply(buy("B", 10)).unwrap();
        assert!((s.total_value() - INITIAL_CASH).abs() < 1e-6);
    }

    #[test]
    fn sell_more_than_held_rejected() {
        let mut s = small_session();
        s.apply(buy("A", 1)).unwrap();
        let err = s.apply(sell("A", 2)).unwrap_err();
        assert_eq!(
            err,
            SessionError::InsufficientHoldings { product: "A".into(), requested: 2, held: 1 }
        );
        assert_eq!(s.holding("A"), 1);
    }

    #[test]
    fn buy_beyond_cash_rejected_without_side_effects() {
        let config =
            MarketConfig::new(2, vec![Product::new("Gold", 900_000.0, VolatilityClass::Stable)]);
        let mut s = SessionState::with_seed(PriceSimulator::new(config).unwrap(), 1);
        let err = s.apply(buy("Gold", 2)).unwrap_err();
        assert!(matches!(err, SessionError::InsufficientCash { .. }));
        assert_eq!(s.cash(), INITIAL_CASH);
        assert!(s.history().is_empty());
    }

    #[test]
    fn quantity_bounds_enforced() {
        let mut s = small_session();
        assert!(matches!(s.apply(buy("A", 0)), Err(SessionError::InvalidQuantity { .. })));
        assert!(matches!(
            s.apply(buy("A", MAX_ORDER_QTY + 1)),
            Err(SessionError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn unknown_product_rejected() {
        let mut s = small_session();
        assert_eq!(s.apply(buy("Z", 1)), Err(SessionError::UnknownProduct("Z".into())));
    }

    #[test]
    fn advancing_past_last_day_finishes() {
        let mut s = small_session();
        assert_eq!(s.apply(Action::AdvanceDay), Ok(Outcome::Advanced { day: 2 }));
        assert_eq!(s.apply(Action::AdvanceDay), Ok(Outcome::Advanced { day: 3 }));
        assert_eq!(s.apply(Action::AdvanceDay), Ok(Outcome::Finished));
        assert!(s.is_finished());
        assert_eq!(s.day(), 3);
        assert_eq!(s.apply(Action::AdvanceDay), Err(SessionError::Finished));
        assert_eq!(s.apply(buy("A", 1)), Err(SessionError::Finished));
    }

    #[test]
    fn sell_uses_the_new_days_close() {
        let mut s = small_session();
        s.apply(buy("A", 5)).unwrap();
        s.apply(Action::AdvanceDay).unwrap();
        let close2 = s.table().row(2, "A").unwrap().price_end;
        let Outcome::Filled(record) = s.apply(sell("A", 5)).unwrap() else {
            panic!("expected fill")
        };
        assert_eq!(record.day, 2);
        assert_eq!(record.price, close2);
        assert_eq!(s.holding("A"), 0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut s = small_session();
        s.apply(buy("A", 2)).unwrap();
        s.apply(Action::AdvanceDay).unwrap();
        s.apply(Action::AdvanceDay).unwrap();
        s.apply(Action::AdvanceDay).unwrap();
        assert!(s.is_finished());

        assert_eq!(s.apply(Action::Reset { seed: Some(9) }), Ok(Outcome::Reset { seed: 9 }));
        assert_eq!(s.phase(), Phase::Trading { day: 1 });
        assert_eq!(s.cash(), INITIAL_CASH);
        assert_eq!(s.holding("A"), 0);
        assert!(s.history().is_empty());
        assert_eq!(s.table().seed(), 9);
    }

    #[test]
    fn view_reflects_state() {
        let mut s = small_session();
        s.apply(buy("B", 4)).unwrap();
        let view = s.view();
        assert_eq!(view.day, 1);
        assert_eq!(view.days, 3);
        assert!(!view.finished);
        assert!(view.event.is_ordinary());
        assert_eq!(view.quotes.len(), 2);
        let b = view.quotes.iter().find(|q| q.product == "B").unwrap();
        assert_eq!(b.holding, 4);
        assert!((view.total_value - (view.cash + view.portfolio_value)).abs() < 1e-9);
    }
}
