//! Domain types for SnackMarket

pub mod event;
pub mod ids;
pub mod price_row;
pub mod product;

pub use event::{EventCalendar, EventRecord, ScheduledEvent, ORDINARY_CODE};
pub use ids::{ConfigHash, RunId};
pub use price_row::{PriceRow, PriceTable};
pub use product::{Product, VolatilityClass};
