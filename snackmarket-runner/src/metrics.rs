//! Path statistics: pure functions over one product's simulated path.
//!
//! Every metric is a pure function: close series and/or rows in, scalar out.

use serde::{Deserialize, Serialize};
use snackmarket_core::{EventCalendar, PriceRow, PriceTable};

/// Summary of one product's path in one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStats {
    pub product: String,
    pub open: f64,
    pub close: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub best_day: f64,
    pub worst_day: f64,
    /// Mean daily return on scheduled event days (0.0 if none).
    pub event_day_mean: f64,
    /// Mean daily return on ordinary days (0.0 if none).
    pub ordinary_day_mean: f64,
    /// Days whose close sits on the price floor.
    pub floor_days: usize,
}

impl PathStats {
    /// Compute stats from a product series ordered by day.
    pub fn from_series(
        product: &str,
        series: &[&PriceRow],
        events: &EventCalendar,
        price_floor: f64,
    ) -> Self {
        let closes: Vec<f64> = series.iter().map(|r| r.price_end).collect();
        let open = series.first().map(|r| r.price_start).unwrap_or(0.0);
        let close = closes.last().copied().unwrap_or(open);
        let returns: Vec<f64> = series.iter().map(|r| r.daily_return()).collect();

        let (event_returns, ordinary_returns): (Vec<&PriceRow>, Vec<&PriceRow>) =
            series.iter().partition(|r| events.scheduled(r.day).is_some());

        let mut path = Vec::with_capacity(closes.len() + 1);
        path.push(open);
        path.extend_from_slice(&closes);

        Self {
            product: product.to_string(),
            open,
            close,
            total_return: total_return(&path),
            max_drawdown: max_drawdown(&path),
            best_day: returns.iter().copied().reduce(f64::max).unwrap_or(0.0),
            worst_day: returns.iter().copied().reduce(f64::min).unwrap_or(0.0),
            event_day_mean: mean_return(&event_returns),
            ordinary_day_mean: mean_return(&ordinary_returns),
            floor_days: closes.iter().filter(|c| **c <= price_floor).count(),
        }
    }

    /// Stats for every product in `table`, in catalog order.
    pub fn for_table(table: &PriceTable, events: &EventCalendar, price_floor: f64) -> Vec<Self> {
        table
            .products()
            .iter()
            .map(|p| Self::from_series(p, &table.series(p), events, price_floor))
            .collect()
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(path: &[f64]) -> f64 {
    match (path.first(), path.last()) {
        (Some(&initial), Some(&last)) if path.len() >= 2 && initial > 0.0 => {
            (last - initial) / initial
        }
        _ => 0.0,
    }
}

/// Maximum peak-to-trough drawdown as a negative fraction (0.0 if none).
pub fn max_drawdown(path: &[f64]) -> f64 {
    if path.len() < 2 {
        return 0.0;
    }
    let mut peak = path[0];
    let mut max_dd = 0.0_f64;

    for &p in path {
        if p > peak {
            peak = p;
        }
        if peak > 0.0 {
            let dd = (p - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

fn mean_return(rows: &[&PriceRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|r| r.daily_return()).sum::<f64>() / rows.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use snackmarket_core::EventRecord;

    fn row(day: u32, start: f64, end: f64) -> PriceRow {
        PriceRow {
            day,
            product: "A".into(),
            price_start: start,
            high: start.max(end),
            low: start.min(end),
            price_end: end,
        }
    }

    #[test]
    fn total_return_basic() {
        assert!((total_return(&[100.0, 110.0, 121.0]) - 0.21).abs() < 1e-12);
        assert_eq!(total_return(&[100.0]), 0.0);
        assert_eq!(total_return(&[]), 0.0);
    }

    #[test]
    fn max_drawdown_basic() {
        // Peak 120 → trough 90 = -25%
        let dd = max_drawdown(&[100.0, 120.0, 90.0, 110.0]);
        assert!((dd + 0.25).abs() < 1e-12);
        assert_eq!(max_drawdown(&[100.0, 101.0, 102.0]), 0.0);
    }

    #[test]
    fn path_stats_split_event_and_ordinary_days() {
        let rows = [row(1, 100.0, 110.0), row(2, 110.0, 99.0), row(3, 99.0, 99.0)];
        let refs: Vec<&PriceRow> = rows.iter().collect();
        let mut exam = EventRecord::ordinary();
        exam.code = "EXAM".into();
        let events = EventCalendar::new().with(2, exam);

        let stats = PathStats::from_series("A", &refs, &events, 1.0);
        assert_eq!(stats.open, 100.0);
        assert_eq!(stats.close, 99.0);
        assert!((stats.total_return + 0.01).abs() < 1e-12);
        assert!((stats.event_day_mean + 0.10).abs() < 1e-12);
        assert!((stats.ordinary_day_mean - 0.05).abs() < 1e-12);
        assert!((stats.best_day - 0.10).abs() < 1e-12);
        assert!((stats.worst_day + 0.10).abs() < 1e-12);
        assert_eq!(stats.floor_days, 0);
    }

    #[test]
    fn floor_days_counted() {
        let rows = [row(1, 5.0, 1.0), row(2, 1.0, 1.0), row(3, 1.0, 2.0)];
        let refs: Vec<&PriceRow> = rows.iter().collect();
        let stats = PathStats::from_series("A", &refs, &EventCalendar::new(), 1.0);
        assert_eq!(stats.floor_days, 2);
    }
}
