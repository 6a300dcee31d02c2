//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: a [`SimulationArtifact`] with config, run id and full table
//! - **CSV**: the price table (one row per day and product) and a trade log
//! - **Markdown**: a human-readable single-run report
//!
//! All persisted artifacts include a `schema_version` field. Newer versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snackmarket_core::domain::RunId;
use snackmarket_core::{MarketConfig, PriceSimulator, PriceTable, TradeRecord};
use tracing::info;

use crate::metrics::PathStats;

/// Current artifact schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// One simulation run, self-describing enough to replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationArtifact {
    pub schema_version: u32,
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub config: MarketConfig,
    pub table: PriceTable,
}

impl SimulationArtifact {
    pub fn new(sim: &PriceSimulator, table: PriceTable) -> Result<Self> {
        let config = sim.config().clone();
        let seed = table.seed();
        let config_hash = config.config_hash().context("failed to hash market config")?;
        Ok(Self {
            schema_version: SCHEMA_VERSION,
            run_id: RunId::new(config_hash, seed),
            generated_at: Utc::now(),
            seed,
            config,
            table,
        })
    }

    /// Per-product path statistics for the stored table.
    pub fn stats(&self) -> Vec<PathStats> {
        PathStats::for_table(&self.table, &self.config.events, self.config.price_floor)
    }
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an artifact to pretty JSON.
pub fn export_table_json(artifact: &SimulationArtifact) -> Result<String> {
    serde_json::to_string_pretty(artifact).context("failed to serialize SimulationArtifact to JSON")
}

/// Deserialize an artifact from JSON, rejecting unknown schema versions.
pub fn import_table_json(json: &str) -> Result<SimulationArtifact> {
    let artifact: SimulationArtifact =
        serde_json::from_str(json).context("failed to deserialize SimulationArtifact from JSON")?;
    if artifact.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            artifact.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(artifact)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the price table as CSV.
///
/// Columns: day, product, event_code, price_start, high, low, price_end
pub fn export_table_csv(table: &PriceTable, config: &MarketConfig) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["day", "product", "event_code", "price_start", "high", "low", "price_end"])?;

    for r in table.rows() {
        wtr.write_record([
            &r.day.to_string(),
            &r.product,
            &config.events.event_for(r.day).code,
            &format!("{:.2}", r.price_start),
            &format!("{:.2}", r.high),
            &format!("{:.2}", r.low),
            &format!("{:.2}", r.price_end),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export a session trade log as CSV.
///
/// Columns: day, product, side, qty, price, amount
pub fn export_history_csv(history: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["day", "product", "side", "qty", "price", "amount"])?;
    for t in history {
        wtr.write_record([
            &t.day.to_string(),
            &t.product,
            &t.side.to_string(),
            &t.qty.to_string(),
            &format!("{:.2}", t.price),
            &format!("{:.2}", t.amount),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single run.
///
/// Creates a directory named `{run_hash}_{timestamp}/` under `output_dir`
/// containing:
/// - `manifest.json`: the full `SimulationArtifact`
/// - `prices.csv`: the price table with event codes
/// - `stats.json`: per-product path statistics
///
/// Returns the path to the created directory.
pub fn save_artifacts(artifact: &SimulationArtifact, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        artifact.run_id.hash(),
        artifact.generated_at.format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_table_json(artifact)?;
    std::fs::write(run_dir.join("manifest.json"), &json)?;

    let prices_csv = export_table_csv(&artifact.table, &artifact.config)?;
    std::fs::write(run_dir.join("prices.csv"), &prices_csv)?;

    let stats = serde_json::to_string_pretty(&artifact.stats())
        .context("failed to serialize path statistics")?;
    std::fs::write(run_dir.join("stats.json"), &stats)?;

    info!(dir = %run_dir.display(), run = %artifact.run_id.hash(), "artifacts saved");
    Ok(run_dir)
}

/// Load an artifact from a run directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<SimulationArtifact> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_table_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for a single run.
pub fn generate_report(artifact: &SimulationArtifact) -> String {
    let mut md = String::with_capacity(2048);
    let config = &artifact.config;

    md.push_str("# Market Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Run | {} |\n", artifact.run_id.hash()));
    md.push_str(&format!("| Seed | {} |\n", artifact.seed));
    md.push_str(&format!("| Days | {} |\n", config.days));
    md.push_str(&format!("| Products | {} |\n", config.products.len()));
    md.push_str(&format!("| Price Floor | {:.2} |\n", config.price_floor));
    md.push_str(&format!("| Config Hash | {} |\n", artifact.run_id.config_hash));
    md.push('\n');

    md.push_str("## Event Calendar\n\n");
    if config.events.is_empty() {
        md.push_str("No scheduled events.\n\n");
    } else {
        md.push_str("| Day | Event | Effect |\n");
        md.push_str("| --- | --- | --- |\n");
        for (day, event) in config.events.iter() {
            md.push_str(&format!(
                "| {} | {} | {:+.1}% |\n",
                day,
                event.title,
                event.price_effect * 100.0
            ));
        }
        md.push('\n');
    }

    md.push_str("## Price Paths\n\n");
    md.push_str("| Product | Open | Close | Return | Max DD | Event-day Avg | Ordinary Avg |\n");
    md.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
    for s in artifact.stats() {
        md.push_str(&format!(
            "| {} | {:.0} | {:.0} | {:+.2}% | {:.2}% | {:+.2}% | {:+.2}% |\n",
            s.product,
            s.open,
            s.close,
            s.total_return * 100.0,
            s.max_drawdown * 100.0,
            s.event_day_mean * 100.0,
            s.ordinary_day_mean * 100.0,
        ));
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(seed: u64) -> SimulationArtifact {
        let sim = PriceSimulator::default();
        let table = sim.run_with_seed(seed);
        SimulationArtifact::new(&sim, table).unwrap()
    }

    #[test]
    fn json_roundtrip() {
        let a = artifact(11);
        let json = export_table_json(&a).unwrap();
        let back = import_table_json(&json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn newer_schema_rejected() {
        let mut a = artifact(11);
        a.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&a).unwrap();
        let err = import_table_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn table_csv_has_header_and_one_line_per_row() {
        let a = artifact(3);
        let csv = export_table_csv(&a.table, &a.config).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("day,product,event_code,price_start,high,low,price_end")
        );
        assert_eq!(lines.count(), a.table.len());
        assert!(csv.contains("FESTIVAL"));
        assert!(csv.contains("ORDINARY"));
    }

    #[test]
    fn report_lists_every_product() {
        let a = artifact(3);
        let md = generate_report(&a);
        assert!(md.starts_with("# Market Report"));
        for p in &a.config.products {
            assert!(md.contains(&p.name));
        }
    }
}
