use std::fmt::Write as _;

use tracing::debug;

use crate::{db::models::RecentReading, error::PersistenceError, gateway::PersistenceGateway};

/// Column headers and widths, in display order.
const COLUMNS: [(&str, usize); 7] = [
    ("greenhouse", 16),
    ("zone", 12),
    ("sensor", 10),
    ("type", 11),
    ("value", 10),
    ("unit", 4),
    ("timestamp", 19),
];

/// The most recent readings, newest first, as last fetched from the database.
#[derive(Debug, Clone)]
pub struct RecentTable {
    limit: u32,
    rows: Vec<RecentReading>,
}

impl RecentTable {
    pub fn new(limit: u32) -> Self {
        Self { limit, rows: Vec::new() }
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[RecentReading] {
        &self.rows
    }

    /// Replaces the rows with a fresh query. On failure the previous rows are kept.
    pub async fn refresh(&mut self, gateway: &PersistenceGateway) -> Result<(), PersistenceError> {
        self.rows = gateway.fetch_recent(self.limit).await?;
        debug!(rows = self.rows.len(), limit = self.limit, "Recent readings refreshed");
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let header: Vec<String> = COLUMNS.iter().map(|(h, _)| (*h).to_owned()).collect();
        push_row(&mut out, &header);
        let rule: Vec<String> = COLUMNS.iter().map(|(_, w)| "-".repeat(*w)).collect();
        push_row(&mut out, &rule);

        if self.rows.is_empty() {
            out.push_str("(no readings yet)\n");
            return out;
        }

        for r in &self.rows {
            push_row(
                &mut out,
                &[
                    r.greenhouse_name.clone(),
                    r.zone_name.clone(),
                    r.sensor_id.clone(),
                    r.sensor_type.to_string(),
                    format_value(r.value),
                    r.unit.clone(),
                    r.timestamp.clone(),
                ],
            );
        }
        out
    }
}

fn push_row(out: &mut String, cells: &[String]) {
    let line = cells
        .iter()
        .zip(COLUMNS)
        .map(|(cell, (_, width))| format!("{:<width$}", fit(cell, width)))
        .collect::<Vec<_>>()
        .join(" | ");
    let _ = writeln!(out, "{}", line.trim_end());
}

/// Truncates on character boundaries, marking the cut with `~`.
fn fit(cell: &str, width: usize) -> String {
    if cell.chars().count() <= width {
        return cell.to_owned();
    }
    let mut s: String = cell.chars().take(width.saturating_sub(1)).collect();
    s.push('~');
    s
}

/// Whole numbers keep one decimal place so `42` reads as `42.0`.
fn format_value(v: f64) -> String {
    format!("{v:?}")
}
