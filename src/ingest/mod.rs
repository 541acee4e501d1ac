//! # Yearly Table Ingestion
//!
//! Reads one CSV transaction table per year (`from_address, to_address,
//! value[, timestamp][, block_number]`) into validated [`TxRecord`]s.
//!
//! Row-level problems — unparseable rows, malformed addresses, negative
//! values, timestamps that fall outside the partition year — are skipped and
//! counted in [`RowIssues`], never fatal. The public ledger exports contain
//! a small tail of such rows (contract-creation transfers with a null
//! `to_address`, for one), and losing a whole year to them would be worse
//! than losing the rows. A missing table, by contrast, is a real error:
//! [`crate::Error::MissingYearData`].

use std::path::Path;

use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{Address, Year};
use crate::{Error, Result};

// ============================================================================
// Validated rows
// ============================================================================

/// One qualifying transaction row, addresses parsed and case-folded.
#[derive(Debug, Clone, PartialEq)]
pub struct TxRecord {
    pub from: Address,
    pub to: Address,
    pub value: f64,
    pub block_number: Option<u64>,
}

impl TxRecord {
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Counters for rows the pipeline dropped, one instance per year.
///
/// Logged once per year with totals; individual rows are not logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssues {
    /// Row did not deserialize, or an address field was empty/malformed.
    pub malformed: u64,
    /// `value` was negative.
    pub negative_value: u64,
    /// `timestamp` resolves to a different calendar year than the table's
    /// partition year.
    pub wrong_year: u64,
    /// Dropped by `EdgePolicy { keep_self_loops: false }`.
    pub self_loops_dropped: u64,
    /// Dropped by `EdgePolicy { keep_zero_value: false }`.
    pub zero_value_dropped: u64,
}

impl RowIssues {
    /// Total rows excluded from the year's graph.
    pub fn skipped(&self) -> u64 {
        self.malformed
            + self.negative_value
            + self.wrong_year
            + self.self_loops_dropped
            + self.zero_value_dropped
    }

    pub fn is_clean(&self) -> bool {
        self.skipped() == 0
    }
}

// ============================================================================
// CSV shape
// ============================================================================

/// Raw CSV row. Only the address columns are required; the acquisition step
/// for the early study years exported tables without values or timestamps.
#[derive(Debug, Deserialize)]
struct RawRow {
    from_address: String,
    to_address: String,
    #[serde(default)]
    value: Option<f64>,
    /// Unix seconds.
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    block_number: Option<u64>,
}

// ============================================================================
// Reader
// ============================================================================

/// Read and validate one year's transaction table.
///
/// Returns the qualifying rows in file order together with the skip
/// counters. Fails only when the file is absent or unreadable as CSV at the
/// header level.
pub fn read_year_table(path: &Path, year: Year) -> Result<(Vec<TxRecord>, RowIssues)> {
    if !path.exists() {
        return Err(Error::MissingYearData {
            year,
            path: path.display().to_string(),
        });
    }
    debug!(year, path = %path.display(), "reading transaction table");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut records = Vec::new();
    let mut issues = RowIssues::default();

    for row in reader.deserialize::<RawRow>() {
        let row = match row {
            Ok(row) => row,
            Err(_) => {
                issues.malformed += 1;
                continue;
            }
        };
        let (Some(from), Some(to)) = (
            Address::parse(&row.from_address),
            Address::parse(&row.to_address),
        ) else {
            issues.malformed += 1;
            continue;
        };
        let value = row.value.unwrap_or(0.0);
        if value < 0.0 || !value.is_finite() {
            issues.negative_value += 1;
            continue;
        }
        // A timestamp outside the partition year means the acquisition step
        // mis-binned the row; keeping it would break the per-edge year
        // invariant downstream.
        if let Some(ts) = row.timestamp {
            match DateTime::from_timestamp(ts, 0) {
                Some(dt) if dt.year() == year => {}
                _ => {
                    issues.wrong_year += 1;
                    continue;
                }
            }
        }
        records.push(TxRecord {
            from,
            to,
            value,
            block_number: row.block_number,
        });
    }

    if !issues.is_clean() {
        warn!(
            year,
            skipped = issues.skipped(),
            malformed = issues.malformed,
            negative_value = issues.negative_value,
            wrong_year = issues.wrong_year,
            "dropped rows from transaction table"
        );
    }
    Ok((records, issues))
}
