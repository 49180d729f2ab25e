//! Reference lookup table of common prices.
//!
//! The table is a plain CSV with the columns `american_moneyline`, `fraction`,
//! `decimal` and `implied_probability` (any order, extra columns ignored).
//! It is data the host displays; the engine never depends on it, but
//! [`ReferenceTable::cross_check`] recomputes every row so a stale or
//! hand-edited table shows up as a list of discrepancies.

pub mod cache;

pub use cache::TableCache;

use crate::engine::odds::format_american;
use crate::engine::{Fraction, InvalidOddsReason, OddsError, OddsInput};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

const COL_AMERICAN: &str = "american_moneyline";
const COL_FRACTION: &str = "fraction";
const COL_DECIMAL: &str = "decimal";
const COL_PROBABILITY: &str = "implied_probability";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read reference table {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reference table has no header row")]
    Empty,
    #[error("reference table is missing column `{0}`")]
    MissingColumn(&'static str),
    #[error("line {line}: cannot read `{column}` from {value:?}")]
    InvalidValue {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("line {line}: malformed CSV: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: csv::Error,
    },
    #[error("line {line}: {source}")]
    InvalidOdds {
        line: usize,
        #[source]
        source: OddsError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceRow {
    /// 1-based line in the source file, header included.
    #[serde(skip)]
    pub line: usize,
    pub american_moneyline: i32,
    pub fraction: Fraction,
    pub decimal: f64,
    pub implied_probability: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceTable {
    rows: Vec<ReferenceRow>,
}

/// How far a stored value may drift from the recomputed one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub decimal: f64,
    pub probability: f64,
}

impl Default for Tolerances {
    /// Half a unit in the last place the table is usually printed to
    /// (two places for decimal odds, four for probability).
    fn default() -> Self {
        Self {
            decimal: 0.005,
            probability: 0.0005,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Fraction,
    Decimal,
    ImpliedProbability,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Fraction => COL_FRACTION,
            Field::Decimal => COL_DECIMAL,
            Field::ImpliedProbability => COL_PROBABILITY,
        };
        f.write_str(name)
    }
}

/// A stored value that disagrees with the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discrepancy {
    pub line: usize,
    pub american_moneyline: i32,
    pub field: Field,
    pub expected: String,
    pub found: String,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {} ({}): {} expected {}, found {}",
            self.line,
            format_american(self.american_moneyline),
            self.field,
            self.expected,
            self.found
        )
    }
}

/// One record as it appears in the file, borrowed from the `csv` record.
/// Columns are matched by (lower-cased) header name; any others are ignored.
#[derive(Debug, Deserialize)]
struct RawRow<'a> {
    american_moneyline: &'a str,
    fraction: &'a str,
    decimal: &'a str,
    implied_probability: &'a str,
}

fn parse_american(raw: &str, line: usize) -> Result<i32, TableError> {
    let invalid = || TableError::InvalidValue {
        line,
        column: COL_AMERICAN,
        value: raw.to_string(),
    };
    let cleaned = raw.trim_start_matches('+');
    if let Ok(v) = cleaned.parse::<i32>() {
        return Ok(v);
    }
    // Spreadsheet exports often write whole numbers as "-110.0".
    let v = cleaned.parse::<f64>().map_err(|_| invalid())?;
    if v.fract() != 0.0 || v < i32::MIN as f64 || v > i32::MAX as f64 {
        return Err(invalid());
    }
    Ok(v as i32)
}

fn parse_real(raw: &str, line: usize, column: &'static str) -> Result<f64, TableError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TableError::InvalidValue {
            line,
            column,
            value: raw.to_string(),
        })
}

fn record_line(position: Option<&csv::Position>) -> usize {
    position.map_or(0, |p| p.line() as usize)
}

impl ReferenceTable {
    pub fn from_rows(rows: Vec<ReferenceRow>) -> Self {
        Self { rows }
    }

    pub fn parse(content: &str) -> Result<Self, TableError> {
        // Strip BOM if present (common on spreadsheet exports)
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let malformed = |source: csv::Error| TableError::Malformed {
            line: record_line(source.position()),
            source,
        };

        let headers: csv::StringRecord = reader
            .headers()
            .map_err(malformed)?
            .iter()
            .map(str::to_ascii_lowercase)
            .collect();
        if headers.iter().all(str::is_empty) {
            return Err(TableError::Empty);
        }
        for column in [COL_AMERICAN, COL_FRACTION, COL_DECIMAL, COL_PROBABILITY] {
            if !headers.iter().any(|h| h == column) {
                return Err(TableError::MissingColumn(column));
            }
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(malformed)?;
            let line = record_line(record.position());
            let raw: RawRow<'_> = record.deserialize(Some(&headers)).map_err(malformed)?;

            let american_moneyline = parse_american(raw.american_moneyline, line)?;
            if american_moneyline == 0 {
                return Err(TableError::InvalidOdds {
                    line,
                    source: InvalidOddsReason::ZeroAmerican.into(),
                });
            }
            let fraction: Fraction = raw
                .fraction
                .parse()
                .map_err(|source| TableError::InvalidOdds { line, source })?;

            rows.push(ReferenceRow {
                line,
                american_moneyline,
                fraction,
                decimal: parse_real(raw.decimal, line, COL_DECIMAL)?,
                implied_probability: parse_real(raw.implied_probability, line, COL_PROBABILITY)?,
            });
        }

        Ok(Self { rows })
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        let content = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), rows = table.len(), "loaded reference table");
        Ok(table)
    }

    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn lookup(&self, american_moneyline: i32) -> Option<&ReferenceRow> {
        self.rows
            .iter()
            .find(|r| r.american_moneyline == american_moneyline)
    }

    /// Row whose stored probability is closest to `probability`.
    pub fn nearest_by_probability(&self, probability: f64) -> Option<&ReferenceRow> {
        self.rows.iter().min_by(|a, b| {
            let da = (a.implied_probability - probability).abs();
            let db = (b.implied_probability - probability).abs();
            da.partial_cmp(&db).unwrap_or(Ordering::Equal)
        })
    }

    /// Recompute every row from its American price and report the fields that
    /// disagree. An empty result means the table is consistent. A row the
    /// engine cannot price at all is an error naming its line.
    pub fn cross_check(
        &self,
        tolerances: &Tolerances,
        max_denominator: u64,
    ) -> Result<Vec<Discrepancy>, TableError> {
        let mut out = Vec::new();
        for row in &self.rows {
            let quote = OddsInput::American(row.american_moneyline)
                .quote(max_denominator)
                .map_err(|source| TableError::InvalidOdds {
                    line: row.line,
                    source,
                })?;

            let mut report = |field, expected: String, found: String| {
                out.push(Discrepancy {
                    line: row.line,
                    american_moneyline: row.american_moneyline,
                    field,
                    expected,
                    found,
                });
            };

            if quote.fraction != row.fraction {
                report(Field::Fraction, quote.fraction.to_string(), row.fraction.to_string());
            }
            if (quote.decimal - row.decimal).abs() > tolerances.decimal {
                report(
                    Field::Decimal,
                    format!("{:.2}", quote.decimal),
                    row.decimal.to_string(),
                );
            }
            if (quote.implied_probability - row.implied_probability).abs() > tolerances.probability
            {
                report(
                    Field::ImpliedProbability,
                    format!("{:.4}", quote.implied_probability),
                    row.implied_probability.to_string(),
                );
            }
        }
        Ok(out)
    }
}
