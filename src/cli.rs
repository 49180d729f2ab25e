//! Command-line front end: argument definitions and plain-text/JSON reports.

use crate::config::{parse_odds, Config, OddsType};
use crate::engine::odds::{format_american, format_percent};
use crate::engine::{evaluate, vig, OddsInput, OddsQuote, Side, WagerOutcome, WagerRequest};
use crate::table::{Discrepancy, ReferenceRow, ReferenceTable, TableCache};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgGroup, Args, Parser, Subcommand};
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Odds Converter - sports-betting odds in every notation.
#[derive(Parser, Debug)]
#[command(name = "odds-converter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: config.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert one price into every notation and price a stake
    Convert(ConvertArgs),
    /// Print the reference lookup table, or cross-check it against the engine
    Table(TableArgs),
    /// Bookmaker margin and fair probabilities for a market
    Vig(VigArgs),
    /// Read prices from stdin, one per line
    Repl,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("odds").args(["american", "decimal", "fractional"])))]
pub struct ConvertArgs {
    /// American moneyline, e.g. -110 or 150
    #[arg(long, allow_negative_numbers = true)]
    pub american: Option<i32>,

    /// Decimal price, e.g. 1.91
    #[arg(long)]
    pub decimal: Option<f64>,

    /// Fractional price, e.g. 10/11
    #[arg(long)]
    pub fractional: Option<String>,

    /// Amount staked (defaults to [defaults] stake)
    #[arg(long)]
    pub stake: Option<f64>,

    /// Your own win probability (0-1) for expected value
    #[arg(long)]
    pub estimate: Option<f64>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl ConvertArgs {
    /// The odds named on the command line, if any.
    pub fn odds_input(&self) -> Result<Option<OddsInput>> {
        if let Some(m) = self.american {
            return Ok(Some(OddsInput::American(m)));
        }
        if let Some(d) = self.decimal {
            return Ok(Some(OddsInput::Decimal(d)));
        }
        match &self.fractional {
            Some(raw) => parse_odds(OddsType::Fractional, raw).map(Some),
            None => Ok(None),
        }
    }
}

/// Arguments for the `table` subcommand.
#[derive(Args, Debug)]
pub struct TableArgs {
    /// CSV file to read (defaults to [table] path)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Recompute every row and report disagreements
    #[arg(long)]
    pub check: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `vig` subcommand.
#[derive(Args, Debug)]
pub struct VigArgs {
    /// American price of one outcome (repeatable)
    #[arg(long, allow_negative_numbers = true)]
    pub american: Vec<i32>,

    /// Decimal price of one outcome (repeatable)
    #[arg(long)]
    pub decimal: Vec<f64>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct ConvertReport {
    pub input: OddsInput,
    pub quote: OddsQuote,
    pub side: Side,
    pub wager: WagerOutcome,
}

#[derive(Debug, Serialize)]
pub struct VigReport {
    pub outcomes: Vec<OddsInput>,
    pub overround: f64,
    pub fair_probabilities: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub rows: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub discrepancies: Vec<Discrepancy>,
}

/// Currency with two places; sub-cent values print as $0.00 rather than -$0.00.
pub fn money(value: f64) -> String {
    let value = if value.abs() < 0.005 { 0.0 } else { value };
    if value < 0.0 {
        format!("-${:.2}", -value)
    } else {
        format!("${value:.2}")
    }
}

/// Guess the notation from the text alone: `N/D` is fractional, anything with
/// a decimal point is decimal. Integers are American when signed or at least
/// 100; a bare `2`..`99` is a whole-number decimal price.
pub fn detect_odds(raw: &str) -> Result<OddsInput> {
    let raw = raw.trim();
    let signed = raw.starts_with(['+', '-']);
    let odds_type = if raw.contains('/') {
        OddsType::Fractional
    } else if raw.contains('.') {
        OddsType::Decimal
    } else if !signed && raw.parse::<u32>().is_ok_and(|n| n < 100) {
        OddsType::Decimal
    } else {
        OddsType::American
    };
    parse_odds(odds_type, raw)
}

pub fn build_convert_report(
    odds: OddsInput,
    stake: f64,
    estimate: Option<f64>,
    max_denominator: u64,
) -> Result<ConvertReport> {
    let quote = odds.quote(max_denominator)?;
    let mut request = WagerRequest::new(odds, stake);
    if let Some(p) = estimate {
        request = request.with_estimate(p);
    }
    let wager = evaluate(&request)?;
    tracing::debug!(%odds, stake, ev = wager.expected_value, "priced wager");
    Ok(ConvertReport {
        input: odds,
        side: quote.side(),
        quote,
        wager,
    })
}

pub fn render_convert(report: &ConvertReport) -> Result<String, fmt::Error> {
    let q = &report.quote;
    let w = &report.wager;
    let mut out = String::new();
    writeln!(out, "  Odds             {} ({})", report.input, report.side)?;
    writeln!(out, "  Implied prob.    {}", q.probability_display())?;
    writeln!(out, "  Fractional       {}", q.fraction)?;
    writeln!(out, "  Decimal          {}", q.decimal_display())?;
    writeln!(out, "  American         {}", q.american_display())?;
    writeln!(out)?;
    writeln!(out, "  Stake            {}", money(w.stake))?;
    writeln!(out, "  Profit           {}", money(w.profit))?;
    writeln!(out, "  Total payout     {}", money(w.payout))?;
    writeln!(
        out,
        "  Win / loss       {} / {}",
        format_percent(w.win_probability),
        format_percent(w.loss_probability)
    )?;
    writeln!(out, "  Expected value   {}", money(w.expected_value))?;
    if w.edge != 0.0 {
        writeln!(out, "  Edge             {:+.1} pts", w.edge * 100.0)?;
    }
    Ok(out)
}

pub fn run_convert(config: &Config, args: &ConvertArgs) -> Result<String> {
    let odds = match args.odds_input()? {
        Some(odds) => odds,
        None => config.defaults.odds_input()?,
    };
    let stake = args.stake.unwrap_or(config.defaults.stake);
    let report = build_convert_report(odds, stake, args.estimate, config.conversion.max_denominator)?;
    if args.json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(render_convert(&report)?)
    }
}

fn render_row(row: &ReferenceRow) -> String {
    format!(
        "  {:>9}  {:>9}  {:>8.2}  {:>7}",
        format_american(row.american_moneyline),
        row.fraction.to_string(),
        row.decimal,
        format_percent(row.implied_probability)
    )
}

pub fn render_table(table: &ReferenceTable) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "  {:>9}  {:>9}  {:>8}  {:>7}",
        "American", "Fraction", "Decimal", "Implied"
    )?;
    for row in table.rows() {
        writeln!(out, "{}", render_row(row))?;
    }
    Ok(out)
}

pub fn render_check(report: &CheckReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "  {} rows checked, {} discrepancies",
        report.rows,
        report.discrepancies.len()
    )?;
    if let Some(at) = report.loaded_at {
        writeln!(out, "  loaded {}", at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    }
    for d in &report.discrepancies {
        writeln!(out, "  {d}")?;
    }
    Ok(out)
}

/// Returns the rendered output and whether the table checked clean.
pub fn run_table(config: &Config, args: &TableArgs) -> Result<(String, bool)> {
    let path = args.path.clone().unwrap_or_else(|| config.table.path.clone());
    let mut cache = TableCache::new(config.table.ttl());
    let table = cache
        .get_or_load(&path)
        .with_context(|| format!("Failed to load reference table {}", path.display()))?;

    if !args.check {
        let out = if args.json {
            serde_json::to_string_pretty(table.as_ref())?
        } else {
            render_table(&table)?
        };
        return Ok((out, true));
    }

    let discrepancies = table
        .cross_check(&config.table.tolerances(), config.conversion.max_denominator)
        .with_context(|| format!("Failed to check reference table {}", path.display()))?;
    for d in &discrepancies {
        tracing::warn!(line = d.line, field = %d.field, expected = %d.expected, found = %d.found, "reference table disagrees with engine");
    }
    let clean = discrepancies.is_empty();
    let report = CheckReport {
        rows: table.len(),
        loaded_at: cache.loaded_at(),
        discrepancies,
    };
    let out = if args.json {
        serde_json::to_string_pretty(&report)?
    } else {
        render_check(&report)?
    };
    Ok((out, clean))
}

pub fn build_vig_report(outcomes: Vec<OddsInput>) -> Result<VigReport> {
    let overround = vig::overround(&outcomes)?;
    let fair_probabilities = vig::devig(&outcomes)?;
    Ok(VigReport {
        outcomes,
        overround,
        fair_probabilities,
    })
}

pub fn render_vig(report: &VigReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "  Overround        {}", format_percent(report.overround))?;
    for (odds, fair) in report.outcomes.iter().zip(&report.fair_probabilities) {
        writeln!(out, "  {:<16} fair {}", odds.to_string(), format_percent(*fair))?;
    }
    Ok(out)
}

pub fn run_vig(args: &VigArgs) -> Result<String> {
    let outcomes: Vec<OddsInput> = args
        .american
        .iter()
        .map(|&m| OddsInput::American(m))
        .chain(args.decimal.iter().map(|&d| OddsInput::Decimal(d)))
        .collect();
    let report = build_vig_report(outcomes)?;
    if args.json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(render_vig(&report)?)
    }
}

const REPL_HELP: &str = "  <odds> [stake]   convert, e.g. `-110 50`, `+150`, `1.91`, `3`, `10/11 20`
                   (bare numbers below 100 are decimal prices)
  refresh          reload the reference table
  help             show this message
  quit             exit";

/// Interactive loop. Each line is `<odds> [stake]` in any notation, or one of
/// `refresh`, `help`, `quit`. Conversions also show the matching reference
/// table row when the table is available; the table is cached per the
/// configured refresh interval and `refresh` forces a reload.
pub fn run_repl<R: BufRead, W: Write>(config: &Config, input: R, mut out: W) -> Result<()> {
    let mut cache = TableCache::new(config.table.ttl());
    let mut table_warned = false;

    writeln!(out, "  Odds Converter. Type `help` for commands.")?;
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "quit" | "exit" => break,
            "help" => {
                writeln!(out, "{REPL_HELP}")?;
                continue;
            }
            "refresh" => {
                cache.invalidate();
                table_warned = false;
                writeln!(out, "  Reference table will reload on next lookup.")?;
                continue;
            }
            _ => {}
        }

        let mut parts = line.split_whitespace();
        let odds_text = parts.next().unwrap_or_default();
        let stake = match parts.next() {
            Some(s) => match s.trim_start_matches('$').parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    writeln!(out, "  error: {s:?} is not a stake amount")?;
                    continue;
                }
            },
            None => config.defaults.stake,
        };

        let report = detect_odds(odds_text).and_then(|odds| {
            build_convert_report(odds, stake, None, config.conversion.max_denominator)
        });
        let report = match report {
            Ok(r) => r,
            Err(e) => {
                writeln!(out, "  error: {e:#}")?;
                continue;
            }
        };
        write!(out, "{}", render_convert(&report)?)?;

        match cache.get_or_load(&config.table.path) {
            Ok(table) => {
                if let Some(row) = table.lookup(report.quote.american) {
                    writeln!(out, "  Table row       {}", render_row(row).trim_start())?;
                }
            }
            Err(e) if !table_warned => {
                tracing::warn!(error = %e, "reference table unavailable");
                table_warned = true;
            }
            Err(_) => {}
        }
        writeln!(out)?;
    }
    Ok(())
}
