//! Builds display rows from raw records and assembles the aligned table.
//!
//! The row builder decides once per pass which derived fields the requested
//! columns actually need, converts only those into a per-process value bag,
//! and renders each column's formatting rule against the bag. The only
//! supported aggregation reduces the table to the single row with the
//! smallest uptime.

use chrono::{DateTime, Duration, Local};

use crate::align;
use crate::column::{self, Column, Field, FormatRule};
use crate::error::{Error, Result};
use crate::format;
use crate::procfs::ProcessRecord;
use crate::system::{Host, SysValues};
use crate::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    MinUptime,
}

/// Derived fields required by a column set. Anything not needed is never
/// computed, so e.g. the page-size lookup is skipped entirely unless a
/// resident_size column was requested.
#[derive(Debug, Default, Clone, Copy)]
struct Needs {
    start_time: bool,
    uptime: bool,
    cpu_percent: bool,
    rss_bytes: bool,
}

impl Needs {
    fn of(columns: &[Column]) -> Needs {
        let mut needs = Needs::default();
        for column in columns {
            match column.field {
                Field::StartTime => needs.start_time = true,
                Field::Uptime => needs.uptime = true,
                Field::CpuPercent => needs.cpu_percent = true,
                Field::ResidentSize => needs.rss_bytes = true,
                Field::Pid | Field::ParentPid | Field::VirtualSize | Field::Command => {}
            }
        }
        // CPU percent is derived from the process uptime.
        if needs.cpu_percent {
            needs.uptime = true;
        }
        needs
    }
}

/// Typed values for one process, populated only for the fields the column
/// set needs.
#[derive(Debug, Clone)]
struct FieldValues {
    pid: i32,
    ppid: i64,
    command: String,
    vsize_bytes: u64,
    rss_bytes: Option<u64>,
    start_time: Option<DateTime<Local>>,
    uptime: Option<Duration>,
    cpu_percent: Option<f64>,
}

impl FieldValues {
    /// Synthetic zero-uptime stand-in used when aggregation runs over an
    /// empty record set.
    fn zero_uptime() -> FieldValues {
        FieldValues {
            pid: 0,
            ppid: 0,
            command: String::new(),
            vsize_bytes: 0,
            rss_bytes: None,
            start_time: None,
            uptime: Some(Duration::zero()),
            cpu_percent: None,
        }
    }
}

/// Fails fast when an aggregation directive does not fit the column list.
/// Min-uptime aggregation is defined only for exactly one uptime column.
pub fn validate_aggregate(columns: &[Column], aggregate: Option<Aggregate>) -> Result<()> {
    if aggregate.is_some() && !(columns.len() == 1 && columns[0].field == Field::Uptime) {
        return Err(Error::InvalidAggregation);
    }
    Ok(())
}

/// Renders the full table: one line per row (plus an optional header), all
/// cells aligned and joined with exactly two spaces.
pub fn render_table<H: Host>(
    columns: &[Column],
    records: &[ProcessRecord],
    aggregate: Option<Aggregate>,
    headers: bool,
    sys: &SysValues<H>,
    now: DateTime<Local>,
) -> Result<Vec<String>> {
    let rows = build_rows(columns, records, aggregate, sys, now)?;

    let mut table = Vec::with_capacity(1 + rows.len());
    if headers {
        table.push(column::header(columns));
    }
    table.extend(rows);

    // No records and no header leaves nothing to align or print. A valid
    // service with no running processes is not an error.
    if table.is_empty() {
        return Ok(Vec::new());
    }

    let aligned = align::align_columns(&table, &column::alignments(columns))?;
    Ok(aligned.into_iter().map(|row| row.join("  ")).collect())
}

/// One row per record in input order, or a single row when aggregating.
fn build_rows<H: Host>(
    columns: &[Column],
    records: &[ProcessRecord],
    aggregate: Option<Aggregate>,
    sys: &SysValues<H>,
    now: DateTime<Local>,
) -> Result<Vec<Vec<String>>> {
    validate_aggregate(columns, aggregate)?;

    let needs = Needs::of(columns);
    let mut bags = Vec::with_capacity(records.len());
    for record in records {
        bags.push(build_values(record, needs, sys)?);
    }

    if let Some(Aggregate::MinUptime) = aggregate {
        let bag = min_uptime_bag(bags);
        return Ok(vec![render_row(columns, &bag, now)]);
    }

    Ok(bags
        .iter()
        .map(|bag| render_row(columns, bag, now))
        .collect())
}

/// Selects the bag with the smallest uptime; ties keep the first one seen.
/// An empty input yields the synthetic zero-uptime bag.
fn min_uptime_bag(bags: Vec<FieldValues>) -> FieldValues {
    let mut min: Option<FieldValues> = None;
    for bag in bags {
        let current = bag.uptime.unwrap_or_else(Duration::zero);
        match &min {
            Some(best) if current >= best.uptime.unwrap_or_else(Duration::zero) => {}
            _ => min = Some(bag),
        }
    }
    min.unwrap_or_else(FieldValues::zero_uptime)
}

fn build_values<H: Host>(
    record: &ProcessRecord,
    needs: Needs,
    sys: &SysValues<H>,
) -> Result<FieldValues> {
    let mut values = FieldValues {
        pid: record.pid,
        ppid: record.ppid,
        command: record.command.clone(),
        vsize_bytes: record.vsize_bytes,
        rss_bytes: None,
        start_time: None,
        uptime: None,
        cpu_percent: None,
    };

    if needs.rss_bytes {
        values.rss_bytes = Some(units::pages_to_bytes(record.rss_pages, sys.page_size()?));
    }
    if needs.start_time {
        values.start_time = Some(units::start_time(
            sys.boot_time()?,
            record.start_time_ticks,
            sys.clock_ticks_per_second()?,
        ));
    }
    if needs.uptime {
        let ticks = sys.clock_ticks_per_second()?;
        let uptime = sys.uptime()?
            - units::ticks_to_duration(record.start_time_ticks, ticks);
        let uptime = Duration::seconds(uptime.num_seconds());
        values.uptime = Some(uptime);
        if needs.cpu_percent {
            values.cpu_percent = Some(units::cpu_percent(
                record.utime_ticks,
                record.stime_ticks,
                uptime,
                ticks,
            )?);
        }
    }
    Ok(values)
}

fn render_row(columns: &[Column], values: &FieldValues, now: DateTime<Local>) -> Vec<String> {
    columns
        .iter()
        .map(|column| render_cell(column, values, now))
        .collect()
}

fn render_cell(column: &Column, values: &FieldValues, now: DateTime<Local>) -> String {
    match (column.field, &column.format) {
        (Field::Pid, _) => values.pid.to_string(),
        (Field::ParentPid, _) => values.ppid.to_string(),
        (Field::Command, _) => values.command.clone(),
        (Field::CpuPercent, _) => values.cpu_percent.unwrap_or_default().to_string(),
        (Field::VirtualSize, FormatRule::IecBytes) => format::iec_bytes(values.vsize_bytes),
        (Field::VirtualSize, _) => values.vsize_bytes.to_string(),
        (Field::ResidentSize, FormatRule::IecBytes) => {
            format::iec_bytes(values.rss_bytes.unwrap_or_default())
        }
        (Field::ResidentSize, _) => values.rss_bytes.unwrap_or_default().to_string(),
        (Field::StartTime, rule) => {
            let start = match values.start_time {
                Some(start) => start,
                None => return String::new(),
            };
            match rule {
                FormatRule::TimeLayout(layout) => start.format(layout).to_string(),
                FormatRule::RelativeTime => format::relative_time(start, now),
                _ => start.to_string(),
            }
        }
        (Field::Uptime, rule) => {
            let secs = values.uptime.unwrap_or_else(Duration::zero).num_seconds();
            match rule {
                FormatRule::Seconds => secs.to_string(),
                FormatRule::Duration => format::long_duration(secs),
                _ => format::short_duration(secs),
            }
        }
    }
}
