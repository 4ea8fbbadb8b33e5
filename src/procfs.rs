//! Raw per-process records read from /proc/<pid>/stat and cmdline.
//!
//! Numeric fields are parsed eagerly at read time; a malformed field fails
//! the read for that PID instead of surfacing later during rendering.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Everything the row builder needs for one process, parsed from two files.
///
/// vsize (stat field 23) is already in bytes; rss (field 24) counts pages.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    pub pid: i32,
    pub ppid: i64,
    pub utime_ticks: u64,
    pub stime_ticks: u64,
    pub start_time_ticks: u64,
    pub vsize_bytes: u64,
    pub rss_pages: u64,
    pub command: String,
}

#[derive(Debug)]
struct StatFields {
    ppid: i64,
    utime_ticks: u64,
    stime_ticks: u64,
    start_time_ticks: u64,
    vsize_bytes: u64,
    rss_pages: u64,
}

/// Reads and joins /proc/<pid>/stat and /proc/<pid>/cmdline.
pub fn read_record(proc_root: &Path, pid: i32) -> Result<ProcessRecord> {
    let stat = read_stat(proc_root, pid)?;
    let command = read_cmdline(proc_root, pid)?;
    Ok(ProcessRecord {
        pid,
        ppid: stat.ppid,
        utime_ticks: stat.utime_ticks,
        stime_ticks: stat.stime_ticks,
        start_time_ticks: stat.start_time_ticks,
        vsize_bytes: stat.vsize_bytes,
        rss_pages: stat.rss_pages,
        command,
    })
}

/// Dispatches one read task per PID and awaits them all before returning.
/// Failures are collected, not short-circuited: one failure propagates
/// as-is, several combine into a multi-cause error. There is no partial
/// success; any failed PID aborts the whole read.
pub async fn read_records(proc_root: &Path, pids: &[i32]) -> Result<Vec<ProcessRecord>> {
    let mut tasks = Vec::with_capacity(pids.len());
    for &pid in pids {
        let root = proc_root.to_path_buf();
        tasks.push(tokio::spawn(async move { read_record(&root, pid) }));
    }

    let mut records = Vec::with_capacity(tasks.len());
    let mut errors = Vec::new();
    for task in tasks {
        match task.await {
            Ok(Ok(record)) => records.push(record),
            Ok(Err(err)) => errors.push(err),
            Err(err) => errors.push(Error::Task(err)),
        }
    }
    Error::join(errors)?;
    Ok(records)
}

fn read_stat(proc_root: &Path, pid: i32) -> Result<StatFields> {
    let path = proc_root.join(pid.to_string()).join("stat");
    let content = fs::read_to_string(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    parse_stat_line(&path, &content)
}

/// Parses the fields of one stat line:
///
/// ```text
/// (4) ppid  (14) utime  (15) stime  (22) starttime  (23) vsize  (24) rss
/// ```
///
/// The comm field (2) may contain spaces and parentheses, so the line is
/// split after its closing ')'; field 3 (state) is then the first token.
fn parse_stat_line(path: &Path, content: &str) -> Result<StatFields> {
    let rest = content
        .rsplit_once(')')
        .map(|(_, rest)| rest)
        .ok_or_else(|| Error::Parse {
            what: "stat line",
            path: path.to_path_buf(),
            text: content.trim_end().to_string(),
        })?;
    let fields: Vec<&str> = rest.split_whitespace().collect();

    // fields[0] is stat field 3, so field N sits at index N - 3.
    const PPID: usize = 4 - 3;
    const UTIME: usize = 14 - 3;
    const STIME: usize = 15 - 3;
    const START_TIME: usize = 22 - 3;
    const VSIZE: usize = 23 - 3;
    const RSS: usize = 24 - 3;

    if fields.len() <= RSS {
        return Err(Error::Parse {
            what: "stat fields",
            path: path.to_path_buf(),
            text: content.trim_end().to_string(),
        });
    }

    Ok(StatFields {
        ppid: parse_field(path, "ppid", fields[PPID])?,
        utime_ticks: parse_field(path, "utime", fields[UTIME])?,
        stime_ticks: parse_field(path, "stime", fields[STIME])?,
        start_time_ticks: parse_field(path, "starttime", fields[START_TIME])?,
        vsize_bytes: parse_field(path, "vsize", fields[VSIZE])?,
        rss_pages: parse_field(path, "rss", fields[RSS])?,
    })
}

fn parse_field<T: std::str::FromStr>(path: &Path, what: &'static str, text: &str) -> Result<T> {
    text.parse().map_err(|_| Error::Parse {
        what,
        path: path.to_path_buf(),
        text: text.to_string(),
    })
}

/// Reads /proc/<pid>/cmdline: NUL-separated arguments with trailing NULs
/// stripped and interior NULs turned into spaces.
pub fn read_cmdline(proc_root: &Path, pid: i32) -> Result<String> {
    let path = proc_root.join(pid.to_string()).join("cmdline");
    let content = fs::read(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    let trimmed = match content.iter().rposition(|&b| b != 0) {
        Some(last) => &content[..=last],
        None => &content[..0],
    };
    let bytes: Vec<u8> = trimmed
        .iter()
        .map(|&b| if b == 0 { b' ' } else { b })
        .collect();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
