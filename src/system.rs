//! Host-level constants and clocks read from the kernel.
//!
//! `Host` is the seam between the rendering pipeline and the machine: boot
//! time and uptime come from /proc, page size and clock ticks from sysconf.
//! `SysValues` caches each value after its first use so a render pass sees
//! one consistent snapshot and skips lookups no column needs.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Local, TimeZone};
use once_cell::sync::OnceCell;

use crate::error::{Error, Result};

pub trait Host {
    /// Absolute timestamp the host booted.
    fn boot_time(&self) -> Result<DateTime<Local>>;
    /// Page size in bytes.
    fn page_size(&self) -> Result<u64>;
    /// Kernel CPU accounting ticks per second.
    fn clock_ticks_per_second(&self) -> Result<u64>;
    /// Time since boot, including time spent in suspend.
    fn uptime(&self) -> Result<Duration>;
}

/// The real host, backed by /proc and sysconf. The proc root is
/// configurable so tests can point it at a fake tree.
pub struct ProcHost {
    proc_root: PathBuf,
}

impl ProcHost {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: root.into(),
        }
    }
}

impl Default for ProcHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for ProcHost {
    fn boot_time(&self) -> Result<DateTime<Local>> {
        // The "btime" line of /proc/stat holds the boot time in seconds
        // since the epoch.
        let path = self.proc_root.join("stat");
        let content = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        for line in content.lines() {
            if let Some(rest) = line.strip_prefix("btime ") {
                let btime: i64 = rest.trim().parse().map_err(|_| Error::Parse {
                    what: "btime",
                    path: path.clone(),
                    text: line.to_string(),
                })?;
                return Local
                    .timestamp_opt(btime, 0)
                    .single()
                    .ok_or_else(|| Error::Parse {
                        what: "btime",
                        path: path.clone(),
                        text: line.to_string(),
                    });
            }
        }
        Err(Error::MissingField {
            what: "btime",
            path,
        })
    }

    fn page_size(&self) -> Result<u64> {
        // SAFETY: sysconf is safe to call with _SC_PAGE_SIZE; negative
        // results signal failure and are handled below.
        let size = unsafe { libc::sysconf(libc::_SC_PAGE_SIZE) };
        if size > 0 {
            Ok(size as u64)
        } else {
            Err(Error::Sysconf {
                name: "_SC_PAGE_SIZE",
            })
        }
    }

    fn clock_ticks_per_second(&self) -> Result<u64> {
        // SAFETY: sysconf is safe to call with _SC_CLK_TCK.
        let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if ticks > 0 {
            Ok(ticks as u64)
        } else {
            // 100 on every Linux architecture this tool targets.
            Ok(100)
        }
    }

    fn uptime(&self) -> Result<Duration> {
        // /proc/uptime: two float fields, the first is seconds since boot.
        let path = self.proc_root.join("uptime");
        let content = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let first = content.split_whitespace().next().unwrap_or_default();
        let secs: f64 = first.parse().map_err(|_| Error::Parse {
            what: "uptime",
            path: path.clone(),
            text: content.trim_end().to_string(),
        })?;
        Ok(Duration::milliseconds((secs * 1000.0) as i64))
    }
}

/// Initialize-once cache over a `Host`. Boot time and page size change
/// never; uptime changes continuously but is sampled once per render pass
/// so every row shares the same snapshot.
pub struct SysValues<H: Host> {
    host: H,
    boot_time: OnceCell<DateTime<Local>>,
    page_size: OnceCell<u64>,
    clock_ticks: OnceCell<u64>,
    uptime: OnceCell<Duration>,
}

impl<H: Host> SysValues<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            boot_time: OnceCell::new(),
            page_size: OnceCell::new(),
            clock_ticks: OnceCell::new(),
            uptime: OnceCell::new(),
        }
    }

    pub fn host_ref(&self) -> &H {
        &self.host
    }

    pub fn boot_time(&self) -> Result<DateTime<Local>> {
        self.boot_time
            .get_or_try_init(|| self.host.boot_time())
            .copied()
    }

    pub fn page_size(&self) -> Result<u64> {
        self.page_size
            .get_or_try_init(|| self.host.page_size())
            .copied()
    }

    pub fn clock_ticks_per_second(&self) -> Result<u64> {
        self.clock_ticks
            .get_or_try_init(|| self.host.clock_ticks_per_second())
            .copied()
    }

    pub fn uptime(&self) -> Result<Duration> {
        self.uptime.get_or_try_init(|| self.host.uptime()).copied()
    }
}
