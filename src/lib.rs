//! svcps library
//!
//! Everything needed to turn a list of systemd service names into an
//! aligned process table: service-to-PID resolution, raw /proc record
//! reads, unit conversion, per-column formatting, and alignment.
//!
//! The pipeline is assembled in [`render::render_table`]; the binary in
//! `main.rs` is a thin wrapper around it.

pub mod align;
pub mod cli;
pub mod column;
pub mod config;
pub mod error;
pub mod format;
pub mod procfs;
pub mod render;
pub mod services;
pub mod system;
pub mod units;
