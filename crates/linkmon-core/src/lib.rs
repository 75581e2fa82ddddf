//! # linkmon-core
//!
//! **Wireless link health, one row at a time.**
//!
//! `linkmon-core` samples a wireless link at a fixed interval by shelling out
//! to `ping` and `iw`, pattern-matches their output into typed fields, and
//! appends one CSV row per sample. After the run the file can be summarized
//! (min/mean/max per field) and, with the `charts` feature, rendered to PNG.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use linkmon_core::{CancelToken, Monitor, RunConfig, ShellRunner};
//!
//! let config = RunConfig {
//!     target: "192.168.1.1".to_string(),
//!     duration: Duration::from_secs(60),
//!     ..Default::default()
//! };
//! let mut monitor = Monitor::new(config, ShellRunner::default()).unwrap();
//! let summary = monitor.run(&CancelToken::new(), |p| {
//!     println!("tick {}: latency {:?}", p.tick, p.sample.latency_ms);
//! }).unwrap();
//! println!("{} samples in {}", summary.samples, summary.output.display());
//! ```
//!
//! ## Architecture
//!
//! CommandRunner → extractors → Collector (3 probes in parallel) → Recorder
//!
//! The [`Monitor`] drives ticks until the duration elapses or its
//! [`CancelToken`] fires. Probe failures only ever produce absent fields; a
//! recording failure aborts the run.

#[cfg(feature = "charts")]
pub mod chart;
pub mod collector;
pub mod command;
pub mod error;
pub mod extract;
pub mod monitor;
pub mod recorder;
pub mod sample;
pub mod summary;

#[cfg(feature = "charts")]
pub use chart::render_charts;
pub use collector::Collector;
pub use command::{CommandRunner, DEFAULT_COMMAND_TIMEOUT, ShellRunner, command_exists};
pub use error::{Error, Result};
pub use extract::{InterfaceInfo, LinkInfo, parse_interface, parse_latency, parse_link};
pub use monitor::{
    CancelToken, Monitor, RunConfig, RunOutcome, RunState, RunSummary, TickProgress,
    default_chart_dir, default_output_path, format_hms,
};
pub use recorder::Recorder;
pub use sample::{COLUMNS, Field, Sample};
pub use summary::{FieldStats, FieldSummary, Summary, load_samples, summarize};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Whether this build can render charts.
pub const CHARTS_ENABLED: bool = cfg!(feature = "charts");
