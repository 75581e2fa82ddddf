//! The sampling loop.
//!
//! ```text
//! Idle → Running → Completed   (end time reached)
//!                → Cancelled   (CancelToken observed at a tick boundary)
//! ```
//!
//! Each tick collects one sample, appends it, reports progress, then waits
//! `min(interval, remaining)`. Ticks are never interrupted: a cancellation
//! that arrives mid-tick takes effect after the sample has been recorded.
//! A recording error aborts the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Local;

use crate::collector::Collector;
use crate::command::CommandRunner;
use crate::error::{Error, Result};
use crate::recorder::Recorder;
use crate::sample::Sample;

/// Granularity of the inter-tick wait; bounds cancellation latency.
const WAIT_SLICE: Duration = Duration::from_millis(50);

/// Characters that would change the meaning of a shell command line.
const SHELL_META: &[char] = &[
    ';', '&', '|', '$', '`', '(', ')', '<', '>', '\'', '"', '\\', '*', '?', '[', ']', '{', '}',
    '!', '#', '~',
];

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Immutable configuration for one monitoring run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target: String,
    pub interface: String,
    pub duration: Duration,
    pub interval: Duration,
    pub output: PathBuf,
    pub chart_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            interface: "wlan0".to_string(),
            duration: Duration::from_secs(3600),
            interval: Duration::from_secs(5),
            output: default_output_path(),
            chart_dir: None,
        }
    }
}

impl RunConfig {
    /// Reject values that cannot produce a meaningful run.
    ///
    /// Target and interface are substituted into shell command lines, so they
    /// must be single words free of shell metacharacters.
    pub fn validate(&self) -> Result<()> {
        check_shell_word("target", &self.target)?;
        check_shell_word("interface", &self.interface)?;
        if self.interval.is_zero() {
            return Err(Error::invalid_config("interval must be greater than zero"));
        }
        Ok(())
    }
}

fn check_shell_word(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_config(format!("{what} must not be empty")));
    }
    if value.chars().any(|c| c.is_whitespace() || SHELL_META.contains(&c)) {
        return Err(Error::invalid_config(format!(
            "{what} '{value}' contains whitespace or shell metacharacters"
        )));
    }
    Ok(())
}

/// Timestamp-derived stem shared by the default output file and chart dir.
pub fn default_stem() -> String {
    format!("network_monitor_{}", Local::now().format("%Y%m%d_%H%M%S"))
}

/// `network_monitor_YYYYmmdd_HHMMSS.csv` in the working directory.
pub fn default_output_path() -> PathBuf {
    PathBuf::from(format!("{}.csv", default_stem()))
}

/// Chart directory paired with an output file: `<stem>_charts` next to it.
pub fn default_chart_dir(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(default_stem);
    output.with_file_name(format!("{stem}_charts"))
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cloneable cancellation handle. The loop polls it at tick boundaries and
/// during the inter-tick wait.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Run state and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub samples: u64,
    pub output: PathBuf,
    pub elapsed: Duration,
}

/// Progress snapshot handed to the tick callback.
#[derive(Debug)]
pub struct TickProgress<'a> {
    /// 1-based tick number.
    pub tick: u64,
    pub elapsed: Duration,
    pub remaining: Duration,
    pub sample: &'a Sample,
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// Drives collection and recording for one run.
pub struct Monitor<R> {
    config: RunConfig,
    collector: Collector<R>,
    recorder: Recorder,
    state: RunState,
}

impl<R: CommandRunner> Monitor<R> {
    /// Validate `config` and wire a collector around `runner`.
    pub fn new(config: RunConfig, runner: R) -> Result<Self> {
        config.validate()?;
        let collector = Collector::new(runner, &config.target, &config.interface);
        let recorder = Recorder::new(config.output.clone());
        Ok(Self {
            config,
            collector,
            recorder,
            state: RunState::Idle,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run until the configured duration elapses or `cancel` fires.
    ///
    /// `on_tick` is called after each sample has been recorded.
    pub fn run<F>(&mut self, cancel: &CancelToken, mut on_tick: F) -> Result<RunSummary>
    where
        F: FnMut(&TickProgress<'_>),
    {
        self.recorder.write_header()?;
        self.state = RunState::Running;

        let start = Instant::now();
        // Durations past the platform clock's range never end on their own.
        let end = start.checked_add(self.config.duration);
        let mut tick = 0u64;

        log::info!(
            "monitoring {} via {} for {}s every {}s -> {}",
            self.config.target,
            self.config.interface,
            self.config.duration.as_secs(),
            self.config.interval.as_secs_f64(),
            self.config.output.display()
        );

        let outcome = loop {
            if cancel.is_cancelled() {
                break RunOutcome::Cancelled;
            }
            if end.is_some_and(|end| Instant::now() >= end) {
                break RunOutcome::Completed;
            }

            let sample = self.collector.collect();
            if let Err(e) = self.recorder.append(&sample) {
                log::error!("failed to record sample to {}: {e}", self.config.output.display());
                return Err(e);
            }
            tick += 1;
            log::debug!("tick {tick}: {sample:?}");

            let now = Instant::now();
            let remaining = end.map_or(Duration::MAX, |end| end.saturating_duration_since(now));
            on_tick(&TickProgress {
                tick,
                elapsed: now.duration_since(start),
                remaining,
                sample: &sample,
            });

            wait(self.config.interval.min(remaining), cancel);
        };

        self.state = match outcome {
            RunOutcome::Completed => RunState::Completed,
            RunOutcome::Cancelled => RunState::Cancelled,
        };
        log::info!("monitoring {outcome} after {tick} samples");

        Ok(RunSummary {
            outcome,
            samples: self.recorder.rows_written(),
            output: self.config.output.clone(),
            elapsed: start.elapsed(),
        })
    }
}

/// Sleep for `total`, returning early once `cancel` fires.
fn wait(total: Duration, cancel: &CancelToken) {
    let deadline = Instant::now() + total;
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() || cancel.is_cancelled() {
            return;
        }
        std::thread::sleep(left.min(WAIT_SLICE));
    }
}

/// Format whole seconds as `HH:MM:SS`; hours are not wrapped at 24.
pub fn format_hms(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl CommandRunner for Silent {
        fn run(&self, _command: &str) -> String {
            String::new()
        }
    }

    fn config(dir: &Path, duration_ms: u64, interval_ms: u64) -> RunConfig {
        RunConfig {
            target: "192.168.1.1".to_string(),
            duration: Duration::from_millis(duration_ms),
            interval: Duration::from_millis(interval_ms),
            output: dir.join("run.csv"),
            ..Default::default()
        }
    }

    // -----------------------------------------------------------------------
    // RunConfig
    // -----------------------------------------------------------------------

    #[test]
    fn default_config_values() {
        let c = RunConfig::default();
        assert_eq!(c.interface, "wlan0");
        assert_eq!(c.duration, Duration::from_secs(3600));
        assert_eq!(c.interval, Duration::from_secs(5));
        let name = c.output.to_string_lossy().into_owned();
        assert!(name.starts_with("network_monitor_"));
        assert!(name.ends_with(".csv"));
        assert!(c.chart_dir.is_none());
    }

    #[test]
    fn validate_accepts_hostnames_and_ipv6() {
        for target in ["192.168.1.1", "router.lan", "fe80::1%wlan0"] {
            let c = RunConfig {
                target: target.to_string(),
                ..Default::default()
            };
            assert!(c.validate().is_ok(), "{target} rejected");
        }
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad = [
            RunConfig::default(),
            RunConfig {
                target: "1.1.1.1; rm -rf /".to_string(),
                ..Default::default()
            },
            RunConfig {
                target: "1.1.1.1".to_string(),
                interface: "wlan0 link".to_string(),
                ..Default::default()
            },
            RunConfig {
                target: "1.1.1.1".to_string(),
                interval: Duration::ZERO,
                ..Default::default()
            },
        ];
        for c in bad {
            assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))), "{c:?}");
        }
    }

    #[test]
    fn chart_dir_follows_output_stem() {
        let dir = default_chart_dir(Path::new("/tmp/out/net_run.csv"));
        assert_eq!(dir, PathBuf::from("/tmp/out/net_run_charts"));
    }

    // -----------------------------------------------------------------------
    // CancelToken
    // -----------------------------------------------------------------------

    #[test]
    fn cancel_token_shared_between_clones() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }

    // -----------------------------------------------------------------------
    // Sampling loop
    // -----------------------------------------------------------------------

    #[test]
    fn monitor_starts_idle() {
        let tmp = tempfile::tempdir().unwrap();
        let m = Monitor::new(config(tmp.path(), 100, 10), Silent).unwrap();
        assert_eq!(m.state(), RunState::Idle);
    }

    #[test]
    fn monitor_rejects_invalid_config() {
        let tmp = tempfile::tempdir().unwrap();
        let mut c = config(tmp.path(), 100, 10);
        c.target.clear();
        assert!(Monitor::new(c, Silent).is_err());
    }

    #[test]
    fn run_completes_within_tick_bound() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = Monitor::new(config(tmp.path(), 300, 100), Silent).unwrap();
        let mut ticks = Vec::new();
        let summary = m
            .run(&CancelToken::new(), |p| ticks.push(p.tick))
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(m.state(), RunState::Completed);
        assert!(summary.samples >= 1 && summary.samples <= 3, "{}", summary.samples);
        assert_eq!(ticks, (1..=summary.samples).collect::<Vec<_>>());

        let text = std::fs::read_to_string(&summary.output).unwrap();
        assert_eq!(text.lines().count() as u64, summary.samples + 1);
    }

    #[test]
    fn interval_longer_than_duration_yields_one_sample() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = Monitor::new(config(tmp.path(), 100, 5_000), Silent).unwrap();
        let t0 = Instant::now();
        let summary = m.run(&CancelToken::new(), |_| {}).unwrap();
        assert_eq!(summary.samples, 1);
        // The wait is capped at the remaining duration.
        assert!(t0.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn cancel_after_first_tick_records_exactly_one_sample() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = Monitor::new(config(tmp.path(), 3_600_000, 5_000), Silent).unwrap();
        let cancel = CancelToken::new();
        let handle = cancel.clone();

        let t0 = Instant::now();
        let summary = m.run(&cancel, |_| handle.cancel()).unwrap();

        assert_eq!(summary.outcome, RunOutcome::Cancelled);
        assert_eq!(m.state(), RunState::Cancelled);
        assert_eq!(summary.samples, 1);
        assert!(t0.elapsed() < Duration::from_secs(2));

        let text = std::fs::read_to_string(tmp.path().join("run.csv")).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn unbounded_duration_runs_until_cancelled() {
        let tmp = tempfile::tempdir().unwrap();
        let mut c = config(tmp.path(), 0, 5_000);
        c.duration = Duration::from_secs(u64::MAX);
        let mut m = Monitor::new(c, Silent).unwrap();
        let cancel = CancelToken::new();
        let handle = cancel.clone();

        let mut remaining = Vec::new();
        let summary = m
            .run(&cancel, |p| {
                remaining.push(p.remaining);
                handle.cancel();
            })
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::Cancelled);
        assert_eq!(summary.samples, 1);
        assert!(remaining[0] > Duration::from_secs(365 * 24 * 3600));
    }

    #[test]
    fn cancel_mid_tick_still_records_in_flight_sample() {
        struct CancelDuringProbe(CancelToken);
        impl CommandRunner for CancelDuringProbe {
            fn run(&self, command: &str) -> String {
                if command.starts_with("ping") {
                    self.0.cancel();
                    return "time=12.5 ms".to_string();
                }
                String::new()
            }
        }

        let tmp = tempfile::tempdir().unwrap();
        let cancel = CancelToken::new();
        let runner = CancelDuringProbe(cancel.clone());
        let mut m = Monitor::new(config(tmp.path(), 3_600_000, 5_000), runner).unwrap();
        let summary = m.run(&cancel, |_| {}).unwrap();

        assert_eq!(summary.outcome, RunOutcome::Cancelled);
        assert_eq!(summary.samples, 1);
        let text = std::fs::read_to_string(tmp.path().join("run.csv")).unwrap();
        assert!(text.lines().nth(1).unwrap().contains(",12.5,"));
    }

    #[test]
    fn cancelled_before_start_writes_header_only() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = Monitor::new(config(tmp.path(), 1_000, 100), Silent).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let summary = m.run(&cancel, |_| {}).unwrap();
        assert_eq!(summary.samples, 0);
        assert_eq!(summary.outcome, RunOutcome::Cancelled);
        let text = std::fs::read_to_string(tmp.path().join("run.csv")).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn unwritable_output_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let mut c = config(tmp.path(), 1_000, 100);
        c.output = tmp.path().join("missing_dir").join("run.csv");
        let mut m = Monitor::new(c, Silent).unwrap();
        assert!(m.run(&CancelToken::new(), |_| {}).is_err());
    }

    #[test]
    fn progress_reports_remaining_time() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = Monitor::new(config(tmp.path(), 10_000, 5_000), Silent).unwrap();
        let cancel = CancelToken::new();
        let handle = cancel.clone();
        let mut seen = None;
        m.run(&cancel, |p| {
            seen = Some((p.elapsed, p.remaining, p.sample.is_empty()));
            handle.cancel();
        })
        .unwrap();

        let (elapsed, remaining, empty) = seen.unwrap();
        assert!(elapsed < Duration::from_secs(2));
        assert!(remaining > Duration::from_secs(8));
        assert!(empty);
    }

    // -----------------------------------------------------------------------
    // format_hms
    // -----------------------------------------------------------------------

    #[test]
    fn format_hms_values() {
        assert_eq!(format_hms(Duration::ZERO), "00:00:00");
        assert_eq!(format_hms(Duration::from_secs(59)), "00:00:59");
        assert_eq!(format_hms(Duration::from_secs(3600)), "01:00:00");
        assert_eq!(format_hms(Duration::from_millis(3_725_900)), "01:02:05");
        assert_eq!(format_hms(Duration::from_secs(100 * 3600)), "100:00:00");
    }
}
