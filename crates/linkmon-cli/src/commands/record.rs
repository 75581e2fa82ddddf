//! `linkmon <target>`: sample the link until the duration elapses or Ctrl+C.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use linkmon_core::{
    CHARTS_ENABLED, CancelToken, Monitor, RunConfig, RunOutcome, ShellRunner, TickProgress,
    command_exists, default_chart_dir, default_output_path, format_hms,
};

/// Exit status when a requested chart run cannot be honoured.
const EXIT_CHARTS_UNAVAILABLE: i32 = 2;

pub struct RecordCommandConfig<'a> {
    pub target: &'a str,
    pub interface: &'a str,
    pub duration_secs: u64,
    pub interval_secs: u64,
    pub output: Option<&'a str>,
    pub charts: bool,
    pub chart_dir: Option<&'a str>,
}

/// Run the record command.
pub fn run(cfg: RecordCommandConfig<'_>) {
    let config = match resolve_config(&cfg) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Some(dir) = &config.chart_dir {
        prepare_chart_dir(dir);
    }

    let mut monitor = match Monitor::new(config, ShellRunner::default()) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    print_banner(monitor.config());

    // Set up Ctrl+C / SIGTERM handler
    let cancel = CancelToken::new();
    let c = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("\nReceived interrupt signal. Stopping monitoring...");
        c.cancel();
    }) {
        eprintln!("Warning: could not install Ctrl+C handler: {e}");
    }

    let result = monitor.run(&cancel, |p| {
        print!("\r{}", progress_line(p));
        let _ = std::io::stdout().flush();
    });

    println!();

    let summary = match result {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Recording stopped; data written so far is in {}", monitor.config().output.display());
            std::process::exit(1);
        }
    };

    match summary.outcome {
        RunOutcome::Completed => println!("Monitoring completed!"),
        RunOutcome::Cancelled => println!("Monitoring stopped early."),
    }
    println!(
        "Collected {} samples in {}",
        summary.samples,
        format_hms(summary.elapsed)
    );
    println!("Data saved to: {}", summary.output.display());

    if let Some(dir) = &monitor.config().chart_dir {
        println!();
        super::report::run(&summary.output, dir);
    }
}

/// Fill in default paths and validate, without touching the filesystem.
fn resolve_config(cfg: &RecordCommandConfig<'_>) -> linkmon_core::Result<RunConfig> {
    let output = cfg
        .output
        .map_or_else(default_output_path, PathBuf::from);
    let chart_dir = cfg.charts.then(|| {
        cfg.chart_dir
            .map_or_else(|| default_chart_dir(&output), PathBuf::from)
    });

    let config = RunConfig {
        target: cfg.target.to_string(),
        interface: cfg.interface.to_string(),
        duration: Duration::from_secs(cfg.duration_secs),
        interval: Duration::from_secs(cfg.interval_secs),
        output,
        chart_dir,
    };
    config.validate()?;
    Ok(config)
}

/// Fail fast, before any sampling, when charts were requested but cannot be
/// produced.
fn prepare_chart_dir(dir: &Path) {
    if !CHARTS_ENABLED {
        eprintln!("Error: chart output requested but this build has no chart support.");
        eprintln!("Rebuild with the `charts` feature or drop --charts/--chart-dir.");
        std::process::exit(EXIT_CHARTS_UNAVAILABLE);
    }
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("Error: cannot create chart directory {}: {e}", dir.display());
        std::process::exit(EXIT_CHARTS_UNAVAILABLE);
    }
}

fn print_banner(config: &RunConfig) {
    let secs = config.duration.as_secs();
    println!("Starting network monitoring...");
    println!("  Target IP:  {}", config.target);
    println!("  Interface:  {}", config.interface);
    println!("  Duration:   {secs} seconds ({} minutes)", secs / 60);
    println!("  Interval:   {} seconds", config.interval.as_secs());
    println!("  Output:     {}", config.output.display());
    if let Some(dir) = &config.chart_dir {
        println!("  Charts:     {}", dir.display());
    }
    for tool in ["ping", "iw"] {
        if !command_exists(tool) {
            println!("  Warning:    `{tool}` not found on PATH; its fields will be empty");
        }
    }
    println!("Press Ctrl+C to stop early");
    println!();
}

fn latency_label(latency: Option<f64>) -> String {
    latency.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn progress_line(p: &TickProgress<'_>) -> String {
    format!(
        "Elapsed: {} | Remaining: {} | Latest ping: {}ms",
        format_hms(p.elapsed),
        format_hms(p.remaining),
        latency_label(p.sample.latency_ms)
    )
}
