//! CLI for linkmon: record wireless link health to CSV.

mod commands;

use clap::Parser;

#[derive(Parser)]
#[command(name = "linkmon")]
#[command(about = "Monitor network metrics (ping, wireless link info) and log to CSV")]
#[command(version = linkmon_core::VERSION)]
#[command(after_help = "\
Examples:
  linkmon 192.168.1.1                    # Monitor ping to 192.168.1.1
  linkmon 8.8.8.8 -i wlan1               # Monitor ping to 8.8.8.8 on wlan1 interface
  linkmon 192.168.0.1 -d 1800 -s 10      # Monitor for 30 minutes, sample every 10 seconds
  linkmon 192.168.0.1 --charts           # Also render summary charts at the end")]
struct Cli {
    /// Target IP address or hostname to ping
    target: String,

    /// Wireless interface to monitor
    #[arg(short, long, default_value = "wlan0")]
    interface: String,

    /// Monitoring duration in seconds
    #[arg(short, long, default_value = "3600")]
    duration: u64,

    /// Sampling interval in seconds
    #[arg(short = 's', long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Output CSV file (default: network_monitor_<timestamp>.csv)
    #[arg(short, long)]
    output: Option<String>,

    /// Render summary charts after the run
    #[arg(long)]
    charts: bool,

    /// Chart output directory (implies --charts; default: <output stem>_charts)
    #[arg(long)]
    chart_dir: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    commands::record::run(commands::record::RecordCommandConfig {
        target: &cli.target,
        interface: &cli.interface,
        duration_secs: cli.duration,
        interval_secs: cli.interval,
        output: cli.output.as_deref(),
        charts: cli.charts || cli.chart_dir.is_some(),
        chart_dir: cli.chart_dir.as_deref(),
    });
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}
