//! One sampling tick: three probes in parallel, merged into a [`Sample`].
//!
//! The ping, link and info queries have no data dependency on each other, so
//! they run on scoped threads and the tick costs roughly the slowest of the
//! three. Every probe is bounded by the runner's own deadline, so `collect`
//! cannot hang.

use crate::command::{CommandRunner, info_command, link_command, ping_command};
use crate::extract::{InterfaceInfo, LinkInfo, parse_interface, parse_latency, parse_link};
use crate::sample::{self, Sample};

/// Runs the three diagnostic probes for one target/interface pair.
pub struct Collector<R> {
    runner: R,
    ping_cmd: String,
    link_cmd: String,
    info_cmd: String,
}

impl<R: CommandRunner> Collector<R> {
    pub fn new(runner: R, target: &str, interface: &str) -> Self {
        Self {
            runner,
            ping_cmd: ping_command(target),
            link_cmd: link_command(interface),
            info_cmd: info_command(interface),
        }
    }

    /// Round-trip latency to the target, in ms.
    pub fn latency(&self) -> Option<f64> {
        parse_latency(&self.runner.run(&self.ping_cmd))
    }

    /// Bitrates and signal strength of the current association.
    pub fn link_info(&self) -> LinkInfo {
        parse_link(&self.runner.run(&self.link_cmd))
    }

    /// Channel parameters and transmit power.
    pub fn interface_info(&self) -> InterfaceInfo {
        parse_interface(&self.runner.run(&self.info_cmd))
    }

    /// Collect exactly one sample, waiting for all three probes.
    ///
    /// A probe thread that panics contributes absent fields rather than
    /// aborting the tick.
    pub fn collect(&self) -> Sample {
        let (latency, link, iface) = std::thread::scope(|s| {
            let ping = s.spawn(|| self.latency());
            let link = s.spawn(|| self.link_info());
            let info = s.spawn(|| self.interface_info());
            (
                ping.join().unwrap_or(None),
                link.join().unwrap_or_default(),
                info.join().unwrap_or_default(),
            )
        });

        Sample::from_parts(sample::now(), latency, link, iface)
    }
}
