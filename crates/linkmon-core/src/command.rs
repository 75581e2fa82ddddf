//! External diagnostic command execution.
//!
//! Every probe shells out to a system tool (`ping`, `iw`) and pattern-matches
//! its text output. The runner never fails: a command that cannot be spawned,
//! exits non-zero, or overruns its deadline yields an empty string, which the
//! extractors turn into absent fields.

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Deadline applied to every diagnostic command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// How often a running child is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Executes one shell command line and returns its trimmed stdout.
///
/// Implementations must return an empty string on any failure. `Sync` is
/// required because the collector invokes the runner from three threads at
/// once.
pub trait CommandRunner: Sync {
    fn run(&self, command: &str) -> String;
}

/// Production runner: `sh -c <command>` with a hard deadline.
#[derive(Debug, Clone, Copy)]
pub struct ShellRunner {
    timeout: Duration,
}

impl ShellRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> String {
        run_shell_with_timeout(command, self.timeout).unwrap_or_default()
    }
}

/// Run `command` through `sh -c`, killing it if it outlives `timeout`.
///
/// Stdout is drained on a reader thread while the child runs, so output
/// larger than the pipe buffer cannot stall the child. Returns `None` on
/// spawn failure, non-zero exit, or timeout.
fn run_shell_with_timeout(command: &str, timeout: Duration) -> Option<String> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let mut stdout = child.stdout.take()?;
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let res = stdout.read_to_end(&mut buf).map(|_| buf);
        let _ = tx.send(res);
    });

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    return None;
                }
                // A backgrounded grandchild can hold the pipe open past exit.
                let wait = deadline.saturating_duration_since(Instant::now()).max(POLL_INTERVAL);
                let buf = rx.recv_timeout(wait).ok()?.ok()?;
                return Some(String::from_utf8_lossy(&buf).trim().to_string());
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    log::debug!("command timed out after {timeout:?}: {command}");
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        }
    }
}

/// Check if a program is on `PATH` by running `which`.
pub fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Single reachability probe with a one second reply wait.
pub fn ping_command(target: &str) -> String {
    format!("ping -c 1 -W 1 {target}")
}

/// Link status query (bitrates, signal).
pub fn link_command(interface: &str) -> String {
    format!("iw dev {interface} link")
}

/// Interface info query (channel, width, centre frequency, tx power).
pub fn info_command(interface: &str) -> String {
    format!("iw dev {interface} info")
}
