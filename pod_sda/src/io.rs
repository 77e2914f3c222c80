//! Collaborator boundary.
//!
//! The core never touches hardware, sockets or files directly. Everything
//! external is reached through these traits so the cycle can be driven by
//! the flight simulator, by tests on simulated time, or by the real pod.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::net::UdpSocket;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use pod_common::command::{ActuatorIntent, CommandVector};
use pod_common::sensor::SensorSnapshot;
use pod_common::state::PodState;

use crate::state::kinematics::Kinematics;

// ─── Pod hardware ───────────────────────────────────────────────────

/// Sensor and actuator layer.
///
/// `poll` never fails: a reading that could not be obtained is simply
/// absent from the snapshot.
pub trait PodIo {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Fresh snapshot at `now` (time since run start).
    fn poll(&mut self, now: Duration) -> SensorSnapshot;

    /// Apply one actuator edge.
    fn actuate(&mut self, intent: ActuatorIntent);
}

// ─── Operator / automation ──────────────────────────────────────────

/// Read-only view of the pod handed to the command source each cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusView {
    pub state: PodState,
    pub faulted: bool,
    pub total_faults: u64,
    pub ready_to_launch: bool,
    pub kinematics: Kinematics,
    pub brake_pressure: Option<f64>,
    /// Mission elapsed time, `None` before launch.
    pub met: Option<Duration>,
    /// Time since run start.
    pub now: Duration,
    /// Log writes dropped so far.
    pub log_failures: u64,
}

/// Out-of-band requests that are not command-vector slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorRequest {
    /// Invoke `abort()` this cycle.
    pub abort: bool,
    /// Set the quit flag.
    pub quit: bool,
}

/// Operator console or automation script.
pub trait CommandSource {
    /// Update `commands` in place and return any out-of-band request.
    fn poll(&mut self, status: &StatusView, commands: &mut CommandVector) -> OperatorRequest;
}

/// Command source that never changes anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleCommands;

impl CommandSource for IdleCommands {
    fn poll(&mut self, _status: &StatusView, _commands: &mut CommandVector) -> OperatorRequest {
        OperatorRequest::default()
    }
}

// ─── Telemetry ──────────────────────────────────────────────────────

/// Datagram transport for telemetry frames.
pub trait TelemetryTransport {
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;
}

/// UDP transport to a fixed `host:port`.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind an ephemeral local port and connect to `endpoint`.
    pub fn connect(endpoint: &str) -> io::Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(endpoint)?;
        Ok(Self { socket })
    }
}

impl TelemetryTransport for UdpTransport {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.socket.send(frame).map(|_| ())
    }
}

/// In-memory transport. Records every frame; can be told to fail.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    pub frames: Vec<Vec<u8>>,
    /// When set, `send` returns an error and records nothing.
    pub fail: bool,
}

impl TelemetryTransport for MemoryTransport {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "transport down"));
        }
        self.frames.push(frame.to_vec());
        Ok(())
    }
}

// ─── Data log ───────────────────────────────────────────────────────

/// Quoted header written at the top of every session log.
pub const LOG_HEADER: &str = "\"Label\"\t\"Value\"\t\"Fault\"\t\"Time\"";

/// Append-only destination for log lines.
pub trait LogSink {
    fn write_lines(&mut self, lines: &[String]) -> io::Result<()>;
}

/// One `log_<unix-seconds>.tsv` file per session. A second session started
/// in the same second gets `log_<unix-seconds>_1.tsv`, and so on.
#[derive(Debug)]
pub struct FileLogSink {
    path: PathBuf,
    file: File,
    buffer: String,
}

impl FileLogSink {
    /// Create `directory` if needed and open a new session file.
    pub fn create(directory: &Path) -> io::Result<Self> {
        fs::create_dir_all(directory)?;
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let (path, file) = open_session_file(directory, stamp)?;
        let mut sink = Self {
            path,
            file,
            buffer: String::new(),
        };
        sink.write_lines(&[LOG_HEADER.to_string()])?;
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Never reopens an existing file.
fn open_session_file(directory: &Path, stamp: u64) -> io::Result<(PathBuf, File)> {
    for suffix in 0u32.. {
        let name = match suffix {
            0 => format!("log_{stamp}.tsv"),
            n => format!("log_{stamp}_{n}.tsv"),
        };
        let path = directory.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "no free session log name",
    ))
}

impl LogSink for FileLogSink {
    /// The whole batch goes out in one write so a failed call leaves no
    /// rows behind to be repeated on retry.
    fn write_lines(&mut self, lines: &[String]) -> io::Result<()> {
        self.buffer.clear();
        for line in lines {
            self.buffer.push_str(line);
            self.buffer.push('\n');
        }
        self.file.write_all(self.buffer.as_bytes())?;
        self.file.flush()
    }
}

/// In-memory log sink.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogSink {
    pub lines: Vec<String>,
    /// Number of successful `write_lines` calls.
    pub writes: usize,
    pub fail: bool,
}

impl LogSink for MemoryLogSink {
    fn write_lines(&mut self, lines: &[String]) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::StorageFull, "log disk full"));
        }
        self.lines.extend_from_slice(lines);
        self.writes += 1;
        Ok(())
    }
}

// ─── Time ───────────────────────────────────────────────────────────

/// Time source for rate limiting, MET and the re-pressurization timeout.
pub trait Clock {
    /// Time since the clock was created.
    fn now(&self) -> Duration;

    /// Block (or advance simulated time) for `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Simulated time. `sleep` advances instantly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.advance(duration);
    }
}
