//! Subprocess seams for the external prober and encoder.
//!
//! Both binaries are invoked with explicit argument vectors, never through a
//! shell. Invocations are bounded: a hung encoder would otherwise pin a
//! worker forever.

use std::future::Future;
use std::io;
use std::path::Path;
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

pub const FFMPEG_BIN: &str = "ffmpeg";
pub const FFPROBE_BIN: &str = "ffprobe";

/// Probes are metadata reads and finish in seconds; a fixed short bound
/// is enough.
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn run_ffprobe(&self, path: &Path) -> io::Result<Output>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EncoderRunner: Send + Sync {
    async fn run_ffmpeg(&self, args: &[String], timeout: Duration) -> io::Result<Output>;
}

/// `ffprobe` on `PATH`.
pub struct RealMediaProber;

#[async_trait]
impl MediaProber for RealMediaProber {
    async fn run_ffprobe(&self, path: &Path) -> io::Result<Output> {
        let fut = Command::new(FFPROBE_BIN)
            .arg("-v")
            .arg("error")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .arg(path)
            .kill_on_drop(true)
            .output();
        bounded(fut, PROBE_TIMEOUT).await
    }
}

/// `ffmpeg` on `PATH`.
pub struct RealEncoderRunner;

#[async_trait]
impl EncoderRunner for RealEncoderRunner {
    async fn run_ffmpeg(&self, args: &[String], timeout: Duration) -> io::Result<Output> {
        let fut = Command::new(FFMPEG_BIN)
            .args(args)
            .kill_on_drop(true)
            .output();
        bounded(fut, timeout).await
    }
}

/// `kill_on_drop` above reaps the child when the timeout cancels the wait.
async fn bounded(
    fut: impl Future<Output = io::Result<Output>>,
    limit: Duration,
) -> io::Result<Output> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("subprocess exceeded {}s", limit.as_secs()),
        )),
    }
}
