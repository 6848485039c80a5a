//! Process execution utilities with timeout support
//!
//! Used for yt-dlp so a hung extractor cannot pin a handler forever.

use std::io;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Run an async Command with a timeout.
///
/// The child is killed when the timeout fires (`kill_on_drop`), and the
/// timeout is reported as `io::ErrorKind::TimedOut`.
pub async fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> io::Result<Output> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("Process timed out after {}s", timeout.as_secs()),
        )),
    }
}
