// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine process runner — launch, drain and reap one engine invocation.
//
// Standard output and standard error are drained on helper threads while the
// calling thread waits, so a chatty engine can never block on a full pipe.
// The wait is bounded: once the timeout passes the child is killed and reaped.
// The same deadline covers collecting its output, since a background process
// the engine left behind can keep the pipes open after the engine exits.

use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::EngineId;
use tracing::{debug, info, warn};

/// How often a bounded wait checks whether the child has exited.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Everything an engine produced.
#[derive(Debug)]
pub struct EngineOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

/// Run `executable` with `args`, waiting at most `timeout` (`None` = forever).
///
/// A launch failure is reported as [`ScanwerkError::EngineNotFound`]; an
/// expired timeout as [`ScanwerkError::EngineTimeout`]. A non-zero exit status
/// is *not* an error: callers decide what partial output is worth.
pub fn run_engine(
    engine: EngineId,
    executable: &Path,
    args: &[OsString],
    timeout: Option<Duration>,
) -> Result<EngineOutput> {
    info!(
        engine = %engine,
        executable = %executable.display(),
        ?timeout,
        "Launching engine"
    );
    let started = Instant::now();
    let deadline = timeout.map(|limit| started + limit);

    let mut child = Command::new(executable)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| ScanwerkError::EngineNotFound {
            engine: engine.executable().to_string(),
            reason: format!("failed to launch {}: {}", executable.display(), err),
        })?;

    let readers = match spawn_readers(engine, &mut child) {
        Ok(readers) => readers,
        Err(err) => {
            kill_and_reap(engine, &mut child);
            return Err(err);
        }
    };

    let timed_out = || ScanwerkError::EngineTimeout {
        engine: engine.executable().to_string(),
        timeout: timeout.unwrap_or_default(),
    };

    let status = match deadline {
        None => child.wait()?,
        Some(deadline) => match wait_bounded(&mut child, deadline)? {
            Some(status) => status,
            None => {
                warn!(engine = %engine, ?timeout, "Engine timed out; killing it");
                kill_and_reap(engine, &mut child);
                // The readers finish on their own once the pipes close.
                return Err(timed_out());
            }
        },
    };

    let Some((stdout, stderr)) = readers.collect(engine, deadline) else {
        warn!(
            engine = %engine,
            ?timeout,
            "Engine exited but its output pipes stayed open past the deadline"
        );
        return Err(timed_out());
    };
    let elapsed = started.elapsed();
    debug!(
        engine = %engine,
        %status,
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Engine exited"
    );

    Ok(EngineOutput {
        status,
        stdout,
        stderr,
        elapsed,
    })
}

/// Poll until the child exits or `deadline` passes. `None` means it timed out.
fn wait_bounded(child: &mut Child, deadline: Instant) -> Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn kill_and_reap(engine: EngineId, child: &mut Child) {
    if let Err(err) = child.kill() {
        warn!(engine = %engine, error = %err, "Failed to kill engine process");
    }
    if let Err(err) = child.wait() {
        warn!(engine = %engine, error = %err, "Failed to reap engine process");
    }
}

// -- Pipe draining ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Buffers from the drain threads, delivered once each pipe hits EOF.
struct PipeReaders {
    receiver: Receiver<(Stream, Vec<u8>)>,
    pending: usize,
}

impl PipeReaders {
    /// Wait for every pipe to close, but not past `deadline`.
    ///
    /// `None` means the deadline passed first. A reader that died without
    /// delivering leaves its stream empty.
    fn collect(self, engine: EngineId, deadline: Option<Instant>) -> Option<(Vec<u8>, Vec<u8>)> {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        for _ in 0..self.pending {
            let received = match deadline {
                None => self.receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
                Some(deadline) => self
                    .receiver
                    .recv_timeout(deadline.saturating_duration_since(Instant::now())),
            };
            match received {
                Ok((Stream::Stdout, buffer)) => stdout = buffer,
                Ok((Stream::Stderr, buffer)) => stderr = buffer,
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => {
                    warn!(engine = %engine, "Engine output reader stopped without delivering");
                    break;
                }
            }
        }
        Some((stdout, stderr))
    }
}

fn spawn_readers(engine: EngineId, child: &mut Child) -> Result<PipeReaders> {
    let (sender, receiver) = mpsc::channel();
    let mut pending = 0;

    if let Some(pipe) = child.stdout.take() {
        drain(engine, Stream::Stdout, pipe, sender.clone())?;
        pending += 1;
    }
    if let Some(pipe) = child.stderr.take() {
        drain(engine, Stream::Stderr, pipe, sender)?;
        pending += 1;
    }
    Ok(PipeReaders { receiver, pending })
}

fn drain<R: Read + Send + 'static>(
    engine: EngineId,
    stream: Stream,
    mut pipe: R,
    sender: Sender<(Stream, Vec<u8>)>,
) -> Result<()> {
    std::thread::Builder::new()
        .name(format!("{engine}-{}", stream.as_str()))
        .spawn(move || {
            let mut buffer = Vec::new();
            if let Err(err) = pipe.read_to_end(&mut buffer) {
                warn!(
                    engine = %engine,
                    stream = stream.as_str(),
                    error = %err,
                    "Failed to read engine output"
                );
            }
            // The receiver is gone if the run already timed out.
            let _ = sender.send((stream, buffer));
        })?;
    Ok(())
}
