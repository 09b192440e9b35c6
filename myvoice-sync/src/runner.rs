//! Remote runner: the only code that spawns processes.
//!
//! A non-zero exit is not an error here; callers inspect [`GitOutput::code`].
//! [`RunnerError`] covers only "the process could not be run to completion":
//! spawn failure, wait failure, or the bounded wait expiring.

use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use myvoice_core::DEFAULT_GIT_TIMEOUT;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Minimum wait for pipe readers after exit, so output already buffered in a
/// pipe is not lost when the process exits right at the deadline.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Captured result of one finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GitOutput {
    /// Exit code; `-1` when the process was terminated by a signal.
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Best human-readable failure description: stderr, else stdout, else the
    /// exit code.
    pub fn detail(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("exit code {}", self.code)
    }
}

/// Failure to run a process to completion.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {}s", .after.as_secs())]
    TimedOut { command: String, after: Duration },
}

/// Executes one version-control command in a working directory.
pub trait GitRunner {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<GitOutput, RunnerError>;
}

impl<T: GitRunner + ?Sized> GitRunner for Box<T> {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<GitOutput, RunnerError> {
        (**self).run(args, cwd)
    }
}

// ---------------------------------------------------------------------------
// ProcessGitRunner
// ---------------------------------------------------------------------------

/// Spawns the real `git` binary, one child per call, with a bounded wait.
#[derive(Debug, Clone)]
pub struct ProcessGitRunner {
    program: OsString,
    timeout: Duration,
}

impl Default for ProcessGitRunner {
    fn default() -> Self {
        Self::new(DEFAULT_GIT_TIMEOUT)
    }
}

impl ProcessGitRunner {
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("git", timeout)
    }

    /// Run `program` instead of `git`.
    pub fn with_program(program: impl Into<OsString>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl GitRunner for ProcessGitRunner {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<GitOutput, RunnerError> {
        let program = self.program_name();
        tracing::debug!("{program} {} (cwd: {})", args.join(" "), cwd.display());

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Drain both pipes concurrently so a chatty child never blocks on a
        // full pipe while we poll for exit.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::warn!(
                        "{program} {} killed after {}s",
                        args.join(" "),
                        self.timeout.as_secs()
                    );
                    return Err(RunnerError::TimedOut {
                        command: format!("{program} {}", args.join(" ")),
                        after: self.timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RunnerError::Wait { program, source });
                }
            }
        };

        // A descendant (ssh ControlPersist master, credential daemon) can keep
        // the pipes open after git exits. Wait for EOF only until the deadline
        // and keep whatever was captured by then.
        Ok(GitOutput {
            code: status.code().unwrap_or(-1),
            stdout: stdout.finish(deadline),
            stderr: stderr.finish(deadline),
        })
    }
}

// ---------------------------------------------------------------------------
// Pipe draining
// ---------------------------------------------------------------------------

/// Output captured by a background reader thread.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    eof: Receiver<()>,
}

impl Drain {
    /// Wait for EOF until `deadline` (at least [`DRAIN_GRACE`]), then return
    /// what has been read. A reader still blocked is left to finish on its own.
    fn finish(self, deadline: Instant) -> String {
        let wait = deadline
            .saturating_duration_since(Instant::now())
            .max(DRAIN_GRACE);
        if self.eof.recv_timeout(wait).is_err() {
            tracing::debug!("output pipe still open after exit; keeping partial output");
        }
        String::from_utf8_lossy(&lock(&self.buf)).into_owned()
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let (tx, eof) = mpsc::channel();
    let sink = Arc::clone(&buf);
    thread::spawn(move || {
        if let Some(mut pipe) = pipe {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => lock(&sink).extend_from_slice(&chunk[..n]),
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        }
        let _ = tx.send(());
    });
    Drain { buf, eof }
}

fn lock(buf: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
