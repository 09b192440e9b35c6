//! Fakes for exercising the store without processes, network, or sleeping.
//!
//! Only compiled for this crate's tests or with the `test-helpers` feature.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::clock::Clock;
use crate::runner::{GitOutput, GitRunner, RunnerError};

// ---------------------------------------------------------------------------
// ScriptedRunner
// ---------------------------------------------------------------------------

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl RecordedCall {
    /// The git subcommand (`clone`, `pull`, ...).
    pub fn subcommand(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Output(GitOutput),
    TimeOut,
}

#[derive(Debug, Default)]
struct Script {
    replies: HashMap<String, VecDeque<Reply>>,
    calls: Vec<RecordedCall>,
}

/// Replays queued replies per subcommand and records every call.
///
/// Unscripted calls succeed with empty output. A successful `clone` creates
/// `<dest>/.git` so the mirror looks cloned afterwards. Clones share state,
/// so a test can keep one handle while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, subcommand: &str, reply: Reply) -> &Self {
        self.script()
            .replies
            .entry(subcommand.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue an exact reply for the next `subcommand` call.
    pub fn reply(&self, subcommand: &str, code: i32, stdout: &str, stderr: &str) -> &Self {
        self.push(
            subcommand,
            Reply::Output(GitOutput {
                code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            }),
        )
    }

    /// Queue a successful reply with `stdout`.
    pub fn ok(&self, subcommand: &str, stdout: &str) -> &Self {
        self.reply(subcommand, 0, stdout, "")
    }

    /// Queue a failing reply (exit 1) with `stderr`.
    pub fn fail(&self, subcommand: &str, stderr: &str) -> &Self {
        self.reply(subcommand, 1, "", stderr)
    }

    /// Queue a bounded-wait expiry for the next `subcommand` call.
    pub fn time_out(&self, subcommand: &str) -> &Self {
        self.push(subcommand, Reply::TimeOut)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script().calls.clone()
    }

    /// Subcommands in call order.
    pub fn subcommands(&self) -> Vec<String> {
        self.script()
            .calls
            .iter()
            .map(|c| c.subcommand().to_string())
            .collect()
    }

    pub fn count(&self, subcommand: &str) -> usize {
        self.script()
            .calls
            .iter()
            .filter(|c| c.subcommand() == subcommand)
            .count()
    }
}

impl GitRunner for ScriptedRunner {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<GitOutput, RunnerError> {
        let subcommand = args.first().copied().unwrap_or_default().to_string();
        let reply = {
            let mut script = self.script();
            script.calls.push(RecordedCall {
                args: args.iter().map(|a| a.to_string()).collect(),
                cwd: cwd.to_path_buf(),
            });
            script
                .replies
                .get_mut(&subcommand)
                .and_then(VecDeque::pop_front)
        };

        let output = match reply {
            Some(Reply::Output(output)) => output,
            Some(Reply::TimeOut) => {
                return Err(RunnerError::TimedOut {
                    command: format!("git {}", args.join(" ")),
                    after: Duration::from_secs(1),
                })
            }
            None => GitOutput::default(),
        };

        if subcommand == "clone" && output.success() {
            if let Some(dest) = args.get(2) {
                let _ = std::fs::create_dir_all(Path::new(dest).join(".git"));
            }
        }
        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self::starting_at(start)
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now += chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}
