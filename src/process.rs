// src/process.rs

//! External process invocation for install and test steps
//!
//! Steps are described as an explicit [`Invocation`] (program, arguments,
//! working directory, environment) rather than a shell string, so the
//! interpreter never depends on a particular shell. Shell-form recipe steps
//! are turned into `<shell> -c <command>` invocations by the caller.
//!
//! Execution features:
//! - Timeout protection (the child is killed when the deadline passes)
//! - stdin nullification to prevent hangs
//! - Scrubbed environment: only `PATH` and the explicitly set variables
//!   reach the child

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

/// Default timeout for a single step (10 minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// A fully specified external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    pub env: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(program: impl Into<String>, workdir: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            workdir: workdir.to_path_buf(),
            env: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Run `command` through `shell -c`
    pub fn shell(shell: &str, command: &str, workdir: &Path) -> Self {
        Self::new(shell, workdir).arg("-c").arg(command)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in vars {
            self.env.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Human-readable command line for logs
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured result of a finished (or killed) process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit status, `None` if killed by a signal or by the timeout
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// stdout followed by stderr, like `2>&1` for commands that write
    /// to only one of them
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Runs invocations; the seam where a sandboxing runtime plugs in
pub trait ProcessRunner: Send + Sync {
    /// Run to completion or timeout
    ///
    /// Only failures to start or wait on the process are errors; a non-zero
    /// exit or a timeout is reported through [`ProcessOutput`].
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput>;
}

/// Runs invocations as host child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct HostRunner;

impl ProcessRunner for HostRunner {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        debug!(
            "Executing: {} (in {})",
            invocation.display(),
            invocation.workdir.display()
        );

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.workdir)
            .env_clear()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(path) = std::env::var_os("PATH") {
            command.env("PATH", path);
        }
        command.envs(&invocation.env);

        let mut child = command.spawn().map_err(|e| {
            Error::CommandFailed(format!("failed to spawn {}: {}", invocation.program, e))
        })?;

        // Drain pipes on separate threads so a chatty child cannot block on
        // a full pipe while we wait for it.
        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let (exit_code, timed_out) = wait_with_deadline(&mut child, invocation)?;

        // A killed step may leave grandchildren holding the pipes open, so
        // the readers are abandoned rather than joined after a timeout.
        let (stdout, stderr) = if timed_out {
            (String::new(), String::new())
        } else {
            (join_reader(stdout_reader), join_reader(stderr_reader))
        };

        Ok(ProcessOutput {
            exit_code,
            stdout,
            stderr,
            timed_out,
        })
    }
}

fn wait_with_deadline(child: &mut Child, invocation: &Invocation) -> Result<(Option<i32>, bool)> {
    let waited = child.wait_timeout(invocation.timeout).map_err(|e| {
        Error::CommandFailed(format!("failed to wait on {}: {}", invocation.program, e))
    })?;

    match waited {
        Some(status) => Ok((status.code(), false)),
        None => {
            warn!(
                "{} timed out after {} seconds, killing",
                invocation.program,
                invocation.timeout.as_secs()
            );
            let _ = child.kill();
            let _ = child.wait();
            Ok((None, true))
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Log captured output line by line under a phase tag
pub fn log_output(phase: &str, output: &ProcessOutput) {
    for line in output.stdout.lines() {
        info!("[{}] {}", phase, line);
    }
    for line in output.stderr.lines() {
        warn!("[{}] {}", phase, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_captures_stdout_and_exit_code() {
        let dir = scratch();
        let inv = Invocation::shell("/bin/sh", "echo hello; echo oops >&2; exit 3", dir.path());
        let out = HostRunner.run(&inv).unwrap();

        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
        assert!(!out.success());
        assert_eq!(out.combined(), "hello\noops\n");
    }

    #[test]
    fn test_runs_in_workdir() {
        let dir = scratch();
        let inv = Invocation::shell("/bin/sh", "echo ok > marker", dir.path());
        let out = HostRunner.run(&inv).unwrap();

        assert!(out.success());
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn test_environment_is_scrubbed() {
        let dir = scratch();
        let inv = Invocation::shell("/bin/sh", "echo \"[$PANTRY_PROBE][$HOME]\"", dir.path())
            .env("PANTRY_PROBE", "set");
        let out = HostRunner.run(&inv).unwrap();

        assert_eq!(out.stdout.trim(), "[set][]");
    }

    #[test]
    fn test_timeout_kills_child() {
        let dir = scratch();
        let inv = Invocation::shell("/bin/sh", "sleep 5", dir.path())
            .with_timeout(Duration::from_millis(200));
        let out = HostRunner.run(&inv).unwrap();

        assert!(out.timed_out);
        assert_eq!(out.exit_code, None);
        assert!(!out.success());
    }

    #[test]
    fn test_argv_form_needs_no_shell() {
        let dir = scratch();
        let inv = Invocation::new("echo", dir.path()).args(["a b", "c"]);
        let out = HostRunner.run(&inv).unwrap();

        assert_eq!(out.stdout, "a b c\n");
    }

    #[test]
    fn test_missing_program_is_error() {
        let dir = scratch();
        let inv = Invocation::new("/nonexistent/pantry-no-such-binary", dir.path());
        assert!(matches!(HostRunner.run(&inv), Err(Error::CommandFailed(_))));
    }

    #[test]
    fn test_display() {
        let inv = Invocation::shell("/bin/sh", "make install", Path::new("/tmp"));
        assert_eq!(inv.display(), "/bin/sh -c make install");
    }
}
