//! External command execution.
//!
//! Everything that touches the host goes through [`CommandRunner`] so the
//! module service stays testable with mocks or fake binaries. Commands are
//! always argument vectors; nothing is interpreted by a shell.

use crate::error::CommandError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Executes one command, once.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    /// Run `argv` and return its standard output if it exits with status 0.
    fn run(&self, argv: &[String]) -> Result<String, CommandError>;
}

/// Run `argv`, returning empty output instead of an error.
pub fn output_or_empty(runner: &dyn CommandRunner, argv: &[String]) -> String {
    match runner.run(argv) {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!("Ignoring failure of '{}': {}", argv.join(" "), e);
            String::new()
        }
    }
}

/// Locations of the host utilities used to manage the module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub modprobe: String,
    pub lsmod: String,
    pub dmsetup: String,
    pub modinfo: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            modprobe: "modprobe".to_string(),
            lsmod: "lsmod".to_string(),
            dmsetup: "dmsetup".to_string(),
            modinfo: "modinfo".to_string(),
        }
    }
}

/// Runs commands as child processes with a per-attempt timeout
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl SystemCommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn wait_with_timeout(
        &self,
        command_line: &str,
        mut child: Child,
        stdout_pipe: Option<ChildStdout>,
        stderr_pipe: Option<ChildStderr>,
    ) -> Result<String, CommandError> {
        let start = Instant::now();
        let stdout_handle = spawn_output_reader(stdout_pipe);
        let stderr_handle = spawn_output_reader(stderr_pipe);
        let spawn_error = |source| CommandError::Spawn {
            command: command_line.to_string(),
            source,
        };

        let status = loop {
            if let Some(status) = child.try_wait().map_err(spawn_error)? {
                break status;
            }
            if start.elapsed() > self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandError::TimedOut {
                    command: command_line.to_string(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = join_reader(stdout_handle);
        let stderr = join_reader(stderr_handle);

        if status.success() {
            Ok(stdout)
        } else {
            Err(CommandError::Failed {
                command: command_line.to_string(),
                code: status.code(),
                stderr: stderr.trim().to_string(),
            })
        }
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, argv: &[String]) -> Result<String, CommandError> {
        let (program, args) = argv.split_first().ok_or(CommandError::EmptyCommand)?;
        let command_line = argv.join(" ");
        tracing::debug!("Running '{}'", command_line);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        self.wait_with_timeout(&command_line, child, stdout_pipe, stderr_pipe)
    }
}

fn spawn_output_reader<R>(pipe: Option<R>) -> thread::JoinHandle<String>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut reader) = pipe {
            // A read error just truncates what we report.
            let _ = reader.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_reader(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}
