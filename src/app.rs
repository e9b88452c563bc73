// Command dispatch for the kmodctl binary

use crate::config::Config;
use crate::error::Result;
use crate::kmod::{KernelModuleService, Readiness, SystemCommandRunner};
use std::io::Write;
use std::sync::Arc;

/// Process exit status: success, or module running/ready
pub const EXIT_OK: u8 = 0;
/// Module not running, or not ready
pub const EXIT_NOT_RUNNING: u8 = 1;
/// The readiness probe itself could not run
pub const EXIT_PROBE_FAILED: u8 = 2;

/// One operation requested on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    Running { wait: bool },
    Probe { wait: bool },
    Status { prefix: String },
    Version,
}

pub struct App {
    pub service: KernelModuleService,
}

impl App {
    pub fn new(service: KernelModuleService) -> Self {
        Self { service }
    }

    /// Service talking to the real host tools
    pub fn from_config(config: &Config) -> Self {
        let runner = Arc::new(SystemCommandRunner::new(config.command_timeout()));
        Self::new(KernelModuleService::from_config(config, runner))
    }

    /// Run `action`, writing user-facing output to `out`; returns the exit status
    pub fn execute(&self, action: &Action, out: &mut impl Write) -> Result<u8> {
        tracing::debug!("Executing {:?} for {:?}", action, self.service);

        match action {
            Action::Start => {
                self.service.start()?;
                Ok(EXIT_OK)
            }
            Action::Stop => {
                self.service.stop()?;
                Ok(EXIT_OK)
            }
            Action::Running { wait } => {
                let running = self.service.running(*wait);
                writeln!(out, "{}", running)?;
                Ok(if running { EXIT_OK } else { EXIT_NOT_RUNNING })
            }
            Action::Probe { wait } => match self.service.probe(*wait) {
                Ok(readiness) => {
                    writeln!(out, "{}: {}", self.service.name(), readiness.label())?;
                    Ok(if readiness == Readiness::Ready { EXIT_OK } else { EXIT_NOT_RUNNING })
                }
                Err(e) => {
                    writeln!(out, "{}: probe failed: {}", self.service.name(), e)?;
                    Ok(EXIT_PROBE_FAILED)
                }
            },
            Action::Status { prefix } => {
                for line in self.service.status(prefix) {
                    writeln!(out, "{}", line)?;
                }
                Ok(EXIT_OK)
            }
            Action::Version => {
                writeln!(out, "{}", self.service.version())?;
                Ok(EXIT_OK)
            }
        }
    }
}
