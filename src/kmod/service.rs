// Kernel module lifecycle service

use crate::config::Config;
use crate::error::CommandError;
use crate::kmod::command::{output_or_empty, CommandRunner, ToolPaths};
use crate::kmod::resilience::{RecoveryStrategy, RetryPolicy};
use crate::messages::{self, Messages};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Attempts per readiness check when the caller is willing to wait
pub const DEFAULT_WAIT_ATTEMPTS: usize = 20;
/// Device-mapper target registered by the VDO module
pub const DEFAULT_TARGET_TYPE: &str = "dedupe";

/// Common contract for anything the management tools start, stop and report on
pub trait Service {
    fn name(&self) -> &str;
    fn start(&self) -> Result<(), CommandError>;
    fn stop(&self) -> Result<(), CommandError>;
    fn running(&self, wait: bool) -> bool;
    fn status(&self, prefix: &str) -> Vec<String>;
}

/// Outcome of a readiness probe that could run to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    ModuleNotLoaded,
    TargetNotRegistered,
}

impl Readiness {
    pub fn label(&self) -> &'static str {
        match self {
            Readiness::Ready => "ready",
            Readiness::ModuleNotLoaded => "module not loaded",
            Readiness::TargetNotRegistered => "device-mapper target not registered",
        }
    }
}

/// Manages one kernel module on the local node.
///
/// Holds nothing but the module's name and how to reach the host tools;
/// whether the module is loaded is always asked of the system afresh.
pub struct KernelModuleService {
    name: String,
    target_type: String,
    wait_attempts: usize,
    retry_policy: RetryPolicy,
    tools: ToolPaths,
    messages: &'static Messages,
    runner: Arc<dyn CommandRunner>,
}

impl KernelModuleService {
    pub fn new(name: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "kernel module name must not be empty");

        Self {
            name,
            target_type: DEFAULT_TARGET_TYPE.to_string(),
            wait_attempts: DEFAULT_WAIT_ATTEMPTS,
            retry_policy: RetryPolicy::default(),
            tools: ToolPaths::default(),
            messages: messages::global(),
            runner,
        }
    }

    /// Build a service from validated configuration
    pub fn from_config(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self::new(config.module_name.clone(), runner)
            .with_target_type(config.target_type.clone())
            .with_wait_attempts(config.wait_attempts)
            .with_retry_policy(RetryPolicy::new(RecoveryStrategy::FixedDelay(
                Duration::from_millis(config.retry_delay_ms),
            )))
            .with_tools(config.tools.clone())
    }

    pub fn with_target_type(mut self, target_type: impl Into<String>) -> Self {
        self.target_type = target_type.into();
        self
    }

    pub fn with_wait_attempts(mut self, attempts: usize) -> Self {
        self.wait_attempts = attempts.max(1);
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_tools(mut self, tools: ToolPaths) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_messages(mut self, messages: &'static Messages) -> Self {
        self.messages = messages;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// Load the module (a no-op for modprobe if it is already loaded)
    pub fn start(&self) -> Result<(), CommandError> {
        tracing::info!("Loading kernel module {}", self.name);
        self.runner
            .run(&[self.tools.modprobe.clone(), self.name.clone()])
            .map(|_| ())
    }

    /// Unload the module
    pub fn stop(&self) -> Result<(), CommandError> {
        tracing::info!("Unloading kernel module {}", self.name);
        self.runner
            .run(&[self.tools.modprobe.clone(), "-r".to_string(), self.name.clone()])
            .map(|_| ())
    }

    /// True if the module is loaded and its device-mapper target is available.
    ///
    /// With `wait`, each check is polled up to the configured number of
    /// attempts to give a freshly loaded module time to register itself.
    pub fn running(&self, wait: bool) -> bool {
        match self.probe(wait) {
            Ok(Readiness::Ready) => true,
            Ok(readiness) => {
                tracing::debug!("Module {} is not running: {}", self.name, readiness.label());
                false
            }
            Err(e) => {
                tracing::debug!("Readiness probe for {} failed: {}", self.name, e);
                false
            }
        }
    }

    /// Readiness probe that tells "not loaded" apart from "could not ask".
    ///
    /// Missing matches are reported as a [`Readiness`]; failures of the
    /// tools themselves come back as errors.
    pub fn probe(&self, wait: bool) -> Result<Readiness, CommandError> {
        let attempts = if wait { self.wait_attempts } else { 1 };

        let lsmod = vec![self.tools.lsmod.clone()];
        match self.poll_for(&lsmod, &self.name, attempts) {
            Ok(()) => {}
            Err(CommandError::NoMatch { .. }) => return Ok(Readiness::ModuleNotLoaded),
            Err(e) => return Err(e),
        }

        let targets = vec![self.tools.dmsetup.clone(), "targets".to_string()];
        match self.poll_for(&targets, &self.target_type, attempts) {
            Ok(()) => Ok(Readiness::Ready),
            Err(CommandError::NoMatch { .. }) => Ok(Readiness::TargetNotRegistered),
            Err(e) => Err(e),
        }
    }

    /// Lines describing this module, each starting with `prefix`
    pub fn status(&self, prefix: &str) -> Vec<String> {
        let messages = self.messages;
        vec![
            format!("{}{}", prefix, messages.module_header),
            format!("{}{}{}", prefix, messages.name_label, self.name),
            format!("{}{}{}", prefix, messages.loaded_label, self.running(false)),
            format!("{}{}", prefix, messages.version_label),
            format!("{}    {}", prefix, self.version()),
        ]
    }

    /// Module name followed by any `version` lines from modinfo
    pub fn version(&self) -> String {
        let output = output_or_empty(
            self.runner.as_ref(),
            &[self.tools.modinfo.clone(), self.name.clone()],
        );

        let mut version = format!("{} ", self.name);
        for line in output.lines().filter(|line| line.starts_with("version")) {
            version.push_str(line);
        }
        version
    }

    /// Run `argv` until some line of its output contains `pattern`
    fn poll_for(&self, argv: &[String], pattern: &str, attempts: usize) -> Result<(), CommandError> {
        let operation = argv.join(" ");
        self.retry_policy.run(attempts, &operation, || {
            let output = self.runner.run(argv)?;
            if output.lines().any(|line| line.contains(pattern)) {
                Ok(())
            } else {
                Err(CommandError::NoMatch {
                    command: operation.clone(),
                    pattern: pattern.to_string(),
                })
            }
        })
    }
}

impl Service for KernelModuleService {
    fn name(&self) -> &str {
        KernelModuleService::name(self)
    }

    fn start(&self) -> Result<(), CommandError> {
        KernelModuleService::start(self)
    }

    fn stop(&self) -> Result<(), CommandError> {
        KernelModuleService::stop(self)
    }

    fn running(&self, wait: bool) -> bool {
        KernelModuleService::running(self, wait)
    }

    fn status(&self, prefix: &str) -> Vec<String> {
        KernelModuleService::status(self, prefix)
    }
}

impl fmt::Debug for KernelModuleService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelModuleService")
            .field("name", &self.name)
            .field("target_type", &self.target_type)
            .field("wait_attempts", &self.wait_attempts)
            .field("retry_policy", &self.retry_policy)
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}
