// Kernel module management

pub mod command;
pub mod resilience;
pub mod service;


pub use command::{output_or_empty, CommandRunner, SystemCommandRunner, ToolPaths};
pub use resilience::{RecoveryStrategy, RetryPolicy};
pub use service::{KernelModuleService, Readiness, Service, DEFAULT_TARGET_TYPE, DEFAULT_WAIT_ATTEMPTS};

#[cfg(test)]
pub use command::MockCommandRunner;
