// kmodctl - kernel module lifecycle wrapper
// Library root

pub mod app;
pub mod config;
pub mod error;
pub mod kmod;
pub mod messages;
pub mod version;

pub use kmod::{CommandRunner, KernelModuleService, Readiness, Service, SystemCommandRunner};

#[cfg(test)]
mod config_tests;
