//! Orchestration module for container runtimes
//!
//! Builds run in throwaway containers launched through the docker or podman
//! CLI. Only one container exists at a time, under a fixed name.

mod cli_runtime;
pub mod container;
mod factory;
#[cfg(test)]
pub(crate) mod fake;
mod runtime;

pub use cli_runtime::CliRuntime;
pub use container::{ContainerConfig, ContainerHandle, Mount};
pub use factory::{create_runtime, SUPPORTED_RUNTIMES};
pub use runtime::ContainerRuntime;
