//! Container shared types
//!
//! Describes one build container and renders it to `run` arguments that both
//! docker and podman accept.

use std::path::PathBuf;

/// A mount attached to the build container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mount {
    /// Host directory bound into the container
    Bind {
        source: PathBuf,
        target: String,
        readonly: bool,
    },
    /// Named volume, created by the runtime on first use
    Volume { name: String, target: String },
}

impl Mount {
    /// Render as a `--mount` value
    pub fn mount_arg(&self) -> String {
        match self {
            Mount::Bind {
                source,
                target,
                readonly,
            } => {
                let ro = if *readonly { ",readonly" } else { "" };
                format!("type=bind,src={},dst={}{}", source.display(), target, ro)
            }
            Mount::Volume { name, target } => format!("type=volume,src={},dst={}", name, target),
        }
    }
}

/// Container configuration for one build
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Fixed container name, so the supervisor can stop it
    pub name: String,
    /// Image reference including the tag
    pub image: String,
    /// Mounts in order
    pub mounts: Vec<Mount>,
    /// Command passed to the image
    pub command: Vec<String>,
}

impl ContainerConfig {
    /// Arguments for `<runtime> run`
    pub fn run_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "-q".to_string(),
            "--name".to_string(),
            self.name.clone(),
        ];

        for mount in &self.mounts {
            args.push("--mount".to_string());
            args.push(mount.mount_arg());
        }

        args.push(self.image.clone());
        args.extend(self.command.iter().cloned());
        args
    }
}

/// Handle on the one container that may be running at any time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    name: String,
}

impl ContainerHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
