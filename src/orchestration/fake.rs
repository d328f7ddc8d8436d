//! In-memory runtime for unit tests

use super::container::{ContainerConfig, Mount};
use super::runtime::ContainerRuntime;
use crate::error::{MatrixError, MatrixResult};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

type Script = Box<dyn Fn(&ContainerConfig) -> (i32, String) + Send + Sync>;

/// Runtime whose builds are answered by a script
///
/// Volumes mounted by a build spring into existence, like they do with a
/// real runtime. Every call is recorded as a short event string.
pub struct FakeRuntime {
    script: Script,
    volumes: Mutex<HashSet<String>>,
    events: Mutex<Vec<String>>,
    hang: bool,
}

impl FakeRuntime {
    /// Every build passes with an empty log
    pub fn passing() -> Self {
        Self::scripted(|_| (0, String::new()))
    }

    pub fn scripted(script: impl Fn(&ContainerConfig) -> (i32, String) + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            volumes: Mutex::new(HashSet::new()),
            events: Mutex::new(Vec::new()),
            hang: false,
        }
    }

    /// Builds never finish
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::passing()
        }
    }

    pub fn add_volume(&self, name: &str) {
        self.volumes.lock().unwrap().insert(name.to_string());
    }

    pub fn volumes(&self) -> HashSet<String> {
        self.volumes.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn ensure_ready(&self) -> MatrixResult<()> {
        Ok(())
    }

    async fn run_to_log(&self, config: &ContainerConfig, log_path: &Path) -> MatrixResult<i32> {
        self.record(format!("run {}", config.image));
        for mount in &config.mounts {
            if let Mount::Volume { name, .. } = mount {
                self.add_volume(name);
            }
        }

        if self.hang {
            std::future::pending::<()>().await;
        }

        let (code, log) = (self.script)(config);
        std::fs::write(log_path, log).map_err(|e| MatrixError::io("writing fake log", e))?;
        Ok(code)
    }

    async fn stop(&self, name: &str, grace: Duration) -> MatrixResult<()> {
        self.record(format!("stop {} {}", name, grace.as_secs()));
        Ok(())
    }

    async fn remove(&self, name: &str) -> MatrixResult<()> {
        self.record(format!("rm {}", name));
        Ok(())
    }

    async fn volume_exists(&self, name: &str) -> MatrixResult<bool> {
        Ok(self.volumes.lock().unwrap().contains(name))
    }

    async fn volume_remove(&self, name: &str) -> MatrixResult<()> {
        self.record(format!("volume rm {}", name));
        self.volumes.lock().unwrap().remove(name);
        Ok(())
    }

    fn runtime_name(&self) -> &str {
        "fake"
    }
}
