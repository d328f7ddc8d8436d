//! Cache volume naming and purging
//!
//! Every configured cache directory is backed by one named volume that the
//! runtime creates on first use. Volumes are purged between projects so no
//! project sees artifacts downloaded by another one.

use crate::error::MatrixResult;
use crate::orchestration::{ContainerRuntime, Mount};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").expect("valid regex"));

/// Derive the volume name for a cache directory
///
/// The readable part is `image + cache_dir` with every run of non-word
/// characters collapsed to `_`. That collapsing is lossy (`/root/.tool` and
/// `/root/tool` read the same), so the first 4 bytes of the SHA-256 of the
/// raw `image + cache_dir` are appended.
pub fn volume_name(image: &str, cache_dir: &str) -> String {
    let raw = format!("{}{}", image, cache_dir);
    let readable = NON_WORD.replace_all(&raw, "_");
    let digest = Sha256::digest(raw.as_bytes());
    format!("{}_{}", readable, hex::encode(&digest[..4]))
}

/// A dependency cache directory and the volume backing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheVolume {
    /// Volume name
    pub name: String,
    /// Mount path inside the container
    pub container_path: String,
}

impl CacheVolume {
    /// Create the volume record for a cache directory
    pub fn new(image: &str, container_path: &str) -> Self {
        Self {
            name: volume_name(image, container_path),
            container_path: container_path.to_string(),
        }
    }

    /// Mount specification for a build container
    pub fn mount(&self) -> Mount {
        Mount::Volume {
            name: self.name.clone(),
            target: self.container_path.clone(),
        }
    }
}

/// Owns the set of cache volumes shared by consecutive builds
pub struct CacheManager {
    runtime: Arc<dyn ContainerRuntime>,
    volumes: Vec<CacheVolume>,
}

impl CacheManager {
    /// Create a manager for the given cache directories
    pub fn new(runtime: Arc<dyn ContainerRuntime>, image: &str, cache_dirs: &[String]) -> Self {
        let volumes = cache_dirs
            .iter()
            .map(|dir| CacheVolume::new(image, dir))
            .collect();
        Self { runtime, volumes }
    }

    /// Managed volumes, in configuration order
    pub fn volumes(&self) -> &[CacheVolume] {
        &self.volumes
    }

    /// Mounts to attach to every build container
    pub fn mounts(&self) -> Vec<Mount> {
        self.volumes.iter().map(CacheVolume::mount).collect()
    }

    /// Remove every managed volume that exists, returning how many were removed
    ///
    /// Safe to call any number of times: absent volumes are skipped.
    pub async fn purge(&self) -> MatrixResult<usize> {
        let mut removed = 0;

        for volume in &self.volumes {
            if self.runtime.volume_exists(&volume.name).await? {
                self.runtime.volume_remove(&volume.name).await?;
                debug!("Removed cache volume {}", volume.name);
                removed += 1;
            }
        }

        if removed > 0 {
            info!("Purged {} cache volume(s)", removed);
        }
        Ok(removed)
    }
}
