//! Dependency cache isolation
//!
//! Builds of one project share named volumes for the build tools' dependency
//! caches, so later JDK versions do not download everything again. Between
//! projects the volumes are destroyed.
//!
//! | Event | Volumes |
//! |-------|---------|
//! | Run start | purged (leftovers of a crashed run) |
//! | Build | created on demand by the runtime, mounted rw |
//! | Project committed | purged |

pub mod volume;

pub use volume::{volume_name, CacheManager, CacheVolume};
