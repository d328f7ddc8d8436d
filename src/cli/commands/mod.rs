//! CLI command implementations

pub mod classify;
pub mod config;
pub mod inspect;
pub mod join;
pub mod run;

pub use classify::execute as classify;
pub use config::execute as config;
pub use inspect::execute as inspect;
pub use join::execute as join;
pub use run::execute as run;
