//! Terminal output
//!
//! Styled in an interactive terminal, plain `[OK]`/`[WARN]` prefixes when
//! output is piped or running under CI.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{intro, key_value, outro_success, section, step_ok, step_warn};
pub use progress::project_bar;
