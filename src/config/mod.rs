//! Configuration.
//!
//! `config.yaml` is read from up to two directories and merged field by field
//! over the built-in defaults:
//! 1. **Defaults** - compiled in
//! 2. **Project** - `$CWD/taskify/`
//! 3. **User** - `~/.taskify/`
//!
//! Environment variables apply last:
//! - `TASKIFY_CONFIG_PATH` - single config file, replaces both file tiers
//! - `TASKIFY_DB_PATH` - database path
//! - `TASKIFY_PORT` - HTTP port

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{merge_into, merge_tiers};
pub use types::*;
