//! Lock timing configuration
//!
//! A handle needs two durations: the lease `timeout` (TTL written into every record)
//! and the `poll_interval` between attempts when polling. Both have defaults, so an
//! empty configuration is valid.
//!
//! # Example Config
//!
//! ```toml
//! timeout_ms = 30000
//! poll_interval_ms = 250
//! ```
//!
//! # Module Structure
//!
//! - `types`: `LockOptions` definition and its serde representation
//! - `defaults`: default values
//! - `load`: parsing from TOML text and files
//! - `validate`: construction-time validation

mod defaults;
mod load;
mod types;
mod validate;

pub use defaults::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
pub use load::load_toml_file;
pub use types::LockOptions;
