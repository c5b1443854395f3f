//! Logging utilities.
//!
//! Installs `env_logger` behind the `log` facade. Library code only ever
//! talks to `log`.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
