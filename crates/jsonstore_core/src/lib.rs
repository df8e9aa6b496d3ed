//! Embedded JSON document store.
//! Records live as one JSON file per resource, grouped into collection
//! directories under a single root.

pub mod codec;
pub mod driver;
pub mod error;
pub mod lock;
pub mod logger;
pub mod logging;
pub mod path;

pub use driver::{Driver, Options};
pub use error::{StoreError, StoreResult};
pub use lock::LockRegistry;
pub use logger::{ConsoleLogger, FacadeLogger, LogLevel, Logger};
pub use logging::{
    default_log_level, init_console_logging, init_logging, logging_status, LogDestination,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
