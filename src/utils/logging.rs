//! Conditional logging macros that check a module-level `ENABLE_LOGS` flag.
//!
//! Usage:
//! ```rust,ignore
//! // In your module, define the flag first:
//! const ENABLE_LOGS: bool = true;
//!
//! // Then use the macros (they're exported at the crate root):
//! use crate::{log_info, log_warn};
//!
//! log_info!("This will log if ENABLE_LOGS is true");
//! ```

/// Conditional info logging. The calling module must define
/// `const ENABLE_LOGS: bool`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Conditional warn logging. The calling module must define
/// `const ENABLE_LOGS: bool`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Conditional error logging.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}

/// Conditional debug logging, for per-keystroke detail.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}
