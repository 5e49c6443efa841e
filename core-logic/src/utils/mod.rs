//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

pub(crate) mod logger;
pub(crate) mod retry;

pub use logger::{setup_logger, RESULT_TARGET};
pub use retry::{is_rate_limited, with_countdown_retry, RetryError};
