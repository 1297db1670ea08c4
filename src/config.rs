//! # Session Configuration
//!
//! Timing used by print sessions and status checks.
//!
//! | Setting | Default | Used for |
//! |---------|---------|----------|
//! | `open_timeout` | 10 s | Opening the port, begin-checked-block status |
//! | `print_settle` | 100 ms | Pause between open and the first status query when printing |
//! | `status_settle` | 500 ms | Pause between open and the status query of a status check |
//! | `end_check_timeout` | 30 s | Status query after the write |
//!
//! ```
//! use cometa::config::SessionConfig;
//! use std::time::Duration;
//!
//! let config = SessionConfig {
//!     end_check_timeout: Duration::from_secs(60),
//!     ..SessionConfig::default()
//! };
//! assert!(config.end_check_timeout > config.open_timeout);
//! ```

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub open_timeout: Duration,
    pub print_settle: Duration,
    pub status_settle: Duration,
    pub end_check_timeout: Duration,
}

impl SessionConfig {
    pub const DEFAULT: Self = Self {
        open_timeout: Duration::from_secs(10),
        print_settle: Duration::from_millis(100),
        status_settle: Duration::from_millis(500),
        end_check_timeout: Duration::from_secs(30),
    };

    /// No settle delays, short timeouts. For mock ports in tests.
    pub const IMMEDIATE: Self = Self {
        open_timeout: Duration::from_millis(100),
        print_settle: Duration::ZERO,
        status_settle: Duration::ZERO,
        end_check_timeout: Duration::from_millis(300),
    };
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
