// Unit Tests for Logging Setup
//
// UNIT UNDER TEST: default_filter, DEFAULT_LOG_FILTER
//
// BUSINESS RESPONSIBILITY:
//   - Keeps stderr quiet unless RUST_LOG asks for log lines
//   - Honours RUST_LOG when it is set
//
// TEST COVERAGE:
//   - Filter with RUST_LOG unset
//   - Filter with RUST_LOG set (serialised)

use crate::logging::{default_filter, DEFAULT_LOG_FILTER};
use serial_test::serial;
use tracing::level_filters::LevelFilter;

#[cfg(test)]
mod default_filter_tests {
    use super::*;

    #[test]
    #[serial]
    fn test_unset_rust_log_disables_every_level() {
        // Arrange
        std::env::remove_var("RUST_LOG");

        // Act
        let filter = default_filter();

        // Assert
        assert_eq!(DEFAULT_LOG_FILTER, "off");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::OFF));
    }

    #[test]
    #[serial]
    fn test_rust_log_overrides_default() {
        std::env::set_var("RUST_LOG", "debug");

        let filter = default_filter();

        std::env::remove_var("RUST_LOG");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
