// Unit Tests for the Console Report
//
// UNIT UNDER TEST: write_report, format_report
//
// BUSINESS RESPONSIBILITY:
//   - Prints output text, status and output token count in a fixed layout
//
// TEST COVERAGE:
//   - Exact three-line layout
//   - Multi-line output text passed through unchanged

use crate::report::{format_report, write_report};
use crate::tests::helpers::inference_response;
use crate::types::ResponseStatus;

#[cfg(test)]
mod report_format_tests {
    use super::*;

    #[test]
    fn test_report_layout() {
        // Arrange
        let response = inference_response("X", ResponseStatus::Completed, 7);

        // Act
        let report = format_report(&response);

        // Assert
        assert_eq!(
            report,
            "Response: X\nStatus:   completed\nOutput tokens: 7\n"
        );
    }

    #[test]
    fn test_multiline_text_is_unchanged() {
        let response = inference_response("line one\nline two", ResponseStatus::Incomplete, 500);

        let mut buffer = Vec::new();
        write_report(&mut buffer, &response).unwrap();
        let report = String::from_utf8(buffer).unwrap();

        assert!(report.starts_with("Response: line one\nline two\n"));
        assert!(report.contains("Status:   incomplete\n"));
        assert!(report.ends_with("Output tokens: 500\n"));
    }
}
