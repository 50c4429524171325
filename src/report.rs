//! Console report for one response

use crate::types::InferenceResponse;
use std::io::Write;

/// Write the three report lines:
///
/// ```text
/// Response: <output text>
/// Status:   <status>
/// Output tokens: <n>
/// ```
pub fn write_report<W: Write>(out: &mut W, response: &InferenceResponse) -> std::io::Result<()> {
    writeln!(out, "Response: {}", response.output_text)?;
    writeln!(out, "Status:   {}", response.status)?;
    writeln!(out, "Output tokens: {}", response.output_token_count)?;
    out.flush()
}

pub fn format_report(response: &InferenceResponse) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_report(&mut buffer, response);
    String::from_utf8_lossy(&buffer).into_owned()
}
