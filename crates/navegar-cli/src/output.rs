//! Output formatting for command results

use console::style;
use serde::Serialize;

use crate::error::CliResult;

/// Print a labeled, pretty-printed JSON block to stdout.
///
/// The label is preceded by a blank line so the block stands apart from
/// the progress lines above it.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn json_block(label: &str, value: &impl Serialize) -> CliResult<()> {
    println!("\n{label}:");
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an error to stderr, styled when stderr is a terminal.
pub fn report_error(message: &str) {
    let prefix = style("Error:").for_stderr().red().bold();
    eprintln!("{prefix} {message}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_block_accepts_records() {
        let records = vec![serde_json::json!({ "method": "GET" })];
        assert!(json_block("Network Requests", &records).is_ok());
    }

    #[test]
    fn test_json_block_accepts_null() {
        assert!(json_block("Result", &serde_json::Value::Null).is_ok());
    }
}
