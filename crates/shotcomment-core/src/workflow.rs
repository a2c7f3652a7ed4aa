//! GitHub Actions workflow commands.
//!
//! The runner scans stdout for lines of the form `::<command>::<message>` and
//! turns them into annotations and collapsible log groups.

use std::fmt;

/// Kind of workflow command to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Group,
    EndGroup,
    Error,
    Warning,
    Notice,
    Debug,
}

impl MessageType {
    fn command(self) -> &'static str {
        match self {
            MessageType::Group => "group",
            MessageType::EndGroup => "endgroup",
            MessageType::Error => "error",
            MessageType::Warning => "warning",
            MessageType::Notice => "notice",
            MessageType::Debug => "debug",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// Render a workflow command line
///
/// # Examples
///
/// ```
/// use shotcomment_core::workflow::{MessageType, format_message};
///
/// assert_eq!(format_message("Parse Configuration", MessageType::Group), "::group::Parse Configuration");
/// assert_eq!(format_message("", MessageType::EndGroup), "::endgroup::");
/// assert_eq!(format_message("50%\ndone", MessageType::Notice), "::notice::50%25%0Adone");
/// ```
pub fn format_message(message: &str, message_type: MessageType) -> String {
    format!("::{}::{}", message_type, escape_data(message))
}

/// Write a workflow command line to stdout
pub fn print_message(message: &str, message_type: MessageType) {
    println!("{}", format_message(message, message_type));
}

fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        assert_eq!(
            format_message(
                "This action only works for [\"pull_request\"] event(s)",
                MessageType::Error
            ),
            "::error::This action only works for [\"pull_request\"] event(s)"
        );
    }

    #[test]
    fn test_all_commands() {
        assert_eq!(format_message("x", MessageType::Warning), "::warning::x");
        assert_eq!(format_message("x", MessageType::Notice), "::notice::x");
        assert_eq!(format_message("x", MessageType::Debug), "::debug::x");
        assert_eq!(format_message("", MessageType::Group), "::group::");
    }

    #[test]
    fn test_escaping_percent_first() {
        // A literal "%0A" must not be mistaken for an escaped newline
        assert_eq!(
            format_message("%0A\r\n", MessageType::Error),
            "::error::%250A%0D%0A"
        );
    }
}
